//! Registration and discovery of the hash functions a key type provides to a
//! [`BloomFilter`](crate::BloomFilter).
//!
//! A key type declares its hash functions by implementing [`BloomKey`],
//! usually through [`impl_bloom_key!`](crate::impl_bloom_key):
//!
//! ```rust
//! use tablebloom::{discover, impl_bloom_key};
//!
//! struct Flower(String);
//!
//! impl Flower {
//!     fn char_sum(&self, bits_per_table: usize) -> usize {
//!         self.0.bytes().map(usize::from).sum::<usize>() % bits_per_table
//!     }
//!
//!     fn length(&self, bits_per_table: usize) -> usize {
//!         self.0.len() % bits_per_table
//!     }
//!
//!     // Not registered, never used by a filter.
//!     fn shout(&self) -> String {
//!         self.0.to_uppercase()
//!     }
//! }
//!
//! impl_bloom_key!(Flower => Flower::char_sum, Flower::length);
//!
//! assert_eq!(
//!     discover::<Flower>().names().collect::<Vec<_>>(),
//!     ["Flower::char_sum", "Flower::length"],
//! );
//! ```

use std::borrow::Cow;
use std::convert::TryInto;
use std::fmt::{self, Display};
use std::iter::FromIterator;
use std::sync::Arc;

use tracing::warn;

use crate::HashFunctionError;

/// The type-erased form of every registered hash function.
///
/// The `Err` variant carries the rendered output when it cannot be converted
/// into a `usize` index.
type RawHashFn<K> = dyn Fn(&K, usize) -> Result<usize, String> + Send + Sync;

/// A function marked for use as one of the hash functions of a
/// [`BloomFilter`](crate::BloomFilter).
///
/// Every hash function has the same shape: it is given the key and the
/// number of bits in each table (`bits_per_table`), and must return an index
/// in the range `[0, bits_per_table)`. The filter uses the index as-is; a
/// value outside that range, or one that cannot be represented as a `usize`
/// (such as a negative integer), is reported as a [`HashFunctionError`].
///
/// Cloning a `HashFunction` is cheap and shares the underlying function.
pub struct HashFunction<K: ?Sized> {
    name: Cow<'static, str>,
    func: Arc<RawHashFn<K>>,
}

impl<K: ?Sized> HashFunction<K> {
    /// Register `func` as a bloom hash function named `name`.
    ///
    /// `func` may return any integer type; the value is converted to a
    /// `usize` index when the filter calls it.
    ///
    /// ```rust
    /// use tablebloom::HashFunction;
    ///
    /// let len = HashFunction::new("len", |key: &str, bits: usize| key.len() % bits);
    /// assert_eq!(len.name(), "len");
    /// ```
    ///
    /// Functions taking anything other than the key and the table size are
    /// rejected:
    ///
    /// ```compile_fail
    /// use tablebloom::HashFunction;
    ///
    /// let f = HashFunction::new("extra", |_k: &str, _a: usize, _b: usize| 0_usize);
    /// ```
    ///
    /// As are functions that do not return an integer:
    ///
    /// ```compile_fail
    /// use tablebloom::HashFunction;
    ///
    /// let f = HashFunction::new("float", |k: &str, _bits: usize| k.len() as f64);
    /// ```
    ///
    /// ```compile_fail
    /// use tablebloom::HashFunction;
    ///
    /// let f = HashFunction::new("text", |_k: &str, _bits: usize| "not a number");
    /// ```
    pub fn new<F, R>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&K, usize) -> R + Send + Sync + 'static,
        R: TryInto<usize> + Display + Copy,
    {
        let func = move |key: &K, bits_per_table: usize| {
            let raw = func(key, bits_per_table);
            let index: Result<usize, _> = raw.try_into();
            index.map_err(|_| raw.to_string())
        };

        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The name this function was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expose this function to a type `O` that can be viewed as a `K`.
    ///
    /// This is how a key type inherits the hash functions of a type it wraps
    /// or embeds. The projected function keeps its name.
    pub fn project<O, P>(&self, parent: P) -> HashFunction<O>
    where
        O: ?Sized,
        K: 'static,
        P: Fn(&O) -> &K + Send + Sync + 'static,
    {
        let func = Arc::clone(&self.func);

        HashFunction {
            name: self.name.clone(),
            func: Arc::new(move |key: &O, bits_per_table: usize| {
                func(parent(key), bits_per_table)
            }),
        }
    }

    /// Call the function and check the result is a usable index into a
    /// table of `bits_per_table` bits.
    pub(crate) fn index(&self, key: &K, bits_per_table: usize) -> Result<usize, HashFunctionError> {
        let index = (self.func)(key, bits_per_table).map_err(|value| {
            warn!(function = %self.name, %value, "hash function returned a non-index value");
            HashFunctionError::InvalidOutput {
                function: self.name.to_string(),
                value,
            }
        })?;

        if index >= bits_per_table {
            warn!(
                function = %self.name,
                index,
                bits_per_table,
                "hash function returned an out of range index"
            );
            return Err(HashFunctionError::OutOfRange {
                function: self.name.to_string(),
                index,
                bits_per_table,
            });
        }

        Ok(index)
    }
}

impl<K: ?Sized> Clone for HashFunction<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<K: ?Sized> fmt::Debug for HashFunction<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashFunction").field(&self.name).finish()
    }
}

/// Register a method or free function as a [`HashFunction`], using its path
/// as the name.
///
/// ```rust
/// use tablebloom::bloom_hash;
///
/// struct Word(&'static str);
///
/// impl Word {
///     fn first_byte(&self, bits_per_table: usize) -> usize {
///         self.0.bytes().next().map_or(0, usize::from) % bits_per_table
///     }
/// }
///
/// let f = bloom_hash!(Word::first_byte);
/// assert_eq!(f.name(), "Word::first_byte");
/// ```
#[macro_export]
macro_rules! bloom_hash {
    ($func:path) => {
        $crate::HashFunction::new(stringify!($func), $func)
    };
}

/// An ordered set of hash functions for keys of type `K`.
///
/// Iteration order is insertion order, and a filter pairs each function with
/// its own table in this order.
pub struct HashFunctions<K: ?Sized> {
    funcs: Vec<HashFunction<K>>,
}

impl<K: ?Sized> HashFunctions<K> {
    /// An empty set.
    pub fn new() -> Self {
        Self { funcs: Vec::new() }
    }

    /// Append `func` to the set.
    pub fn push(&mut self, func: HashFunction<K>) {
        self.funcs.push(func);
    }

    /// Append `func`, returning the set for chaining.
    pub fn register(mut self, func: HashFunction<K>) -> Self {
        self.push(func);
        self
    }

    /// Expose every function in this set to a type `O` that can be viewed as
    /// a `K`, preserving order and names.
    ///
    /// ```rust
    /// use tablebloom::{bloom_hash, discover, BloomKey, HashFunctions, impl_bloom_key};
    ///
    /// struct Name(String);
    ///
    /// impl Name {
    ///     fn len(&self, bits: usize) -> usize {
    ///         self.0.len() % bits
    ///     }
    /// }
    ///
    /// impl_bloom_key!(Name => Name::len);
    ///
    /// struct TitledName {
    ///     name: Name,
    ///     title: &'static str,
    /// }
    ///
    /// impl TitledName {
    ///     fn title_len(&self, bits: usize) -> usize {
    ///         self.title.len() % bits
    ///     }
    /// }
    ///
    /// impl BloomKey for TitledName {
    ///     fn hash_functions() -> HashFunctions<Self> {
    ///         discover::<Name>()
    ///             .project(|t: &TitledName| &t.name)
    ///             .register(bloom_hash!(TitledName::title_len))
    ///     }
    /// }
    ///
    /// assert_eq!(
    ///     discover::<TitledName>().names().collect::<Vec<_>>(),
    ///     ["Name::len", "TitledName::title_len"],
    /// );
    /// ```
    pub fn project<O, P>(&self, parent: P) -> HashFunctions<O>
    where
        O: ?Sized,
        K: 'static,
        P: Fn(&O) -> &K + Clone + Send + Sync + 'static,
    {
        self.funcs
            .iter()
            .map(|f| f.project(parent.clone()))
            .collect()
    }

    /// The number of functions in the set.
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    /// Returns `true` if no functions have been registered.
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Iterate over the functions, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, HashFunction<K>> {
        self.funcs.iter()
    }

    /// The names of the functions, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.funcs.iter().map(HashFunction::name)
    }
}

impl<K: ?Sized> Default for HashFunctions<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized> Clone for HashFunctions<K> {
    fn clone(&self) -> Self {
        Self {
            funcs: self.funcs.clone(),
        }
    }
}

impl<K: ?Sized> fmt::Debug for HashFunctions<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<K: ?Sized> FromIterator<HashFunction<K>> for HashFunctions<K> {
    fn from_iter<I: IntoIterator<Item = HashFunction<K>>>(iter: I) -> Self {
        Self {
            funcs: iter.into_iter().collect(),
        }
    }
}

impl<K: ?Sized> Extend<HashFunction<K>> for HashFunctions<K> {
    fn extend<I: IntoIterator<Item = HashFunction<K>>>(&mut self, iter: I) {
        self.funcs.extend(iter)
    }
}

impl<K: ?Sized> IntoIterator for HashFunctions<K> {
    type Item = HashFunction<K>;
    type IntoIter = std::vec::IntoIter<HashFunction<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.funcs.into_iter()
    }
}

impl<'a, K: ?Sized> IntoIterator for &'a HashFunctions<K> {
    type Item = &'a HashFunction<K>;
    type IntoIter = std::slice::Iter<'a, HashFunction<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.funcs.iter()
    }
}

/// A key type that declares the hash functions a
/// [`BloomFilter`](crate::BloomFilter) uses for it.
///
/// The returned set must be the same, in the same order, every time it is
/// called within a process.
pub trait BloomKey {
    /// The hash functions a filter keyed by `Self` uses, one table each.
    fn hash_functions() -> HashFunctions<Self>;
}

/// Return the hash functions declared by `K`.
pub fn discover<K: BloomKey + ?Sized>() -> HashFunctions<K> {
    K::hash_functions()
}

/// Implement [`BloomKey`] for a type from a list of its hash functions.
///
/// Each entry is registered with [`bloom_hash!`](crate::bloom_hash), so the
/// function's path becomes its name.
///
/// ```rust
/// use tablebloom::{impl_bloom_key, BloomFilter};
///
/// struct Id(u64);
///
/// impl Id {
///     fn low(&self, bits: usize) -> u64 {
///         self.0 % bits as u64
///     }
///
///     fn high(&self, bits: usize) -> u64 {
///         (self.0 >> 32) % bits as u64
///     }
/// }
///
/// impl_bloom_key!(Id => Id::low, Id::high);
///
/// let mut filter = BloomFilter::<Id>::new(64).unwrap();
/// filter.insert(&Id(42)).unwrap();
/// assert!(filter.contains(&Id(42)).unwrap());
/// ```
#[macro_export]
macro_rules! impl_bloom_key {
    ($ty:ty => $($func:path),+ $(,)?) => {
        impl $crate::BloomKey for $ty {
            fn hash_functions() -> $crate::HashFunctions<Self> {
                $crate::HashFunctions::new()
                    $(.register($crate::bloom_hash!($func)))+
            }
        }
    };
}
