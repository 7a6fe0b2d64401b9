use crate::registry::{discover, BloomKey, HashFunction, HashFunctions};
use crate::{BitTable, ConfigurationError, HashFunctionError};
use std::any::type_name;
use std::convert::TryInto;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use tracing::debug;

/// The number of bits per table used when a [`BloomFilterBuilder`] is not
/// given an explicit size: the key space of a 2 byte index.
pub const DEFAULT_BITS_PER_TABLE: usize = 1 << 16;

/// A trait to abstract the bit storage of a single table in a
/// [`BloomFilter`].
pub trait Bitmap {
    /// Allocate storage for `bits` bits, all unset.
    fn new_with_capacity(bits: usize) -> Self
    where
        Self: Sized;

    /// Set the bit indexed by `key` to `true`.
    fn set(&mut self, key: usize);

    /// Return `true` if the given bit index was previously set.
    fn get(&self, key: usize) -> bool;

    /// Return the size of the bitmap in bytes.
    fn byte_size(&self) -> usize;

    /// Return the number of set bits.
    fn count_ones(&self) -> usize;
}

/// Construct [`BloomFilter`] instances with varying parameters.
///
/// ```rust
/// use tablebloom::{impl_bloom_key, BloomFilterBuilder};
///
/// struct Tag(&'static str);
///
/// impl Tag {
///     fn len(&self, bits: usize) -> usize {
///         self.0.len() % bits
///     }
/// }
///
/// impl_bloom_key!(Tag => Tag::len);
///
/// let mut filter = BloomFilterBuilder::<Tag>::default()
///                     .bits_per_table(128)
///                     .build()
///                     .unwrap();
///
/// filter.insert(&Tag("success!")).unwrap();
/// ```
pub struct BloomFilterBuilder<K, B = BitTable>
where
    K: ?Sized,
    B: Bitmap,
{
    hash_functions: HashFunctions<K>,
    bits_per_table: Result<usize, ConfigurationError>,
    _bitmap: PhantomData<B>,
}

/// Initialise a `BloomFilterBuilder` using the hash functions declared by
/// `K`, [`DEFAULT_BITS_PER_TABLE`] bits per table and [`BitTable`] storage.
impl<K> Default for BloomFilterBuilder<K, BitTable>
where
    K: BloomKey + ?Sized,
{
    fn default() -> Self {
        Self::new(discover::<K>())
    }
}

impl<K> BloomFilterBuilder<K, BitTable>
where
    K: ?Sized,
{
    /// Initialise a `BloomFilterBuilder` using an explicit set of hash
    /// functions, rather than those declared by `K`.
    pub fn new(hash_functions: HashFunctions<K>) -> Self {
        Self {
            hash_functions,
            bits_per_table: Ok(DEFAULT_BITS_PER_TABLE),
            _bitmap: PhantomData,
        }
    }
}

impl<K, B> BloomFilterBuilder<K, B>
where
    K: ?Sized,
    B: Bitmap,
{
    /// Set the number of bits in each table.
    ///
    /// Any integer type is accepted; values that are not positive are
    /// rejected when [`build`](Self::build) is called.
    pub fn bits_per_table<N>(self, bits: N) -> Self
    where
        N: TryInto<usize> + Display + Copy,
    {
        let parsed: Result<usize, _> = bits.try_into();
        let bits_per_table = match parsed {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigurationError::InvalidCapacity {
                bits_per_table: bits.to_string(),
            }),
        };

        Self {
            bits_per_table,
            ..self
        }
    }

    /// Set the bit storage for each table of the filter.
    pub fn with_bitmap<U: Bitmap>(self) -> BloomFilterBuilder<K, U> {
        BloomFilterBuilder {
            hash_functions: self.hash_functions,
            bits_per_table: self.bits_per_table,
            _bitmap: PhantomData,
        }
    }

    /// Validate the parameters and initialise the [`BloomFilter`].
    pub fn build(self) -> Result<BloomFilter<K, B>, ConfigurationError> {
        let bits_per_table = self.bits_per_table?;

        if self.hash_functions.is_empty() {
            return Err(ConfigurationError::NoHashFunctions {
                key_type: type_name::<K>(),
            });
        }

        let tables = self
            .hash_functions
            .into_iter()
            .map(|f| (f, B::new_with_capacity(bits_per_table)))
            .collect::<Vec<_>>();

        debug!(
            key_type = type_name::<K>(),
            hash_functions = tables.len(),
            bits_per_table,
            "initialised bloom filter"
        );

        Ok(BloomFilter {
            tables,
            bits_per_table,
        })
    }
}

/// A bloom filter holding one bit table per registered hash function.
///
/// Each hash function declared by the key type (see
/// [`BloomKey`](crate::BloomKey)) is paired with its own table of
/// `bits_per_table` bits. An insert sets one bit in every table; a lookup
/// reports the key as present only if the corresponding bit is set in every
/// table.
///
/// ```rust
/// use tablebloom::{impl_bloom_key, BloomFilter};
///
/// struct Word(&'static str);
///
/// impl Word {
///     fn byte_sum(&self, bits: usize) -> usize {
///         self.0.bytes().map(usize::from).sum::<usize>() % bits
///     }
///
///     fn len(&self, bits: usize) -> usize {
///         self.0.len() % bits
///     }
/// }
///
/// impl_bloom_key!(Word => Word::byte_sum, Word::len);
///
/// let mut b = BloomFilter::<Word>::new(1024).unwrap();
/// b.insert(&Word("hello 🐐")).unwrap();
/// assert!(b.contains(&Word("hello 🐐")).unwrap());
/// ```
///
/// Hash functions are handed the table size and must return an index in
/// `[0, bits_per_table)`; the filter does not rescale their output. A function
/// that breaks this contract causes the lookup or insert to fail with a
/// [`HashFunctionError`].
///
/// A `BloomFilter` is not internally synchronised. Inserts require `&mut
/// self`; callers sharing an instance between threads must serialise access
/// themselves, for example with a `Mutex`.
pub struct BloomFilter<K, B = BitTable>
where
    K: ?Sized,
    B: Bitmap,
{
    tables: Vec<(HashFunction<K>, B)>,
    bits_per_table: usize,
}

impl<K> BloomFilter<K, BitTable>
where
    K: BloomKey + ?Sized,
{
    /// Initialise a filter with `bits_per_table` bits for each hash function
    /// declared by `K`.
    ///
    /// It is the equivalent of:
    ///
    /// ```rust
    /// # use tablebloom::{impl_bloom_key, BloomFilterBuilder};
    /// # struct Tag(u8);
    /// # impl Tag { fn id(&self, bits: usize) -> usize { self.0 as usize % bits } }
    /// # impl_bloom_key!(Tag => Tag::id);
    /// let b = BloomFilterBuilder::<Tag>::default()
    ///     .bits_per_table(10)
    ///     .build();
    /// # assert!(b.is_ok());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if `bits_per_table` is not positive or
    /// `K` declares no hash functions.
    pub fn new<N>(bits_per_table: N) -> Result<Self, ConfigurationError>
    where
        N: TryInto<usize> + Display + Copy,
    {
        BloomFilterBuilder::default()
            .bits_per_table(bits_per_table)
            .build()
    }
}

impl<K> BloomFilter<K, BitTable>
where
    K: ?Sized,
{
    /// Initialise a filter using an explicit set of hash functions, such as
    /// one assembled at runtime.
    ///
    /// ```rust
    /// use tablebloom::{BloomFilter, HashFunction, HashFunctions};
    ///
    /// let funcs: HashFunctions<str> = (1..=3_usize)
    ///     .map(|seed| {
    ///         HashFunction::new(format!("seed_{}", seed), move |key: &str, bits: usize| {
    ///             key.bytes().fold(seed, |h, b| h.wrapping_mul(31).wrapping_add(b.into())) % bits
    ///         })
    ///     })
    ///     .collect();
    ///
    /// let mut b = BloomFilter::with_hash_functions(256, funcs).unwrap();
    /// b.insert("bananas").unwrap();
    /// assert!(b.contains("bananas").unwrap());
    /// assert_eq!(b.hash_function_count(), 3);
    /// ```
    pub fn with_hash_functions<N>(
        bits_per_table: N,
        hash_functions: HashFunctions<K>,
    ) -> Result<Self, ConfigurationError>
    where
        N: TryInto<usize> + Display + Copy,
    {
        BloomFilterBuilder::new(hash_functions)
            .bits_per_table(bits_per_table)
            .build()
    }
}

impl<K, B> BloomFilter<K, B>
where
    K: ?Sized,
    B: Bitmap,
{
    /// Insert places `key` into the bloom filter.
    ///
    /// Any subsequent calls to [`contains`](BloomFilter::contains) for the
    /// same `key` will always return true. Inserting a key more than once has
    /// no further effect.
    ///
    /// Every hash function is evaluated before any table is modified, so an
    /// insert that fails leaves the filter unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HashFunctionError`] if a hash function produces a value that
    /// is not an index in `[0, bits_per_table)`.
    pub fn insert(&mut self, key: &K) -> Result<(), HashFunctionError> {
        let bits_per_table = self.bits_per_table;

        let indexes = self
            .tables
            .iter()
            .map(|(f, _)| f.index(key, bits_per_table))
            .collect::<Result<Vec<_>, _>>()?;

        self.tables
            .iter_mut()
            .zip(indexes)
            .for_each(|((_, table), index)| table.set(index));

        Ok(())
    }

    /// Checks if `key` exists in the filter.
    ///
    /// If `contains` returns true, `key` has **probably** been inserted
    /// previously. If `contains` returns false, `key` has **definitely not**
    /// been inserted into the filter.
    ///
    /// The tables are checked in order and the lookup stops at the first
    /// unset bit; hash functions after it are not called.
    ///
    /// # Errors
    ///
    /// Returns [`HashFunctionError`] if a hash function that is called
    /// produces a value that is not an index in `[0, bits_per_table)`.
    pub fn contains(&self, key: &K) -> Result<bool, HashFunctionError> {
        for (f, table) in &self.tables {
            if !table.get(f.index(key, self.bits_per_table)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The number of bits in each table.
    pub fn bits_per_table(&self) -> usize {
        self.bits_per_table
    }

    /// The number of hash functions, and therefore tables, in the filter.
    pub fn hash_function_count(&self) -> usize {
        self.tables.len()
    }

    /// The names of the hash functions, in table order.
    pub fn hash_function_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.iter().map(|(f, _)| f.name())
    }

    /// The tables, in hash function order.
    pub fn tables(&self) -> impl Iterator<Item = &B> + '_ {
        self.tables.iter().map(|(_, table)| table)
    }

    /// The total number of bits set across all tables.
    pub fn count_ones(&self) -> usize {
        self.tables().map(Bitmap::count_ones).sum()
    }

    /// Return the byte size of the tables of this filter.
    pub fn byte_size(&self) -> usize {
        self.tables().map(Bitmap::byte_size).sum()
    }
}

impl<K, B> Clone for BloomFilter<K, B>
where
    K: ?Sized,
    B: Bitmap + Clone,
{
    fn clone(&self) -> Self {
        Self {
            tables: self.tables.clone(),
            bits_per_table: self.bits_per_table,
        }
    }
}

impl<K, B> fmt::Debug for BloomFilter<K, B>
where
    K: ?Sized,
    B: Bitmap + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("tables", &self.tables)
            .field("bits_per_table", &self.bits_per_table)
            .finish()
    }
}
