use tablebloom::{
    bloom_hash, discover, impl_bloom_key, BloomFilter, BloomKey, ConfigurationError,
    HashFunction, HashFunctionError, HashFunctions,
};
use itertools::Itertools;
use twox_hash::XxHash64;

/// Fixed keys inserted by the scenario tests.
const FLOWERS: [&str; 4] = ["lily", "oleander", "scarlet pimpernel", "spanish oyster"];

#[derive(Debug, Clone)]
struct MyString(String);

impl MyString {
    fn foo(&self, bits: usize) -> usize {
        self.0.chars().map(|c| c as usize).sum::<usize>() % bits
    }

    fn bar(&self, bits: usize) -> u64 {
        XxHash64::oneshot(0, self.0.as_bytes()) % bits as u64
    }

    fn baz(&self, bits: usize) -> usize {
        self.0
            .chars()
            .fold(1_usize, |acc, c| acc.wrapping_mul(c as usize))
            % bits
    }

    fn qux(&self, _bits: usize) -> usize {
        1
    }

    #[allow(dead_code)]
    fn not_a_hash(&self, _bits: usize) -> usize {
        0
    }
}

impl_bloom_key!(MyString => MyString::foo, MyString::bar, MyString::baz, MyString::qux);

/// Inherits every hash function of [`MyString`] without adding any.
struct Shouted(MyString);

impl BloomKey for Shouted {
    fn hash_functions() -> HashFunctions<Self> {
        discover::<MyString>().project(|s: &Shouted| &s.0)
    }
}

struct NoHashes;

impl BloomKey for NoHashes {
    fn hash_functions() -> HashFunctions<Self> {
        HashFunctions::new()
    }
}

struct TooBig(usize);

impl TooBig {
    fn identity(&self, _bits: usize) -> usize {
        self.0
    }
}

impl_bloom_key!(TooBig => TooBig::identity);

struct Negative;

impl Negative {
    fn minus_one(&self, _bits: usize) -> i64 {
        -1
    }
}

impl_bloom_key!(Negative => Negative::minus_one);

fn flowers() -> Vec<MyString> {
    FLOWERS.iter().map(|s| MyString(s.to_string())).collect()
}

/// Generate a test inserting the flower keys in every order into a filter of
/// the given size, asserting each is found after insertion.
macro_rules! test_membership {
    (
        $name:ident, // Test name suffix.
        $bits:expr   // Bits per table.
    ) => {
        paste::paste! {
            #[test]
            fn [<test_membership_ $name>]() {
                let keys = flowers();
                let orders = keys
                    .iter()
                    .cloned()
                    .permutations(keys.len())
                    .collect::<Vec<_>>();
                assert_eq!(orders.len(), 24);

                let mut tables = Vec::new();
                for order in orders {
                    let mut b = BloomFilter::<MyString>::new($bits).unwrap();

                    for k in &order {
                        b.insert(k).unwrap();
                        assert!(b.contains(k).unwrap());
                    }

                    for k in &keys {
                        assert!(b.contains(k).unwrap(), "{:?} not found", k);
                    }

                    tables.push(b.tables().cloned().collect::<Vec<_>>());
                }

                // Invariant: the final state does not depend on insertion order.
                assert!(tables.windows(2).all(|w| w[0] == w[1]));
            }
        }
    };
}

test_membership!(bits_10, 10);
test_membership!(bits_64, 64);
test_membership!(bits_4096, 4096);

#[test]
fn test_empty() {
    let b = BloomFilter::<MyString>::new(10).unwrap();

    assert!(flowers().iter().all(|k| !b.contains(k).unwrap()));
    assert_eq!(b.count_ones(), 0);
}

#[test]
fn test_discovery() {
    assert_eq!(
        discover::<MyString>().names().collect::<Vec<_>>(),
        ["MyString::foo", "MyString::bar", "MyString::baz", "MyString::qux"]
    );
}

#[test]
fn test_inherited_hash_functions() {
    assert_eq!(
        discover::<Shouted>().names().collect::<Vec<_>>(),
        discover::<MyString>().names().collect::<Vec<_>>()
    );

    let mut plain = BloomFilter::<MyString>::new(10).unwrap();
    let mut shouted = BloomFilter::<Shouted>::new(10).unwrap();

    for k in flowers() {
        plain.insert(&k).unwrap();
        shouted.insert(&Shouted(k)).unwrap();
    }

    // The inherited functions hash the wrapped string, producing identical
    // tables.
    assert!(plain.tables().eq(shouted.tables()));
}

#[test]
fn test_dynamic_hash_functions() {
    // Seeds only known at runtime.
    let seeds = FLOWERS.iter().map(|f| f.len() as u64).collect::<Vec<_>>();

    let funcs: HashFunctions<str> = seeds
        .iter()
        .map(|&seed| {
            HashFunction::new(format!("xxh64_{}", seed), move |k: &str, bits: usize| {
                XxHash64::oneshot(seed, k.as_bytes()) % bits as u64
            })
        })
        .collect();

    let mut b = BloomFilter::with_hash_functions(1024, funcs).unwrap();
    assert_eq!(b.hash_function_count(), 4);

    for f in FLOWERS.iter() {
        b.insert(f).unwrap();
    }
    for f in FLOWERS.iter() {
        assert!(b.contains(f).unwrap());
    }
}

#[test]
fn test_bad_bits_per_table() {
    assert!(matches!(
        BloomFilter::<MyString>::new(0),
        Err(ConfigurationError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        BloomFilter::<MyString>::new(-5),
        Err(ConfigurationError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        BloomFilter::<MyString>::new(-1234),
        Err(ConfigurationError::InvalidCapacity { .. })
    ));
}

#[test]
fn test_type_without_hash_functions() {
    let err = BloomFilter::<NoHashes>::new(10).unwrap_err();

    assert!(matches!(err, ConfigurationError::NoHashFunctions { .. }));
    assert!(err.to_string().contains("NoHashes"));
}

#[test]
fn test_out_of_range_hash() {
    let mut b = BloomFilter::<TooBig>::new(10).unwrap();

    // In range works as normal.
    b.insert(&TooBig(9)).unwrap();
    assert!(b.contains(&TooBig(9)).unwrap());

    let want = HashFunctionError::OutOfRange {
        function: "TooBig::identity".to_string(),
        index: 10,
        bits_per_table: 10,
    };
    assert_eq!(b.insert(&TooBig(10)), Err(want.clone()));
    assert_eq!(b.contains(&TooBig(10)), Err(want));
}

#[test]
fn test_negative_hash() {
    let mut b = BloomFilter::<Negative>::new(10).unwrap();

    let err = b.insert(&Negative).unwrap_err();
    assert_eq!(
        err,
        HashFunctionError::InvalidOutput {
            function: "Negative::minus_one".to_string(),
            value: "-1".to_string(),
        }
    );
    assert!(err.to_string().contains("Negative::minus_one"));
}

#[test]
fn test_errors_convert() {
    fn build_and_insert() -> tablebloom::Result<bool> {
        let mut b = BloomFilter::<TooBig>::new(4)?;
        b.insert(&TooBig(2))?;
        b.insert(&TooBig(4))?;
        Ok(true)
    }

    assert!(matches!(
        build_and_insert(),
        Err(tablebloom::Error::HashFunction(HashFunctionError::OutOfRange { .. }))
    ));
}

#[test]
fn test_macro_name() {
    let f = bloom_hash!(MyString::foo);
    assert_eq!(f.name(), "MyString::foo");
}
