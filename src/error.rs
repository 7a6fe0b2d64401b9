use thiserror::Error;

/// A [`BloomFilter`](crate::BloomFilter) could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The requested number of bits per table was zero or negative, or did
    /// not fit in a `usize`.
    #[error("bloom filter must have a positive number of bits per table, got {bits_per_table}")]
    InvalidCapacity {
        /// The rejected capacity, as provided by the caller.
        bits_per_table: String,
    },

    /// The key type declares no hash functions.
    #[error("no bloom hash functions found for {key_type}")]
    NoHashFunctions {
        /// Name of the key type.
        key_type: &'static str,
    },
}

/// A registered hash function broke its contract during a lookup or insert.
///
/// A filter whose hash function produces one of these can no longer be
/// trusted to answer queries; fix the hash function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashFunctionError {
    /// The function returned a value that cannot be used as a table index,
    /// such as a negative integer.
    #[error("hash function {function} returned {value}, which is not a valid table index")]
    InvalidOutput {
        /// Name of the offending hash function.
        function: String,
        /// The returned value.
        value: String,
    },

    /// The function returned an index outside `[0, bits_per_table)`.
    #[error(
        "hash function {function} returned {index}, outside the table range \
         [0, {bits_per_table}); hash functions must distribute throughout \
         [0, bits_per_table)"
    )]
    OutOfRange {
        /// Name of the offending hash function.
        function: String,
        /// The returned index.
        index: usize,
        /// Size of each table in the filter.
        bits_per_table: usize,
    },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A filter could not be constructed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A hash function broke its contract.
    #[error(transparent)]
    HashFunction(#[from] HashFunctionError),
}

/// A `Result` defaulting to this crate's [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
