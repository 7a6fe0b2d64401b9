//! tablebloom implements a bloom filter that keeps an independent bit table
//! for each of its hash functions, with the hash functions declared by the
//! key type itself.
//!
//! A key type lists its hash functions by implementing [`BloomKey`], most
//! easily with [`impl_bloom_key!`]. Each function is given the key and the
//! number of bits in a table, and returns the index of the bit to use:
//!
//! ```rust
//! use tablebloom::{impl_bloom_key, BloomFilter};
//!
//! struct Flower(&'static str);
//!
//! impl Flower {
//!     fn byte_sum(&self, bits_per_table: usize) -> usize {
//!         self.0.bytes().map(usize::from).sum::<usize>() % bits_per_table
//!     }
//!
//!     fn len(&self, bits_per_table: usize) -> usize {
//!         self.0.len() % bits_per_table
//!     }
//! }
//!
//! impl_bloom_key!(Flower => Flower::byte_sum, Flower::len);
//!
//! let mut filter = BloomFilter::<Flower>::new(10)?;
//! filter.insert(&Flower("lily"))?;
//!
//! assert!(filter.contains(&Flower("lily"))?);
//! # Ok::<(), tablebloom::Error>(())
//! ```
//!
//! Lookups may return false positives but never false negatives. There is no
//! removal, resizing or serialisation; a filter is sized once when it is
//! built.
//!
//! Hash functions that return an index outside `[0, bits_per_table)` cause
//! the lookup or insert to fail with a [`HashFunctionError`], logged at `WARN`
//! through [tracing].
//!
//! [tracing]: https://docs.rs/tracing

mod bitmap;
mod bloom;
mod error;
mod registry;

pub use bitmap::*;
pub use bloom::*;
pub use error::*;
pub use registry::*;
