use crate::Bitmap;

use super::{bitmask_for_key, index_for_key, words_for_bits};

/// A plain, heap-allocated, `O(1)` indexed bit table.
///
/// Bits are packed into `usize` words and every bit starts unset. The length
/// is fixed when the table is allocated; bits can be set but never cleared,
/// matching the insert-only nature of a bloom filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitTable {
    bitmap: Vec<usize>,
    len: usize,
}

impl BitTable {
    /// The number of addressable bits in this table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table has no addressable bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Bitmap for BitTable {
    fn new_with_capacity(bits: usize) -> Self {
        Self {
            bitmap: vec![0; words_for_bits(bits)],
            len: bits,
        }
    }

    /// # Panics
    ///
    /// Panics if `key >= len`.
    fn set(&mut self, key: usize) {
        assert!(key < self.len, "key {} >= {} len", key, self.len);

        self.bitmap[index_for_key(key)] |= bitmask_for_key(key);
    }

    /// # Panics
    ///
    /// Panics if `key >= len`.
    fn get(&self, key: usize) -> bool {
        assert!(key < self.len, "key {} >= {} len", key, self.len);

        self.bitmap[index_for_key(key)] & bitmask_for_key(key) != 0
    }

    fn byte_size(&self) -> usize {
        self.bitmap.len() * std::mem::size_of::<usize>()
    }

    fn count_ones(&self) -> usize {
        self.bitmap.iter().map(|w| w.count_ones() as usize).sum()
    }
}
