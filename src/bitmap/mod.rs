//! Bit storage backing each table of a [`BloomFilter`](crate::BloomFilter).

mod table;
pub use table::*;

use std::mem;

const WORD_BITS: usize = mem::size_of::<usize>() * 8;

#[inline(always)]
fn bitmask_for_key(key: usize) -> usize {
    1 << (key % WORD_BITS)
}

#[inline(always)]
fn index_for_key(key: usize) -> usize {
    key / WORD_BITS
}

/// Number of `usize` words needed to hold `bits` bits.
fn words_for_bits(bits: usize) -> usize {
    match bits % WORD_BITS {
        0 => index_for_key(bits),
        _ => index_for_key(bits) + 1, // +1 to cover the remainder
    }
}
