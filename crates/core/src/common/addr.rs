//! Address field decomposition.
//!
//! This module splits a 32-bit physical address into the three fields a
//! set-associative cache cares about. It provides:
//! 1. **Field extraction:** tag, set index, and block offset under a given
//!    `(set_bits, block_bits)` geometry.
//! 2. **Type safety:** the fields travel together as one struct so a tag is
//!    never confused with a set index at a call site.

/// The three bit-fields of an address under a set-associative mapping.
///
/// With `s` set-index bits and `b` block-offset bits, an address decomposes
/// as `[ tag | set | offset ]` from high to low bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrParts {
    /// High-order address tag stored in the cache line.
    pub tag: u32,
    /// Index of the cache set the address maps to.
    pub set: usize,
    /// Byte offset within the block.
    pub offset: u32,
}

impl AddrParts {
    /// Decomposes `addr` under `set_bits` (`s`) and `block_bits` (`b`).
    #[inline]
    pub fn decompose(addr: u32, set_bits: u32, block_bits: u32) -> Self {
        let offset = addr & ((1 << block_bits) - 1);
        let set = ((addr >> block_bits) & ((1 << set_bits) - 1)) as usize;
        let tag = addr >> (block_bits + set_bits);
        Self { tag, set, offset }
    }
}
