//! Prefix lookup table for decoding.

use kraft_core::{Error, Result};

use crate::types::HuffmanCode;

/// A single entry in a prefix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixEntry {
    /// The symbol this prefix decodes to.
    pub symbol: u8,
    /// Number of bits in the matched code; 0 if no code matches.
    pub length: u8,
}

impl PrefixEntry {
    /// Create a new entry.
    pub const fn new(symbol: u8, length: u8) -> Self {
        Self { symbol, length }
    }

    /// Check if a code matches this prefix.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.length != 0
    }
}

/// Single-level lookup table indexed by the next `max_bits` bits of input.
///
/// Every slot whose top `length` bits equal a code holds that code's symbol
/// and length, so one peek and one lookup decode any symbol. The storage is
/// kept between builds.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    entries: Vec<PrefixEntry>,
    max_bits: u8,
}

impl PrefixTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table from canonical codes no longer than `max_bits`.
    pub fn build(&mut self, codes: &[HuffmanCode], max_bits: u8) -> Result<()> {
        let size = 1usize << max_bits;

        self.entries.clear();
        self.entries.resize(size, PrefixEntry::default());
        self.max_bits = max_bits;

        for code in codes {
            if code.length == 0 || code.length > max_bits {
                return Err(Error::corrupted(format!(
                    "code length {} for symbol 0x{:02x} outside [1, {}]",
                    code.length, code.symbol, max_bits
                )));
            }

            // The code occupies the high bits, remaining bits can be anything
            let num_extra = max_bits - code.length;
            let base = usize::from(code.code) << num_extra;
            let count = 1usize << num_extra;

            let Some(slots) = self.entries.get_mut(base..base + count) else {
                return Err(Error::corrupted(format!(
                    "code {} does not fit in {} bits",
                    code, max_bits
                )));
            };
            slots.fill(PrefixEntry::new(code.symbol, code.length));
        }

        Ok(())
    }

    /// Get the table size.
    #[inline]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Get the lookup width in bits.
    #[inline]
    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Look up the entry for `max_bits` peeked bits.
    #[inline]
    pub fn lookup(&self, index: usize) -> PrefixEntry {
        self.entries.get(index).copied().unwrap_or_default()
    }
}
