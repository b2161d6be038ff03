//! Huffman primitives: tree nodes, canonical codes and code lists.

use std::cmp::Ordering;
use std::fmt;

use kraft_core::{Error, Result};

use crate::MAX_SYMBOLS;

/// Index of a node within a tree arena.
pub type NodeIndex = u16;

/// A node of a Huffman tree.
///
/// Nodes live in a fixed arena and refer to their children by index, so a
/// tree needs no per-node allocation and no parent links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A symbol and how often it occurs.
    Leaf { symbol: u8, frequency: u64 },
    /// Two subtrees and the sum of their frequencies.
    Junction {
        left: NodeIndex,
        right: NodeIndex,
        frequency: u64,
    },
}

impl HuffmanNode {
    /// Frequency of the subtree rooted at this node.
    #[inline]
    pub fn frequency(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { frequency, .. } | HuffmanNode::Junction { frequency, .. } => {
                frequency
            }
        }
    }

    /// Check if this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

impl Default for HuffmanNode {
    fn default() -> Self {
        HuffmanNode::Leaf {
            symbol: 0,
            frequency: 0,
        }
    }
}

/// A symbol's code: its bit pattern and length.
///
/// The code occupies the `length` least-significant bits of `code`. Codes
/// order by length, then by symbol, which is the canonical order used both in
/// memory and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HuffmanCode {
    /// The symbol this code stands for.
    pub symbol: u8,
    /// The code bits.
    pub code: u16,
    /// Number of bits in the code.
    pub length: u8,
}

impl HuffmanCode {
    /// Create a new code.
    pub const fn new(symbol: u8, code: u16, length: u8) -> Self {
        Self {
            symbol,
            code,
            length,
        }
    }
}

impl Ord for HuffmanCode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.length, self.symbol, self.code).cmp(&(other.length, other.symbol, other.code))
    }
}

impl PartialOrd for HuffmanCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HuffmanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02x} => {:0width$b}",
            self.symbol,
            self.code,
            width = usize::from(self.length)
        )
    }
}

/// A list of at most [`MAX_SYMBOLS`] codes, held inline.
#[derive(Clone)]
pub struct CodeList {
    codes: [HuffmanCode; MAX_SYMBOLS],
    len: usize,
}

impl CodeList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            codes: [HuffmanCode::default(); MAX_SYMBOLS],
            len: 0,
        }
    }

    /// Number of codes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list holds no codes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The codes.
    #[inline]
    pub fn as_slice(&self) -> &[HuffmanCode] {
        &self.codes[..self.len]
    }

    /// Remove every code.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a code. Fails once the list holds one code per symbol.
    pub fn push(&mut self, code: HuffmanCode) -> Result<()> {
        if self.len == MAX_SYMBOLS {
            return Err(Error::corrupted(format!(
                "more than {} Huffman codes",
                MAX_SYMBOLS
            )));
        }
        self.codes[self.len] = code;
        self.len += 1;
        Ok(())
    }

    /// Length of the longest code, or 0 for an empty list.
    pub fn longest(&self) -> u8 {
        self.as_slice().iter().map(|c| c.length).max().unwrap_or(0)
    }

    /// Sort into canonical order: by length, then by symbol.
    pub fn sort(&mut self) {
        self.codes[..self.len].sort_unstable_by_key(|c| (c.length, c.symbol));
    }

    /// Assign canonical code values to a sorted list.
    ///
    /// The first code is zero. Each following code is the previous code plus
    /// one, shifted left by the difference in length. A lone code is given
    /// length 1 so every occurrence still costs a bit.
    pub fn assign_canonical(&mut self) {
        let codes = &mut self.codes[..self.len];

        if let [only] = codes {
            only.length = only.length.max(1);
        }

        let mut previous: Option<(u32, u8)> = None;
        for code in codes.iter_mut() {
            let value = match previous {
                None => 0,
                Some((value, length)) => (value + 1) << (code.length - length),
            };
            code.code = value as u16;
            previous = Some((value, code.length));
        }
    }

    /// Count codes per length. Index 0 counts zero-length codes and is always
    /// present, so the result has `longest() + 1` entries.
    pub fn length_counts(&self) -> Vec<u16> {
        let mut counts = vec![0u16; usize::from(self.longest()) + 1];
        for code in self.as_slice() {
            counts[usize::from(code.length)] += 1;
        }
        counts
    }

    /// Kraft–McMillan sum scaled by `2^max_length`: `sum(2^(max_length - len))`.
    ///
    /// A prefix code with no length above `max_length` exists exactly when
    /// this is at most `2^max_length`. Codes longer than `max_length` are
    /// ignored.
    pub fn kraft_sum(&self, max_length: u8) -> u64 {
        self.as_slice()
            .iter()
            .filter(|c| c.length <= max_length)
            .map(|c| 1u64 << (max_length - c.length))
            .sum()
    }

    /// Limit every code to `max_length` bits on a sorted list, keeping the
    /// Kraft–McMillan inequality satisfied.
    ///
    /// Over-long codes are clamped. The longest codes are then lengthened
    /// until the sum fits again, after which the shortest codes are shortened
    /// as far as the remaining room allows. The list is left sorted.
    pub fn limit_lengths(&mut self, max_length: u8) -> Result<()> {
        let capacity = 1u64 << max_length;
        if self.len as u64 > capacity {
            return Err(Error::CodeLengthOverflow {
                length: self.longest(),
                max: max_length,
            });
        }

        let weight = |length: u8| 1u64 << (max_length - length);
        let codes = &mut self.codes[..self.len];

        let mut kraft = 0;
        for code in codes.iter_mut() {
            code.length = code.length.min(max_length);
            kraft += weight(code.length);
        }

        for code in codes.iter_mut().rev() {
            if kraft <= capacity {
                break;
            }
            while code.length < max_length {
                code.length += 1;
                kraft -= weight(code.length);
            }
        }

        for code in codes.iter_mut() {
            while code.length > 1 && kraft + weight(code.length) <= capacity {
                kraft += weight(code.length);
                code.length -= 1;
            }
        }

        self.sort();
        Ok(())
    }
}

impl Default for CodeList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
