//! # Kraft Huffman
//!
//! Chunked canonical Huffman coding over Kraft bit streams.
//!
//! Input is split into chunks of a configured size and every chunk gets its
//! own code table, so memory use stays bounded for inputs of any length and
//! the code adapts as the data changes.
//!
//! ## Overview
//!
//! Only code lengths and symbols are transmitted. Both sides derive the code
//! values canonically: codes sorted by (length, symbol), the first code zero,
//! and each next code one more than the previous one, shifted left to its own
//! length. The decoder turns the table into a prefix lookup table indexed by
//! the next `max_code_length` bits, so every symbol costs one peek and one
//! lookup.
//!
//! ## Example
//!
//! ```
//! use kraft_core::{CoderConfig, Decoder, Encoder};
//! use kraft_huffman::{HuffmanDecoder, HuffmanEncoder};
//!
//! let mut encoder = HuffmanEncoder::new(CoderConfig::default());
//! let encoded = encoder.encode_bytes(b"abracadabra").unwrap();
//!
//! let mut decoder = HuffmanDecoder::new();
//! assert_eq!(decoder.decode_bytes(&encoded).unwrap(), b"abracadabra");
//! ```

mod decoder;
mod encoder;
mod table;
mod tree;
mod types;

pub use decoder::{ChunkHeader, HuffmanDecoder};
pub use encoder::HuffmanEncoder;
pub use table::{PrefixEntry, PrefixTable};
pub use tree::HuffmanTree;
pub use types::{CodeList, HuffmanCode, HuffmanNode, NodeIndex};

/// Chunk format version written by the encoder.
pub const HUFFMAN_VERSION: u8 = 1;

/// Number of distinct symbols (one per byte value).
pub const MAX_SYMBOLS: usize = 256;

/// Nodes in a full tree: one leaf per symbol plus the junctions joining them.
pub const MAX_TREE_NODES: usize = 2 * MAX_SYMBOLS;
