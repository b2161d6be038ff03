//! # Kraft Core
//!
//! Shared building blocks for the Kraft entropy coders: the bit stream,
//! coder configuration, error type, chunk buffering and the
//! [`Encoder`]/[`Decoder`] contract.
//!
//! Kraft is named after the Kraft–McMillan inequality, which every prefix
//! code it emits has to satisfy.
//!
//! ## Bit Streams
//!
//! - [`BitWriter`] - Arbitrary-width bit writes over a seekable byte sink
//! - [`BitReader`] - Arbitrary-width bit reads and peeks over a byte source
//!
//! Every bit stream starts with a one-byte header carrying a magic number and
//! the count of zero-fill bits at its end. See [`bitstream`] for the layout.
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//! use kraft_core::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Cursor::new(Vec::new())).unwrap();
//! writer.write_bits(0b101, 3).unwrap();
//! let bytes = writer.finish().unwrap().into_inner();
//!
//! let mut reader = BitReader::new(&bytes[..]).unwrap();
//! assert_eq!(reader.read_bits(3).unwrap(), (0b101, 3));
//! assert!(reader.fully_consumed().unwrap());
//! ```

pub mod bitstream;
pub mod chunk;
pub mod config;
pub mod error;
pub mod stats;
pub mod traits;

pub use bitstream::{BitReader, BitWriter};
pub use chunk::ChunkBuffer;
pub use config::{
    CoderConfig, LengthLimit, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CODE_LENGTH, MAX_CHUNK_SIZE,
    MAX_CODE_LENGTH,
};
pub use error::{Error, Result};
pub use stats::CodingStats;
pub use traits::{Decoder, Encoder};
