//! The coder contract.
//!
//! ## Layers
//!
//! ```text
//! encode_binary / decode_binary   (bit stream in, bit stream out)
//!       ↓
//! encode / decode                 (byte streams, header handling)
//!       ↓
//! *_bytes / *_file / decode_to_string   (convenience wrappers)
//! ```
//!
//! Coders implement only the binary layer. Everything above it is provided,
//! and every failure surfacing there is logged once at `warn`.
//!
//! Output already written when an operation fails is not rolled back;
//! callers should discard it.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::warn;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::stats::CodingStats;

/// Encodes a byte stream into a bit stream.
pub trait Encoder {
    /// Encode everything `input` yields into `output`.
    ///
    /// The caller owns the bit stream and must finish it afterwards.
    fn encode_binary<R, W>(&mut self, input: &mut R, output: &mut BitWriter<W>) -> Result<()>
    where
        R: Read + ?Sized,
        W: Write + Seek;

    /// Statistics from the last encode.
    fn stats(&self) -> CodingStats;

    /// Encode `input` into a new bit stream written to `output`, returning
    /// `output` once the stream is finished.
    fn encode<R, W>(&mut self, input: &mut R, output: W) -> Result<W>
    where
        R: Read + ?Sized,
        W: Write + Seek,
    {
        let result = BitWriter::new(output).and_then(|mut writer| {
            self.encode_binary(input, &mut writer)?;
            writer.finish()
        });
        logged("encode", result)
    }

    /// Encode an in-memory buffer.
    fn encode_bytes(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut input = input;
        let output = self.encode(&mut input, Cursor::new(Vec::new()))?;
        Ok(output.into_inner())
    }

    /// Encode the file at `input` into a new file at `output`.
    fn encode_file(&mut self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let files = File::open(input.as_ref())
            .and_then(|i| File::create(output.as_ref()).map(|o| (i, o)));
        let (input, output) = logged("encode", files.map_err(Error::from))?;

        let mut input = BufReader::new(input);
        self.encode(&mut input, BufWriter::new(output))?;
        Ok(())
    }
}

/// Decodes a bit stream back into a byte stream.
pub trait Decoder {
    /// Decode every chunk in `input` into `output`.
    fn decode_binary<R, W>(&mut self, input: &mut BitReader<R>, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized;

    /// Statistics from the last decode.
    fn stats(&self) -> CodingStats;

    /// Decode the bit stream in `input` into `output`.
    fn decode<R, W>(&mut self, input: R, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let result = BitReader::new(input).and_then(|mut reader| {
            self.decode_binary(&mut reader, output)?;
            output.flush()?;
            Ok(())
        });
        logged("decode", result)
    }

    /// Decode an in-memory buffer.
    fn decode_bytes(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decode(input, &mut output)?;
        Ok(output)
    }

    /// Decode an in-memory buffer holding encoded UTF-8 text.
    fn decode_to_string(&mut self, input: &[u8]) -> Result<String> {
        let bytes = self.decode_bytes(input)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::corrupted(format!("decoded text is not UTF-8: {}", e)));
        logged("decode", text)
    }

    /// Decode the file at `input` into a new file at `output`.
    fn decode_file(&mut self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let files = File::open(input.as_ref())
            .and_then(|i| File::create(output.as_ref()).map(|o| (i, o)));
        let (input, output) = logged("decode", files.map_err(Error::from))?;

        let mut output = BufWriter::new(output);
        self.decode(BufReader::new(input), &mut output)
    }
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!("{} failed [{}]: {}", operation, e.category(), e);
    }
    result
}
