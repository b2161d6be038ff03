//! Bit stream writer.

use std::io::{Seek, SeekFrom, Write};

use super::{
    bit_mask, encode_header, BufferType, ByteType, WordType, BITS_PER_BUFFER, BITS_PER_BYTE,
    BITS_PER_WORD,
};
use crate::error::{Error, Result};

/// Writes arbitrary-width bit fields to a byte stream.
///
/// Bits collect in a 64-bit buffer that is flushed to the stream whenever it
/// fills. [`BitWriter::finish`] must be called once writing is done: it flushes
/// the final partial buffer and rewrites the header byte with the zero-fill
/// count. Dropping the writer without finishing leaves an invalid stream.
///
/// Any I/O error is returned from the call that hit it; the writer makes no
/// attempt to retry.
#[derive(Debug)]
pub struct BitWriter<W: Write + Seek> {
    inner: W,
    buffer: BufferType,
    /// Free bits left in `buffer`. Never zero between calls.
    position: u8,
    /// Stream offset of the header byte.
    header_offset: u64,
    bits_written: u64,
}

impl<W: Write + Seek> BitWriter<W> {
    /// Wrap a stream, writing a placeholder header byte at its current
    /// position.
    pub fn new(mut inner: W) -> Result<Self> {
        let header_offset = inner.stream_position()?;
        inner.write_all(&[encode_header(0)])?;

        Ok(Self {
            inner,
            buffer: 0,
            position: BITS_PER_BUFFER,
            header_offset,
            bits_written: 0,
        })
    }

    /// Write a full word, most-significant bit first.
    #[inline]
    pub fn write_word(&mut self, word: WordType) -> Result<()> {
        self.write_bits(BufferType::from(word), BITS_PER_WORD)
    }

    /// Write a full byte, most-significant bit first.
    #[inline]
    pub fn write_byte(&mut self, byte: ByteType) -> Result<()> {
        self.write_bits(BufferType::from(byte), BITS_PER_BYTE)
    }

    /// Write the `size` least-significant bits of `bits`, most-significant of
    /// those first. Bits above `size` are ignored.
    pub fn write_bits(&mut self, bits: BufferType, size: u8) -> Result<()> {
        if size > BITS_PER_BUFFER {
            return Err(Error::invalid_config(format!(
                "cannot write {} bits at once (max {})",
                size, BITS_PER_BUFFER
            )));
        }

        if size == 0 {
            return Ok(());
        }

        let mut bits = bits & bit_mask(size);
        let mut size = size;
        self.bits_written += u64::from(size);

        // Split writes that overrun the buffer: fill what is left, flush,
        // then continue with the low bits.
        if size > self.position {
            let rshift = size - self.position;

            self.buffer |= bits >> rshift;
            self.flush_buffer()?;

            bits &= bit_mask(rshift);
            size = rshift;
        }

        let lshift = self.position - size;
        self.buffer |= bits << lshift;
        self.position = lshift;

        if self.position == 0 {
            self.flush_buffer()?;
        }

        Ok(())
    }

    /// Number of payload bits written so far, excluding the header byte and
    /// any zero fill.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Zero-fill and flush any partial byte, rewrite the header, and return
    /// the underlying stream.
    pub fn finish(mut self) -> Result<W> {
        let bits_in_buffer = BITS_PER_BUFFER - self.position;

        if bits_in_buffer > 0 {
            let bytes = bits_in_buffer.div_ceil(BITS_PER_BYTE);
            let remainder = bytes * BITS_PER_BYTE - bits_in_buffer;

            self.inner
                .write_all(&self.buffer.to_be_bytes()[..usize::from(bytes)])?;
            self.buffer = 0;
            self.position = BITS_PER_BUFFER;

            if remainder > 0 {
                self.flush_header(remainder)?;
            }
        }

        self.inner.flush()?;
        Ok(self.inner)
    }

    fn flush_header(&mut self, remainder: u8) -> Result<()> {
        let end = self.inner.stream_position()?;

        self.inner.seek(SeekFrom::Start(self.header_offset))?;
        self.inner.write_all(&[encode_header(remainder)])?;
        self.inner.seek(SeekFrom::Start(end))?;

        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        self.inner.write_all(&self.buffer.to_be_bytes())?;
        self.buffer = 0;
        self.position = BITS_PER_BUFFER;
        Ok(())
    }
}
