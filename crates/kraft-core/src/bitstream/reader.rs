//! Bit stream reader.

use std::io::{BufRead, ErrorKind};

use super::{
    bit_mask, decode_header, BufferType, ByteType, WordType, BITS_PER_BUFFER, BITS_PER_BYTE,
    BITS_PER_WORD, MAGIC, MAX_PEEK_BITS,
};
use crate::error::{Error, Result};

/// Reads arbitrary-width bit fields from a byte stream.
///
/// The stream is read lazily: bytes are pulled into a 64-bit buffer only when
/// a read or peek needs more bits than the buffer holds. When the last byte of
/// the stream enters the buffer, the zero-fill bits recorded in the header are
/// dropped so callers never see them.
#[derive(Debug)]
pub struct BitReader<R: BufRead> {
    inner: R,
    /// Valid bits are the low `position` bits, oldest first.
    buffer: BufferType,
    position: u8,
    header: u8,
    remainder: u8,
    at_eof: bool,
    bits_read: u64,
}

impl<R: BufRead> BitReader<R> {
    /// Wrap a stream and decode its header byte.
    ///
    /// Fails with [`Error::BadMagic`] if the header does not carry the bit
    /// stream magic number, before any payload is touched.
    pub fn new(mut inner: R) -> Result<Self> {
        let header = match fill_buf(&mut inner)?.first() {
            Some(&byte) => byte,
            None => return Err(Error::unexpected_eof(BITS_PER_BYTE, 0)),
        };
        inner.consume(1);

        let (magic, remainder) = decode_header(header);
        if magic != MAGIC {
            return Err(Error::BadMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let at_eof = fill_buf(&mut inner)?.is_empty();

        Ok(Self {
            inner,
            buffer: 0,
            position: 0,
            header,
            remainder,
            at_eof,
            bits_read: 0,
        })
    }

    /// The raw header byte.
    pub fn header(&self) -> u8 {
        self.header
    }

    /// Number of payload bits consumed so far, excluding the header byte.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Read a full word.
    pub fn read_word(&mut self) -> Result<WordType> {
        let (bits, read) = self.read_bits(BITS_PER_WORD)?;
        if read != BITS_PER_WORD {
            return Err(Error::unexpected_eof(BITS_PER_WORD, read));
        }
        Ok(bits as WordType)
    }

    /// Read a full byte.
    pub fn read_byte(&mut self) -> Result<ByteType> {
        let (bits, read) = self.read_bits(BITS_PER_BYTE)?;
        if read != BITS_PER_BYTE {
            return Err(Error::unexpected_eof(BITS_PER_BYTE, read));
        }
        Ok(bits as ByteType)
    }

    /// Read up to `size` bits.
    ///
    /// Returns the bits and how many were actually read. Fewer than `size`
    /// bits are read only at the end of the stream; the bits obtained are
    /// then left-aligned within `size` and zero-padded.
    pub fn read_bits(&mut self, size: u8) -> Result<(BufferType, u8)> {
        if size > BITS_PER_BUFFER {
            return Err(Error::invalid_config(format!(
                "cannot read {} bits at once (max {})",
                size, BITS_PER_BUFFER
            )));
        }

        if size <= MAX_PEEK_BITS {
            let (bits, peeked) = self.peek_bits(size)?;
            self.discard_bits(peeked);
            return Ok((bits, peeked));
        }

        // Too wide for one peek; split in two.
        let size_high = size / 2;
        let size_low = size - size_high;

        let (high, read_high) = self.peek_bits(size_high)?;
        self.discard_bits(read_high);

        let (low, read_low) = self.peek_bits(size_low)?;
        self.discard_bits(read_low);

        Ok(((high << size_low) | low, read_high + read_low))
    }

    /// Look at up to `size` bits without consuming them.
    ///
    /// Near the end of the stream the result is zero-padded on the right, so
    /// a prefix lookup of a fixed width still works; the second value says
    /// how many of the bits are real.
    pub fn peek_bits(&mut self, size: u8) -> Result<(BufferType, u8)> {
        if size > MAX_PEEK_BITS {
            return Err(Error::invalid_config(format!(
                "cannot peek {} bits at once (max {})",
                size, MAX_PEEK_BITS
            )));
        }

        if size > self.position {
            self.refill()?;
        }

        let available = size.min(self.position);
        if available == 0 {
            return Ok((0, 0));
        }

        let bits = (self.buffer >> (self.position - available)) & bit_mask(available);
        Ok((bits << (size - available), available))
    }

    /// Consume `size` bits, which should have been returned by a previous
    /// peek.
    #[inline]
    pub fn discard_bits(&mut self, size: u8) {
        debug_assert!(size <= self.position, "discarding unpeeked bits");
        let size = size.min(self.position);
        self.position -= size;
        self.bits_read += u64::from(size);
    }

    /// Whether the underlying stream is exhausted and every buffered bit has
    /// been consumed.
    pub fn fully_consumed(&mut self) -> Result<bool> {
        if self.position == 0 {
            self.refill()?;
        }
        Ok(self.position == 0 && self.at_eof)
    }

    /// Pull as many whole bytes as fit into the buffer.
    fn refill(&mut self) -> Result<()> {
        if self.at_eof {
            return Ok(());
        }

        let wanted = usize::from((BITS_PER_BUFFER - self.position) / BITS_PER_BYTE);
        let mut filled = 0;

        while filled < wanted {
            let available = fill_buf(&mut self.inner)?;
            if available.is_empty() {
                break;
            }

            let count = available.len().min(wanted - filled);
            for &byte in &available[..count] {
                self.buffer = (self.buffer << BITS_PER_BYTE) | BufferType::from(byte);
            }

            self.inner.consume(count);
            filled += count;
        }

        self.position += (filled as u8) * BITS_PER_BYTE;

        if fill_buf(&mut self.inner)?.is_empty() {
            // The final byte is in the buffer; drop its zero fill.
            let fill = self.remainder.min(self.position);
            self.buffer >>= fill;
            self.position -= fill;
            self.at_eof = true;
        }

        Ok(())
    }
}

/// `BufRead::fill_buf`, retrying on interruption.
fn fill_buf<R: BufRead>(inner: &mut R) -> Result<&[u8]> {
    loop {
        match inner.fill_buf() {
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    // Already buffered, so this returns the same data without reading.
    Ok(inner.fill_buf()?)
}
