//! Bit-granular streams layered over byte streams.
//!
//! The first byte of every bit stream is a header reserved for the stream
//! itself:
//!
//! ```text
//! |    5 bits    |           3 bits           |
//! ---------------------------------------------
//! | Magic number | Number of zero-filled bits |
//! ```
//!
//! Files cannot hold partial bytes, so when a writer finishes with a partial
//! byte it zero-fills the rest and records the fill count in the header. The
//! reader drops that many bits from the end of the stream.
//!
//! Bits are buffered most-significant-first in a 64-bit word and moved to and
//! from the byte stream in big-endian order.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;

/// Buffer holding bits in flight.
pub type BufferType = u64;

/// Multi-byte word read and written as a unit.
pub type WordType = u16;

/// Single byte.
pub type ByteType = u8;

/// Bits in the in-memory buffer.
pub const BITS_PER_BUFFER: u8 = BufferType::BITS as u8;

/// Bits in a word.
pub const BITS_PER_WORD: u8 = WordType::BITS as u8;

/// Bits in a byte.
pub const BITS_PER_BYTE: u8 = ByteType::BITS as u8;

/// Widest single peek the reader supports.
///
/// A refill tops the buffer up in whole bytes, so up to seven bits of the
/// buffer may stay unused.
pub const MAX_PEEK_BITS: u8 = BITS_PER_BUFFER - BITS_PER_BYTE + 1;

/// Magic number stored in the high bits of the header byte.
pub const MAGIC: u8 = 0x1a;

pub(crate) const MAGIC_MASK: u8 = 0x1f;
pub(crate) const MAGIC_SHIFT: u8 = 3;
pub(crate) const REMAINDER_MASK: u8 = 0x07;
pub(crate) const REMAINDER_SHIFT: u8 = 0;

const _: () = assert!(MAGIC <= MAGIC_MASK, "magic must fit in 5 bits");

/// Build a header byte recording `remainder` zero-filled bits.
#[inline]
pub fn encode_header(remainder: u8) -> u8 {
    (MAGIC << MAGIC_SHIFT) | ((remainder & REMAINDER_MASK) << REMAINDER_SHIFT)
}

/// Split a header byte into its magic number and zero-fill count.
#[inline]
pub fn decode_header(header: u8) -> (u8, u8) {
    (
        (header >> MAGIC_SHIFT) & MAGIC_MASK,
        (header >> REMAINDER_SHIFT) & REMAINDER_MASK,
    )
}

/// Mask with the `bits` least-significant bits set.
#[inline]
pub(crate) fn bit_mask(bits: u8) -> BufferType {
    if bits >= BITS_PER_BUFFER {
        BufferType::MAX
    } else {
        (1 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom, Write};

    /// Sink that accepts `limit` bytes, and optionally refuses absolute seeks.
    struct FailingSink {
        inner: Cursor<Vec<u8>>,
        limit: u64,
        fail_seek: bool,
    }

    impl FailingSink {
        fn new(limit: u64, fail_seek: bool) -> Self {
            Self {
                inner: Cursor::new(Vec::new()),
                limit,
                fail_seek,
            }
        }
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.inner.position() + buf.len() as u64 > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "device full"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for FailingSink {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::Start(_) if self.fail_seek => {
                    Err(io::Error::new(io::ErrorKind::Other, "not seekable"))
                }
                _ => self.inner.seek(pos),
            }
        }
    }

    /// Source that serves `limit` bytes of `data`, then fails.
    struct FailingSource<'a> {
        data: &'a [u8],
        limit: usize,
    }

    impl Read for FailingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let available = self.fill_buf()?;
            let count = available.len().min(buf.len());
            buf[..count].copy_from_slice(&available[..count]);
            self.consume(count);
            Ok(count)
        }
    }

    impl BufRead for FailingSource<'_> {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            if self.limit == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "connection reset"));
            }
            Ok(&self.data[..self.limit.min(self.data.len())])
        }

        fn consume(&mut self, amt: usize) {
            self.data = &self.data[amt..];
            self.limit -= amt;
        }
    }

    fn finished(write: impl FnOnce(&mut BitWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut output = Cursor::new(Vec::new());
        let mut writer = BitWriter::new(&mut output).unwrap();
        write(&mut writer);
        writer.finish().unwrap();
        output.into_inner()
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(encode_header(0), 0xd0);
        assert_eq!(encode_header(7), 0xd7);
        assert_eq!(decode_header(0xd3), (MAGIC, 3));
        assert_eq!(decode_header(0x00), (0, 0));
    }

    #[test]
    fn test_bit_mask() {
        assert_eq!(bit_mask(0), 0);
        assert_eq!(bit_mask(1), 1);
        assert_eq!(bit_mask(11), 0x7ff);
        assert_eq!(bit_mask(64), u64::MAX);
    }

    #[test]
    fn test_empty_writer_emits_only_header() {
        let bytes = finished(|_| {});
        assert_eq!(bytes, vec![encode_header(0)]);

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.header(), encode_header(0));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = BitReader::new(&[][..]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let bytes = [(MAGIC - 1) << MAGIC_SHIFT, 0xff, 0xff];
        let err = BitReader::new(&bytes[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::BadMagic {
                expected: MAGIC,
                found
            } if found == MAGIC - 1
        ));
    }

    #[test]
    fn test_single_bit_records_remainder() {
        let bytes = finished(|w| w.write_bits(1, 1).unwrap());
        assert_eq!(bytes, vec![encode_header(7), 0x80]);

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.read_bits(1).unwrap(), (1, 1));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_bytes_and_words() {
        let bytes = finished(|w| {
            w.write_byte(0xa5).unwrap();
            w.write_word(0xbeef).unwrap();
            w.write_byte(0x01).unwrap();
        });
        assert_eq!(bytes, vec![encode_header(0), 0xa5, 0xbe, 0xef, 0x01]);

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xa5);
        assert_eq!(reader.read_word().unwrap(), 0xbeef);
        assert_eq!(reader.read_byte().unwrap(), 0x01);
        assert!(reader.fully_consumed().unwrap());
        assert!(matches!(
            reader.read_byte(),
            Err(Error::UnexpectedEof {
                requested_bits: 8,
                available_bits: 0
            })
        ));
    }

    #[test]
    fn test_writes_span_buffer_flushes() {
        // 13 bits at a time walks the buffer boundary through every offset.
        let values: Vec<u64> = (0..200u64).map(|i| (i * 7919) & 0x1fff).collect();
        let bytes = finished(|w| {
            for &value in &values {
                w.write_bits(value, 13).unwrap();
            }
        });

        // 200 * 13 = 2600 bits = 325 bytes exactly.
        assert_eq!(bytes.len(), 1 + 325);
        assert_eq!(bytes[0], encode_header(0));

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        for &value in &values {
            assert_eq!(reader.read_bits(13).unwrap(), (value, 13));
        }
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_full_width_values() {
        let bytes = finished(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_bits(0x0123_4567_89ab_cdef, 64).unwrap();
            w.write_bits(u64::MAX, 64).unwrap();
        });
        assert_eq!(bytes.len(), 1 + 17);
        assert_eq!(decode_header(bytes[0]), (MAGIC, 5));

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.read_bits(3).unwrap(), (0b101, 3));
        assert_eq!(reader.read_bits(64).unwrap(), (0x0123_4567_89ab_cdef, 64));
        assert_eq!(reader.read_bits(64).unwrap(), (u64::MAX, 64));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_only_low_bits_written() {
        let bytes = finished(|w| w.write_bits(0xffff_fff0, 4).unwrap());
        assert_eq!(bytes, vec![encode_header(4), 0x00]);
    }

    #[test]
    fn test_peek_and_discard() {
        let bytes = finished(|w| w.write_bits(0b1011_0110_01, 10).unwrap());

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.peek_bits(4).unwrap(), (0b1011, 4));
        assert_eq!(reader.peek_bits(4).unwrap(), (0b1011, 4));
        reader.discard_bits(3);
        assert_eq!(reader.peek_bits(3).unwrap(), (0b101, 3));
        reader.discard_bits(3);
        assert_eq!(reader.read_bits(4).unwrap(), (0b1001, 4));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_peek_past_end_zero_pads() {
        let bytes = finished(|w| w.write_bits(0b11, 2).unwrap());

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.peek_bits(11).unwrap(), (0b11 << 9, 2));
        reader.discard_bits(2);
        assert_eq!(reader.peek_bits(11).unwrap(), (0, 0));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_short_read_reports_available_bits() {
        let bytes = finished(|w| w.write_bits(0b101, 3).unwrap());

        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.read_bits(8).unwrap(), (0b1010_0000, 3));
        assert!(reader.fully_consumed().unwrap());
    }

    #[test]
    fn test_header_written_at_stream_offset() {
        let mut output = Cursor::new(vec![0xee, 0xee]);
        output.set_position(2);

        let mut writer = BitWriter::new(&mut output).unwrap();
        writer.write_bits(0b1, 1).unwrap();
        writer.finish().unwrap();

        let bytes = output.into_inner();
        assert_eq!(bytes, vec![0xee, 0xee, encode_header(7), 0x80]);
    }

    #[test]
    fn test_bit_counters() {
        let mut output = Cursor::new(Vec::new());
        let mut writer = BitWriter::new(&mut output).unwrap();
        writer.write_bits(0, 5).unwrap();
        writer.write_word(0).unwrap();
        assert_eq!(writer.bits_written(), 21);
        writer.finish().unwrap();

        let bytes = output.into_inner();
        let mut reader = BitReader::new(&bytes[..]).unwrap();
        reader.read_bits(5).unwrap();
        reader.peek_bits(16).unwrap();
        assert_eq!(reader.bits_read(), 5);
        reader.read_word().unwrap();
        assert_eq!(reader.bits_read(), 21);
    }

    #[test]
    fn test_oversized_fields_rejected() {
        let mut output = Cursor::new(Vec::new());
        let mut writer = BitWriter::new(&mut output).unwrap();
        let err = writer.write_bits(u64::MAX, 65).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(writer.bits_written(), 0);
        writer.finish().unwrap();

        let bytes = finished(|w| w.write_bits(u64::MAX, 64).unwrap());
        let mut reader = BitReader::new(&bytes[..]).unwrap();
        assert!(matches!(reader.read_bits(65), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            reader.peek_bits(MAX_PEEK_BITS + 1),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(reader.read_bits(64).unwrap(), (u64::MAX, 64));
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut writer = BitWriter::new(FailingSink::new(4, false)).unwrap();

        // The first buffer flush needs eight more bytes than the sink takes.
        let err = writer.write_bits(0, 64).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.category(), "io_error");
    }

    #[test]
    fn test_header_seek_failure_propagates() {
        let mut writer = BitWriter::new(FailingSink::new(64, true)).unwrap();
        writer.write_bits(0b1, 1).unwrap();

        // A partial final byte forces the header to be rewritten.
        assert!(matches!(writer.finish(), Err(Error::Io(_))));

        // Byte-aligned output leaves the header alone, so no seek happens.
        let mut writer = BitWriter::new(FailingSink::new(64, true)).unwrap();
        writer.write_byte(0xa5).unwrap();
        let sink = writer.finish().unwrap();
        assert_eq!(sink.inner.into_inner(), vec![encode_header(0), 0xa5]);
    }

    #[test]
    fn test_read_failure_propagates() {
        let bytes = finished(|w| {
            for _ in 0..4 {
                w.write_bits(u64::MAX, 64).unwrap();
            }
        });

        let source = FailingSource {
            data: &bytes,
            limit: 12,
        };
        let mut reader = BitReader::new(source).unwrap();
        assert_eq!(reader.read_bits(64).unwrap(), (u64::MAX, 64));

        let err = reader.read_bits(64).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
