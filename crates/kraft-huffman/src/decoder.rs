//! Chunked Huffman decoder.
//!
//! Mirrors [`HuffmanEncoder`](crate::HuffmanEncoder): each chunk's header and
//! code table are read, canonical code values are rebuilt from the lengths,
//! and symbols are decoded with one prefix-table lookup each.

use std::io::{BufRead, Write};

use kraft_core::{
    BitReader, ChunkBuffer, CodingStats, Decoder, Error, Result, MAX_CHUNK_SIZE, MAX_CODE_LENGTH,
};
use tracing::{debug, trace};

use crate::table::PrefixTable;
use crate::types::{CodeList, HuffmanCode};
use crate::MAX_SYMBOLS;

/// Fields of a chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Coder format version.
    pub version: u8,
    /// Number of bytes the chunk decodes to.
    pub chunk_size: u32,
    /// Maximum code length the encoder was configured with.
    pub max_code_length: u8,
}

/// Chunked canonical Huffman decoder.
///
/// Decoders take no configuration; everything they need is carried in the
/// stream.
#[derive(Debug, Default)]
pub struct HuffmanDecoder {
    codes: CodeList,
    table: PrefixTable,
    chunk: ChunkBuffer,
    max_code_length: u8,
    stats: CodingStats,
}

impl HuffmanDecoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical codes of the last chunk decoded.
    pub fn codes(&self) -> &[HuffmanCode] {
        self.codes.as_slice()
    }

    /// Kraft–McMillan sum of the last code table, scaled by `2^L` where `L`
    /// is the maximum code length from the chunk header.
    ///
    /// Equals `2^L` for a complete code and is smaller for an incomplete one,
    /// such as a single 1-bit code.
    pub fn kraft_mcmillan_constant(&self) -> u64 {
        self.codes.kraft_sum(self.max_code_length)
    }

    fn decode_chunk<R, W>(&mut self, input: &mut BitReader<R>, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let header = read_header(input)?;
        self.max_code_length = header.max_code_length;

        read_codes(input, header.max_code_length, &mut self.codes)?;
        if self.codes.is_empty() && header.chunk_size > 0 {
            return Err(Error::corrupted(format!(
                "chunk of {} bytes has no codes",
                header.chunk_size
            )));
        }

        self.table
            .build(self.codes.as_slice(), header.max_code_length)?;

        let before = input.bits_read();
        let result = self.decode_symbols(input, header);

        // Symbols decoded before a truncation are still written out.
        output.write_all(self.chunk.as_slice())?;
        self.stats.record_chunk(self.chunk.len());

        debug!(
            "Decoded chunk {}: {} bits -> {} of {} bytes",
            self.stats.chunks,
            input.bits_read() - before,
            self.chunk.len(),
            header.chunk_size
        );

        result
    }

    fn decode_symbols<R: BufRead>(
        &mut self,
        input: &mut BitReader<R>,
        header: ChunkHeader,
    ) -> Result<()> {
        let expected = header.chunk_size as usize;
        let width = header.max_code_length;

        self.chunk.reserve(expected);

        while self.chunk.len() < expected {
            let (bits, available) = input.peek_bits(width)?;
            if available == 0 {
                break;
            }

            let entry = self.table.lookup(bits as usize);
            if !entry.is_assigned() {
                if available == width {
                    return Err(Error::corrupted(format!(
                        "no code matches prefix {:0width$b}",
                        bits,
                        width = usize::from(width)
                    )));
                }
                break;
            }

            // Near the end the peek is zero-padded; only accept codes made
            // entirely of real bits.
            if entry.length > available {
                break;
            }

            self.chunk.push(entry.symbol);
            input.discard_bits(entry.length);
        }

        if self.chunk.len() < expected {
            return Err(Error::Truncated {
                expected: header.chunk_size,
                decoded: self.chunk.len() as u32,
            });
        }

        Ok(())
    }
}

impl Decoder for HuffmanDecoder {
    fn decode_binary<R, W>(&mut self, input: &mut BitReader<R>, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        self.stats.reset();
        let start = input.bits_read();

        // At least one chunk, even for empty input.
        let result = loop {
            if let Err(e) = self.decode_chunk(input, output) {
                break Err(e);
            }
            match input.fully_consumed() {
                Ok(true) => break Ok(()),
                Ok(false) => continue,
                Err(e) => break Err(e),
            }
        };

        self.stats.encoded_bits = input.bits_read() - start;
        if result.is_ok() {
            debug!(
                "Decoded {} bytes from {} chunks: ratio {:.2}",
                self.stats.decoded_bytes,
                self.stats.chunks,
                self.stats.ratio()
            );
        }
        result
    }

    fn stats(&self) -> CodingStats {
        self.stats
    }
}

/// Read a chunk header, dispatching on its version.
fn read_header<R: BufRead>(input: &mut BitReader<R>) -> Result<ChunkHeader> {
    let version = input.read_byte()?;
    match version {
        1 => read_header_v1(input),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

fn read_header_v1<R: BufRead>(input: &mut BitReader<R>) -> Result<ChunkHeader> {
    let (chunk_size, read) = input.read_bits(32)?;
    if read != 32 {
        return Err(Error::unexpected_eof(32, read));
    }
    let chunk_size = chunk_size as u32;
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(Error::corrupted(format!(
            "chunk size {} exceeds maximum of {}",
            chunk_size, MAX_CHUNK_SIZE
        )));
    }

    let max_code_length = input.read_byte()?;
    if max_code_length == 0 || max_code_length > MAX_CODE_LENGTH {
        return Err(Error::corrupted(format!(
            "maximum code length {} outside [1, {}]",
            max_code_length, MAX_CODE_LENGTH
        )));
    }

    Ok(ChunkHeader {
        version: 1,
        chunk_size,
        max_code_length,
    })
}

/// Read a code table into `codes`, rebuilding canonical code values from the
/// transmitted lengths.
fn read_codes<R: BufRead>(
    input: &mut BitReader<R>,
    max_code_length: u8,
    codes: &mut CodeList,
) -> Result<()> {
    codes.clear();

    let num_counts = input.read_byte()?;
    if num_counts == 0 || num_counts > max_code_length + 1 {
        return Err(Error::corrupted(format!(
            "{} code length counts for a maximum length of {}",
            num_counts, max_code_length
        )));
    }

    let mut counts = [0u16; MAX_CODE_LENGTH as usize + 1];
    let counts = &mut counts[..usize::from(num_counts)];
    for count in counts.iter_mut() {
        *count = input.read_word()?;
    }

    if counts[0] != 0 {
        return Err(Error::corrupted("codes of length 0"));
    }

    let total: usize = counts.iter().map(|&c| usize::from(c)).sum();
    if total > MAX_SYMBOLS {
        return Err(Error::corrupted(format!(
            "{} codes exceed the {} symbol alphabet",
            total, MAX_SYMBOLS
        )));
    }

    let kraft: u64 = counts
        .iter()
        .enumerate()
        .map(|(length, &count)| u64::from(count) << (usize::from(max_code_length) - length))
        .sum();
    if kraft > 1u64 << max_code_length {
        return Err(Error::corrupted(format!(
            "code lengths over-subscribed: Kraft sum {} > {}",
            kraft,
            1u64 << max_code_length
        )));
    }

    for (length, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            let symbol = input.read_byte()?;
            codes.push(HuffmanCode::new(symbol, 0, length as u8))?;
        }
    }

    codes.assign_canonical();

    for code in codes.as_slice() {
        trace!("{}", code);
    }

    Ok(())
}
