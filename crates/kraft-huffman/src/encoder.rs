//! Chunked Huffman encoder.
//!
//! Input is read in chunks of `chunk_size_bytes`. Each chunk is coded
//! independently:
//!
//! 1. Count byte frequencies
//! 2. Build a Huffman tree over the symbols present
//! 3. Take code lengths from leaf depths and sort them canonically
//! 4. Enforce the maximum code length, then assign canonical code values
//! 5. Write the chunk header, the code table and the coded symbols
//!
//! ## Chunk Layout
//!
//! ```text
//! version        8 bits   always 1
//! chunk size    32 bits   bytes in this chunk
//! max length     8 bits   configured maximum code length
//! NN             8 bits   longest code length + 1
//! counts     NN×16 bits   codes per length, starting at length 0
//! symbols     N×8  bits   symbols in canonical order
//! data                    one code per input byte
//! ```

use std::io::{Read, Seek, Write};

use kraft_core::{
    BitWriter, ChunkBuffer, CoderConfig, CodingStats, Encoder, Error, LengthLimit, Result,
};
use tracing::{debug, trace};

use crate::tree::HuffmanTree;
use crate::types::{CodeList, HuffmanCode};
use crate::{HUFFMAN_VERSION, MAX_SYMBOLS};

/// Chunked canonical Huffman encoder.
///
/// Tree, code and chunk storage is reused across chunks and across calls, so
/// a single encoder must not be shared between threads mid-operation; use
/// one encoder per thread.
#[derive(Debug)]
pub struct HuffmanEncoder {
    config: CoderConfig,
    chunk: ChunkBuffer,
    tree: HuffmanTree,
    codes: CodeList,
    /// Code for each symbol, indexed by symbol value.
    symbol_codes: Box<[HuffmanCode; MAX_SYMBOLS]>,
    stats: CodingStats,
}

impl HuffmanEncoder {
    /// Create an encoder. The configuration is validated when encoding
    /// starts.
    pub fn new(config: CoderConfig) -> Self {
        Self {
            config,
            chunk: ChunkBuffer::default(),
            tree: HuffmanTree::new(),
            codes: CodeList::new(),
            symbol_codes: Box::new([HuffmanCode::default(); MAX_SYMBOLS]),
            stats: CodingStats::new(),
        }
    }

    /// Canonical codes of the last chunk encoded.
    pub fn codes(&self) -> &[HuffmanCode] {
        self.codes.as_slice()
    }

    fn encode_chunk<W: Write + Seek>(&mut self, output: &mut BitWriter<W>) -> Result<()> {
        let data = self.chunk.as_slice();
        let max_length = self.config.max_code_length_bits;

        let mut frequencies = [0u64; MAX_SYMBOLS];
        for &byte in data {
            frequencies[usize::from(byte)] += 1;
        }

        self.tree.build(&frequencies);
        self.codes.clear();
        self.tree.collect_lengths(&mut self.codes)?;
        self.codes.sort();

        let longest = self.codes.longest();
        if longest > max_length {
            match self.config.length_limit {
                LengthLimit::Reject => {
                    return Err(Error::CodeLengthOverflow {
                        length: longest,
                        max: max_length,
                    });
                }
                LengthLimit::Kraft => {
                    self.codes.limit_lengths(max_length)?;
                    debug!(
                        "Limited code lengths from {} to {} bits",
                        longest,
                        self.codes.longest()
                    );
                }
            }
        }

        self.codes.assign_canonical();
        for code in self.codes.as_slice() {
            trace!("{}", code);
            self.symbol_codes[usize::from(code.symbol)] = *code;
        }

        write_header(output, data.len() as u32, max_length)?;
        write_codes(output, &self.codes)?;

        for &byte in data {
            let code = self.symbol_codes[usize::from(byte)];
            output.write_bits(u64::from(code.code), code.length)?;
        }

        Ok(())
    }
}

impl Default for HuffmanEncoder {
    fn default() -> Self {
        Self::new(CoderConfig::default())
    }
}

impl Encoder for HuffmanEncoder {
    fn encode_binary<R, W>(&mut self, input: &mut R, output: &mut BitWriter<W>) -> Result<()>
    where
        R: Read + ?Sized,
        W: Write + Seek,
    {
        self.config.validate()?;
        self.stats.reset();

        let chunk_size = self.config.chunk_size_bytes as usize;
        self.chunk.reserve(chunk_size);

        let start = output.bits_written();

        loop {
            let read = self.chunk.fill_from(input, chunk_size)?;
            if read == 0 && self.stats.chunks > 0 {
                break;
            }

            let before = output.bits_written();
            self.encode_chunk(output)?;
            self.stats.record_chunk(read);

            debug!(
                "Encoded chunk {}: {} bytes -> {} bits, {} codes (longest {} bits)",
                self.stats.chunks,
                read,
                output.bits_written() - before,
                self.codes.len(),
                self.codes.longest()
            );

            if read < chunk_size {
                break;
            }
        }

        self.stats.encoded_bits = output.bits_written() - start;
        debug!(
            "Encoded {} bytes in {} chunks: ratio {:.2}, {:.1}% saved",
            self.stats.decoded_bytes,
            self.stats.chunks,
            self.stats.ratio(),
            self.stats.savings_percent()
        );
        Ok(())
    }

    fn stats(&self) -> CodingStats {
        self.stats
    }
}

fn write_header<W: Write + Seek>(
    output: &mut BitWriter<W>,
    chunk_size: u32,
    max_code_length: u8,
) -> Result<()> {
    output.write_byte(HUFFMAN_VERSION)?;
    output.write_bits(u64::from(chunk_size), 32)?;
    output.write_byte(max_code_length)
}

fn write_codes<W: Write + Seek>(output: &mut BitWriter<W>, codes: &CodeList) -> Result<()> {
    let counts = codes.length_counts();

    output.write_byte(counts.len() as u8)?;
    for &count in &counts {
        output.write_word(count)?;
    }

    for code in codes.as_slice() {
        output.write_byte(code.symbol)?;
    }

    Ok(())
}
