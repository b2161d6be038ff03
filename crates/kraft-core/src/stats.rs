//! Statistics for coding operations.

/// Statistics from the most recent encode or decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodingStats {
    /// Number of chunks processed.
    pub chunks: u64,

    /// Plain (decoded) size in bytes.
    pub decoded_bytes: u64,

    /// Payload bits on the encoded side, excluding the bit stream header
    /// and zero fill.
    pub encoded_bits: u64,
}

impl CodingStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk of `decoded_bytes` bytes.
    pub fn record_chunk(&mut self, decoded_bytes: usize) {
        self.chunks += 1;
        self.decoded_bytes += decoded_bytes as u64;
    }

    /// Encoded size rounded up to whole bytes.
    pub fn encoded_bytes(&self) -> u64 {
        self.encoded_bits.div_ceil(8)
    }

    /// Compression ratio (decoded / encoded). Higher is better.
    pub fn ratio(&self) -> f64 {
        if self.encoded_bits == 0 {
            return 0.0;
        }
        (self.decoded_bytes * 8) as f64 / self.encoded_bits as f64
    }

    /// Space savings as a percentage (0-100, negative on expansion).
    pub fn savings_percent(&self) -> f64 {
        if self.decoded_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.encoded_bits as f64 / (self.decoded_bytes * 8) as f64) * 100.0
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
