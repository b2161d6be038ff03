//! Error types for coding operations.

use thiserror::Error;

/// Result type alias for coding operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Coding error types.
///
/// Malformed or truncated encoded data is an expected input, so every format
/// problem is reported through this type rather than by panicking.
#[derive(Debug, Error)]
pub enum Error {
    /// The bit stream header did not carry the expected magic number.
    #[error("bad bit stream magic: expected 0x{expected:02x}, got 0x{found:02x}")]
    BadMagic { expected: u8, found: u8 },

    /// The coder version in a chunk header is not one this decoder knows.
    #[error("unsupported coder version {0}")]
    UnsupportedVersion(u8),

    /// Encoded data is structurally invalid.
    #[error("corrupted data: {message}")]
    CorruptedData { message: String },

    /// A Huffman code came out longer than the configured maximum.
    #[error("code length {length} exceeds maximum of {max} bits")]
    CodeLengthOverflow { length: u8, max: u8 },

    /// The coder configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The bit stream ended before a fixed-width field could be read.
    #[error("unexpected end of stream: wanted {requested_bits} bits, got {available_bits}")]
    UnexpectedEof {
        requested_bits: u8,
        available_bits: u8,
    },

    /// A chunk ended before its declared number of symbols was decoded.
    #[error("truncated chunk: expected {expected} bytes, decoded {decoded}")]
    Truncated { expected: u32, decoded: u32 },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a corrupted data error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Error::CorruptedData {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(requested_bits: u8, available_bits: u8) -> Self {
        Error::UnexpectedEof {
            requested_bits,
            available_bits,
        }
    }

    /// Check if the error came from the encoded data rather than from I/O or
    /// configuration.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::BadMagic { .. }
                | Error::UnsupportedVersion(_)
                | Error::CorruptedData { .. }
                | Error::UnexpectedEof { .. }
                | Error::Truncated { .. }
        )
    }

    /// Get error category for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Error::BadMagic { .. } => "bad_magic",
            Error::UnsupportedVersion(_) => "unsupported_version",
            Error::CorruptedData { .. } => "corrupted_data",
            Error::CodeLengthOverflow { .. } => "code_length_overflow",
            Error::InvalidConfig(_) => "invalid_config",
            Error::UnexpectedEof { .. } => "unexpected_eof",
            Error::Truncated { .. } => "truncated",
            Error::Io(_) => "io_error",
        }
    }
}
