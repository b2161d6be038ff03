//! Coder configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest chunk a coder will buffer (64 MiB).
pub const MAX_CHUNK_SIZE: u32 = 64 << 20;

/// Widest code the 16-bit code type can hold.
pub const MAX_CODE_LENGTH: u8 = 16;

/// Default chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 1 << 20;

/// Default maximum code length.
pub const DEFAULT_MAX_CODE_LENGTH: u8 = 11;

/// What the encoder does with a code longer than the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthLimit {
    /// Fail the encode.
    #[default]
    Reject,
    /// Clamp long codes and repair the Kraft–McMillan sum.
    Kraft,
}

/// Configuration handed to an encoder at construction.
///
/// ```
/// use kraft_core::CoderConfig;
///
/// let config = CoderConfig::from_json_str(r#"{ "chunk_size_bytes": 4096 }"#).unwrap();
/// assert_eq!(config.chunk_size_bytes, 4096);
/// assert_eq!(config.max_code_length_bits, 11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderConfig {
    /// Number of input bytes coded as one independent chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u32,

    /// Longest code the encoder may emit; sizes the decoder's prefix table.
    #[serde(default = "default_max_code_length")]
    pub max_code_length_bits: u8,

    /// Handling of codes that exceed `max_code_length_bits`.
    #[serde(default)]
    pub length_limit: LengthLimit,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            max_code_length_bits: default_max_code_length(),
            length_limit: LengthLimit::default(),
        }
    }
}

impl CoderConfig {
    /// Create a configuration with the given chunk size and code length.
    pub fn new(chunk_size_bytes: u32, max_code_length_bits: u8) -> Self {
        Self {
            chunk_size_bytes,
            max_code_length_bits,
            length_limit: LengthLimit::default(),
        }
    }

    /// Set the length-limit policy.
    pub fn with_length_limit(mut self, length_limit: LengthLimit) -> Self {
        self.length_limit = length_limit;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::invalid_config(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the configuration can drive an encoder.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_bytes == 0 || self.chunk_size_bytes > MAX_CHUNK_SIZE {
            return Err(Error::invalid_config(format!(
                "chunk size {} outside range [1, {}]",
                self.chunk_size_bytes, MAX_CHUNK_SIZE
            )));
        }

        if self.max_code_length_bits == 0 || self.max_code_length_bits > MAX_CODE_LENGTH {
            return Err(Error::invalid_config(format!(
                "maximum code length {} outside range [1, {}]",
                self.max_code_length_bits, MAX_CODE_LENGTH
            )));
        }

        Ok(())
    }
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

fn default_max_code_length() -> u8 {
    DEFAULT_MAX_CODE_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoderConfig::default();
        assert_eq!(config.chunk_size_bytes, 1 << 20);
        assert_eq!(config.max_code_length_bits, 11);
        assert_eq!(config.length_limit, LengthLimit::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CoderConfig::new(0, 11).validate().is_err());
        assert!(CoderConfig::new(MAX_CHUNK_SIZE + 1, 11).validate().is_err());
        assert!(CoderConfig::new(1024, 0).validate().is_err());
        assert!(CoderConfig::new(1024, 17).validate().is_err());
        assert!(CoderConfig::new(MAX_CHUNK_SIZE, 16).validate().is_ok());
        assert!(CoderConfig::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = CoderConfig::from_json_str(
            r#"{ "chunk_size_bytes": 65536, "max_code_length_bits": 9, "length_limit": "kraft" }"#,
        )
        .unwrap();
        assert_eq!(config.chunk_size_bytes, 65536);
        assert_eq!(config.max_code_length_bits, 9);
        assert_eq!(config.length_limit, LengthLimit::Kraft);

        let config = CoderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoderConfig::default());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = CoderConfig::from_json_str(r#"{ "max_code_length_bits": 255 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = CoderConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coder.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "chunk_size_bytes": 2048 }"#).unwrap();
        drop(file);

        let config = CoderConfig::from_path(&path).unwrap();
        assert_eq!(config.chunk_size_bytes, 2048);

        let missing = CoderConfig::from_path(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
