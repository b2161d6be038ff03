//! Fixed-capacity chunk buffer shared by the coders.
//!
//! Large inputs are coded as a sequence of independent chunks so memory use is
//! bounded by the chunk size, not the input size. A coder keeps one
//! [`ChunkBuffer`] and reuses it for every chunk of every operation.

use std::io::{ErrorKind, Read};

use crate::error::Result;

/// A reusable buffer holding one chunk.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    len: usize,
}

impl ChunkBuffer {
    /// Create a buffer able to hold `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            len: 0,
        }
    }

    /// Get the buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of valid bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the buffer holds `capacity` bytes.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// The valid bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Make sure the buffer holds at least `capacity` bytes, and drop its
    /// contents. Storage is only reallocated when it has to grow.
    pub fn reserve(&mut self, capacity: usize) {
        if self.data.len() < capacity {
            self.data.resize(capacity, 0);
        }
        self.len = 0;
    }

    /// Drop the contents, keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one byte. The caller must not exceed the capacity.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.data[self.len] = byte;
        self.len += 1;
    }

    /// Replace the contents with up to `limit` bytes read from `input`.
    ///
    /// Keeps reading until `limit` bytes arrive or the input reports
    /// end-of-file, so a short read from a pipe or socket never ends a chunk
    /// early. Returns the number of bytes read.
    pub fn fill_from<R: Read + ?Sized>(&mut self, input: &mut R, limit: usize) -> Result<usize> {
        let limit = limit.min(self.data.len());
        self.len = 0;

        while self.len < limit {
            match input.read(&mut self.data[self.len..limit]) {
                Ok(0) => break,
                Ok(n) => self.len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.len)
    }
}
