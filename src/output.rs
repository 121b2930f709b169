//! Fixed-size output buffer shared by all decoders

use crate::{Result, SqzError};

/// Pre-allocated output sized to the header-declared payload length
///
/// Writes past the end fail with [`SqzError::LengthMismatch`]; [`finish`]
/// fails the same way if the buffer was not filled exactly.
///
/// [`finish`]: OutputBuffer::finish
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl OutputBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            pos: 0,
        }
    }

    /// Number of bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.pos]
    }

    fn reserve(&self, count: usize) -> Result<()> {
        let end = self.pos + count;
        if end > self.data.len() {
            return Err(SqzError::LengthMismatch {
                declared: self.data.len(),
                produced: end,
            });
        }
        Ok(())
    }

    /// Append one byte
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.reserve(1)?;
        self.data[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    /// Append a slice
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.data[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Append `count` copies of `byte`
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<()> {
        self.reserve(count)?;
        self.data[self.pos..self.pos + count].fill(byte);
        self.pos += count;
        Ok(())
    }

    /// Copy `count` bytes starting `distance` bytes behind the write position
    ///
    /// The copy runs one byte at a time so a source range overlapping the
    /// destination repeats the bytes just written.
    pub fn copy_back(&mut self, distance: usize, count: usize) -> Result<()> {
        if distance == 0 || distance > self.pos {
            return Err(SqzError::CorruptStream(format!(
                "back-reference distance {distance} at output offset {}",
                self.pos
            )));
        }
        self.reserve(count)?;

        let mut src = self.pos - distance;
        for _ in 0..count {
            self.data[self.pos] = self.data[src];
            self.pos += 1;
            src += 1;
        }
        Ok(())
    }

    /// Return the payload if it was filled exactly
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.pos != self.data.len() {
            return Err(SqzError::LengthMismatch {
                declared: self.data.len(),
                produced: self.pos,
            });
        }
        Ok(self.data)
    }
}
