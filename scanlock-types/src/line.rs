//! Fixed-width scanline storage.
//!
//! A [`LineBuffer`] holds one horizontal scan of video samples. Buffers are
//! allocated once at pipeline startup and recycled for every subsequent
//! line; the hot path never allocates. Ownership of a buffer moves between
//! the two pipeline stages with the message that carries it, so a stage can
//! never touch a buffer it has handed off.

use crate::LinkError;

/// One scanline of video samples, fixed width for the life of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    /// Allocate a zero-filled buffer of the given active-line width.
    pub fn new(width: usize) -> Self {
        Self {
            bytes: vec![0; width],
        }
    }

    /// Build a buffer from existing sample bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Active-line width in bytes.
    pub fn width(&self) -> usize {
        self.bytes.len()
    }

    /// The samples as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The samples as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Overwrite this buffer's samples from `src`.
    ///
    /// Fails if `src` is not exactly one line wide; the pipeline treats a
    /// width mismatch as a configuration error, not something to pad or
    /// truncate silently.
    pub fn copy_from(&mut self, src: &[u8]) -> Result<(), LinkError> {
        if src.len() != self.bytes.len() {
            return Err(LinkError::WidthMismatch {
                expected: self.bytes.len(),
                actual: src.len(),
            });
        }
        self.bytes.copy_from_slice(src);
        Ok(())
    }
}

impl AsRef<[u8]> for LineBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
