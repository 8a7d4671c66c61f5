//! 16-byte aligned pixel storage.
//!
//! Pointer pixel buffers are handed to SIMD-friendly conversion and scaling
//! routines, so their first byte must sit on a 16-byte boundary. The storage
//! is a vector of 16-byte blocks viewed as a byte slice; it is released when
//! the owning value is dropped.
//!
//! Allocation is fallible: an impossible size or an exhausted allocator
//! yields [`PixelBufferError::Allocation`] instead of aborting.

use crate::errors::PixelBufferError;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Alignment of every [`AlignedBuffer`], in bytes.
pub const BUFFER_ALIGNMENT: usize = 16;

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Block([u8; 16]);

/// An owned, zero-initialised, 16-byte aligned byte buffer.
#[derive(Clone)]
pub struct AlignedBuffer {
    blocks: Vec<Block>,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Result<Self, PixelBufferError> {
        let count = len.div_ceil(BUFFER_ALIGNMENT);
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(count).map_err(|e| {
            PixelBufferError::Allocation(format!("cannot allocate {} bytes: {}", len, e))
        })?;
        blocks.resize(count, Block::zeroed());

        Ok(Self { blocks, len })
    }

    /// Allocate storage for a `width` x `height` image with `bytes_per_pixel`
    /// bytes per pixel, rejecting sizes that overflow `usize`.
    pub fn for_image(
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<Self, PixelBufferError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
            .ok_or_else(|| {
                PixelBufferError::Allocation(format!(
                    "image size {}x{}x{} overflows",
                    width, height, bytes_per_pixel
                ))
            })?;
        Self::zeroed(len)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len]
    }

    /// The buffer contents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..self.len]
    }
}

impl AsRef<[u8]> for AlignedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for AlignedBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .finish()
    }
}
