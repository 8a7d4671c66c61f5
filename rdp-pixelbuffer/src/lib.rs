//! Pixel formats, aligned pixel storage and pointer bitmap conversion.
//!
//! This crate holds the pixel-level building blocks of the pointer pipeline:
//!
//! - [`PixelFormat`] and [`Palette`] - describe how pixels are laid out in memory
//! - [`AlignedBuffer`] - owned, 16-byte aligned pixel storage
//! - [`copy_from_pointer_data`] - decodes XOR/AND mask pairs into 32bpp pixels
//! - [`image_scale`] - resamples a 32bpp image between sizes and formats
//!
//! # Critical Note: Stride is in Pixels, Not Bytes!
//!
//! As everywhere else in this workspace, stride values are measured in
//! **pixels**. Multiply by `bytes_per_pixel()` to get byte offsets.

pub mod aligned;
pub mod errors;
pub mod format;
pub mod pointer_data;
pub mod scale;

pub use aligned::{AlignedBuffer, BUFFER_ALIGNMENT};
pub use errors::PixelBufferError;
pub use format::{Palette, PixelFormat};
pub use pointer_data::{copy_from_pointer_data, PointerMasks};
pub use scale::{image_scale, ImageMut, ImageRef, ScaleFilter};

/// Result type for pixel buffer operations.
pub type Result<T> = std::result::Result<T, PixelBufferError>;
