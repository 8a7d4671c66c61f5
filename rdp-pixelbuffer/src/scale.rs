//! Image resampling between sizes and pixel formats.
//!
//! [`image_scale`] copies a source image into a destination image of a
//! possibly different size and format. Equal sizes are copied pixel-exactly;
//! anything else goes through the `image` crate's separable resampler with
//! the selected [`ScaleFilter`], so the target may be larger, smaller or a
//! different aspect ratio than the source.

use crate::errors::PixelBufferError;
use crate::format::PixelFormat;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rdp_common::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Filtering options for scaling operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleFilter {
    /// Nearest neighbor filtering (sharp, pixelated)
    Nearest,
    /// Linear filtering (smooth)
    #[default]
    Linear,
}

impl ScaleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Linear => FilterType::Triangle,
        }
    }
}

impl fmt::Display for ScaleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Linear => write!(f, "Linear"),
        }
    }
}

/// Read-only view of an image in memory. `stride` is in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    pub data: &'a [u8],
    pub format: PixelFormat,
    pub stride: usize,
    pub size: Size,
}

/// Mutable view of an image in memory. `stride` is in pixels.
#[derive(Debug)]
pub struct ImageMut<'a> {
    pub data: &'a mut [u8],
    pub format: PixelFormat,
    pub stride: usize,
    pub size: Size,
}

fn validate(
    what: &str,
    len: usize,
    format: &PixelFormat,
    stride: usize,
    size: Size,
) -> Result<(), PixelBufferError> {
    if size.is_empty() {
        return Err(PixelBufferError::Scale(format!(
            "{} image is empty ({}x{})",
            what, size.width, size.height
        )));
    }
    if stride < size.width as usize {
        return Err(PixelBufferError::Scale(format!(
            "{} stride {} smaller than width {}",
            what, stride, size.width
        )));
    }
    let bpp = format.bytes_per_pixel() as usize;
    let required = ((size.height as usize - 1) * stride + size.width as usize) * bpp;
    if len < required {
        return Err(PixelBufferError::Scale(format!(
            "{} image holds {} bytes, need {}",
            what, len, required
        )));
    }
    Ok(())
}

/// Resample `src` into `dst`.
pub fn image_scale(
    dst: &mut ImageMut<'_>,
    src: &ImageRef<'_>,
    filter: ScaleFilter,
) -> Result<(), PixelBufferError> {
    validate("source", src.data.len(), &src.format, src.stride, src.size)?;
    validate("destination", dst.data.len(), &dst.format, dst.stride, dst.size)?;

    trace!(
        "Scaling {}x{} -> {}x{} ({})",
        src.size.width,
        src.size.height,
        dst.size.width,
        dst.size.height,
        filter
    );

    if src.size == dst.size {
        copy_converted(dst, src);
        return Ok(());
    }

    let source = to_rgba_image(src)?;
    let scaled = imageops::resize(
        &source,
        dst.size.width,
        dst.size.height,
        filter.filter_type(),
    );
    write_rgba_image(dst, &scaled);
    Ok(())
}

fn copy_converted(dst: &mut ImageMut<'_>, src: &ImageRef<'_>) {
    let src_bpp = src.format.bytes_per_pixel() as usize;
    let dst_bpp = dst.format.bytes_per_pixel() as usize;
    let width = src.size.width as usize;

    for y in 0..src.size.height as usize {
        let src_row = &src.data[y * src.stride * src_bpp..][..width * src_bpp];
        let dst_row = &mut dst.data[y * dst.stride * dst_bpp..][..width * dst_bpp];

        if src.format == dst.format {
            dst_row.copy_from_slice(src_row);
            continue;
        }

        for (s, d) in src_row
            .chunks_exact(src_bpp)
            .zip(dst_row.chunks_exact_mut(dst_bpp))
        {
            dst.format.write_rgba(src.format.to_rgba(s), d);
        }
    }
}

fn to_rgba_image(src: &ImageRef<'_>) -> Result<RgbaImage, PixelBufferError> {
    let bpp = src.format.bytes_per_pixel() as usize;
    let width = src.size.width as usize;
    let mut rgba = Vec::with_capacity(src.size.area() as usize * 4);

    for y in 0..src.size.height as usize {
        let row = &src.data[y * src.stride * bpp..][..width * bpp];
        for pixel in row.chunks_exact(bpp) {
            rgba.extend_from_slice(&src.format.to_rgba(pixel));
        }
    }

    RgbaImage::from_raw(src.size.width, src.size.height, rgba)
        .ok_or_else(|| PixelBufferError::Scale("source image buffer size mismatch".to_string()))
}

fn write_rgba_image(dst: &mut ImageMut<'_>, image: &RgbaImage) {
    let bpp = dst.format.bytes_per_pixel() as usize;
    for (x, y, pixel) in image.enumerate_pixels() {
        let offset = (y as usize * dst.stride + x as usize) * bpp;
        dst.format.write_rgba(pixel.0, &mut dst.data[offset..offset + bpp]);
    }
}
