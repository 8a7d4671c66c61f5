//! Protocol-side pointer resources.
//!
//! A [`PointerShape`] is one remote cursor shape decoded into a normalized
//! 32bpp buffer. Construction is all-or-nothing: either the buffer is
//! allocated and fully converted, or an error is returned and nothing is
//! kept. Shapes are immutable once built and shared with the UI thread as
//! [`PointerRef`]; the pixel buffer is released when the last reference
//! is dropped.

use crate::errors::PointerError;
use rdp_common::{Point, Size};
use rdp_pixelbuffer::{
    copy_from_pointer_data, AlignedBuffer, ImageRef, Palette, PixelFormat, PointerMasks,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a decoded pointer shape.
pub type PointerRef = Arc<PointerShape>;

static NEXT_POINTER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pointer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(u64);

impl PointerId {
    fn next() -> Self {
        Self(NEXT_POINTER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pointer#{}", self.0)
    }
}

/// A pointer update as received from the protocol layer.
#[derive(Debug, Clone, Copy)]
pub struct PointerAttributes<'a> {
    /// Width in session pixels.
    pub width: u32,
    /// Height in session pixels.
    pub height: u32,
    /// Hot point relative to the top-left corner, in session pixels.
    pub hotspot: Point,
    /// XOR/AND mask pair.
    pub masks: PointerMasks<'a>,
}

/// A decoded remote cursor shape.
pub struct PointerShape {
    id: PointerId,
    size: Size,
    hotspot: Point,
    format: PixelFormat,
    data: AlignedBuffer,
}

impl PointerShape {
    /// Decode a pointer update into a new shape.
    ///
    /// Allocates `4 * width * height` bytes, 16-byte aligned, and converts
    /// the masks into `format` (which must be 32bpp).
    pub fn new(
        attributes: &PointerAttributes<'_>,
        format: PixelFormat,
        palette: Option<&Palette>,
    ) -> Result<Self, PointerError> {
        let size = Size::new(attributes.width, attributes.height);
        let mut data = Self::allocate(size, &format)?;

        copy_from_pointer_data(
            data.as_mut_slice(),
            &format,
            0,
            size.width,
            size.height,
            &attributes.masks,
            palette,
        )?;

        let shape = Self {
            id: PointerId::next(),
            size,
            hotspot: attributes.hotspot,
            format,
            data,
        };
        debug!(
            "New {}: {}x{} xorBpp={} hotspot=({}, {})",
            shape.id,
            size.width,
            size.height,
            attributes.masks.xor_bpp,
            shape.hotspot.x,
            shape.hotspot.y
        );
        Ok(shape)
    }

    /// Build a shape from pixels already in `format`, tightly packed.
    pub fn from_pixels(
        size: Size,
        hotspot: Point,
        format: PixelFormat,
        pixels: &[u8],
    ) -> Result<Self, PointerError> {
        let mut data = Self::allocate(size, &format)?;
        if pixels.len() != data.len() {
            return Err(PointerError::Conversion(format!(
                "pixel data length {} does not match {}x{} pointer ({} bytes)",
                pixels.len(),
                size.width,
                size.height,
                data.len()
            )));
        }
        data.as_mut_slice().copy_from_slice(pixels);

        Ok(Self {
            id: PointerId::next(),
            size,
            hotspot,
            format,
            data,
        })
    }

    fn allocate(size: Size, format: &PixelFormat) -> Result<AlignedBuffer, PointerError> {
        if size.is_empty() {
            return Err(PointerError::Conversion(format!(
                "invalid pointer dimensions {}x{}",
                size.width, size.height
            )));
        }
        if format.bytes_per_pixel() != 4 {
            return Err(PointerError::Conversion(format!(
                "pointer buffers must be 32bpp, got {}bpp",
                format.bits_per_pixel
            )));
        }
        Ok(AlignedBuffer::for_image(size.width, size.height, 4)?)
    }

    /// Unique identity of this shape.
    pub fn id(&self) -> PointerId {
        self.id
    }

    /// Width in session pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in session pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Dimensions in session pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Hot point in session pixels.
    pub fn hotspot(&self) -> Point {
        self.hotspot
    }

    /// Pixel format of the buffer.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The decoded pixel buffer.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// View of the buffer suitable for [`rdp_pixelbuffer::image_scale`].
    pub fn image(&self) -> ImageRef<'_> {
        ImageRef {
            data: self.data.as_slice(),
            format: self.format,
            stride: self.size.width as usize,
            size: self.size,
        }
    }
}

impl fmt::Debug for PointerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerShape")
            .field("id", &self.id)
            .field("size", &format!("{}x{}", self.size.width, self.size.height))
            .field("hotspot", &self.hotspot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rdp_pixelbuffer::pointer_data::scanline_step;

    fn attributes<'a>(
        width: u32,
        height: u32,
        xor: &'a [u8],
        and: &'a [u8],
        bpp: u32,
    ) -> PointerAttributes<'a> {
        PointerAttributes {
            width,
            height,
            hotspot: Point::new(1, 2),
            masks: PointerMasks {
                xor_mask: xor,
                and_mask: and,
                xor_bpp: bpp,
            },
        }
    }

    #[test]
    fn test_new_pointer_buffer_size() {
        let xor = vec![0x40u8; scanline_step(32, 24) * 32];
        let and = vec![0u8; scanline_step(32, 1) * 32];
        let shape = PointerShape::new(
            &attributes(32, 32, &xor, &and, 24),
            PixelFormat::bgra32(),
            None,
        )
        .unwrap();

        assert_eq!(shape.size(), Size::new(32, 32));
        assert_eq!(shape.data().len(), 4 * 32 * 32);
        assert_eq!(shape.hotspot(), Point::new(1, 2));
        assert_eq!(shape.data().as_ptr() as usize % 16, 0);
        assert_eq!(
            shape.format().to_rgba(&shape.data()[0..4]),
            [0x40, 0x40, 0x40, 0xFF]
        );
    }

    fn pixels(size: Size, format: PixelFormat, data: &[u8]) -> Result<PointerShape, PointerError> {
        PointerShape::from_pixels(size, Point::default(), format, data)
    }

    #[test]
    fn test_ids_are_unique() {
        let data = vec![0u8; 4];
        let a = pixels(Size::new(1, 1), PixelFormat::bgra32(), &data).unwrap();
        let b = pixels(Size::new(1, 1), PixelFormat::bgra32(), &data).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_zero_size_rejected() {
        let attributes = attributes(0, 32, &[0; 4], &[0; 4], 24);
        let err = PointerShape::new(&attributes, PixelFormat::bgra32(), None).unwrap_err();
        assert!(matches!(err, PointerError::Conversion(_)));
    }

    #[test]
    fn test_conversion_failure_reported() {
        let attributes = attributes(32, 32, &[0; 10], &[], 24);
        let err = PointerShape::new(&attributes, PixelFormat::bgra32(), None).unwrap_err();
        assert!(matches!(err, PointerError::Conversion(_)));
    }

    #[test]
    fn test_non_32bpp_format_rejected() {
        let err = pixels(Size::new(1, 1), PixelFormat::bgr24(), &[0; 3]).unwrap_err();
        assert!(err.to_string().contains("32bpp"));
    }

    #[test]
    fn test_from_pixels_length_mismatch() {
        let err = pixels(Size::new(2, 2), PixelFormat::bgra32(), &[0; 8]).unwrap_err();
        assert!(matches!(err, PointerError::Conversion(_)));
    }

    #[test]
    fn test_image_view() {
        let data = vec![7u8; 3 * 2 * 4];
        let shape = pixels(Size::new(3, 2), PixelFormat::rgba32(), &data).unwrap();
        let image = shape.image();
        assert_eq!(image.stride, 3);
        assert_eq!(image.size, Size::new(3, 2));
        assert_eq!(image.data, &data[..]);
    }

    proptest! {
        #[test]
        fn prop_buffer_is_exactly_four_bytes_per_pixel(
            width in 1u32..96,
            height in 1u32..96,
            bpp in prop::sample::select(vec![1u32, 8, 16, 24, 32]),
        ) {
            let xor = vec![0u8; scanline_step(width, bpp) * height as usize];
            let and = vec![0u8; scanline_step(width, 1) * height as usize];
            let palette = Palette::new(vec![[0, 0, 0]]);
            let shape = PointerShape::new(
                &attributes(width, height, &xor, &and, bpp),
                PixelFormat::bgra32(),
                Some(&palette),
            )
            .unwrap();
            prop_assert_eq!(shape.data().len(), 4 * width as usize * height as usize);
        }
    }
}
