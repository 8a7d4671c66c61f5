//! UI-side pixel surfaces.
//!
//! A [`Surface`] is the image a native cursor is built from. Surfaces belong
//! to the UI thread: alternate images are attached as `Rc<Surface>`, which
//! keeps every surface (and everything holding one) `!Send`.

use image::RgbaImage;
use rdp_common::Size;
use rdp_pixelbuffer::{image_scale, AlignedBuffer, ImageMut, ImageRef, PixelFormat, ScaleFilter};
use rdp_pointer::PointerError;
use std::fmt;
use std::rc::Rc;

/// An owned image in a native pixel format, with optional alternate
/// representations at other resolutions.
pub struct Surface {
    size: Size,
    format: PixelFormat,
    data: AlignedBuffer,
    alternates: Vec<Rc<Surface>>,
}

impl Surface {
    /// Allocate a zeroed (fully transparent) surface.
    pub fn new(size: Size, format: PixelFormat) -> Result<Self, PointerError> {
        if size.is_empty() {
            return Err(PointerError::Build(format!(
                "cannot create {}x{} surface",
                size.width, size.height
            )));
        }
        let bytes_per_pixel = format.bytes_per_pixel() as usize;
        let data = AlignedBuffer::for_image(size.width, size.height, bytes_per_pixel)?;
        Ok(Self {
            size,
            format,
            data,
            alternates: Vec::new(),
        })
    }

    /// Dimensions in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Pixel format of the surface.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes, tightly packed.
    pub fn pixels(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Read-only view for resampling.
    pub fn image(&self) -> ImageRef<'_> {
        ImageRef {
            data: self.data.as_slice(),
            format: self.format,
            stride: self.size.width as usize,
            size: self.size,
        }
    }

    /// Exclusive access to the pixels for writing.
    pub fn lock(&mut self) -> ImageMut<'_> {
        ImageMut {
            data: self.data.as_mut_slice(),
            format: self.format,
            stride: self.size.width as usize,
            size: self.size,
        }
    }

    /// Resample `src` to fill this whole surface.
    pub fn blit_scaled(&mut self, src: &Surface, filter: ScaleFilter) -> Result<(), PointerError> {
        image_scale(&mut self.lock(), &src.image(), filter)?;
        Ok(())
    }

    /// Attach a higher (or lower) resolution rendition of this image.
    pub fn add_alternate_image(&mut self, image: Rc<Surface>) {
        self.alternates.push(image);
    }

    /// Attached alternate images, in the order they were added.
    pub fn alternates(&self) -> &[Rc<Surface>] {
        &self.alternates
    }

    /// The largest of this surface and its alternates.
    pub fn best_image(&self) -> &Surface {
        self.alternates
            .iter()
            .map(Rc::as_ref)
            .filter(|alt| alt.size.area() > self.size.area())
            .max_by_key(|alt| alt.size.area())
            .unwrap_or(self)
    }

    /// RGBA colour of the pixel at `(x, y)`, if it is inside the surface.
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        let offset = (y as usize * self.size.width as usize + x as usize) * bpp;
        Some(self.format.to_rgba(&self.data.as_slice()[offset..offset + bpp]))
    }

    /// Copy the pixels out as an RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let bpp = self.format.bytes_per_pixel() as usize;
        let mut rgba = Vec::with_capacity(self.size.area() as usize * 4);
        for pixel in self.data.as_slice().chunks_exact(bpp) {
            rgba.extend_from_slice(&self.format.to_rgba(pixel));
        }
        RgbaImage::from_vec(self.size.width, self.size.height, rgba)
            .unwrap_or_else(|| RgbaImage::new(self.size.width, self.size.height))
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("size", &format!("{}x{}", self.size.width, self.size.height))
            .field(
                "alternates",
                &self
                    .alternates
                    .iter()
                    .map(|alt| format!("{}x{}", alt.width(), alt.height()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
