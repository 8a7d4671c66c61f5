//! Pixel format descriptions and conversions.
//!
//! [`PixelFormat`] describes a packed true-color pixel: how many bytes it
//! occupies, its byte order, and where each channel lives inside the packed
//! value. The same type describes both the normalized 32bpp pointer buffers
//! and the legacy 15/16/24/32bpp layouts found in XOR masks.
//!
//! # Channel Extraction and Scaling
//!
//! To extract a color component from a pixel value:
//! 1. Shift right by the channel's shift value
//! 2. Mask with the channel's max value
//! 3. Scale to 8-bit: `(component * 255) / channel_max`
//!
//! A format with `alpha_max == 0` carries no alpha; its pixels decode as opaque.
//!
//! # Example
//!
//! ```
//! use rdp_pixelbuffer::PixelFormat;
//!
//! // BGRA32: bytes in memory are B, G, R, A
//! let pf = PixelFormat::bgra32();
//! assert_eq!(pf.bytes_per_pixel(), 4);
//!
//! let rgba = pf.to_rgba(&[0xCC, 0xBB, 0xAA, 0x80]);
//! assert_eq!(rgba, [0xAA, 0xBB, 0xCC, 0x80]);
//!
//! let mut out = [0u8; 4];
//! pf.write_rgba([0xAA, 0xBB, 0xCC, 0x80], &mut out);
//! assert_eq!(out, [0xCC, 0xBB, 0xAA, 0x80]);
//! ```

/// Describes a packed true-color pixel format.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct PixelFormat {
    /// Bits used per pixel, e.g. 32 for BGRA32, 16 for RGB565.
    pub bits_per_pixel: u8,

    /// Significant bits (sum of the channel widths), e.g. 24 for BGRX32.
    pub depth: u8,

    /// Byte order for multi-byte pixels (`true` = big endian).
    pub big_endian: bool,

    /// Maximum red component value (e.g. 255 for 8-bit red).
    pub red_max: u16,

    /// Maximum green component value.
    pub green_max: u16,

    /// Maximum blue component value.
    pub blue_max: u16,

    /// Maximum alpha component value, `0` if the format has no alpha.
    pub alpha_max: u16,

    /// Bit shift for the least significant bit of the red component.
    pub red_shift: u8,

    /// Bit shift for the least significant bit of the green component.
    pub green_shift: u8,

    /// Bit shift for the least significant bit of the blue component.
    pub blue_shift: u8,

    /// Bit shift for the least significant bit of the alpha component.
    pub alpha_shift: u8,
}

impl PixelFormat {
    /// Returns bytes-per-pixel, rounded up to the nearest byte.
    ///
    /// Stride values elsewhere in this workspace are measured in **pixels**;
    /// multiply by this value when calculating byte offsets.
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel.div_ceil(8)
    }

    /// True if the format carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.alpha_max > 0
    }

    /// 32bpp with B, G, R, A in memory order (little-endian `0xAARRGGBB`).
    ///
    /// This is the normalized format used for decoded pointer buffers.
    pub fn bgra32() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 32,
            big_endian: false,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            alpha_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
            alpha_shift: 24,
        }
    }

    /// 32bpp with R, G, B, A in memory order.
    pub fn rgba32() -> Self {
        Self {
            red_shift: 0,
            green_shift: 8,
            blue_shift: 16,
            alpha_shift: 24,
            ..Self::bgra32()
        }
    }

    /// 32bpp with B, G, R in memory order and an unused fourth byte.
    pub fn bgrx32() -> Self {
        Self {
            depth: 24,
            alpha_max: 0,
            ..Self::bgra32()
        }
    }

    /// 24bpp with B, G, R in memory order.
    pub fn bgr24() -> Self {
        Self {
            bits_per_pixel: 24,
            depth: 24,
            alpha_max: 0,
            alpha_shift: 0,
            ..Self::bgra32()
        }
    }

    /// 16bpp, 5 bits red, 6 bits green, 5 bits blue, little-endian.
    pub fn rgb565() -> Self {
        Self {
            bits_per_pixel: 16,
            depth: 16,
            big_endian: false,
            red_max: 31,
            green_max: 63,
            blue_max: 31,
            alpha_max: 0,
            red_shift: 11,
            green_shift: 5,
            blue_shift: 0,
            alpha_shift: 0,
        }
    }

    /// 16bpp storage with 5 bits per channel, little-endian.
    pub fn rgb555() -> Self {
        Self {
            depth: 15,
            green_max: 31,
            red_shift: 10,
            ..Self::rgb565()
        }
    }

    /// Converts a pixel from this format to `[R, G, B, A]`.
    ///
    /// Formats without alpha decode with `A = 255`.
    ///
    /// # Panics
    ///
    /// Panics if `pixel.len()` does not equal `self.bytes_per_pixel()`.
    pub fn to_rgba(&self, pixel: &[u8]) -> [u8; 4] {
        let bpp = self.bytes_per_pixel() as usize;
        assert_eq!(
            pixel.len(),
            bpp,
            "pixel length {} does not match bytes_per_pixel {}",
            pixel.len(),
            bpp
        );

        let mut value = 0u32;
        if self.big_endian {
            for &byte in pixel {
                value = (value << 8) | byte as u32;
            }
        } else {
            for (i, &byte) in pixel.iter().enumerate() {
                value |= (byte as u32) << (i * 8);
            }
        }

        let a = if self.has_alpha() {
            channel_to_8bit(value, self.alpha_shift, self.alpha_max)
        } else {
            255
        };

        [
            channel_to_8bit(value, self.red_shift, self.red_max),
            channel_to_8bit(value, self.green_shift, self.green_max),
            channel_to_8bit(value, self.blue_shift, self.blue_max),
            a,
        ]
    }

    /// Encodes `[R, G, B, A]` into `out` using this format.
    ///
    /// The alpha component is dropped for formats without alpha.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` does not equal `self.bytes_per_pixel()`.
    pub fn write_rgba(&self, rgba: [u8; 4], out: &mut [u8]) {
        let bpp = self.bytes_per_pixel() as usize;
        assert_eq!(
            out.len(),
            bpp,
            "output length {} does not match bytes_per_pixel {}",
            out.len(),
            bpp
        );

        let mut value = channel_from_8bit(rgba[0], self.red_shift, self.red_max)
            | channel_from_8bit(rgba[1], self.green_shift, self.green_max)
            | channel_from_8bit(rgba[2], self.blue_shift, self.blue_max);
        if self.has_alpha() {
            value |= channel_from_8bit(rgba[3], self.alpha_shift, self.alpha_max);
        }

        if self.big_endian {
            for byte in out.iter_mut().rev() {
                *byte = (value & 0xFF) as u8;
                value >>= 8;
            }
        } else {
            for byte in out.iter_mut() {
                *byte = (value & 0xFF) as u8;
                value >>= 8;
            }
        }
    }
}

fn channel_to_8bit(value: u32, shift: u8, max: u16) -> u8 {
    if max == 0 {
        return 0;
    }
    let component = (value >> shift) & max as u32;
    ((component * 255) / max as u32) as u8
}

fn channel_from_8bit(component: u8, shift: u8, max: u16) -> u32 {
    ((component as u32 * max as u32) / 255) << shift
}

/// Color table used to decode 8bpp pointer data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    /// Create a palette from `[R, G, B]` entries.
    pub fn new(entries: Vec<[u8; 3]>) -> Self {
        Self { entries }
    }

    /// Look up an entry by index.
    pub fn get(&self, index: u8) -> Option<[u8; 3]> {
        self.entries.get(index as usize).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
