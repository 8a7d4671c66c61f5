//! Conversion of XOR/AND masked pointer bitmaps into 32bpp pixels.
//!
//! Remote pointers arrive as a pair of masks:
//!
//! - the **XOR mask** carries color at `xor_bpp` bits per pixel
//!   (1, 8, 15, 16, 24 or 32)
//! - the **AND mask** is 1bpp and marks pixels that combine with the screen
//!
//! Every scanline of either mask is padded to an even number of bytes. Color
//! masks (`xor_bpp > 1`) are stored bottom-up, monochrome masks top-down.
//!
//! | AND | XOR (mono) | result                  |
//! |-----|------------|-------------------------|
//! | 0   | 0          | opaque black            |
//! | 0   | 1          | opaque white            |
//! | 1   | 0          | transparent             |
//! | 1   | 1          | inverted (checkerboard) |
//!
//! For color masks a set AND bit turns opaque black into transparent and
//! opaque white into an inverted pixel. A 32bpp pixel with non-zero alpha
//! ignores the AND mask. Screen inversion cannot be expressed by a cursor
//! image, so inverted pixels are drawn as a black/white checkerboard.

use crate::errors::PixelBufferError;
use crate::format::{Palette, PixelFormat};
use tracing::trace;

const BLACK: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];
const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const TRANSPARENT: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

/// Raw mask data of a pointer update, as delivered by the protocol layer.
#[derive(Debug, Clone, Copy)]
pub struct PointerMasks<'a> {
    /// Color mask, `xor_bpp` bits per pixel.
    pub xor_mask: &'a [u8],
    /// Transparency mask, 1 bit per pixel. May be empty for color pointers.
    pub and_mask: &'a [u8],
    /// Bits per pixel of the XOR mask.
    pub xor_bpp: u32,
}

/// Bytes per scanline of a mask `width` pixels wide at `bpp` bits per pixel,
/// padded to an even count.
pub fn scanline_step(width: u32, bpp: u32) -> usize {
    let step = if bpp == 1 {
        (width as usize).div_ceil(8)
    } else {
        width as usize * (bpp as usize).div_ceil(8)
    };
    step + step % 2
}

/// Decode `masks` into `dst` as a `width` x `height` image in `dst_format`.
///
/// `dst_stride` is measured in pixels; `0` means `width`. `dst_format` must
/// be a 32bpp format. `palette` is required for 8bpp masks.
pub fn copy_from_pointer_data(
    dst: &mut [u8],
    dst_format: &PixelFormat,
    dst_stride: usize,
    width: u32,
    height: u32,
    masks: &PointerMasks<'_>,
    palette: Option<&Palette>,
) -> Result<(), PixelBufferError> {
    if width == 0 || height == 0 {
        return Ok(());
    }

    if dst_format.bytes_per_pixel() != 4 {
        return Err(PixelBufferError::Conversion(format!(
            "pointer destination must be 32bpp, got {}bpp",
            dst_format.bits_per_pixel
        )));
    }

    let stride = if dst_stride == 0 {
        width as usize
    } else {
        dst_stride
    };
    if stride < width as usize {
        return Err(PixelBufferError::Conversion(format!(
            "destination stride {} smaller than width {}",
            stride, width
        )));
    }
    let required = ((height as usize - 1) * stride + width as usize) * 4;
    if dst.len() < required {
        return Err(PixelBufferError::Conversion(format!(
            "destination holds {} bytes, need {}",
            dst.len(),
            required
        )));
    }

    trace!(
        "Converting {}x{} pointer, xorBpp={}, xor={} and={} bytes",
        width,
        height,
        masks.xor_bpp,
        masks.xor_mask.len(),
        masks.and_mask.len()
    );

    let mut target = Target {
        dst,
        format: dst_format,
        stride,
    };

    match masks.xor_bpp {
        1 => copy_monochrome(&mut target, width, height, masks),
        8 | 15 | 16 | 24 | 32 => copy_color(&mut target, width, height, masks, palette),
        other => Err(PixelBufferError::Conversion(format!(
            "invalid xorBpp {}",
            other
        ))),
    }
}

struct Target<'a> {
    dst: &'a mut [u8],
    format: &'a PixelFormat,
    stride: usize,
}

impl Target<'_> {
    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = (y as usize * self.stride + x as usize) * 4;
        self.format.write_rgba(rgba, &mut self.dst[offset..offset + 4]);
    }
}

fn inverted_color(x: u32, y: u32) -> [u8; 4] {
    let fill = if (x + y) & 1 != 0 { 0x00 } else { 0xFF };
    [fill, fill, fill, 0xFF]
}

fn mask_bit(row: &[u8], x: u32) -> bool {
    row[(x / 8) as usize] & (0x80 >> (x % 8)) != 0
}

fn check_mask_len(
    name: &str,
    mask: &[u8],
    step: usize,
    height: u32,
) -> Result<(), PixelBufferError> {
    let needed = step * height as usize;
    if mask.len() < needed {
        return Err(PixelBufferError::Conversion(format!(
            "{} mask holds {} bytes, need {}",
            name,
            mask.len(),
            needed
        )));
    }
    Ok(())
}

fn copy_monochrome(
    target: &mut Target<'_>,
    width: u32,
    height: u32,
    masks: &PointerMasks<'_>,
) -> Result<(), PixelBufferError> {
    if masks.xor_mask.is_empty() || masks.and_mask.is_empty() {
        return Err(PixelBufferError::Conversion(
            "monochrome pointer requires both masks".to_string(),
        ));
    }

    let step = scanline_step(width, 1);
    check_mask_len("XOR", masks.xor_mask, step, height)?;
    check_mask_len("AND", masks.and_mask, step, height)?;

    for y in 0..height {
        let offset = y as usize * step;
        let xor_row = &masks.xor_mask[offset..offset + step];
        let and_row = &masks.and_mask[offset..offset + step];

        for x in 0..width {
            let color = match (mask_bit(and_row, x), mask_bit(xor_row, x)) {
                (false, false) => BLACK,
                (false, true) => WHITE,
                (true, false) => TRANSPARENT,
                (true, true) => inverted_color(x, y),
            };
            target.put(x, y, color);
        }
    }

    Ok(())
}

fn copy_color(
    target: &mut Target<'_>,
    width: u32,
    height: u32,
    masks: &PointerMasks<'_>,
    palette: Option<&Palette>,
) -> Result<(), PixelBufferError> {
    if masks.xor_mask.is_empty() {
        return Err(PixelBufferError::Conversion("empty XOR mask".to_string()));
    }

    let palette = match (masks.xor_bpp, palette) {
        (8, None) => {
            return Err(PixelBufferError::Conversion(
                "8bpp pointer without palette".to_string(),
            ))
        }
        (_, p) => p,
    };

    let source_format = match masks.xor_bpp {
        15 => Some(PixelFormat::rgb555()),
        16 => Some(PixelFormat::rgb565()),
        24 => Some(PixelFormat::bgr24()),
        32 => Some(PixelFormat::bgra32()),
        _ => None,
    };
    let bytes_per_pixel = (masks.xor_bpp as usize).div_ceil(8);

    let xor_step = scanline_step(width, masks.xor_bpp);
    let and_step = scanline_step(width, 1);
    check_mask_len("XOR", masks.xor_mask, xor_step, height)?;
    let has_and_mask = !masks.and_mask.is_empty();
    if has_and_mask {
        check_mask_len("AND", masks.and_mask, and_step, height)?;
    }

    for y in 0..height {
        // color masks are stored bottom-up
        let row = (height - 1 - y) as usize;
        let xor_row = &masks.xor_mask[row * xor_step..(row + 1) * xor_step];
        let and_row = if has_and_mask {
            Some(&masks.and_mask[row * and_step..(row + 1) * and_step])
        } else {
            None
        };

        for x in 0..width {
            let start = x as usize * bytes_per_pixel;
            let raw = &xor_row[start..start + bytes_per_pixel];

            let (mut color, ignore_and) = match (source_format, palette) {
                (Some(format), _) => {
                    let color = format.to_rgba(raw);
                    (color, masks.xor_bpp == 32 && color[3] != 0)
                }
                (None, Some(palette)) => {
                    let [r, g, b] = palette.get(raw[0]).ok_or_else(|| {
                        PixelBufferError::Conversion(format!(
                            "palette index {} out of range ({} entries)",
                            raw[0],
                            palette.len()
                        ))
                    })?;
                    ([r, g, b, 0xFF], false)
                }
                (None, None) => {
                    return Err(PixelBufferError::Conversion(
                        "8bpp pointer without palette".to_string(),
                    ))
                }
            };

            let and_bit = and_row.map(|r| mask_bit(r, x)).unwrap_or(false);
            if and_bit && !ignore_and {
                if color == BLACK {
                    color = TRANSPARENT;
                } else if color == WHITE {
                    color = inverted_color(x, y);
                }
            }

            target.put(x, y, color);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(width: u32, height: u32, masks: &PointerMasks<'_>) -> Vec<[u8; 4]> {
        let mut dst = vec![0u8; (width * height * 4) as usize];
        let palette = Palette::new(vec![[0, 0, 0], [0x10, 0x20, 0x30]]);
        copy_from_pointer_data(
            &mut dst,
            &PixelFormat::rgba32(),
            0,
            width,
            height,
            masks,
            Some(&palette),
        )
        .unwrap();
        dst.chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect()
    }

    #[test]
    fn test_scanline_step_is_even() {
        assert_eq!(scanline_step(1, 1), 2);
        assert_eq!(scanline_step(16, 1), 2);
        assert_eq!(scanline_step(17, 1), 4);
        assert_eq!(scanline_step(32, 1), 4);
        assert_eq!(scanline_step(3, 24), 10);
        assert_eq!(scanline_step(3, 8), 4);
        assert_eq!(scanline_step(2, 15), 4);
        assert_eq!(scanline_step(32, 32), 128);
    }

    #[test]
    fn test_monochrome_truth_table() {
        // 4x1: pixels (and,xor) = (0,0) (0,1) (1,0) (1,1)
        let xor = [0b0101_0000, 0x00];
        let and = [0b0011_0000, 0x00];
        let pixels = decode(
            4,
            1,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &and,
                xor_bpp: 1,
            },
        );
        assert_eq!(pixels[0], BLACK);
        assert_eq!(pixels[1], WHITE);
        assert_eq!(pixels[2], TRANSPARENT);
        // x + y = 3 is odd -> black square of the checkerboard
        assert_eq!(pixels[3], [0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_monochrome_is_top_down() {
        // 1x2: first row white, second row black
        let xor = [0x80, 0x00, 0x00, 0x00];
        let and = [0x00; 4];
        let pixels = decode(
            1,
            2,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &and,
                xor_bpp: 1,
            },
        );
        assert_eq!(pixels, vec![WHITE, BLACK]);
    }

    #[test]
    fn test_monochrome_requires_and_mask() {
        let mut dst = vec![0u8; 16];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgra32(),
            0,
            2,
            2,
            &PointerMasks {
                xor_mask: &[0; 4],
                and_mask: &[],
                xor_bpp: 1,
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PixelBufferError::Conversion(_)));
    }

    #[test]
    fn test_24bpp_is_bottom_up() {
        // 1x2, stride 4 bytes per row (3 padded to even)
        // stored row 0 = bottom = red, stored row 1 = top = blue
        let xor = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00];
        let pixels = decode(
            1,
            2,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &[],
                xor_bpp: 24,
            },
        );
        assert_eq!(pixels[0], [0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(pixels[1], [0xFF, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_24bpp_and_mask_makes_black_transparent() {
        // 2x1: black then white, both with AND bit set
        let xor = [0, 0, 0, 0xFF, 0xFF, 0xFF];
        let and = [0b1100_0000, 0x00];
        let pixels = decode(
            2,
            1,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &and,
                xor_bpp: 24,
            },
        );
        assert_eq!(pixels[0], TRANSPARENT);
        // x + y = 1 is odd -> black square of the checkerboard
        assert_eq!(pixels[1], [0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_32bpp_alpha_ignores_and_mask() {
        // 2x1 BGRA: opaque black with AND set stays black; zero-alpha black becomes transparent
        let xor = [0, 0, 0, 0xFF, 0, 0, 0, 0];
        let and = [0b1100_0000, 0x00];
        let pixels = decode(
            2,
            1,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &and,
                xor_bpp: 32,
            },
        );
        assert_eq!(pixels[0], BLACK);
        assert_eq!(pixels[1], TRANSPARENT);
    }

    #[test]
    fn test_8bpp_uses_palette() {
        let xor = [1, 0];
        let pixels = decode(
            1,
            1,
            &PointerMasks {
                xor_mask: &xor,
                and_mask: &[],
                xor_bpp: 8,
            },
        );
        assert_eq!(pixels[0], [0x10, 0x20, 0x30, 0xFF]);
    }

    #[test]
    fn test_8bpp_without_palette_fails() {
        let mut dst = vec![0u8; 4];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgra32(),
            0,
            1,
            1,
            &PointerMasks {
                xor_mask: &[0, 0],
                and_mask: &[],
                xor_bpp: 8,
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("palette"));
    }

    #[test]
    fn test_short_xor_mask_fails() {
        let mut dst = vec![0u8; 32 * 32 * 4];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgra32(),
            0,
            32,
            32,
            &PointerMasks {
                xor_mask: &[0u8; 100],
                and_mask: &[],
                xor_bpp: 24,
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PixelBufferError::Conversion(_)));
    }

    #[test]
    fn test_invalid_bpp_fails() {
        let mut dst = vec![0u8; 4];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgra32(),
            0,
            1,
            1,
            &PointerMasks {
                xor_mask: &[0; 4],
                and_mask: &[0; 2],
                xor_bpp: 7,
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Conversion failed: invalid xorBpp 7");
    }

    #[test]
    fn test_small_destination_fails() {
        let mut dst = vec![0u8; 8];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgra32(),
            0,
            2,
            2,
            &PointerMasks {
                xor_mask: &[0; 16],
                and_mask: &[],
                xor_bpp: 32,
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_non_32bpp_destination_fails() {
        let mut dst = vec![0u8; 8];
        let err = copy_from_pointer_data(
            &mut dst,
            &PixelFormat::bgr24(),
            0,
            1,
            1,
            &PointerMasks {
                xor_mask: &[0; 4],
                and_mask: &[],
                xor_bpp: 24,
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("32bpp"));
    }

    proptest! {
        #[test]
        fn prop_scanline_step_is_even_and_covers_row(
            width in 1u32..512,
            bpp in prop::sample::select(vec![1u32, 8, 15, 16, 24, 32]),
        ) {
            let step = scanline_step(width, bpp);
            prop_assert_eq!(step % 2, 0);
            prop_assert!(step * 8 >= width as usize * bpp as usize);
        }
    }
}
