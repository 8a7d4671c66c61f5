//! Synthetic pointer updates.
//!
//! Builds XOR/AND mask pairs in the wire layout a server would send, so the
//! whole decode path is exercised: even-padded scanlines, bottom-up colour
//! rows, top-down monochrome rows.

use crate::args::Pattern;
use rdp_pixelbuffer::pointer_data::scanline_step;
use rdp_pixelbuffer::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pixel {
    Opaque([u8; 3]),
    Transparent,
    Inverted,
}

/// Mask pair for one pointer update.
#[derive(Debug, Clone)]
pub struct Masks {
    pub xor: Vec<u8>,
    pub and: Vec<u8>,
    pub bpp: u32,
}

/// Greyscale palette used for 8bpp pointers.
pub fn grey_palette() -> Palette {
    Palette::new((0..=255u8).map(|v| [v, v, v]).collect())
}

fn design(pattern: Pattern, width: u32, height: u32, x: u32, y: u32) -> Pixel {
    match pattern {
        Pattern::Arrow => {
            // right triangle along the left edge, one pixel outline
            let limit = y * width / height.max(1);
            if x > limit || y >= height {
                Pixel::Transparent
            } else if x == 0 || x == limit || y + 1 == height {
                Pixel::Opaque([0, 0, 0])
            } else {
                Pixel::Opaque([0xFF, 0xFF, 0xFF])
            }
        }
        Pattern::Inverted => {
            let inside = |v: u32, len: u32| v >= len / 4 && v < len - len / 4;
            if inside(x, width) && inside(y, height) {
                Pixel::Inverted
            } else {
                Pixel::Transparent
            }
        }
        Pattern::Gradient => {
            let r = (x * 255 / width.saturating_sub(1).max(1)) as u8;
            let g = (y * 255 / height.saturating_sub(1).max(1)) as u8;
            Pixel::Opaque([r, g, 0x80])
        }
    }
}

fn luma([r, g, b]: [u8; 3]) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

fn set_bit(row: &mut [u8], x: u32) {
    row[(x / 8) as usize] |= 0x80 >> (x % 8);
}

fn encode(pixel: Pixel, bpp: u32, out: &mut [u8]) {
    let ([r, g, b], alpha) = match pixel {
        Pixel::Opaque(rgb) => (rgb, 0xFF),
        Pixel::Transparent => ([0, 0, 0], 0x00),
        // a 32bpp pixel with alpha ignores the AND mask, so inversion
        // degrades to white there
        Pixel::Inverted => ([0xFF, 0xFF, 0xFF], if bpp == 32 { 0xFF } else { 0x00 }),
    };

    match bpp {
        8 => out[0] = luma([r, g, b]),
        15 => {
            let v = ((r as u16 >> 3) << 10) | ((g as u16 >> 3) << 5) | (b as u16 >> 3);
            out.copy_from_slice(&v.to_le_bytes());
        }
        16 => {
            let v = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
            out.copy_from_slice(&v.to_le_bytes());
        }
        24 => out.copy_from_slice(&[b, g, r]),
        _ => out.copy_from_slice(&[b, g, r, alpha]),
    }
}

/// Generate the masks of `pattern` at `bpp` bits per pixel.
pub fn generate(pattern: Pattern, width: u32, height: u32, bpp: u32) -> Masks {
    let and_step = scanline_step(width, 1);
    let xor_step = scanline_step(width, bpp);
    let mut and = vec![0u8; and_step * height as usize];
    let mut xor = vec![0u8; xor_step * height as usize];
    let bytes_per_pixel = (bpp as usize).div_ceil(8);

    for y in 0..height {
        // monochrome rows are top-down, colour rows bottom-up
        let row = (if bpp == 1 { y } else { height - 1 - y }) as usize;
        let and_row = &mut and[row * and_step..(row + 1) * and_step];
        let pixel_row = (0..width).map(|x| (x, design(pattern, width, height, x, y)));

        if bpp == 1 {
            let xor_row = &mut xor[row * xor_step..(row + 1) * xor_step];
            for (x, pixel) in pixel_row {
                let (and_bit, xor_bit) = match pixel {
                    Pixel::Opaque(rgb) => (false, luma(rgb) >= 0x80),
                    Pixel::Transparent => (true, false),
                    Pixel::Inverted => (true, true),
                };
                if and_bit {
                    set_bit(and_row, x);
                }
                if xor_bit {
                    set_bit(xor_row, x);
                }
            }
        } else {
            let xor_row = &mut xor[row * xor_step..(row + 1) * xor_step];
            for (x, pixel) in pixel_row {
                if matches!(pixel, Pixel::Transparent | Pixel::Inverted) {
                    set_bit(and_row, x);
                }
                let start = x as usize * bytes_per_pixel;
                encode(pixel, bpp, &mut xor_row[start..start + bytes_per_pixel]);
            }
        }
    }

    Masks { xor, and, bpp }
}
