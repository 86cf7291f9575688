//! Luminance thresholding and 1-bit packing.
//!
//! A pixel is printed when the mean of its red, green and blue channels is
//! below [`LUMINANCE_THRESHOLD`]. Alpha is ignored. There is no dithering, so
//! photographs come out posterized; logos, text snapshots and barcodes are
//! the intended input.

use log::debug;

use crate::{
    bitmap::Bitmap,
    error::{Error, Result},
    Matrix,
};

pub const LUMINANCE_THRESHOLD: u16 = 128;

/// One bit per pixel, 1 = mark, row-major, each row padded to whole bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeBitstream {
    width: u32,
    height: u32,
    rows: Matrix,
}

impl MonochromeBitstream {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        bytes_per_row(self.width)
    }

    pub fn total_bytes(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    pub fn rows(&self) -> &Matrix {
        &self.rows
    }

    /// Whether the pixel at `(x, y)` is a mark.
    pub fn is_mark(&self, x: u32, y: u32) -> bool {
        let byte = self.rows[y as usize][(x / 8) as usize];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Uppercase hex, two digits per byte, in row-major order.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.total_bytes() * 2);
        for row in &self.rows {
            out.push_str(&hex::encode_upper(row));
        }
        out
    }
}

pub fn bytes_per_row(width: u32) -> usize {
    (width as usize + 7) / 8
}

/// Whether an RGB triple counts as a printed mark.
pub fn is_mark(r: u8, g: u8, b: u8) -> bool {
    // mean(r, g, b) < 128 without losing the fraction
    u16::from(r) + u16::from(g) + u16::from(b) < 3 * LUMINANCE_THRESHOLD
}

/// Threshold and pack a bitmap, most significant bit first.
pub fn pack(bitmap: &Bitmap) -> Result<MonochromeBitstream> {
    let width = bitmap.width();
    let height = bitmap.height();
    if width == 0 || height == 0 {
        return Err(Error::EmptyBitmap { width, height });
    }

    let bpp = bitmap.layout().bytes_per_pixel();
    let row_len = bytes_per_row(width);
    let mut rows: Matrix = Vec::with_capacity(height as usize);

    for y in 0..height {
        let pixels = bitmap.row(y);
        let mut buf = vec![0u8; row_len];
        for (x, px) in pixels.chunks_exact(bpp).enumerate() {
            if is_mark(px[0], px[1], px[2]) {
                buf[x / 8] |= 0x80 >> (x % 8);
            }
        }
        rows.push(buf);
    }

    debug!(
        "packed {}x{} bitmap into {} bytes ({} per row)",
        width,
        height,
        row_len * height as usize,
        row_len
    );

    Ok(MonochromeBitstream {
        width,
        height,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Bitmap {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = f(x, y);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Bitmap::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn white_bitmap_packs_to_zero() {
        let white = Bitmap::filled(13, 4, [255, 255, 255, 255]);
        let bits = pack(&white).unwrap();
        assert_eq!(bits.bytes_per_row(), 2);
        assert_eq!(bits.total_bytes(), 8);
        assert!(bits.rows().iter().flatten().all(|b| *b == 0));
        assert_eq!(bits.to_hex(), "0000000000000000");
    }

    #[test]
    fn threshold_boundary_is_strict() {
        assert!(is_mark(127, 127, 127));
        assert!(!is_mark(128, 128, 128));
        // mean 127.67 is still below the threshold
        assert!(is_mark(128, 128, 127));

        let bitmap = bitmap_from_fn(2, 1, |x, _| if x == 0 { 127 } else { 128 });
        let bits = pack(&bitmap).unwrap();
        assert!(bits.is_mark(0, 0));
        assert!(!bits.is_mark(1, 0));
        assert_eq!(bits.to_hex(), "80");
    }

    #[test]
    fn alpha_is_ignored() {
        let transparent_black = Bitmap::filled(8, 1, [0, 0, 0, 0]);
        assert_eq!(pack(&transparent_black).unwrap().to_hex(), "FF");
    }

    #[test]
    fn rows_are_padded_with_zero_bits() {
        let black = Bitmap::filled(10, 3, [0, 0, 0, 255]);
        let bits = pack(&black).unwrap();
        assert_eq!(bits.bytes_per_row(), 2);
        for row in bits.rows() {
            assert_eq!(row, &vec![0xFF, 0xC0]);
            assert_eq!(row[1] & 0b0011_1111, 0);
        }
        assert_eq!(bits.to_hex(), "FFC0FFC0FFC0");
    }

    #[test]
    fn packs_msb_first() {
        let bitmap = bitmap_from_fn(8, 2, |x, y| if x == y || x == 7 { 0 } else { 255 });
        let bits = pack(&bitmap).unwrap();
        assert_eq!(bits.rows(), &vec![vec![0b1000_0001], vec![0b0100_0001]]);
        assert_eq!(bits.to_hex(), "8141");
    }

    #[test]
    fn rgb_layout_packs_like_rgba() {
        let rgb = Bitmap::from_rgb(3, 1, vec![0, 0, 0, 255, 255, 255, 10, 10, 10]).unwrap();
        assert_eq!(pack(&rgb).unwrap().to_hex(), "A0");
    }

    #[test]
    fn empty_bitmap_is_rejected() {
        for (w, h) in [(0, 0), (0, 4), (4, 0)] {
            let empty = Bitmap::filled(w, h, [0, 0, 0, 255]);
            assert!(matches!(pack(&empty), Err(Error::EmptyBitmap { .. })));
        }
    }
}
