//! # Monochrome Bitmap
//!
//! The 1-bit image the printer's raster command consumes. Pixels are kept
//! packed exactly as they go on the wire, so encoding a bitmap is a copy
//! rather than a conversion.
//!
//! ## Layout
//!
//! ```text
//! Row 0:    d[0]        d[1]          ... d[wb-1]
//! Row 1:    d[wb]       d[wb+1]       ... d[2*wb-1]
//! ...
//! wb = ceil(width / 8), bit 7 of each byte = leftmost pixel, 1 = black
//! ```
//!
//! Padding bits at the end of a row (when width is not a multiple of 8)
//! are always 0 (white).

use image::{GrayImage, Luma};

/// Color of a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    Black,
    White,
}

/// A width × height grid of black/white pixels, packed 1 bit per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MonochromeBitmap {
    /// Wrap already packed rows.
    ///
    /// Returns `None` if `data` is not exactly `ceil(width/8) * height` bytes.
    pub fn from_packed(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize).div_ceil(8) * height as usize;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap packed rows whose length the caller derived from the dimensions.
    pub(crate) fn from_packed_unchecked(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize).div_ceil(8) * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a bitmap from a row-major slice of pixels.
    ///
    /// ```
    /// use sppcore::render::bitmap::{MonochromeBitmap, Pixel};
    ///
    /// let bmp = MonochromeBitmap::from_pixels(
    ///     2,
    ///     1,
    ///     &[Pixel::Black, Pixel::White],
    /// ).unwrap();
    /// assert_eq!(bmp.row(0), &[0x80]);
    /// ```
    pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        let mut data = Vec::with_capacity((width as usize).div_ceil(8) * height as usize);
        if width > 0 {
            for row in pixels.chunks(width as usize) {
                let bits: Vec<bool> = row.iter().map(|p| *p == Pixel::Black).collect();
                data.extend(pack_row(&bits));
            }
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per packed row.
    pub fn width_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// All packed rows, top row first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Packed bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let wb = self.width_bytes();
        let start = y as usize * wb;
        &self.data[start..start + wb]
    }

    /// Color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        if self.is_black(x, y) {
            Pixel::Black
        } else {
            Pixel::White
        }
    }

    #[inline]
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        let byte = self.row(y)[x as usize / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }

    /// Every pixel, row-major.
    pub fn pixels(&self) -> Vec<Pixel> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.pixel(x, y));
            }
        }
        out
    }

    /// Packed rows re-framed to `width_dots`.
    ///
    /// Wider rows are cropped on the right, narrower rows are padded with
    /// white. Bits beyond `width_dots` inside the last byte are cleared so
    /// cropping never leaks stray dots.
    pub fn rows_fitted(&self, width_dots: u16) -> Vec<u8> {
        let target_wb = (width_dots as usize).div_ceil(8);
        let src_wb = self.width_bytes();
        let copy = target_wb.min(src_wb);

        let tail_mask = match width_dots % 8 {
            0 => 0xFF,
            rem => 0xFFu8 << (8 - rem),
        };

        let mut out = Vec::with_capacity(target_wb * self.height as usize);
        for y in 0..self.height {
            let start = out.len();
            out.extend_from_slice(&self.row(y)[..copy]);
            out.resize(start + target_wb, 0x00);
            if target_wb > 0 && (width_dots as u32) < self.width {
                out[start + target_wb - 1] &= tail_mask;
            }
        }
        out
    }

    /// Render as an 8-bit grayscale image (black = 0, white = 255) for previews.
    pub fn to_gray_image(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = if self.is_black(x, y) { 0u8 } else { 255u8 };
                img.put_pixel(x, y, Luma([color]));
            }
        }
        img
    }
}

/// Pack a row of boolean pixel values into bytes.
///
/// - Bit 7 (MSB) = leftmost pixel
/// - 1 = black (print dot), 0 = white
///
/// If the row length is not a multiple of 8, the last byte is padded with
/// zeros (white) on the right.
///
/// ```
/// use sppcore::render::bitmap::pack_row;
///
/// assert_eq!(pack_row(&[true, true, false, false, true, false, true, false]), vec![0xCA]);
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}
