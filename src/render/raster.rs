//! # Image Rasterizer
//!
//! Converts a color (or grayscale) image into the [`MonochromeBitmap`] the
//! printer's raster command expects.
//!
//! ## Threshold Rule
//!
//! ```text
//! mean  = (r + g + b) / 3        integer division, truncates
//! pixel = White  if mean > 128
//!         Black  otherwise        (128 itself is black)
//! ```
//!
//! This is an unweighted average, not a perceptual (Rec. 601) luminance,
//! and it is not dithered. Output from earlier prints depends on exactly
//! this rule, including the truncation and the strict `>` boundary.
//! Alpha is ignored: every pixel is treated as fully opaque.
//!
//! Rows are binarized in parallel; each row only reads its own source
//! pixels, so the result is byte-identical to a sequential pass.

use image::DynamicImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bitmap::MonochromeBitmap;
use super::dither;

/// Means strictly above this value are white.
pub const WHITE_THRESHOLD: u8 = 128;

/// How grayscale means are reduced to black and white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binarization {
    /// Fixed `mean > 128` threshold.
    #[default]
    Threshold,
    /// Bayer 8x8 ordered dithering of the same mean.
    Bayer,
}

/// Unweighted channel mean with integer truncation.
///
/// ```
/// use sppcore::render::raster::channel_mean;
///
/// assert_eq!(channel_mean(255, 255, 255), 255);
/// assert_eq!(channel_mean(1, 1, 2), 1); // 4 / 3 truncates
/// ```
#[inline]
pub fn channel_mean(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Threshold classification of a mean.
#[inline]
pub fn is_white(mean: u8) -> bool {
    mean > WHITE_THRESHOLD
}

/// Rasterize with the default threshold rule.
///
/// ```
/// use image::{DynamicImage, Rgb, RgbImage};
/// use sppcore::render::{bitmap::Pixel, raster::rasterize};
///
/// let mut img = RgbImage::new(2, 1);
/// img.put_pixel(0, 0, Rgb([128, 128, 128]));
/// img.put_pixel(1, 0, Rgb([129, 129, 129]));
///
/// let bmp = rasterize(&DynamicImage::ImageRgb8(img));
/// assert_eq!(bmp.pixel(0, 0), Pixel::Black);
/// assert_eq!(bmp.pixel(1, 0), Pixel::White);
/// ```
pub fn rasterize(image: &DynamicImage) -> MonochromeBitmap {
    rasterize_with(image, Binarization::Threshold)
}

/// Rasterize with an explicit binarization method.
pub fn rasterize_with(image: &DynamicImage, method: Binarization) -> MonochromeBitmap {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let width_bytes = (width as usize).div_ceil(8);

    let mut data = vec![0u8; width_bytes * height as usize];

    if width_bytes > 0 {
        data.par_chunks_mut(width_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let [r, g, b, _a] = rgba.get_pixel(x, y as u32).0;
                    let mean = channel_mean(r, g, b);
                    let black = match method {
                        Binarization::Threshold => !is_white(mean),
                        Binarization::Bayer => {
                            dither::should_print(x as usize, y, dither::darkness(mean))
                        }
                    };
                    if black {
                        row[x as usize / 8] |= 1 << (7 - (x % 8));
                    }
                }
            });
    }

    MonochromeBitmap::from_packed_unchecked(width, height, data)
}
