//! # Bayer 8x8 Ordered Dithering
//!
//! Optional alternative to the plain threshold in [`super::raster`]. It is
//! never selected by default: existing receipts were printed with the
//! threshold rule and must keep looking the same.
//!
//! For each pixel position (x, y):
//!
//! 1. Look up a threshold from the matrix using (x mod 8, y mod 8)
//! 2. Compare the pixel's darkness to the threshold
//! 3. If darkness > threshold, print black; otherwise leave white
//!
//! Matrix values range from 0-63 and are normalized with
//! `threshold = (value + 0.5) / 64.0`, so pure white never prints and
//! pure black always does.

/// Bayer 8x8 dithering matrix
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Dithering threshold for a pixel position, in (0, 1).
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER8[y & 7][x & 7];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Whether a dot should be printed at the given position.
///
/// `intensity`: 0.0 = white, 1.0 = black.
///
/// ```
/// use sppcore::render::dither::should_print;
///
/// assert!(should_print(0, 0, 1.0));
/// assert!(!should_print(0, 0, 0.0));
/// ```
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32) -> bool {
    intensity > threshold(x, y)
}

/// Darkness of an 8-bit luminance mean (0 = white, 1 = black).
#[inline]
pub fn darkness(mean: u8) -> f32 {
    1.0 - mean as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 64];
        for row in &BAYER8 {
            for &val in row {
                assert!(val < 64, "Matrix value {} out of range", val);
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "Not all values 0-63 present");
    }

    #[test]
    fn test_threshold_range() {
        for y in 0..8 {
            for x in 0..8 {
                let t = threshold(x, y);
                assert!(t > 0.0 && t < 1.0);
            }
        }
    }

    #[test]
    fn test_threshold_periodicity() {
        assert_eq!(threshold(3, 5), threshold(11, 13));
        assert_eq!(threshold(0, 0), threshold(8, 16));
    }

    #[test]
    fn test_mid_gray_prints_about_half() {
        let mut count = 0;
        for y in 0..8 {
            for x in 0..8 {
                if should_print(x, y, 0.5) {
                    count += 1;
                }
            }
        }
        assert_eq!(count, 32);
    }

    #[test]
    fn test_darkness_extremes() {
        assert_eq!(darkness(255), 0.0);
        assert_eq!(darkness(0), 1.0);
    }
}
