//! # ESC/POS Raster Graphics
//!
//! This module implements the raster bit image command used to print
//! monochrome bitmaps.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (horizontal, 384 dots max on 58mm paper)
//!   │
//!   │   ████████  ← Each dot is ~0.125mm (203 DPI)
//!   │   ████████
//!   ▼
//!   Y (vertical, paper feed direction)
//! ```
//!
//! ## Bit Packing
//!
//! Each byte carries 8 horizontal dots:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{GS, u16_le};

/// Header length of a `GS v 0` command.
pub const RASTER_HEADER_LEN: usize = 8;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Scale mode (0 = normal density, no doubling)
/// - `xL, xH`: Width in **bytes**, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: k = width_bytes × height bytes, row-major, top row first
///
/// ## Example
///
/// ```
/// use sppcore::protocol::graphics;
///
/// // 384-dot wide (48 bytes), 10-row tall block
/// let data = vec![0xAA; 48 * 10];
/// let cmd = graphics::raster(384, 10, &data);
///
/// assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
/// assert_eq!(&cmd[4..8], &[48, 0, 10, 0]);
/// assert_eq!(cmd.len(), 8 + 48 * 10);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    let expected_len = width_bytes as usize * height as usize;

    debug_assert!(
        data.len() == expected_len,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        expected_len,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(RASTER_HEADER_LEN + data.len());
    cmd.push(GS);
    cmd.push(b'v');
    cmd.push(b'0');
    cmd.push(0); // m = 0 (normal)
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// TESTS
// ============================================================================
