//! # Printer Configuration
//!
//! This module defines hardware specifications for supported thermal printers.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Resolution | Rows per raster block |
//! |-------|--------------|------------|-----------------------|
//! | SPP-R200III | 384 | 203 DPI | 256 |
//!
//! ## Usage
//!
//! ```
//! use sppcore::printer::PrinterConfig;
//!
//! let config = PrinterConfig::SPP_R200III;
//! println!("{}: {} dots ({:.0} mm)",
//!          config.name,
//!          config.width_dots,
//!          config.width_mm());
//! ```

/// # Printer Configuration
///
/// Defines the hardware characteristics of a thermal printer.
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// width_mm = width_dots / dots_per_mm
///
/// For SPP-R200III:
///   dots_per_mm = 203 / 25.4 ≈ 8
///   width_mm = 384 / 8 = 48mm
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Maximum rows per raster command (for Bluetooth buffer limits)
    pub max_chunk_rows: u16,
}

impl PrinterConfig {
    /// # Bixolon SPP-R200III Configuration
    ///
    /// 58mm mobile receipt printer with Bluetooth SPP.
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Paper width | 58mm |
    /// | Print width | 48mm (384 dots) |
    /// | Resolution | 203 DPI |
    /// | Interface | Bluetooth SPP / USB |
    /// | Cutter | None (tear bar) |
    pub const SPP_R200III: Self = Self {
        name: "Bixolon SPP-R200III",
        width_dots: 384,
        dpi: 203,
        max_chunk_rows: 256,
    };

    /// Calculate dots per millimeter
    ///
    /// ```
    /// use sppcore::printer::PrinterConfig;
    ///
    /// let config = PrinterConfig::SPP_R200III;
    /// assert!((config.dots_per_mm() - 8.0).abs() < 0.1);
    /// ```
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Calculate print width in millimeters
    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::SPP_R200III
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spp_r200iii_dimensions() {
        let config = PrinterConfig::SPP_R200III;
        assert_eq!(config.width_dots, 384);
        assert_eq!(config.dpi, 203);
        assert_eq!(config.width_dots % 8, 0);
    }

    #[test]
    fn test_width_mm() {
        let width = PrinterConfig::SPP_R200III.width_mm();
        // 384 dots / 8 dpmm = 48mm
        assert!((width - 48.0).abs() < 1.0);
    }

    #[test]
    fn test_default_is_spp_r200iii() {
        assert_eq!(PrinterConfig::default().name, PrinterConfig::SPP_R200III.name);
    }
}
