//! # Rendering Module
//!
//! Turns stored images into printable 1-bit rasters.
//!
//! ## Modules
//!
//! - [`source`]: Image loading (files, memory, already-decoded images)
//! - [`raster`]: Threshold binarization into a [`bitmap::MonochromeBitmap`]
//! - [`bitmap`]: The packed 1-bit bitmap type
//! - [`dither`]: Bayer 8x8 ordered dithering (opt-in alternative)
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use sppcore::render::{raster, source::{ImageSource, fit_to_width}};
//!
//! let image = DynamicImage::ImageRgb8(RgbImage::new(800, 200));
//! let image = fit_to_width(image.load()?, 384);
//!
//! let bitmap = raster::rasterize(&image);
//! assert_eq!(bitmap.width(), 384);
//! # Ok::<(), sppcore::PrintError>(())
//! ```

pub mod bitmap;
pub mod dither;
pub mod raster;
pub mod source;

pub use bitmap::{MonochromeBitmap, Pixel};
pub use raster::{Binarization, rasterize, rasterize_with};
