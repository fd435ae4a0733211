//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS command set spoken by
//! Bixolon mobile receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed, cut)
//! - [`text`]: Text lines and alignment
//! - [`graphics`]: Raster bit image command
//!
//! ## Usage Example
//!
//! ```
//! use sppcore::protocol::{commands, graphics, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//!
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(graphics::raster(16, 2, &[0xFF, 0x00, 0x00, 0xFF]));
//! data.extend(text::align(text::Alignment::Left));
//!
//! data.extend(text::line("Thank you!"));
//! data.extend(commands::feed_lines(3));
//! ```
//!
//! Every builder is a pure function: same arguments, same bytes.

pub mod commands;
pub mod graphics;
pub mod text;
