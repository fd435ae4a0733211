//! # Text and Alignment Commands
//!
//! Text is sent as raw bytes. No escaping happens: a control byte inside
//! the string reaches the firmware verbatim, exactly like the rest of the
//! command stream.
//!
//! ## Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT
//! Center aligned            |  CENTER
//! Right aligned             |    RIGHT
//! ```
//!
//! Alignment applies to text lines and to raster images alike.

use serde::{Deserialize, Serialize};

use super::commands::{ESC, LF};

/// Horizontal alignment selector for `ESC a n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// `n` is 0 (left), 1 (center) or 2 (right).
///
/// ```
/// use sppcore::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// Encode one line of text: the string's UTF-8 bytes followed by LF.
///
/// ```
/// use sppcore::protocol::text::line;
///
/// assert_eq!(line("Hello"), b"Hello\n".to_vec());
/// ```
pub fn line(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 1);
    out.extend_from_slice(s.as_bytes());
    out.push(LF);
    out
}
