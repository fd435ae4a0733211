//! # ESC/POS Control Commands
//!
//! This module implements the basic ESC/POS commands understood by Bixolon
//! mobile receipt printers (SPP-R200III and siblings) and most other
//! ESC/POS-compatible thermal printers.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC a n`, `GS V m`, `GS v 0 m xL xH yL yH d...`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics (`GS v 0`) and paper cutting (`GS V`).
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets the printer to its power-on mode.
/// Every job starts with this command.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// Sending it mid-job discards whatever the printer has buffered but not
/// yet printed, which is how an interrupted job is aborted.
///
/// ## Example
///
/// ```
/// use sppcore::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Feed Lines (LF × n)
///
/// Prints the line buffer and advances `n` lines by emitting `n` plain
/// line feeds. Plain LFs are used instead of `ESC d n` so the command
/// behaves identically on every firmware revision.
///
/// ```
/// use sppcore::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x0A, 0x0A, 0x0A]);
/// assert!(commands::feed_lines(0).is_empty());
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![LF; n as usize]
}

// ============================================================================
// CUTTER CONTROL
// ============================================================================

/// # Cut Paper (GS V m)
///
/// | Variant | Bytes    |
/// |---------|----------|
/// | Full    | 1D 56 00 |
/// | Partial | 1D 56 01 |
///
/// Mobile printers without an auto-cutter ignore this command.
#[inline]
pub fn cut(partial: bool) -> Vec<u8> {
    vec![GS, b'V', if partial { 1 } else { 0 }]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use sppcore::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(384), [0x80, 0x01]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
