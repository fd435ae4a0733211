//! # sppcore - Bluetooth Receipt Printer Core
//!
//! sppcore prints receipts on ESC/POS thermal printers reached over
//! Bluetooth SPP (RFCOMM). It provides:
//!
//! - **Transport**: connect, send, and close over a bound RFCOMM node
//! - **Protocol**: ESC/POS command builders and a small print-job IR
//! - **Rasterizer**: colour image to 1-bit bitmap by channel-mean threshold
//! - **Orchestrator**: runs a job with guaranteed cleanup
//!
//! ## Quick Start
//!
//! ```no_run
//! use sppcore::{
//!     printer::Printer,
//!     render::source::FileImage,
//!     transport::{RfcommAccessGate, RfcommTransport},
//!     DeviceHandle,
//! };
//!
//! let device: DeviceHandle = "74:F0:7D:E5:91:F7".parse()?;
//! let printer = Printer::new(device, RfcommTransport::new())
//!     .with_gate(RfcommAccessGate::new())
//!     .with_image(FileImage::new("logo.png"));
//!
//! let summary = printer.print_now()?;
//! println!("sent {} bytes", summary.bytes_sent);
//! # Ok::<(), sppcore::PrintError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Bluetooth and in-memory transports, permission gate |
//! | [`protocol`] | ESC/POS command builders |
//! | [`ir`] | Print job operations and byte encoding |
//! | [`render`] | Image loading and rasterization |
//! | [`printer`] | Hardware config and job orchestration |
//! | [`receipt`] | Receipt text block |
//! | [`config`] | Application configuration |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Bixolon SPP-R200III (58mm paper, 203 DPI, Bluetooth)

pub mod config;
pub mod device;
pub mod error;
pub mod ir;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use device::DeviceHandle;
pub use error::PrintError;
pub use printer::{Printer, PrinterConfig};
