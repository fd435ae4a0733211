//! # Printer Transport Layer
//!
//! This module provides communication backends for sending data to printers.
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: Bluetooth SPP over a bound RFCOMM TTY (Linux)
//! - [`memory`]: In-process transport that records traffic (dry runs, tests)
//!
//! ## Connection Lifecycle
//!
//! ```text
//! Transport::connect ──► Connection (open) ──send──► ... ──close──► (closed)
//! ```
//!
//! A connection is either open or closed. `close` is idempotent and never
//! fails visibly: an error while releasing a link that is already broken
//! is logged and dropped, because by then the job outcome is decided.

pub mod bluetooth;
pub mod memory;
pub mod permission;

use std::time::Duration;

use crate::device::DeviceHandle;
use crate::error::PrintError;

pub use bluetooth::RfcommTransport;
pub use memory::MemoryTransport;
pub use permission::{AlwaysGranted, PermissionGate, RfcommAccessGate};

/// Default ceiling on the initial connect/claim.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens connections to a printer.
pub trait Transport: Send + Sync {
    /// Open a connection, waiting at most `timeout`.
    ///
    /// ## Errors
    ///
    /// - [`PrintError::Connection`] if the device is unreachable, not
    ///   paired/bound, already in use, or the wait times out
    /// - [`PrintError::PermissionDenied`] if the OS refuses access
    fn connect(
        &self,
        device: &DeviceHandle,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, PrintError>;
}

/// An open byte channel to one device.
pub trait Connection: Send {
    /// Write all of `data` and flush.
    ///
    /// Fails with [`PrintError::Write`] on I/O failure or if the
    /// connection is already closed.
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError>;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn connect(
        &self,
        device: &DeviceHandle,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, PrintError> {
        (**self).connect(device, timeout)
    }
}
