//! # Print Job Orchestrator
//!
//! [`Printer::print_now`] runs one complete job: connect, rasterize the
//! image, encode the receipt, send it, close. Every path ends with the
//! connection closed exactly once, and a job is either sent whole or
//! aborted with `ESC @`.
//!
//! ## Job States
//!
//! ```text
//! Idle ──► Connecting ──► TransactionOpen ──► Sending ──► Closed
//!   │           │                                │
//!   └───────────┴──────────► Failed ◄────────────┘
//!                              │
//!                              └──► Closed
//! ```
//!
//! The states a job went through are kept for inspection
//! ([`Printer::last_trace`]) and logged at debug level.
//!
//! ## Example
//!
//! ```
//! use sppcore::printer::Printer;
//! use sppcore::transport::MemoryTransport;
//! use sppcore::DeviceHandle;
//!
//! let transport = MemoryTransport::new();
//! let printer = Printer::new(DeviceHandle::default(), transport.clone());
//!
//! let summary = printer.print_now()?;
//! assert_eq!(summary.bytes_sent, transport.sent().len());
//! assert_eq!(transport.open_connections(), 0);
//! # Ok::<(), sppcore::PrintError>(())
//! ```

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::config::PrinterConfig;
use crate::config::AppConfig;
use crate::device::DeviceHandle;
use crate::error::PrintError;
use crate::ir::{Op, PrintJob};
use crate::protocol::{commands, text::Alignment};
use crate::receipt::Receipt;
use crate::render::source::{fit_to_width, FileImage, ImageSource};
use crate::render::{rasterize_with, Binarization, MonochromeBitmap};
use crate::transport::{
    AlwaysGranted, Connection, PermissionGate, Transport, DEFAULT_CONNECT_TIMEOUT,
};

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Connecting,
    TransactionOpen,
    Sending,
    Failed,
    Closed,
}

/// What a successful job delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub bytes_sent: usize,
    /// Printed image size in dots; zero for a text-only receipt.
    pub image_width: u32,
    pub image_height: u32,
}

/// One printer and the receipt it prints.
///
/// Only one job per device runs at a time in this process: while a job
/// is running, any other [`print_now`](Self::print_now) for the same
/// device, on this `Printer` or another one, fails immediately with
/// [`PrintError::Busy`].
pub struct Printer {
    device: DeviceHandle,
    transport: Box<dyn Transport>,
    gate: Box<dyn PermissionGate>,
    image: Option<Box<dyn ImageSource>>,
    receipt: Receipt,
    alignment: Alignment,
    binarization: Binarization,
    hardware: PrinterConfig,
    timeout: Duration,
    trace: Mutex<Vec<JobState>>,
}

impl Printer {
    /// A printer with the stock receipt, no image, and no permission check.
    pub fn new<T: Transport + 'static>(device: DeviceHandle, transport: T) -> Self {
        Self {
            device,
            transport: Box::new(transport),
            gate: Box::new(AlwaysGranted),
            image: None,
            receipt: Receipt::default(),
            alignment: Alignment::Center,
            binarization: Binarization::default(),
            hardware: PrinterConfig::default(),
            timeout: DEFAULT_CONNECT_TIMEOUT,
            trace: Mutex::new(Vec::new()),
        }
    }

    /// A printer set up from application config.
    pub fn from_config<T: Transport + 'static>(config: &AppConfig, transport: T) -> Self {
        let printer = Self::new(config.device.clone(), transport)
            .with_receipt(Receipt::from_config(config))
            .with_alignment(config.alignment)
            .with_binarization(config.binarization)
            .with_timeout(config.connect_timeout());
        match &config.image {
            Some(path) => printer.with_image(FileImage::new(path)),
            None => printer,
        }
    }

    pub fn with_gate<G: PermissionGate + 'static>(mut self, gate: G) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_image<S: ImageSource + 'static>(mut self, image: S) -> Self {
        self.image = Some(Box::new(image));
        self
    }

    pub fn with_receipt(mut self, receipt: Receipt) -> Self {
        self.receipt = receipt;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_binarization(mut self, binarization: Binarization) -> Self {
        self.binarization = binarization;
        self
    }

    pub fn with_hardware(mut self, hardware: PrinterConfig) -> Self {
        self.hardware = hardware;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    /// States the most recent job passed through. Empty before the first job.
    pub fn last_trace(&self) -> Vec<JobState> {
        lock(&self.trace).clone()
    }

    /// Run one print job to completion.
    ///
    /// ## Errors
    ///
    /// - [`PrintError::Busy`] if another job is printing to the same device
    /// - [`PrintError::PermissionDenied`] if the gate refuses; nothing is attempted
    /// - [`PrintError::Connection`] if the printer cannot be reached
    /// - [`PrintError::Asset`] if the image cannot be loaded; no bytes are sent
    /// - [`PrintError::Write`] if transmission fails; the job is aborted
    pub fn print_now(&self) -> Result<JobSummary, PrintError> {
        let Some(_claim) = DeviceClaim::acquire(&self.device) else {
            info!(device = %self.device, "printer busy, rejecting job");
            return Err(PrintError::Busy);
        };

        let mut trace = Trace::default();
        let result = self.run(&mut trace);
        if let Err(e) = &result {
            warn!(device = %self.device, error = %e, "print job failed");
            trace.enter(JobState::Failed);
        }
        trace.enter(JobState::Closed);
        *lock(&self.trace) = trace.0;

        if let Ok(summary) = &result {
            info!(
                device = %self.device,
                bytes = summary.bytes_sent,
                "print job complete"
            );
        }
        result
    }

    fn run(&self, trace: &mut Trace) -> Result<JobSummary, PrintError> {
        self.gate.check(&self.device)?;

        trace.enter(JobState::Connecting);
        let conn = self.transport.connect(&self.device, self.timeout)?;
        info!(device = %self.device, printer = self.hardware.name, "connected");
        let mut link = Link::new(conn);

        let bitmap = match &self.image {
            Some(source) => Some(self.rasterize(source.as_ref())?),
            None => None,
        };
        let (image_width, image_height) = bitmap
            .as_ref()
            .map_or((0, 0), |b| (b.width(), b.height()));

        trace.enter(JobState::TransactionOpen);
        let job = self.build_job(bitmap);
        let bytes = job.to_bytes_with_config(&self.hardware);

        trace.enter(JobState::Sending);
        debug!(ops = job.len(), bytes = bytes.len(), "sending job");
        if let Err(e) = link.send(&bytes) {
            link.abort();
            return Err(e);
        }

        Ok(JobSummary {
            bytes_sent: bytes.len(),
            image_width,
            image_height,
        })
    }

    fn rasterize(&self, source: &dyn ImageSource) -> Result<MonochromeBitmap, PrintError> {
        let image = source.load()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PrintError::Asset(format!(
                "{} has no pixels",
                source.describe()
            )));
        }
        let image = fit_to_width(image, u32::from(self.hardware.width_dots));
        let bitmap = rasterize_with(&image, self.binarization);
        debug!(
            source = %source.describe(),
            width = bitmap.width(),
            height = bitmap.height(),
            "image rasterized"
        );
        Ok(bitmap)
    }

    fn build_job(&self, bitmap: Option<MonochromeBitmap>) -> PrintJob {
        let mut job = PrintJob::new();
        if let Some(bitmap) = bitmap {
            let width = bitmap.width().min(u32::from(self.hardware.width_dots)) as u16;
            job.push(Op::Raster {
                bitmap,
                alignment: self.alignment,
                width,
            });
            job.push(Op::Feed { lines: 1 });
        }
        self.receipt.append_to(&mut job);
        job.end();
        job
    }
}

/// Devices with a job in flight, across every `Printer` in the process.
static ACTIVE_DEVICES: LazyLock<Mutex<HashSet<DeviceHandle>>> = LazyLock::new(Default::default);

/// Exclusive use of one device for the duration of a job.
struct DeviceClaim(DeviceHandle);

impl DeviceClaim {
    fn acquire(device: &DeviceHandle) -> Option<Self> {
        lock(&*ACTIVE_DEVICES)
            .insert(device.clone())
            .then(|| Self(device.clone()))
    }
}

impl Drop for DeviceClaim {
    fn drop(&mut self) {
        lock(&*ACTIVE_DEVICES).remove(&self.0);
    }
}

/// Owns the connection for one job and closes it exactly once.
struct Link {
    conn: Box<dyn Connection>,
    closed: bool,
}

impl Link {
    fn new(conn: Box<dyn Connection>) -> Self {
        Self {
            conn,
            closed: false,
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        self.conn.send(data)
    }

    /// Tell the printer to drop whatever part of the job it buffered.
    fn abort(&mut self) {
        match self.conn.send(&commands::init()) {
            Ok(()) => debug!("job aborted with ESC @"),
            Err(e) => warn!(error = %e, "could not abort job"),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            self.conn.close();
            info!("connection closed");
        }
    }
}

#[derive(Default)]
struct Trace(Vec<JobState>);

impl Trace {
    fn enter(&mut self, state: JobState) {
        if self.0.is_empty() && state != JobState::Idle {
            self.0.push(JobState::Idle);
        }
        debug!(from = ?self.0.last(), to = ?state, "job state");
        self.0.push(state);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
