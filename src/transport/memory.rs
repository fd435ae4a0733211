//! # In-Memory Transport
//!
//! A transport that never touches hardware. Every connect, send and close
//! is recorded so callers can inspect the exact bytes a job produced:
//! `sppcore print --dry-run` uses it to write a job to a file, and the
//! tests use it to observe the connection lifecycle.
//!
//! It can also be told to fail in the ways a real link fails.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use super::{Connection, Transport};
use crate::device::DeviceHandle;
use crate::error::PrintError;

/// How the simulated device behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Connects and accepts every write.
    #[default]
    Accept,
    /// Connect fails as if the printer were switched off.
    Unreachable,
    /// Connect fails with an OS permission error.
    Denied,
    /// Connect succeeds, every write fails (link dropped).
    FailWrites,
    /// The first write on this transport fails, later writes go through.
    FailFirstWrite,
}

#[derive(Debug, Default)]
struct Log {
    connect_attempts: usize,
    connects: usize,
    write_attempts: usize,
    sends: Vec<Vec<u8>>,
    close_calls: usize,
    releases: usize,
}

/// Recording transport. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    behavior: Behavior,
    log: Arc<Mutex<Log>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        lock(&self.log)
    }

    /// Number of times `connect` was called.
    pub fn connect_attempts(&self) -> usize {
        self.log().connect_attempts
    }

    /// Number of connections successfully opened.
    pub fn connects(&self) -> usize {
        self.log().connects
    }

    /// Number of buffers the device accepted.
    pub fn send_count(&self) -> usize {
        self.log().sends.len()
    }

    /// Every successfully sent buffer, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log().sends.clone()
    }

    /// All successfully sent bytes, concatenated.
    pub fn sent(&self) -> Vec<u8> {
        self.log().sends.concat()
    }

    /// Number of times `close` was called on any connection.
    pub fn close_calls(&self) -> usize {
        self.log().close_calls
    }

    /// Connections opened but not yet released.
    pub fn open_connections(&self) -> usize {
        let log = self.log();
        log.connects - log.releases
    }
}

impl Transport for MemoryTransport {
    fn connect(
        &self,
        device: &DeviceHandle,
        _timeout: Duration,
    ) -> Result<Box<dyn Connection>, PrintError> {
        let mut log = self.log();
        log.connect_attempts += 1;

        match self.behavior {
            Behavior::Unreachable => Err(PrintError::Connection(format!(
                "{} is unreachable",
                device
            ))),
            Behavior::Denied => Err(PrintError::PermissionDenied(format!(
                "access to {} denied",
                device
            ))),
            Behavior::Accept | Behavior::FailWrites | Behavior::FailFirstWrite => {
                log.connects += 1;
                debug!(device = %device, "memory connection opened");
                Ok(Box::new(MemoryConnection {
                    log: Arc::clone(&self.log),
                    open: true,
                    behavior: self.behavior,
                }))
            }
        }
    }
}

struct MemoryConnection {
    log: Arc<Mutex<Log>>,
    open: bool,
    behavior: Behavior,
}

impl Connection for MemoryConnection {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        if !self.open {
            return Err(PrintError::Write("connection is closed".into()));
        }
        let mut log = lock(&self.log);
        log.write_attempts += 1;
        let fail = match self.behavior {
            Behavior::FailWrites => true,
            Behavior::FailFirstWrite => log.write_attempts == 1,
            _ => false,
        };
        if fail {
            return Err(PrintError::Write("link dropped".into()));
        }
        log.sends.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        let mut log = lock(&self.log);
        log.close_calls += 1;
        if self.open {
            self.open = false;
            log.releases += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// A poisoned log is still a valid log.
fn lock(log: &Mutex<Log>) -> MutexGuard<'_, Log> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
