//! # Background Printing
//!
//! Printing blocks on Bluetooth I/O, so async callers hand the job to
//! tokio's blocking pool instead of running it on a runtime thread.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::session::{JobSummary, Printer};
use crate::error::PrintError;

/// Run [`Printer::print_now`] on the blocking pool.
///
/// The returned handle resolves to the job result once the connection has
/// been closed. A second job spawned while one is running resolves to
/// [`PrintError::Busy`].
pub fn spawn_print(printer: Arc<Printer>) -> JoinHandle<Result<JobSummary, PrintError>> {
    tokio::task::spawn_blocking(move || printer.print_now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceHandle;
    use crate::transport::memory::{Behavior, MemoryTransport};

    #[tokio::test]
    async fn test_spawn_print() {
        let transport = MemoryTransport::new();
        let printer = Arc::new(Printer::new(DeviceHandle::new("00:11:22:33:02:01").unwrap(), transport.clone()));

        let summary = spawn_print(printer).await.unwrap().unwrap();
        assert_eq!(summary.bytes_sent, transport.sent().len());
        assert_eq!(transport.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_spawn_print_reports_failure() {
        let transport = MemoryTransport::with_behavior(Behavior::Unreachable);
        let printer = Arc::new(Printer::new(DeviceHandle::new("00:11:22:33:02:02").unwrap(), transport));

        let result = spawn_print(printer).await.unwrap();
        assert!(matches!(result, Err(PrintError::Connection(_))));
    }
}
