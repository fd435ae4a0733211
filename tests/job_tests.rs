//! # Print Job Tests
//!
//! End-to-end runs of the orchestrator against the in-memory transport.
//! Each test checks both the job result and what reached the "device":
//! bytes sent, connections opened, and closes.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use pretty_assertions::assert_eq;

use sppcore::config::AppConfig;
use sppcore::ir::PrintJob;
use sppcore::printer::{spawn_print, JobState, Printer};
use sppcore::protocol::text::Alignment;
use sppcore::receipt::Receipt;
use sppcore::render::source::{FileImage, MemoryImage};
use sppcore::render::{rasterize, Pixel};
use sppcore::transport::memory::{Behavior, MemoryTransport};
use sppcore::transport::{Connection, Transport};
use sppcore::{DeviceHandle, PrintError};

// ============================================================================
// HELPERS
// ============================================================================

/// A distinct address per test: jobs on one device exclude each other
/// across the whole process.
fn device(n: u8) -> DeviceHandle {
    DeviceHandle::new(&format!("00:11:22:33:03:{:02X}", n)).unwrap()
}

/// 2×2 image whose channel means are 10, 200 (top row) and 130, 128.
fn four_pixel_image() -> DynamicImage {
    let mut img = RgbImage::new(2, 2);
    img.put_pixel(0, 0, Rgb([0, 0, 30]));
    img.put_pixel(1, 0, Rgb([200, 200, 200]));
    img.put_pixel(0, 1, Rgb([255, 135, 0]));
    img.put_pixel(1, 1, Rgb([100, 150, 134]));
    DynamicImage::ImageRgb8(img)
}

/// Image-only printer: no receipt text, image left-aligned.
fn image_printer(device: DeviceHandle, transport: &MemoryTransport, image: DynamicImage) -> Printer {
    Printer::new(device, transport.clone())
        .with_image(image)
        .with_alignment(Alignment::Left)
        .with_receipt(Receipt::new(Vec::<String>::new()))
}

/// Transport that parks inside `connect` until released.
struct GatedTransport {
    inner: MemoryTransport,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Transport for GatedTransport {
    fn connect(
        &self,
        device: &DeviceHandle,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, PrintError> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        self.inner.connect(device, timeout)
    }
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_four_pixel_receipt() {
    let image = four_pixel_image();
    let bitmap = rasterize(&image);
    assert_eq!(
        bitmap.pixels(),
        vec![Pixel::Black, Pixel::White, Pixel::White, Pixel::Black]
    );

    let transport = MemoryTransport::new();
    let summary = image_printer(device(1), &transport, image).print_now().unwrap();

    assert_eq!(
        transport.sent(),
        vec![
            0x1B, 0x40, // ESC @
            0x1B, 0x61, 0x00, // ESC a 0
            0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x02, 0x00, // GS v 0, 1 byte × 2 rows
            0b1000_0000, // row 0: black, white
            0b0100_0000, // row 1: white, black
            0x0A, // blank line under the image
        ]
    );
    assert_eq!(summary.bytes_sent, 16);
    assert_eq!((summary.image_width, summary.image_height), (2, 2));
    assert_eq!(transport.connects(), 1);
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(transport.open_connections(), 0);
}

#[test]
fn test_default_receipt_text() {
    let transport = MemoryTransport::new();
    Printer::new(device(2), transport.clone()).print_now().unwrap();

    let mut expected = vec![0x1B, 0x40];
    expected.extend_from_slice(b"Test in Bixolon SPP-R200III\n\nThank you!\n");
    expected.extend_from_slice(b"\n\n\n");
    assert_eq!(transport.sent(), expected);
}

#[test]
fn test_job_is_sent_as_one_buffer() {
    let transport = MemoryTransport::new();
    image_printer(device(11), &transport, four_pixel_image())
        .print_now()
        .unwrap();
    assert_eq!(transport.send_count(), 1);
}

#[test]
fn test_config_file_job() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(16, 4, Rgb([0, 0, 0]))
        .save(dir.path().join("logo.png"))
        .unwrap();
    let config_path = dir.path().join("receipt.json");
    std::fs::write(
        &config_path,
        r#"{"device": "00:11:22:33:03:0F", "image": "logo.png", "alignment": "center", "lines": ["ok"], "trailing_feed": 0}"#,
    )
    .unwrap();

    let config = AppConfig::load(&config_path).unwrap();
    let transport = MemoryTransport::new();
    let summary = Printer::from_config(&config, transport.clone())
        .print_now()
        .unwrap();

    let sent = transport.sent();
    assert_eq!(&sent[..5], &[0x1B, 0x40, 0x1B, 0x61, 0x01]);
    // 2 bytes per row, 4 rows, all black
    assert_eq!(&sent[5..13], &[0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x04, 0x00]);
    assert!(sent[13..21].iter().all(|&b| b == 0xFF));
    assert!(sent.ends_with(b"\x1B\x61\x00\nok\n"));
    assert_eq!((summary.image_width, summary.image_height), (16, 4));
}

// ============================================================================
// FAILURE PATHS
// ============================================================================

#[test]
fn test_unreachable_device() {
    let transport = MemoryTransport::with_behavior(Behavior::Unreachable);
    let printer = Printer::new(device(4), transport.clone());

    let err = printer.print_now().unwrap_err();
    assert!(matches!(err, PrintError::Connection(_)));
    assert!(err.is_retryable());
    assert_eq!(transport.send_count(), 0);
    assert_eq!(transport.open_connections(), 0);
}

#[test]
fn test_os_permission_error_on_connect() {
    let transport = MemoryTransport::with_behavior(Behavior::Denied);
    let err = Printer::new(device(5), transport.clone())
        .print_now()
        .unwrap_err();
    assert!(matches!(err, PrintError::PermissionDenied(_)));
    assert_eq!(transport.open_connections(), 0);
}

#[test]
fn test_permission_gate_blocks_connect() {
    let transport = MemoryTransport::new();
    let printer = Printer::new(device(6), transport.clone()).with_gate(
        |_: &DeviceHandle| -> Result<(), PrintError> {
            Err(PrintError::PermissionDenied("bluetooth access not granted".into()))
        },
    );

    let err = printer.print_now().unwrap_err();
    assert!(matches!(err, PrintError::PermissionDenied(_)));
    assert_eq!(transport.connect_attempts(), 0);
}

#[test]
fn test_missing_image_file() {
    let transport = MemoryTransport::new();
    let printer = Printer::new(device(7), transport.clone())
        .with_image(FileImage::new("/nonexistent/logo.png"));

    let err = printer.print_now().unwrap_err();
    assert!(matches!(err, PrintError::Asset(_)));
    assert!(!err.is_retryable());
    assert_eq!(transport.send_count(), 0);
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(transport.open_connections(), 0);
}

#[test]
fn test_undecodable_image() {
    let transport = MemoryTransport::new();
    let printer = Printer::new(device(8), transport.clone())
        .with_image(MemoryImage::new(b"definitely not a png".to_vec()));

    assert!(matches!(printer.print_now(), Err(PrintError::Asset(_))));
    assert_eq!(transport.send_count(), 0);
    assert_eq!(transport.open_connections(), 0);
}

#[test]
fn test_write_failure_closes_once() {
    let transport = MemoryTransport::with_behavior(Behavior::FailWrites);
    let printer = image_printer(device(12), &transport, four_pixel_image());

    let err = printer.print_now().unwrap_err();
    assert!(matches!(err, PrintError::Write(_)));
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(transport.open_connections(), 0);
    assert_eq!(
        printer.last_trace().last(),
        Some(&JobState::Closed)
    );
}

#[test]
fn test_printer_reusable_after_failure() {
    let transport = MemoryTransport::with_behavior(Behavior::FailFirstWrite);
    let printer = Printer::new(device(9), transport.clone());

    assert!(printer.print_now().is_err());
    // The abort went out on the first connection; the next job is clean.
    printer.print_now().unwrap();
    assert_eq!(transport.connects(), 2);
    assert_eq!(transport.close_calls(), 2);
    assert_eq!(transport.open_connections(), 0);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_job_is_rejected() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let inner = MemoryTransport::new();
    let transport = GatedTransport {
        inner: inner.clone(),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let printer = Arc::new(Printer::new(device(10), transport));

    let first = {
        let printer = Arc::clone(&printer);
        thread::spawn(move || printer.print_now())
    };
    entered_rx.recv().unwrap();

    assert!(matches!(printer.print_now(), Err(PrintError::Busy)));

    release_tx.send(()).unwrap();
    first.join().unwrap().unwrap();
    assert_eq!(inner.connects(), 1);
    assert_eq!(inner.open_connections(), 0);
}

#[test]
fn test_second_printer_for_same_device_is_rejected() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let inner = MemoryTransport::new();
    let transport = Arc::new(GatedTransport {
        inner: inner.clone(),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let first = Printer::new(device(15), Arc::clone(&transport));
    let second = Printer::new(device(15), Arc::clone(&transport));

    let running = thread::spawn(move || first.print_now());
    entered_rx.recv().unwrap();

    // Separate instance, same device: still excluded.
    assert!(matches!(second.print_now(), Err(PrintError::Busy)));
    // Another device is not held up by the running job.
    let other = MemoryTransport::new();
    Printer::new(device(16), other.clone()).print_now().unwrap();
    assert_eq!(other.connects(), 1);

    release_tx.send(()).unwrap();
    running.join().unwrap().unwrap();
    assert_eq!(inner.connects(), 1);
    assert_eq!(inner.open_connections(), 0);

    // The claim is released with the job.
    let (again_tx, _again_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    release_tx.send(()).unwrap();
    let again = GatedTransport {
        inner: inner.clone(),
        entered: Mutex::new(again_tx),
        release: Mutex::new(release_rx),
    };
    Printer::new(device(15), again).print_now().unwrap();
    assert_eq!(inner.connects(), 2);
}

#[tokio::test]
async fn test_spawned_job() {
    let transport = MemoryTransport::new();
    let printer = Arc::new(image_printer(device(13), &transport, four_pixel_image()));

    let summary = spawn_print(Arc::clone(&printer)).await.unwrap().unwrap();
    assert_eq!(summary.bytes_sent, transport.sent().len());
    assert_eq!(
        printer.last_trace(),
        vec![
            JobState::Idle,
            JobState::Connecting,
            JobState::TransactionOpen,
            JobState::Sending,
            JobState::Closed,
        ]
    );
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_same_job_same_bytes() {
    let first = MemoryTransport::new();
    let second = MemoryTransport::new();
    image_printer(device(14), &first, four_pixel_image()).print_now().unwrap();
    image_printer(device(14), &second, four_pixel_image()).print_now().unwrap();
    assert_eq!(first.sent(), second.sent());
}

#[test]
fn test_encoding_is_stateless() {
    let mut job = PrintJob::new();
    job.lines(["Hello"]).end();
    assert_eq!(job.to_bytes(), job.to_bytes());
    assert_eq!(
        job.to_bytes(),
        vec![0x1B, 0x40, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x0A]
    );
}
