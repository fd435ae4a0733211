//! # Bluetooth SPP Transport
//!
//! This module talks to a printer over the Bluetooth Serial Port Profile
//! through a Linux RFCOMM TTY (`/dev/rfcommN`).
//!
//! ## Bluetooth Setup (Linux)
//!
//! The printer must be paired and its address bound to an RFCOMM node:
//!
//! ```bash
//! # 1. Pair with the printer
//! $ bluetoothctl
//! [bluetooth]# pair 74:F0:7D:E5:91:F7
//!
//! # 2. Bind to RFCOMM device (or: sppcore bind 74:F0:7D:E5:91:F7)
//! $ sudo rfcomm bind 0 74:F0:7D:E5:91:F7
//! # This creates /dev/rfcomm0
//! ```
//!
//! [`RfcommTransport`] resolves the configured address to its bound node
//! on every connect, so re-binding under a different number is picked up.
//!
//! ## Claiming the Device
//!
//! The node is opened on a helper thread and the caller waits a bounded
//! time for it: opening an RFCOMM TTY triggers the baseband connection,
//! which hangs for a long time when the printer is off. A blocking open
//! cannot be cancelled, so after a timeout the helper thread lingers until
//! the kernel gives up on its own and then closes whatever it got. Once open, the TTY
//! is switched to exclusive mode (`TIOCEXCL`) so a second process gets
//! `EBUSY` instead of interleaving bytes into our job.
//!
//! ## TTY Configuration
//!
//! The node is put in raw mode so binary data passes through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, etc. off
//! - **No XON/XOFF**: 0x11 and 0x13 occur in raster data
//! - **No output processing**: OPOST off (no LF → CRLF)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**
//!
//! ## Chunked Writes
//!
//! Large buffers are written in 4096-byte chunks with a short pause in
//! between so the printer's receive buffer is not overrun. A send returns
//! only after `tcdrain` reports the TTY output queue empty.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::{AsRawFd, RawFd};

use tracing::{debug, info, warn};

use super::{Connection, Transport};
use crate::device::DeviceHandle;
use crate::error::PrintError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Bluetooth SPP Transport
///
/// ## Example
///
/// ```no_run
/// use sppcore::DeviceHandle;
/// use sppcore::protocol::commands;
/// use sppcore::transport::{RfcommTransport, Transport, DEFAULT_CONNECT_TIMEOUT};
///
/// let device = DeviceHandle::new("74:F0:7D:E5:91:F7")?;
/// let transport = RfcommTransport::new();
///
/// let mut conn = transport.connect(&device, DEFAULT_CONNECT_TIMEOUT)?;
/// conn.send(&commands::init())?;
/// conn.close();
/// # Ok::<(), sppcore::PrintError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RfcommTransport {
    node: Option<PathBuf>,
}

impl RfcommTransport {
    /// Transport that looks the device's RFCOMM node up on each connect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport bound to a fixed node (e.g. "/dev/rfcomm0").
    pub fn with_node<P: Into<PathBuf>>(node: P) -> Self {
        Self {
            node: Some(node.into()),
        }
    }

    fn resolve_node(&self, device: &DeviceHandle) -> Result<PathBuf, PrintError> {
        if let Some(node) = &self.node {
            return Ok(node.clone());
        }
        match find_rfcomm_for_mac(device.address())? {
            Some(path) => Ok(PathBuf::from(path)),
            None => Err(PrintError::Connection(format!(
                "No RFCOMM device bound to {}. Is the printer paired? Try `sppcore bind {}`",
                device, device
            ))),
        }
    }
}

impl Transport for RfcommTransport {
    fn connect(
        &self,
        device: &DeviceHandle,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, PrintError> {
        let node = self.resolve_node(device)?;
        info!(device = %device, node = %node.display(), "connecting to printer");

        let open_path = node.clone();
        let file = wait_for_open(move || open_raw(&open_path), timeout, device)?;

        info!(device = %device, "connected");
        Ok(Box::new(RfcommConnection {
            file: Some(file),
            node,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }))
    }
}

/// Run `open` on a helper thread and wait at most `timeout` for it.
///
/// `open(2)` on an RFCOMM node cannot be interrupted. On timeout the helper
/// thread is left blocked in the kernel until the baseband connect
/// succeeds or fails by itself; a file that arrives after the caller gave
/// up is dropped there, which closes it. Each timed-out connect leaves at
/// most one such thread behind, and it holds nothing but the node path.
fn wait_for_open<F>(open: F, timeout: Duration, device: &DeviceHandle) -> Result<File, PrintError>
where
    F: FnOnce() -> Result<File, PrintError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("rfcomm-open".into())
        .spawn(move || {
            if let Err(mpsc::SendError(Ok(_late))) = tx.send(open()) {
                debug!("open finished after the caller timed out, closing");
            }
        })
        .map_err(|e| PrintError::Connection(format!("Failed to start connect worker: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(PrintError::Connection(format!(
            "Timed out after {:?} connecting to {}",
            timeout, device
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(PrintError::Connection(format!(
            "Connect worker for {} exited without a result",
            device
        ))),
    }
}

/// An open RFCOMM TTY.
#[derive(Debug)]
pub struct RfcommConnection {
    file: Option<File>,
    node: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl RfcommConnection {
    fn write_chunked(file: &mut File, data: &[u8], chunk_size: usize, delay: Duration) -> io::Result<()> {
        if data.len() <= chunk_size {
            return file.write_all(data);
        }
        for chunk in data.chunks(chunk_size) {
            file.write_all(chunk)?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        Ok(())
    }
}

impl Connection for RfcommConnection {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        let file = self.file.as_mut().ok_or_else(|| {
            PrintError::Write(format!("{} is closed", self.node.display()))
        })?;

        Self::write_chunked(file, data, self.chunk_size, self.chunk_delay)
            .and_then(|()| drain(file))
            .map_err(|e| PrintError::Write(format!("Write to {} failed: {}", self.node.display(), e)))?;

        debug!(bytes = data.len(), node = %self.node.display(), "sent");
        Ok(())
    }

    fn close(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        if let Err(e) = drain(&file) {
            let err = PrintError::Close(format!("{}: {}", self.node.display(), e));
            warn!(error = %err, "ignoring error while closing printer connection");
        }
        drop(file);
        info!(node = %self.node.display(), "connection closed");
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

/// Block until everything written to the TTY has been transmitted.
#[cfg(unix)]
fn drain(file: &File) -> io::Result<()> {
    drain_fd(file.as_raw_fd())
}

#[cfg(unix)]
fn drain_fd(fd: RawFd) -> io::Result<()> {
    loop {
        if unsafe { libc::tcdrain(fd) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            // Not a TTY: no output queue to wait for
            Some(libc::ENOTTY) => return Ok(()),
            _ => return Err(err),
        }
    }
}

#[cfg(not(unix))]
fn drain(mut file: &File) -> io::Result<()> {
    file.flush()
}

/// Open an RFCOMM node for raw, exclusive, read/write access.
fn open_raw(path: &Path) -> Result<File, PrintError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| open_error(path, e))?;

    #[cfg(target_os = "linux")]
    claim_exclusive(&file, path)?;

    configure_tty_raw(&file)?;
    Ok(file)
}

fn open_error(path: &Path, e: io::Error) -> PrintError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            PrintError::PermissionDenied(format!("Cannot open {}: {}", path.display(), e))
        }
        io::ErrorKind::NotFound => PrintError::Connection(format!(
            "{} does not exist (device not bound?)",
            path.display()
        )),
        _ if e.raw_os_error() == Some(libc::EBUSY) => {
            PrintError::Connection(format!("{} is in use by another process", path.display()))
        }
        _ => PrintError::Connection(format!("Failed to open {}: {}", path.display(), e)),
    }
}

/// Put the TTY in exclusive mode: further opens fail with EBUSY.
#[cfg(target_os = "linux")]
fn claim_exclusive(file: &File, path: &Path) -> Result<(), PrintError> {
    let result = unsafe { libc::ioctl(file.as_raw_fd(), libc::TIOCEXCL) };
    if result != 0 {
        return Err(PrintError::Connection(format!(
            "Failed to claim {}: {}",
            path.display(),
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Configure a file descriptor for raw TTY mode.
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control. This is
/// critical because 0x11 (XON/DC1) and 0x13 (XOFF/DC3) can appear in
/// binary raster data.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> Result<(), PrintError> {
    use std::mem::MaybeUninit;

    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PrintError::Connection(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PrintError::Connection(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> Result<(), PrintError> {
    Ok(())
}

// ============================================================================
// RFCOMM DISCOVERY AND BINDING
// ============================================================================

/// Find the RFCOMM node bound to a Bluetooth address.
///
/// Checks `/proc/net/rfcomm` and falls back to `rfcomm -a`.
/// Returns the device path (e.g., "/dev/rfcomm0") if found.
#[cfg(unix)]
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, PrintError> {
    let mac_upper = mac.to_uppercase();

    // Format: "rfcomm0: XX:XX:XX:XX:XX:XX channel N ..."
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm")
        && let Some(path) = node_from_listing(&contents, &mac_upper, Path::new("/dev"))
    {
        return Ok(Some(path));
    }

    let output = Command::new("rfcomm").arg("-a").output().map_err(|e| {
        PrintError::Connection(format!("Failed to run 'rfcomm -a': {}", e))
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(node_from_listing(&stdout, &mac_upper, Path::new("/dev")))
}

#[cfg(not(unix))]
pub fn find_rfcomm_for_mac(_mac: &str) -> Result<Option<String>, PrintError> {
    Ok(None)
}

/// Pick the node for `mac_upper` out of an rfcomm listing. Only nodes
/// that exist under `dev_dir` count.
fn node_from_listing(listing: &str, mac_upper: &str, dev_dir: &Path) -> Option<String> {
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|dev_name| dev_dir.join(dev_name.trim()))
        .find(|path| path.exists())
        .map(|path| path.display().to_string())
}

/// Bind `/dev/rfcomm<node>` to a Bluetooth address.
///
/// Runs:
/// 1. `bluetoothctl connect <MAC>` - connect to device
/// 2. `l2ping -c 1 <MAC>` - verify connectivity
/// 3. `rfcomm bind <node> <MAC> <channel>` - create the node
///
/// SPP printers almost always listen on channel 1.
/// Returns the device path on success. **Requires root** for `rfcomm bind`.
#[cfg(unix)]
pub fn setup_rfcomm(device: &DeviceHandle, node: u8, channel: u8) -> Result<String, PrintError> {
    let mac = device.address();
    let device_path = format!("/dev/rfcomm{}", node);

    // May fail if already connected; l2ping verifies below
    info!(device = %device, "connecting via bluetoothctl");
    let output = Command::new("bluetoothctl")
        .arg("connect")
        .arg(mac)
        .output()
        .map_err(|e| PrintError::Connection(format!("Failed to run bluetoothctl: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.contains("Connection successful") || stdout.contains("already connected") {
        info!("connected");
    } else {
        warn!(output = %stdout.trim(), "bluetoothctl did not confirm the connection");
    }

    thread::sleep(Duration::from_millis(500));

    info!("verifying connectivity");
    let output = Command::new("l2ping")
        .arg("-c")
        .arg("1")
        .arg(mac)
        .output()
        .map_err(|e| PrintError::Connection(format!("Failed to run l2ping: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PrintError::Connection(format!(
            "Device {} not reachable: {}",
            mac,
            stderr.trim()
        )));
    }

    info!(node, channel, "binding rfcomm");
    let output = Command::new("rfcomm")
        .arg("bind")
        .arg(node.to_string())
        .arg(mac)
        .arg(channel.to_string())
        .output()
        .map_err(|e| PrintError::Connection(format!("Failed to run rfcomm bind: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("ermission") {
            return Err(PrintError::PermissionDenied(format!(
                "rfcomm bind failed: {}",
                stderr.trim()
            )));
        }
        return Err(PrintError::Connection(format!(
            "rfcomm bind failed: {}",
            stderr.trim()
        )));
    }

    thread::sleep(Duration::from_millis(500));

    if !Path::new(&device_path).exists() {
        return Err(PrintError::Connection(format!(
            "Device {} was not created",
            device_path
        )));
    }

    info!(node = %device_path, "rfcomm node created");
    Ok(device_path)
}

#[cfg(not(unix))]
pub fn setup_rfcomm(_device: &DeviceHandle, _node: u8, _channel: u8) -> Result<String, PrintError> {
    Err(PrintError::Connection(
        "RFCOMM setup not supported on this platform".to_string(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
