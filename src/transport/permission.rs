//! # Permission Gate
//!
//! Access to the printer must be granted before a connection is attempted.
//! A denial is reported as [`PrintError::PermissionDenied`] so the caller
//! can ask for access again; the connect itself is never tried.

use std::path::PathBuf;

use tracing::debug;

use crate::device::DeviceHandle;
use crate::error::PrintError;

use super::bluetooth::find_rfcomm_for_mac;

/// Decides whether this process may talk to a device.
pub trait PermissionGate: Send + Sync {
    fn check(&self, device: &DeviceHandle) -> Result<(), PrintError>;
}

/// Any closure with the right signature is a gate.
impl<F> PermissionGate for F
where
    F: Fn(&DeviceHandle) -> Result<(), PrintError> + Send + Sync,
{
    fn check(&self, device: &DeviceHandle) -> Result<(), PrintError> {
        self(device)
    }
}

/// Grants everything. For transports with no OS-level access control.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn check(&self, _device: &DeviceHandle) -> Result<(), PrintError> {
        Ok(())
    }
}

/// Checks write access to the RFCOMM node bound to the device.
///
/// If the device has no bound node yet, or the lookup itself fails,
/// access is granted and the transport reports the problem as a
/// connection error instead. Typical fix for a denial: add the user to
/// the `dialout` group.
#[derive(Debug, Clone)]
pub struct RfcommAccessGate {
    node: Option<PathBuf>,
    lookup: fn(&str) -> Result<Option<String>, PrintError>,
}

impl Default for RfcommAccessGate {
    fn default() -> Self {
        Self {
            node: None,
            lookup: find_rfcomm_for_mac,
        }
    }
}

impl RfcommAccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a fixed node instead of looking the device up.
    pub fn with_node<P: Into<PathBuf>>(node: P) -> Self {
        Self {
            node: Some(node.into()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    fn with_lookup(lookup: fn(&str) -> Result<Option<String>, PrintError>) -> Self {
        Self {
            node: None,
            lookup,
        }
    }
}

impl PermissionGate for RfcommAccessGate {
    fn check(&self, device: &DeviceHandle) -> Result<(), PrintError> {
        let node = match &self.node {
            Some(node) => node.clone(),
            None => match (self.lookup)(device.address()) {
                Ok(Some(path)) => PathBuf::from(path),
                Ok(None) => return Ok(()),
                Err(e) => {
                    debug!(device = %device, error = %e, "rfcomm lookup failed, leaving it to connect");
                    return Ok(());
                }
            },
        };

        if !node.exists() || is_writable(&node) {
            Ok(())
        } else {
            Err(PrintError::PermissionDenied(format!(
                "{} is not writable by this user (is it in the dialout group?)",
                node.display()
            )))
        }
    }
}

#[cfg(unix)]
fn is_writable(path: &std::path::Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(path: &std::path::Path) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
