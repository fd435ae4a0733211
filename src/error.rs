//! # Error Types
//!
//! This module defines the error type used throughout the sppcore library.
//!
//! Every stage of a print job reports exactly one of these variants. The
//! orchestrator decides between "transition" and "abort" by matching on
//! them, so they carry a message rather than a boxed source.

use thiserror::Error;

/// Main error type for sppcore operations
#[derive(Debug, Error)]
pub enum PrintError {
    /// The OS refused access to the printer; no connection was attempted.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Device unreachable, not paired/bound, busy, or connect timed out.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Mid-transmission I/O failure (link drop, buffer full, timeout).
    #[error("Write error: {0}")]
    Write(String),

    /// Source image missing or undecodable.
    #[error("Asset error: {0}")]
    Asset(String),

    /// Another job currently holds the connection slot.
    #[error("Printer busy: another job is in progress")]
    Busy,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while releasing a connection.
    ///
    /// Never returned from a job; only logged, since the job outcome is
    /// already decided by the time a connection is closed.
    #[error("Close error: {0}")]
    Close(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Whether re-invoking the whole job from the start might succeed.
    ///
    /// No retries happen inside the library; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Write(_) | Self::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(PrintError::Connection("gone".into()).is_retryable());
        assert!(PrintError::Write("pipe".into()).is_retryable());
        assert!(PrintError::Busy.is_retryable());
        assert!(!PrintError::PermissionDenied("no".into()).is_retryable());
        assert!(!PrintError::Asset("missing".into()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            PrintError::Connection("unreachable".into()).to_string(),
            "Connection error: unreachable"
        );
        assert_eq!(
            PrintError::Busy.to_string(),
            "Printer busy: another job is in progress"
        );
    }
}
