//! Serial link errors.
//!
//! Steady-state link failures are observed by the control loop only through
//! the link state and the stop flag. These values are produced at start-up
//! (connect, thread spawn) and when joining the worker.

use crate::common::ErrorSeverity;

/// Serial link errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Opening the device failed
    #[error("Failed to connect to device {device}: {reason}")]
    ConnectFailed {
        /// Device identifier (path or name)
        device: String,
        /// Reason reported by the port layer
        reason: String,
    },

    /// The device went away during operation
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// An operation exceeded its deadline
    #[error("Device {device} timeout after {timeout_ms}ms")]
    Timeout {
        /// Device identifier
        device: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Link configuration rejected before the worker started
    #[error("Invalid link configuration: {0}")]
    InvalidConfig(String),

    /// The worker thread could not be spawned
    #[error("Failed to spawn link worker: {0}")]
    SpawnFailed(String),

    /// The worker thread panicked
    #[error("Link worker panicked")]
    WorkerPanicked,

    /// The link has already stopped
    #[error("Link is not running")]
    NotRunning,

    /// Raw I/O failure
    #[error("I/O error on {device}: {message}")]
    Io {
        /// Device identifier
        device: String,
        /// Error message
        message: String,
    },
}

impl LinkError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LinkError::Timeout { .. } => ErrorSeverity::Warning,
            LinkError::NotRunning => ErrorSeverity::Warning,
            LinkError::ConnectFailed { .. } | LinkError::Io { .. } | LinkError::InvalidConfig(_) => {
                ErrorSeverity::Error
            }
            LinkError::Disconnected(_) | LinkError::SpawnFailed(_) | LinkError::WorkerPanicked => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Whether the error is a transient timeout rather than a fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Timeout { .. })
    }

    /// Create a connect failure.
    pub fn connect_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        LinkError::ConnectFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        LinkError::Disconnected(device.into())
    }

    /// Create a timeout error.
    pub fn timeout(device: impl Into<String>, timeout_ms: u64) -> Self {
        LinkError::Timeout {
            device: device.into(),
            timeout_ms,
        }
    }

    /// Wrap an I/O error for a device.
    pub fn io(device: impl Into<String>, err: &std::io::Error) -> Self {
        LinkError::Io {
            device: device.into(),
            message: err.to_string(),
        }
    }
}
