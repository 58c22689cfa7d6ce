//! Top-level error type and classification shared by all balance crates.
//!
//! Front ends decide what to do with a failure from [`BalanceError::category`]
//! (which exit code, which subsystem to blame) and [`BalanceError::severity`]
//! (how loudly to log it).

use core::fmt;
use std::path::PathBuf;

use crate::{ConfigError, LinkError};

/// Top-level error type wrapping every balance-core sub-error.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Construction-time configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Serial link errors
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A file outside the link worker could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// A configuration document did not parse
    #[error("{format} error: {message}")]
    Format {
        /// Document format, e.g. `YAML`
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// Configuration file with an extension no parser handles
    #[error("Unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl BalanceError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BalanceError::Config(_)
            | BalanceError::Format { .. }
            | BalanceError::UnsupportedFormat(_) => ErrorCategory::Config,
            BalanceError::Link(_) => ErrorCategory::Link,
            BalanceError::Io { .. } => ErrorCategory::IO,
            BalanceError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BalanceError::Config(e) => e.severity(),
            BalanceError::Link(e) => e.severity(),
            BalanceError::Io { .. }
            | BalanceError::Format { .. }
            | BalanceError::UnsupportedFormat(_)
            | BalanceError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a read error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BalanceError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a document in `format`.
    pub fn format(format: &'static str, err: impl fmt::Display) -> Self {
        BalanceError::Format {
            format,
            message: err.to_string(),
        }
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        BalanceError::Other(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Configuration documents and validation
    Config = 0,
    /// Serial link errors
    Link = 1,
    /// I/O errors
    IO = 2,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Link => write!(f, "Link"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, stimulation must not continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
