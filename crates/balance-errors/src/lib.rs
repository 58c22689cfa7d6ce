//! Centralized error types for the balance-training stimulation core.
//!
//! The control core has three failure surfaces with very different handling:
//!
//! - [`config`]: construction-time validation. Filters and the stimulation
//!   controller reject degenerate parameters before the first tick runs.
//! - [`link`]: serial link failures. These never cross the worker thread
//!   boundary as values in steady state; they surface as link state
//!   transitions and log output, and as [`LinkError`] only from start-up
//!   and join operations.
//! - [`common`]: the top-level [`BalanceError`] wrapping both together with
//!   configuration file failures, plus the category and severity that front
//!   ends map to exit codes and log levels.
//!
//! Cold-start underflow (filter or controller history not yet populated)
//! and read timeouts are *not* errors and have no variant here.
//!
//! # Example
//!
//! ```
//! use balance_errors::prelude::*;
//!
//! fn check_cutoff(cutoff_hz: f64, sample_hz: f64) -> Result<f64> {
//!     if !(cutoff_hz > 0.0 && cutoff_hz < sample_hz / 2.0) {
//!         return Err(ConfigError::InvalidCutoff { cutoff_hz, sample_hz }.into());
//!     }
//!     Ok(cutoff_hz)
//! }
//!
//! assert!(check_cutoff(0.4615, 20.0).is_ok());
//! assert!(check_cutoff(15.0, 20.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod config;
pub mod link;
pub mod prelude;

pub use common::{BalanceError, ErrorCategory, ErrorSeverity};
pub use config::ConfigError;
pub use link::LinkError;

/// A specialized `Result` type for balance-core operations.
pub type Result<T> = std::result::Result<T, BalanceError>;

/// A specialized `Result` type for construction-time validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A specialized `Result` type for serial link operations.
pub type LinkResult<T = ()> = std::result::Result<T, LinkError>;
