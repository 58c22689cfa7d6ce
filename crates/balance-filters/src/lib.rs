//! Streaming filters for center-of-pressure conditioning.
//!
//! This crate turns a noisy per-tick scalar into a smoothed scalar with bounded
//! group delay. It is evaluated once per control tick for each CoP axis.
//!
//! # Overview
//!
//! - **Register**: [`ShiftRegister`], [`FirStage`] and [`IirStage`], the fixed-length
//!   tap primitives every filter is built on
//! - **Coefficients**: [`FilterStage::derive`] computes one first- or second-order
//!   Butterworth section through the bilinear transform
//! - **Cascade**: [`CascadeFilter`] chains sections into an Nth-order low/high-pass
//!   filter, or runs a plain moving average
//! - **Median**: [`MedianFilter`] suppresses isolated spikes
//!
//! # Cold start
//!
//! A section whose input or output register is not yet full returns its input
//! unchanged. A filter therefore behaves as the identity for the first
//! [`CascadeFilter::warm_up_len`] samples after construction or reset. This is
//! the defined behavior, not an error.
//!
//! # RT Safety
//!
//! - All buffers are allocated at construction
//! - `process` never allocates, locks or performs I/O
//! - Each filter instance is single-owner; nothing here is shared across threads
//!
//! # Example
//!
//! ```
//! use balance_filters::prelude::*;
//!
//! # fn main() -> Result<(), balance_errors::ConfigError> {
//! let mut lp = CascadeFilter::butterworth(0.4615, 20.0, 2, PassType::LowPass)?;
//!
//! let mut y = 0.0;
//! for _ in 0..200 {
//!     y = lp.process(1.0);
//! }
//! assert!((y - 1.0).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cascade;
pub mod coefficients;
pub mod median;
pub mod prelude;
pub mod register;

pub use cascade::{CascadeFilter, FilterKind, FilterSection, MAX_ORDER};
pub use coefficients::{FilterCoefficients, FilterStage, PassType, pole_zeta, warped_cutoff};
pub use median::MedianFilter;
pub use register::{FirStage, IirStage, ShiftRegister};
