//! Biomechanical stimulation controller for balance training.
//!
//! Each control tick the controller converts the filtered center of pressure
//! and the current target into four bounded stimulation amplitudes:
//!
//! 1. CoP and target are shifted into the ankle frame and turned into sway
//!    angles about the ankle (`atan2(y, com_height)`)
//! 2. A neural torque (proportional on the angle error, derivative on a
//!    delayed CoP angle) and a mechanical torque (stiffness and damping on the
//!    current CoP angle) are computed
//! 3. Half of each torque (one leg) is mapped onto plantarflexion and
//!    dorsiflexion channels through slopes derived from the limits of
//!    stability; channels on the wrong side of their gate contribute nothing
//! 4. A fitted polynomial bias in the lateral angle is added to active channels
//! 5. The result is scaled by a ramp that restarts on every target change and
//!    clamped to `[0, max_amplitude]`
//!
//! # Modules
//!
//! - [`config`]: user-facing [`ControllerConfig`] with defaults and validation
//! - [`constants`]: [`ControllerConstants`] derived once from the config
//! - [`history`]: [`CopHistory`] and the backward-difference derivative
//! - [`ramp`]: [`RampGenerator`]
//! - [`bias`]: [`BiasPolynomial`] and [`BiasModel`]
//! - [`session`]: [`SessionState`], the explicit session object
//! - [`controller`]: [`StimulationController`]
//! - [`frame`]: [`StimulationFrame`], the per-tick result
//!
//! # RT Safety
//!
//! Construction validates and allocates; [`StimulationController::step`] does
//! neither and is infallible.
//!
//! # Example
//!
//! ```
//! use balance_control::prelude::*;
//!
//! # fn main() -> Result<(), balance_errors::ConfigError> {
//! let mut controller = StimulationController::new(&ControllerConfig::default())?;
//! let mut session = SessionState::new(CopPoint::new(0.0, 4.0));
//!
//! let frame = controller.step(CopPoint::new(0.0, 0.0), &session);
//! assert!(frame.final_amplitudes().iter().all(|a| *a >= 0.0));
//!
//! session.set_target(CopPoint::new(2.0, 6.0));
//! let frame = controller.step(CopPoint::new(0.0, 0.0), &session);
//! assert!(frame.ramp_fraction < 1.0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bias;
pub mod config;
pub mod constants;
pub mod controller;
pub mod frame;
pub mod history;
pub mod prelude;
pub mod ramp;
pub mod session;
pub mod types;

pub use bias::{BiasModel, BiasPolynomial};
pub use config::ControllerConfig;
pub use constants::{ControllerConstants, TorqueRanges};
pub use controller::StimulationController;
pub use frame::StimulationFrame;
pub use history::{CopHistory, HISTORY_LEN, backward_difference};
pub use ramp::RampGenerator;
pub use session::SessionState;
pub use types::{Channel, CopPoint, Sample};
