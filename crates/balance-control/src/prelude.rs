//! Prelude for the controller crate.

pub use crate::bias::{BiasModel, BiasPolynomial};
pub use crate::config::ControllerConfig;
pub use crate::constants::ControllerConstants;
pub use crate::controller::StimulationController;
pub use crate::frame::StimulationFrame;
pub use crate::ramp::RampGenerator;
pub use crate::session::SessionState;
pub use crate::types::{Channel, CopPoint, Sample};
