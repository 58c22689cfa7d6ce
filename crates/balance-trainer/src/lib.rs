//! Balance-training session runner.
//!
//! Glues the control core together for one subject on one board:
//!
//! ```text
//! SampleSource ─▶ CascadeFilter (x, y) ─▶ StimulationController ─▶ StimCodec ─▶ SerialLink
//!                                   ▲                        ▲
//!                            TrainerConfig            SessionState
//!                        (from ConfigStore)         (target, condition)
//! ```
//!
//! - [`store`]: flat numeric configuration loaded from YAML or JSON
//! - [`config`]: typed configuration sections built from the store
//! - [`session`]: the per-tick pipeline and teardown burst
//! - [`clock`]: absolute-deadline tick scheduling
//! - [`acquisition`]: sample sources, including a simulated subject
//! - [`report`]: run summary

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod acquisition;
pub mod clock;
pub mod config;
pub mod report;
pub mod session;
pub mod store;

pub use acquisition::{SampleSource, SimulatedSway, corner_loads, cop_from_corner_loads};
pub use clock::{TickClock, TickTiming};
pub use config::{FilterConfig, SessionConfig, TrainerConfig};
pub use report::RunSummary;
pub use session::{ControlSession, TickReport};
pub use store::ConfigStore;
