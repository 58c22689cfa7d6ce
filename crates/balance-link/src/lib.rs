//! Serial link between the control loop and the stimulator.
//!
//! A [`SerialLink`] spawns one worker thread that is the sole owner of the
//! physical port. The control loop talks to it only through two lock-free
//! queues and a handful of atomics:
//!
//! ```text
//! control loop ── send ──▶ OutboundQueue ──▶ worker ──▶ port
//! control loop ◀─ poll ── InboundQueue  ◀── worker ◀── port
//! ```
//!
//! # State machine
//!
//! ```text
//! Idle → Connecting → Open → Closing → Stopped
//!                       └──→ Faulted ─→ Stopped
//! ```
//!
//! Read timeouts keep the link `Open`. Any other port error moves it to
//! `Faulted`; the port is then closed best-effort and the worker exits.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use balance_link::{DeviceConnector, LinkConfig, SerialLink};
//! use fes_protocol::StimCodec;
//!
//! # fn main() -> Result<(), balance_errors::LinkError> {
//! let config = LinkConfig::default();
//! let connector = DeviceConnector::new("/dev/ttyUSB0", config.baud_rate);
//! let link = SerialLink::start(connector, config)?;
//! for msg in StimCodec::default().encode_frame([10, 10, 0, 0]) {
//!     link.send(msg)?;
//! }
//! std::thread::sleep(Duration::from_millis(50));
//! link.join()
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod device;
pub mod link;
pub mod port;
pub mod queue;
pub mod state;
mod worker;

pub use config::{DEFAULT_BAUD_RATE, LinkConfig};
pub use device::{DeviceConnector, DevicePort};
pub use link::SerialLink;
pub use port::{PortConnector, SerialPort, is_timeout};
pub use queue::{InboundQueue, OutboundQueue};
pub use state::{LinkState, LinkStats};
