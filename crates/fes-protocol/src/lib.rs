//! Wire protocol for the four-channel FES stimulator.
//!
//! The stimulator accepts ASCII commands of the form `<channel><amplitude>`
//! followed by a delimiter, where the channel is one of `a`..`d` and the
//! amplitude is two decimal digits in `0..=99`.
//!
//! # Protocol Overview
//!
//! ```text
//! a07\n   set channel a to 7
//! b00\n   switch channel b off
//! ```
//!
//! One command is sent per channel per control tick, in channel order. On
//! teardown the host sends [`StimCodec::shutdown_burst`] (`a00 b00 c00 d00`)
//! exactly once.
//!
//! All functions here are pure; [`WireMessage`] is the only allocation and is
//! created once per command.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![warn(missing_docs)]

pub mod channel;
pub mod codec;
pub mod error;
pub mod message;

pub use channel::StimChannel;
pub use codec::{DEFAULT_DELIMITER, MAX_AMPLITUDE, StimCodec, parse_command, quantize_amplitude};
pub use error::ProtocolError;
pub use message::WireMessage;
