//! Protocol errors.

use thiserror::Error;

/// Errors raised while parsing stimulator commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Command shorter or longer than `<letter><digit><digit>`
    #[error("Malformed command: expected 3 bytes, got {0}")]
    Malformed(usize),

    /// Channel letter outside `a`..`d`
    #[error("Unknown channel byte 0x{0:02X}")]
    UnknownChannel(u8),

    /// Amplitude field is not two ASCII digits
    #[error("Invalid amplitude digits {0:?}")]
    InvalidAmplitude([u8; 2]),
}
