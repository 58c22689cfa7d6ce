//! Stimulation channel identifiers.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// One of the four stimulator outputs.
///
/// The host-side controller assigns channels as:
///
/// | Channel | Muscle group                 |
/// |---------|------------------------------|
/// | `A`     | right plantarflexors         |
/// | `B`     | left plantarflexors          |
/// | `C`     | right dorsiflexors           |
/// | `D`     | left dorsiflexors            |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum StimChannel {
    /// Channel `a`
    A = 0,
    /// Channel `b`
    B = 1,
    /// Channel `c`
    C = 2,
    /// Channel `d`
    D = 3,
}

impl StimChannel {
    /// All channels in wire order.
    pub const ALL: [StimChannel; 4] = [
        StimChannel::A,
        StimChannel::B,
        StimChannel::C,
        StimChannel::D,
    ];

    /// ASCII letter used on the wire.
    pub const fn letter(self) -> u8 {
        match self {
            StimChannel::A => b'a',
            StimChannel::B => b'b',
            StimChannel::C => b'c',
            StimChannel::D => b'd',
        }
    }

    /// Position in [`StimChannel::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parse a wire letter.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownChannel`] for anything but `a`..`d`.
    pub fn from_letter(letter: u8) -> Result<Self, ProtocolError> {
        match letter {
            b'a' => Ok(StimChannel::A),
            b'b' => Ok(StimChannel::B),
            b'c' => Ok(StimChannel::C),
            b'd' => Ok(StimChannel::D),
            other => Err(ProtocolError::UnknownChannel(other)),
        }
    }
}

impl core::fmt::Display for StimChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", char::from(self.letter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_roundtrip() {
        for ch in StimChannel::ALL {
            assert_eq!(StimChannel::from_letter(ch.letter()), Ok(ch));
        }
    }

    #[test]
    fn test_index_matches_wire_order() {
        for (i, ch) in StimChannel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
    }

    #[test]
    fn test_uppercase_is_rejected() {
        assert_eq!(
            StimChannel::from_letter(b'A'),
            Err(ProtocolError::UnknownChannel(b'A'))
        );
    }
}
