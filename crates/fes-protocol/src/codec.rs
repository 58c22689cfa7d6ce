//! Command encoding and parsing.

use crate::{ProtocolError, StimChannel, WireMessage};

/// Highest amplitude the stimulator accepts.
pub const MAX_AMPLITUDE: u8 = 99;

/// Terminator appended after every command unless configured otherwise.
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Round a controller amplitude to the stimulator's integer scale.
///
/// NaN and negative values map to 0; values above [`MAX_AMPLITUDE`] saturate.
pub fn quantize_amplitude(amplitude: f64) -> u8 {
    if amplitude.is_nan() || amplitude <= 0.0 {
        return 0;
    }
    let rounded = amplitude.round();
    if rounded >= f64::from(MAX_AMPLITUDE) {
        MAX_AMPLITUDE
    } else {
        rounded as u8
    }
}

/// Encoder for stimulator commands with a fixed delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StimCodec {
    delimiter: u8,
}

impl Default for StimCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl StimCodec {
    /// Create a codec terminating every command with `delimiter`.
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Command terminator.
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Encode one command. Amplitudes above [`MAX_AMPLITUDE`] saturate.
    pub fn encode_command(&self, channel: StimChannel, amplitude: u8) -> WireMessage {
        let amplitude = amplitude.min(MAX_AMPLITUDE);
        let bytes = [
            channel.letter(),
            b'0' + amplitude / 10,
            b'0' + amplitude % 10,
            self.delimiter,
        ];
        WireMessage::from(&bytes[..])
    }

    /// Encode one tick: four commands in channel order.
    pub fn encode_frame(&self, amplitudes: [u8; 4]) -> [WireMessage; 4] {
        StimChannel::ALL.map(|ch| self.encode_command(ch, amplitudes[ch.index()]))
    }

    /// The all-zero teardown burst `a00 b00 c00 d00`.
    pub fn shutdown_burst(&self) -> [WireMessage; 4] {
        self.encode_frame([0; 4])
    }
}

/// Parse one command, with or without a trailing `\n` or `\r\n`.
///
/// # Errors
///
/// - [`ProtocolError::Malformed`] if the body is not exactly three bytes
/// - [`ProtocolError::UnknownChannel`] for a letter outside `a`..`d`
/// - [`ProtocolError::InvalidAmplitude`] unless both amplitude bytes are digits
pub fn parse_command(bytes: &[u8]) -> Result<(StimChannel, u8), ProtocolError> {
    let body = bytes
        .strip_suffix(b"\n")
        .map(|b| b.strip_suffix(b"\r").unwrap_or(b))
        .unwrap_or(bytes);

    let [letter, hi, lo] = body else {
        return Err(ProtocolError::Malformed(body.len()));
    };
    let channel = StimChannel::from_letter(*letter)?;
    if !(hi.is_ascii_digit() && lo.is_ascii_digit()) {
        return Err(ProtocolError::InvalidAmplitude([*hi, *lo]));
    }
    Ok((channel, (hi - b'0') * 10 + (lo - b'0')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_to_two_digits() {
        let codec = StimCodec::default();
        assert_eq!(codec.encode_command(StimChannel::A, 7).as_bytes(), b"a07\n");
        assert_eq!(codec.encode_command(StimChannel::D, 42).as_bytes(), b"d42\n");
    }

    #[test]
    fn test_encode_saturates() {
        let codec = StimCodec::default();
        assert_eq!(codec.encode_command(StimChannel::B, 250).as_bytes(), b"b99\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let codec = StimCodec::new(b';');
        assert_eq!(codec.encode_command(StimChannel::C, 5).as_bytes(), b"c05;");
    }

    #[test]
    fn test_parse_accepts_crlf() {
        assert_eq!(parse_command(b"c12\r\n"), Ok((StimChannel::C, 12)));
        assert_eq!(parse_command(b"c12"), Ok((StimChannel::C, 12)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command(b"a7\n"), Err(ProtocolError::Malformed(2)));
        assert_eq!(
            parse_command(b"e10"),
            Err(ProtocolError::UnknownChannel(b'e'))
        );
        assert_eq!(
            parse_command(b"a1x"),
            Err(ProtocolError::InvalidAmplitude([b'1', b'x']))
        );
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize_amplitude(-3.0), 0);
        assert_eq!(quantize_amplitude(f64::NAN), 0);
        assert_eq!(quantize_amplitude(6.5), 7);
        assert_eq!(quantize_amplitude(6.49), 6);
        assert_eq!(quantize_amplitude(120.0), MAX_AMPLITUDE);
    }
}
