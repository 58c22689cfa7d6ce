//! Link configuration.

use std::time::Duration;

use balance_errors::{ConfigError, ConfigResult, validate, validate_range};
use fes_protocol::DEFAULT_DELIMITER;
use serde::{Deserialize, Serialize};

/// Line speed used when no other is configured.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Line speed, timeouts, queue policy and framing for a [`SerialLink`](crate::SerialLink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial line speed (baud)
    pub baud_rate: u32,
    /// Deadline for opening the device (ms)
    pub connect_timeout_ms: u64,
    /// Deadline for one read (ms); also the idle wait when there is nothing to do
    pub read_timeout_ms: u64,
    /// Deadline for writing one message (ms)
    pub write_timeout_ms: u64,
    /// Inbound messages kept before new arrivals are dropped
    pub max_unread_messages: usize,
    /// Bytes requested per read; also the longest inbound message accepted
    pub read_buffer_len: usize,
    /// Inbound message terminator
    pub delimiter: u8,
    /// Whether the worker reads at all when it starts
    pub read_enabled: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            connect_timeout_ms: 100,
            read_timeout_ms: 100,
            write_timeout_ms: 100,
            max_unread_messages: 64,
            read_buffer_len: 256,
            delimiter: DEFAULT_DELIMITER,
            read_enabled: false,
        }
    }
}

impl LinkConfig {
    /// Check timeouts and sizes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OutOfRange`] for a timeout outside 1..=60000 ms or a
    /// baud rate outside 300..=4000000, [`ConfigError::InvalidWindow`] for a
    /// zero queue limit or buffer.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_range!("link.baud_rate", self.baud_rate, 300, 4_000_000);
        validate_range!("link.connect_timeout_ms", self.connect_timeout_ms, 1, 60_000);
        validate_range!("link.read_timeout_ms", self.read_timeout_ms, 1, 60_000);
        validate_range!("link.write_timeout_ms", self.write_timeout_ms, 1, 60_000);
        validate!(
            self.max_unread_messages > 0,
            ConfigError::invalid_window("link.max_unread_messages", self.max_unread_messages)
        );
        validate!(
            self.read_buffer_len > 0,
            ConfigError::invalid_window("link.read_buffer_len", self.read_buffer_len)
        );
        Ok(())
    }

    /// Connect deadline.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read deadline.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Write deadline.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
        assert_eq!(config.max_unread_messages, 64);
        assert_eq!(config.delimiter, b'\n');
        assert!(!config.read_enabled);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = LinkConfig {
            write_timeout_ms: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_queue() {
        let config = LinkConfig {
            max_unread_messages: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindow { window: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_zero_baud() {
        let config = LinkConfig {
            baud_rate: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field, .. }) if field == "link.baud_rate"
        ));
    }
}
