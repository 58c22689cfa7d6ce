//! Construction-time configuration errors.
//!
//! Every variant here is raised before the first control tick: filters and
//! the stimulation controller validate their parameters when they are built,
//! never on the hot path.

use core::fmt;

use crate::common::ErrorSeverity;

/// Configuration and validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required key is missing from the configuration store
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// A key holds a value of the wrong shape (e.g. a string where a scalar is expected)
    #[error("Invalid type for field '{field}': expected {expected}, got {actual}")]
    InvalidType {
        /// Field name
        field: String,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// A value that must be finite is NaN or infinite
    #[error("Field '{field}' must be finite")]
    NonFinite {
        /// Field name
        field: String,
    },

    /// A torque range used as a slope denominator collapses to zero or below
    #[error("Degenerate torque range '{range}': {value} N·m (must be positive)")]
    DegenerateTorqueRange {
        /// Name of the torque range
        range: String,
        /// The computed range in N·m
        value: f64,
    },

    /// Filter order outside the supported range
    #[error("Invalid filter order {0} (supported: 1..=8)")]
    InvalidFilterOrder(usize),

    /// Cutoff must lie strictly between zero and the Nyquist frequency
    #[error("Invalid cutoff {cutoff_hz} Hz for sample rate {sample_hz} Hz")]
    InvalidCutoff {
        /// Cutoff frequency in Hz
        cutoff_hz: f64,
        /// Sample rate in Hz
        sample_hz: f64,
    },

    /// A window length is zero or otherwise unusable
    #[error("Invalid window for '{field}': {window}")]
    InvalidWindow {
        /// Field name
        field: String,
        /// The requested window length
        window: usize,
    },
}

impl ConfigError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ConfigError::Required(field.into())
    }

    /// Create an invalid type error.
    pub fn invalid_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidType {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ConfigError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a non-finite value error.
    pub fn non_finite(field: impl Into<String>) -> Self {
        ConfigError::NonFinite {
            field: field.into(),
        }
    }

    /// Create a degenerate torque range error.
    pub fn degenerate_range(range: impl Into<String>, value: f64) -> Self {
        ConfigError::DegenerateTorqueRange {
            range: range.into(),
            value,
        }
    }

    /// Create an invalid window error.
    pub fn invalid_window(field: impl Into<String>, window: usize) -> Self {
        ConfigError::InvalidWindow {
            field: field.into(),
            window,
        }
    }
}

/// Check that `value` is finite and inside `[min, max]`.
///
/// # Errors
///
/// Returns [`ConfigError::NonFinite`] or [`ConfigError::OutOfRange`].
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::non_finite(field));
    }
    if value < min || value > max {
        return Err(ConfigError::out_of_range(field, value, min, max));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ConfigError::out_of_range("controller.body_mass_kg", 900.0_f64, 20.0, 250.0);
        let msg = err.to_string();
        assert!(msg.contains("controller.body_mass_kg"));
        assert!(msg.contains("900.0"));
    }

    #[test]
    fn test_required_message() {
        let err = ConfigError::required("filter.order");
        assert_eq!(err.to_string(), "Required field 'filter.order' is missing");
    }

    #[test]
    fn test_check_range_accepts_bounds() {
        assert!(check_range("x", 1.0, 1.0, 2.0).is_ok());
        assert!(check_range("x", 2.0, 1.0, 2.0).is_ok());
    }

    #[test]
    fn test_check_range_rejects_nan() {
        assert_eq!(
            check_range("x", f64::NAN, 0.0, 1.0),
            Err(ConfigError::non_finite("x"))
        );
    }

    #[test]
    fn test_check_range_rejects_outside() {
        assert!(matches!(
            check_range("x", -0.5, 0.0, 1.0),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_config_error_severity() {
        assert_eq!(
            ConfigError::InvalidFilterOrder(0).severity(),
            ErrorSeverity::Error
        );
    }
}
