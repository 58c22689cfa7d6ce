//! Unit tests for error classification and construction helpers.

use balance_errors::prelude::*;

#[test]
fn test_config_error_into_balance_error() {
    let err: BalanceError = ConfigError::degenerate_range("neural_plantarflexion", 0.0).into();
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(err.is_recoverable());
}

#[test]
fn test_link_disconnect_is_not_recoverable() {
    let err: BalanceError = LinkError::disconnected("/dev/ttyACM0").into();
    assert_eq!(err.severity(), ErrorSeverity::Critical);
    assert!(!err.is_recoverable());
}

#[test]
fn test_io_error_keeps_path() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
    let err = BalanceError::io("trainer.yaml", io);
    assert_eq!(err.category(), ErrorCategory::IO);
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert!(err.to_string().contains("trainer.yaml"));
}

#[test]
fn test_document_errors_classify_as_config() {
    let err = BalanceError::format("JSON", "expected value at line 1 column 1");
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(err.is_recoverable());
}

#[test]
fn test_other_is_uncategorised() {
    let err = BalanceError::other("no stimulator device given");
    assert_eq!(err.category(), ErrorCategory::Other);
}

#[test]
fn test_invalid_cutoff_fields() {
    let err = ConfigError::InvalidCutoff {
        cutoff_hz: 12.0,
        sample_hz: 20.0,
    };
    let text = err.to_string();
    assert!(text.contains("12"));
    assert!(text.contains("20"));
}

#[test]
fn test_invalid_window_helper() {
    assert_eq!(
        ConfigError::invalid_window("filter.window", 0),
        ConfigError::InvalidWindow {
            field: "filter.window".to_string(),
            window: 0,
        }
    );
}

#[test]
fn test_check_range_returns_value() {
    let v = check_range("controller.ramp_seconds", 3.0, 0.0, 60.0);
    assert_eq!(v, Ok(3.0));
}
