//! Property-based tests for error construction and context preservation.

use balance_errors::{
    BalanceError, ConfigError, ErrorCategory, ErrorSeverity, LinkError, config::check_range,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_required_message_contains_field(field in "[a-z_.]{1,32}") {
        let msg = ConfigError::required(&field).to_string();
        prop_assert!(msg.contains(&field));
    }

    #[test]
    fn test_config_errors_keep_config_category(field in "[a-z_.]{1,32}") {
        let err = BalanceError::from(ConfigError::non_finite(&field));
        prop_assert_eq!(err.category(), ErrorCategory::Config);
        prop_assert!(err.to_string().contains(&field));
    }

    #[test]
    fn test_check_range_agrees_with_bounds(value in -100.0f64..100.0, lo in -50.0f64..0.0, hi in 0.0f64..50.0) {
        let inside = value >= lo && value <= hi;
        prop_assert_eq!(check_range("v", value, lo, hi).is_ok(), inside);
    }

    #[test]
    fn test_timeout_is_never_critical(ms in 0u64..10_000) {
        let err = LinkError::timeout("dev", ms);
        prop_assert!(err.severity() < ErrorSeverity::Critical);
    }
}
