//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use balance_errors::prelude::*;
//!
//! fn window(len: usize) -> ConfigResult<usize> {
//!     balance_errors::validate!(len > 0, ConfigError::invalid_window("median", len));
//!     Ok(len)
//! }
//!
//! assert!(window(3).is_ok());
//! assert!(window(0).is_err());
//! ```

pub use crate::{
    ConfigResult, LinkResult, Result,
    common::{BalanceError, ErrorCategory, ErrorSeverity},
    config::{ConfigError, check_range},
    link::LinkError,
};

/// Return early with an error if a condition does not hold.
#[macro_export]
macro_rules! validate {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}

/// Return early with an out of range error.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if $value < $min || $value > $max {
            return Err($crate::ConfigError::out_of_range($field, $value, $min, $max).into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_macro() {
        fn test_fn() -> ConfigResult<()> {
            validate!(false, ConfigError::required("test"));
            Ok(())
        }
        assert!(test_fn().is_err());
    }

    #[test]
    fn test_validate_range_macro() {
        fn test_fn(order: usize) -> ConfigResult<()> {
            validate_range!("filter.order", order, 1usize, 8usize);
            Ok(())
        }
        assert!(test_fn(2).is_ok());
        assert!(test_fn(9).is_err());
    }
}
