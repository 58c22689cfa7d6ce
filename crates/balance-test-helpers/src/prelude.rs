//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use balance_test_helpers::prelude::*;
//! ```

pub use crate::eventually;
pub use crate::must::{must, must_err, must_parse, must_some, must_with};

#[cfg(feature = "tracking")]
pub use crate::tracking::{AllocationGuard, TrackingAllocator, track};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{instant_config, neural_only_config, neutral_bias_config};

#[cfg(feature = "mock")]
pub use crate::mock::{MockConnector, MockPort, ReadStep};

pub use crate::{assert_all_within, assert_approx_eq, assert_sorted};

#[cfg(feature = "tracking")]
pub use crate::assert_no_alloc;
