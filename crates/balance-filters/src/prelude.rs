//! Prelude for the filters crate.
//!
//! ```
//! use balance_filters::prelude::*;
//!
//! let mut median = MedianFilter::new(3).map_err(|e| e.to_string())?;
//! median.process(1.0);
//! # Ok::<(), String>(())
//! ```

pub use crate::cascade::{CascadeFilter, FilterKind, FilterSection};
pub use crate::coefficients::{FilterCoefficients, FilterStage, PassType};
pub use crate::median::MedianFilter;
pub use crate::register::{FirStage, IirStage, ShiftRegister};
