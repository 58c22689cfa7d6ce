//! Cascaded Butterworth and moving-average filters.

use balance_errors::{ConfigError, ConfigResult};
use serde::Serialize;

use crate::coefficients::{FilterCoefficients, FilterStage, PassType};
use crate::register::{FirStage, IirStage};

/// Highest supported Butterworth order.
pub const MAX_ORDER: usize = 8;

/// What a [`CascadeFilter`] was built as.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    /// Nth-order Butterworth design
    Butterworth {
        /// Cutoff frequency in Hz
        cutoff_hz: f64,
        /// Sample rate in Hz
        sample_hz: f64,
        /// Number of poles
        order: usize,
        /// Response type
        pass: PassType,
    },
    /// Equal-weight average of the last `window` samples
    MovingAverage {
        /// Number of averaged samples
        window: usize,
    },
}

/// One section of a cascade: coefficients plus its own shift registers.
#[derive(Clone, Debug)]
pub struct FilterSection {
    coefficients: FilterCoefficients,
    fir: FirStage,
    iir: IirStage,
}

impl FilterSection {
    fn new(coefficients: FilterCoefficients) -> Self {
        let fir = FirStage::new(&coefficients.a);
        let iir = IirStage::new(&coefficients.b);
        Self {
            coefficients,
            fir,
            iir,
        }
    }

    /// Coefficients this section was built with.
    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coefficients
    }

    /// Samples passed through unchanged before this section starts filtering.
    pub fn warm_up_len(&self) -> usize {
        let fir = self.coefficients.a.len().saturating_sub(1);
        fir.max(self.coefficients.b.len())
    }

    /// Whether both registers are populated.
    pub fn is_warm(&self) -> bool {
        self.fir.is_warm() && self.iir.is_warm()
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        let feed_forward = self.fir.feed(x);
        let feedback = self.iir.feedback();
        let y = match (feed_forward, feedback) {
            (Some(ff), Some(fb)) => ff - fb,
            _ => x,
        };
        self.iir.record(y);
        y
    }

    fn reset(&mut self) {
        self.fir.reset();
        self.iir.reset();
    }
}

/// Streaming filter made of sections applied in construction order.
///
/// # RT Safety
///
/// - Sections and their registers are allocated in the constructors
/// - [`process`](Self::process) is allocation-free and O(order)
#[derive(Clone, Debug)]
pub struct CascadeFilter {
    kind: FilterKind,
    sections: Vec<FilterSection>,
}

impl CascadeFilter {
    /// Build an `order`-pole Butterworth filter.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidFilterOrder`] unless `1 <= order <= MAX_ORDER`
    /// - [`ConfigError::InvalidCutoff`] unless both rates are finite and
    ///   `0 < cutoff_hz < sample_hz / 2`
    pub fn butterworth(
        cutoff_hz: f64,
        sample_hz: f64,
        order: usize,
        pass: PassType,
    ) -> ConfigResult<Self> {
        if !(1..=MAX_ORDER).contains(&order) {
            return Err(ConfigError::InvalidFilterOrder(order));
        }
        let sections = (0..order.div_ceil(2))
            .map(|section| {
                FilterStage::derive(cutoff_hz, sample_hz, order, section, pass)
                    .map(FilterSection::new)
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            kind: FilterKind::Butterworth {
                cutoff_hz,
                sample_hz,
                order,
                pass,
            },
            sections,
        })
    }

    /// Build a moving average over the last `window` samples.
    ///
    /// The input register holds `window + 1` samples; the oldest carries a
    /// zero tap so the average has unit DC gain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWindow`] if `window` is zero.
    pub fn moving_average(window: usize) -> ConfigResult<Self> {
        if window == 0 {
            return Err(ConfigError::invalid_window("filter.moving_average_window", window));
        }
        let weight = 1.0 / window as f64;
        let mut a = vec![weight; window + 1];
        a[window] = 0.0;
        let coefficients = FilterCoefficients { a, b: Vec::new() };

        Ok(Self {
            kind: FilterKind::MovingAverage { window },
            sections: vec![FilterSection::new(coefficients)],
        })
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.sections.iter_mut().fold(x, |acc, s| s.process(acc))
    }

    /// Return to the cold-start state.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Sections in processing order.
    pub fn sections(&self) -> &[FilterSection] {
        &self.sections
    }

    /// Number of samples after construction or reset that come out unchanged.
    pub fn warm_up_len(&self) -> usize {
        self.sections
            .iter()
            .map(FilterSection::warm_up_len)
            .max()
            .unwrap_or(0)
    }

    /// Whether every section is past its warm-up.
    pub fn is_warm(&self) -> bool {
        self.sections.iter().all(FilterSection::is_warm)
    }

    /// What this filter was built as.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}
