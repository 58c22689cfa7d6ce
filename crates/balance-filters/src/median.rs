//! Sliding-window median filter.

use balance_errors::{ConfigError, ConfigResult};

use crate::register::ShiftRegister;

/// Median of the last `window` samples.
///
/// Until `window` samples have been seen the input is returned unchanged.
/// Even windows return the mean of the two middle values.
///
/// # RT Safety
///
/// - History and sort scratch are allocated in [`MedianFilter::new`]
/// - `process` is O(w log w) with no allocation
#[derive(Clone, Debug)]
pub struct MedianFilter {
    history: ShiftRegister,
    scratch: Box<[f64]>,
}

impl MedianFilter {
    /// Create a median filter over `window` samples.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWindow`] if `window` is zero.
    pub fn new(window: usize) -> ConfigResult<Self> {
        if window == 0 {
            return Err(ConfigError::invalid_window("median.window", window));
        }
        Ok(Self {
            history: ShiftRegister::new(window),
            scratch: vec![0.0; window].into_boxed_slice(),
        })
    }

    /// Push `x` and return the current median.
    pub fn process(&mut self, x: f64) -> f64 {
        self.history.push(x);
        if !self.history.is_full() {
            return x;
        }
        for (dst, src) in self.scratch.iter_mut().zip(self.history.iter()) {
            *dst = src;
        }
        self.scratch.sort_unstable_by(f64::total_cmp);

        let n = self.scratch.len();
        let mid = n / 2;
        if n % 2 == 1 {
            self.scratch[mid]
        } else {
            (self.scratch[mid - 1] + self.scratch[mid]) / 2.0
        }
    }

    /// Forget every sample.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// Window length.
    pub fn window(&self) -> usize {
        self.history.len()
    }

    /// Whether a full window has been seen.
    pub fn is_warm(&self) -> bool {
        self.history.is_full()
    }
}
