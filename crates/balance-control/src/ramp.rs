//! Time-based amplitude ramp.

/// Ticks needed to ramp over `duration_s` at `tick_hz`.
///
/// Products within 1e-9 of an integer are not rounded up, so `0.3 s` at
/// `10 Hz` is three ticks rather than four.
pub(crate) fn ramp_ticks(duration_s: f64, tick_hz: f64) -> u32 {
    let ticks = (duration_s * tick_hz - 1e-9).ceil();
    if ticks.is_finite() && ticks > 0.0 {
        ticks.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Linear 0 → 1 ramp advanced once per tick.
///
/// The fraction after `k` calls to [`advance`](Self::advance) is
/// `min(1, k / ceil(duration · tick_hz))`, so it reaches exactly `1.0` and
/// stays there. A zero duration is always at full scale.
///
/// # RT Safety
///
/// - No allocation
/// - O(1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampGenerator {
    total_ticks: u32,
    elapsed: u32,
}

impl RampGenerator {
    /// Create a ramp lasting `duration_s` at `tick_hz`.
    ///
    /// Non-finite or negative durations behave as zero.
    pub fn new(duration_s: f64, tick_hz: f64) -> Self {
        Self::with_ticks(ramp_ticks(duration_s, tick_hz))
    }

    /// Create a ramp lasting `total_ticks` ticks.
    pub const fn with_ticks(total_ticks: u32) -> Self {
        Self {
            total_ticks,
            elapsed: 0,
        }
    }

    /// Move one tick forward and return the new fraction.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        if self.elapsed < self.total_ticks {
            self.elapsed += 1;
        }
        self.fraction()
    }

    /// Current fraction in `[0, 1]`.
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.total_ticks == 0 {
            1.0
        } else {
            f64::from(self.elapsed) / f64::from(self.total_ticks)
        }
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    /// Whether the ramp has reached full scale.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.total_ticks
    }

    /// Ticks from zero to full scale.
    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }
}
