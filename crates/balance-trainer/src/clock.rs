//! Fixed-rate tick scheduling.
//!
//! Deadlines are computed from the start instant and the tick index, never
//! by adding a period to the previous wake-up, so sleep jitter does not
//! accumulate. A tick that wakes more than one period late skips the missed
//! deadlines instead of bursting to catch up.

use std::thread;
use std::time::{Duration, Instant};

use balance_errors::{ConfigResult, config::check_range};
use tracing::warn;

/// Timing of one completed wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTiming {
    /// Ticks handed out before this one
    pub tick: u64,
    /// How far past its deadline this tick started
    pub late_by: Duration,
    /// Deadlines skipped because the loop fell more than a period behind
    pub skipped: u64,
    /// Scheduled time of this tick since the clock started (s)
    pub timestamp_s: f64,
}

impl TickTiming {
    /// Whether this tick started more than one period late.
    pub fn is_overrun(&self) -> bool {
        self.skipped > 0
    }
}

/// Absolute-deadline ticker.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick_hz: f64,
    period: Duration,
    start: Instant,
    slot: u64,
    ticks: u64,
    overruns: u64,
}

impl TickClock {
    /// Clock whose first deadline is now.
    ///
    /// # Errors
    ///
    /// `tick_hz` must be finite and within 1..=2000.
    pub fn new(tick_hz: f64) -> ConfigResult<Self> {
        let tick_hz = check_range("session.tick_hz", tick_hz, 1.0, 2000.0)?;
        Ok(Self {
            tick_hz,
            period: Duration::from_secs_f64(1.0 / tick_hz),
            start: Instant::now(),
            slot: 0,
            ticks: 0,
            overruns: 0,
        })
    }

    /// Deadline of schedule slot `slot`.
    pub fn deadline(&self, slot: u64) -> Instant {
        self.start + Duration::from_secs_f64(slot as f64 / self.tick_hz)
    }

    /// Time between deadlines.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks handed out so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Waits that started more than one period late.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Seconds from the start to the current slot's deadline.
    pub fn elapsed_s(&self) -> f64 {
        self.slot as f64 / self.tick_hz
    }

    /// Sleep until the next deadline and report how the wait went.
    pub fn wait(&mut self) -> TickTiming {
        let deadline = self.deadline(self.slot);
        let now = Instant::now();
        if now < deadline {
            thread::sleep(deadline - now);
        }
        let late_by = now.saturating_duration_since(deadline);
        let skipped = self.skipped_slots(late_by);
        if skipped > 0 {
            self.overruns += 1;
            warn!(
                tick = self.ticks,
                late_ms = late_by.as_secs_f64() * 1e3,
                skipped,
                "Control loop overrun"
            );
        }
        self.advance(skipped, late_by)
    }

    /// Take the next tick without sleeping (offline runs).
    pub fn step(&mut self) -> TickTiming {
        self.advance(0, Duration::ZERO)
    }

    fn skipped_slots(&self, late_by: Duration) -> u64 {
        if late_by <= self.period {
            return 0;
        }
        let periods = late_by.as_nanos() / self.period.as_nanos().max(1);
        u64::try_from(periods).unwrap_or(u64::MAX)
    }

    fn advance(&mut self, skipped: u64, late_by: Duration) -> TickTiming {
        let timing = TickTiming {
            tick: self.ticks,
            late_by,
            skipped,
            timestamp_s: self.elapsed_s(),
        };
        self.slot = self.slot.saturating_add(1).saturating_add(skipped);
        self.ticks += 1;
        timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_rate() {
        assert!(TickClock::new(0.0).is_err());
        assert!(TickClock::new(f64::NAN).is_err());
    }

    #[test]
    fn test_deadlines_do_not_drift() {
        let clock = match TickClock::new(20.0) {
            Ok(c) => c,
            Err(e) => panic!("clock: {e}"),
        };
        let span = clock.deadline(72_000) - clock.deadline(0);
        assert_eq!(span, Duration::from_secs(3600));
        assert_eq!(clock.period(), Duration::from_millis(50));
    }

    #[test]
    fn test_wait_paces_ticks() {
        let mut clock = match TickClock::new(500.0) {
            Ok(c) => c,
            Err(e) => panic!("clock: {e}"),
        };
        let started = Instant::now();
        for expected in 0..10 {
            assert_eq!(clock.wait().tick, expected);
        }
        // ten deadlines at 2 ms spacing, the first immediate
        assert!(started.elapsed() >= Duration::from_millis(18));
        assert_eq!(clock.ticks(), 10);
    }

    #[test]
    fn test_stall_is_reported_as_overrun() {
        let mut clock = match TickClock::new(200.0) {
            Ok(c) => c,
            Err(e) => panic!("clock: {e}"),
        };
        clock.wait();
        thread::sleep(Duration::from_millis(30));
        let timing = clock.wait();
        assert!(timing.is_overrun());
        assert!(timing.skipped >= 4);
        assert!(timing.late_by >= Duration::from_millis(20));
        assert_eq!(clock.overruns(), 1);
    }

    #[test]
    fn test_step_does_not_sleep() {
        let mut clock = match TickClock::new(1.0) {
            Ok(c) => c,
            Err(e) => panic!("clock: {e}"),
        };
        let started = Instant::now();
        for _ in 0..5 {
            clock.step();
        }
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(clock.elapsed_s(), 5.0);
        assert_eq!(clock.step().timestamp_s, 5.0);
    }
}
