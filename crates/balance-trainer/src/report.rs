//! Per-run summary.

use balance_link::LinkStats;
use serde::Serialize;

use crate::clock::TickTiming;
use crate::session::TickReport;

/// Aggregate of a finished run, printed by the CLI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Ticks requested
    pub planned_ticks: u64,
    /// Ticks executed
    pub ticks: u64,
    /// Ticks that started after their deadline
    pub overruns: u64,
    /// Deadlines skipped across all overruns
    pub skipped: u64,
    /// Worst lateness of any tick (ms)
    pub max_late_ms: f64,
    /// Mean commanded amplitude per channel a..d
    pub mean_output: [f64; 4],
    /// Largest commanded amplitude per channel a..d
    pub peak_output: [f64; 4],
    /// Link counters at shutdown; absent for dry runs
    pub link: Option<LinkStats>,
    /// Error that ended the run early
    pub aborted: Option<String>,
}

impl RunSummary {
    /// Empty summary for a run of `planned_ticks`.
    pub fn new(planned_ticks: u64) -> Self {
        Self {
            planned_ticks,
            ..Self::default()
        }
    }

    /// Fold one tick in.
    pub fn record(&mut self, report: &TickReport, timing: &TickTiming) {
        self.ticks += 1;
        self.skipped += timing.skipped;
        if timing.is_overrun() {
            self.overruns += 1;
        }
        self.max_late_ms = self.max_late_ms.max(timing.late_by.as_secs_f64() * 1e3);

        let n = self.ticks as f64;
        for (i, out) in report.frame.output.iter().enumerate() {
            self.mean_output[i] += (out - self.mean_output[i]) / n;
            self.peak_output[i] = self.peak_output[i].max(*out);
        }
    }

    /// Whether every planned tick ran.
    pub fn completed(&self) -> bool {
        self.aborted.is_none() && self.ticks == self.planned_ticks
    }
}
