//! One training session: filters, controller and stimulator link.

use balance_control::{CopPoint, Sample, SessionState, StimulationController, StimulationFrame};
use balance_errors::{ConfigResult, LinkResult};
use balance_filters::CascadeFilter;
use balance_link::{LinkState, LinkStats, SerialLink};
use fes_protocol::StimCodec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TrainerConfig;

/// Result of one control tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickReport {
    /// The input sample with its filtered CoP filled in
    pub sample: Sample,
    /// Controller output for the filtered CoP, as sent to the link
    pub frame: StimulationFrame,
}

/// Owns the per-session control pipeline.
///
/// Each tick filters the raw CoP on both axes, steps the controller and, with
/// a link attached, enqueues exactly four channel commands. Shutdown enqueues
/// the all-zero burst once; dropping an unfinished session does the same.
#[derive(Debug)]
pub struct ControlSession {
    filter_x: CascadeFilter,
    filter_y: CascadeFilter,
    controller: StimulationController,
    codec: StimCodec,
    link: Option<SerialLink>,
    shutdown_sent: bool,
    ticks: u64,
    replies: u64,
}

impl ControlSession {
    /// Build the pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Any filter or controller construction error.
    pub fn new(config: &TrainerConfig, link: Option<SerialLink>) -> ConfigResult<Self> {
        let session = Self {
            filter_x: config.filter.build()?,
            filter_y: config.filter.build()?,
            controller: StimulationController::new(&config.controller)?,
            codec: StimCodec::new(config.link.delimiter),
            link,
            shutdown_sent: false,
            ticks: 0,
            replies: 0,
        };
        info!(
            filter = ?session.filter_x.kind(),
            linked = session.link.is_some(),
            "Control session ready"
        );
        Ok(session)
    }

    /// Run one control tick.
    ///
    /// # Errors
    ///
    /// [`LinkError::NotRunning`](balance_errors::LinkError::NotRunning) if the
    /// link has stopped; the session should then be finished.
    pub fn tick(&mut self, sample: &Sample, state: &SessionState) -> LinkResult<TickReport> {
        let filtered = CopPoint::new(
            self.filter_x.process(sample.raw_cop.x),
            self.filter_y.process(sample.raw_cop.y),
        );
        let sample = sample.with_filtered(filtered);
        let frame = self.controller.step(filtered, state);

        if let Some(link) = &self.link {
            for msg in self.codec.encode_frame(frame.wire_amplitudes()) {
                link.send(msg)?;
            }
            while let Some(reply) = link.poll() {
                self.replies += 1;
                debug!(?reply, "Stimulator reply");
            }
        }
        self.ticks += 1;
        Ok(TickReport { sample, frame })
    }

    /// Restart the ramp after an external target change.
    pub fn notify_target_changed(&mut self) {
        self.controller.notify_target_changed();
    }

    /// Enqueue the all-zero burst (once) and ask the link to stop.
    ///
    /// # Errors
    ///
    /// [`LinkError::NotRunning`](balance_errors::LinkError::NotRunning) if
    /// the link stopped before the burst could be queued.
    pub fn shutdown(&mut self) -> LinkResult<()> {
        if self.shutdown_sent {
            return Ok(());
        }
        self.shutdown_sent = true;
        let Some(link) = &self.link else {
            return Ok(());
        };
        let queued = self
            .codec
            .shutdown_burst()
            .into_iter()
            .try_for_each(|msg| link.send(msg));
        link.request_stop();
        info!(ticks = self.ticks, "Session shutdown");
        queued
    }

    /// Shut down and wait for the link to drain and close.
    ///
    /// # Errors
    ///
    /// The shutdown error, or the error that ended the link worker.
    pub fn finish(mut self) -> LinkResult<()> {
        let shutdown = self.shutdown();
        let joined = match self.link.take() {
            Some(link) => link.join(),
            None => Ok(()),
        };
        shutdown.and(joined)
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Inbound messages seen from the stimulator.
    pub fn replies(&self) -> u64 {
        self.replies
    }

    /// Current link state; `None` for a dry run.
    pub fn link_state(&self) -> Option<LinkState> {
        self.link.as_ref().map(SerialLink::state)
    }

    /// Link counters; `None` for a dry run.
    pub fn link_stats(&self) -> Option<LinkStats> {
        self.link.as_ref().map(SerialLink::stats)
    }

    /// Whether the shutdown burst has been queued.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_sent
    }
}

impl Drop for ControlSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Could not send shutdown burst");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_test_helpers::{assert_approx_eq, must};

    fn offline(config: &TrainerConfig) -> ControlSession {
        must(ControlSession::new(config, None))
    }

    #[test]
    fn test_tick_fills_filtered_cop() {
        let config = TrainerConfig::default();
        let mut session = offline(&config);
        let state = SessionState::new(config.session.target());
        let sample = Sample::new(0.0, CopPoint::new(1.0, 2.0), [17.5; 4]);

        let report = must(session.tick(&sample, &state));
        // cold start passes the first sample through
        assert_eq!(report.sample.filtered_cop, Some(CopPoint::new(1.0, 2.0)));
        assert_eq!(report.sample.raw_cop, sample.raw_cop);
        assert_eq!(report.frame.cop, CopPoint::new(1.0, 2.0));
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_filtered_cop_converges_on_constant_input() {
        let config = TrainerConfig::default();
        let mut session = offline(&config);
        let state = SessionState::new(config.session.target());
        let sample = Sample::new(0.0, CopPoint::new(-2.0, 3.0), [17.5; 4]);

        let mut last = None;
        for _ in 0..400 {
            last = Some(must(session.tick(&sample, &state)));
        }
        let cop = last.and_then(|r| r.sample.filtered_cop);
        let cop = balance_test_helpers::must_some(cop, "filtered");
        assert_approx_eq!(cop.x, -2.0, 1e-6);
        assert_approx_eq!(cop.y, 3.0, 1e-6);
    }

    #[test]
    fn test_offline_shutdown_is_idempotent() {
        let mut session = offline(&TrainerConfig::default());
        assert!(!session.is_shutdown());
        must(session.shutdown());
        must(session.shutdown());
        assert!(session.is_shutdown());
        assert_eq!(session.link_state(), None);
        must(session.finish());
    }
}
