//! The stimulation control law.

use balance_errors::ConfigResult;
use balance_filters::MedianFilter;
use tracing::{debug, trace};

use crate::config::ControllerConfig;
use crate::constants::ControllerConstants;
use crate::frame::StimulationFrame;
use crate::history::{CopHistory, backward_difference};
use crate::ramp::RampGenerator;
use crate::session::SessionState;
use crate::types::{Channel, CopPoint};

/// History slot where the mechanical (current) velocity window starts.
const MECH_WINDOW: usize = 0;
/// History slot where the neural (delayed) velocity window starts.
const NEURAL_WINDOW: usize = 2;

/// Converts filtered CoP and a target into four stimulation amplitudes.
///
/// One instance per session, stepped once per control tick from a single
/// thread.
///
/// # RT Safety
///
/// - Median filters and history are allocated in [`StimulationController::new`]
/// - [`step`](Self::step) is infallible and allocation-free
#[derive(Debug, Clone)]
pub struct StimulationController {
    constants: ControllerConstants,
    history: CopHistory,
    neural_median: MedianFilter,
    mech_median: MedianFilter,
    ramp: RampGenerator,
    seen_generation: Option<u64>,
    tick: u64,
}

impl StimulationController {
    /// Validate `config`, derive constants and build the controller.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`](balance_errors::ConfigError) from
    /// [`ControllerConstants::derive`].
    pub fn new(config: &ControllerConfig) -> ConfigResult<Self> {
        let constants = ControllerConstants::derive(config)?;
        let ramp = RampGenerator::with_ticks(constants.ramp_ticks);
        debug!(
            tick_hz = config.tick_hz,
            ramp_s = config.ramp_duration_s,
            "Stimulation controller ready"
        );
        Ok(Self {
            constants,
            history: CopHistory::new(),
            neural_median: MedianFilter::new(config.derivative_median_window)?,
            mech_median: MedianFilter::new(config.derivative_median_window)?,
            ramp,
            seen_generation: None,
            tick: 0,
        })
    }

    /// Derived constants.
    pub fn constants(&self) -> &ControllerConstants {
        &self.constants
    }

    /// Restart the ramp as if the target had just changed.
    pub fn notify_target_changed(&mut self) {
        self.ramp.reset();
    }

    /// Forget history, derivative filters and ramp progress.
    pub fn reset(&mut self) {
        self.history.reset();
        self.neural_median.reset();
        self.mech_median.reset();
        self.ramp.reset();
        self.seen_generation = None;
        self.tick = 0;
    }

    /// Run the control law for one tick.
    pub fn step(&mut self, cop: CopPoint, session: &SessionState) -> StimulationFrame {
        let k = &self.constants;
        let target = session.target();

        if self.seen_generation != Some(session.generation()) {
            if self.seen_generation.is_some() {
                trace!(generation = session.generation(), "Target changed, ramp restarted");
            }
            self.seen_generation = Some(session.generation());
            self.ramp.reset();
        }

        let target_angle = k.sway_angle(target.y);
        let cop_angle = k.sway_angle(cop.y);
        let angle_error = target_angle - cop_angle;

        self.history.push(cop_angle);
        let neural_velocity = match self.history.window(NEURAL_WINDOW) {
            Some(w) => self.neural_median.process(backward_difference(w, k.dt)),
            None => 0.0,
        };
        let mech_velocity = match self.history.window(MECH_WINDOW) {
            Some(w) => self.mech_median.process(backward_difference(w, k.dt)),
            None => 0.0,
        };

        let neural_torque = k.neural_kp * angle_error + k.neural_kd * neural_velocity;
        let mech_torque = k.mech_kp * cop_angle + k.mech_kd * mech_velocity;

        let neural_half = neural_torque / 2.0;
        let mech_half = mech_torque / 2.0;
        let quiet_half = k.quiet_standing_torque / 2.0;

        let neural_pf = if cop_angle > 0.0 { neural_half } else { 0.0 };
        let neural_df = if cop_angle < k.quiet_standing_angle {
            -neural_half
        } else {
            0.0
        };
        let mech_pf = if mech_half > 0.0 { mech_half } else { 0.0 };
        // dorsiflexion makes up the shortfall below quiet standing
        let mech_df = if mech_half < quiet_half {
            quiet_half - mech_half
        } else {
            0.0
        };

        let neural = Channel::ALL.map(|ch| {
            let torque = if ch.is_plantarflexion() { neural_pf } else { neural_df };
            k.neural_slopes[ch.index()] * torque
        });
        let mechanical = Channel::ALL.map(|ch| {
            let torque = if ch.is_plantarflexion() { mech_pf } else { mech_df };
            k.mech_slopes[ch.index()] * torque
        });
        let raw: [f64; 4] = core::array::from_fn(|i| neural[i] + mechanical[i]);

        let bias_angle_deg = k.lateral_bias_angle(target.x, cop.x);
        let bias = k.bias.channel_bias(bias_angle_deg);
        let biased: [f64; 4] =
            core::array::from_fn(|i| if raw[i] > 0.0 { raw[i] + bias[i] } else { 0.0 });

        let active = !session.is_condition_done();
        let ramp_fraction = if active {
            self.ramp.advance()
        } else {
            self.ramp.reset();
            0.0
        };
        let output: [f64; 4] = core::array::from_fn(|i| {
            let scaled = biased[i] * ramp_fraction;
            if scaled.is_nan() {
                0.0
            } else {
                scaled.clamp(0.0, k.max_amplitude[i])
            }
        });

        let frame = StimulationFrame {
            tick: self.tick,
            cop,
            target,
            active,
            target_angle,
            cop_angle,
            quiet_standing_angle: k.quiet_standing_angle,
            angle_error,
            neural_velocity,
            mech_velocity,
            neural_torque,
            mech_torque,
            bias_angle_deg,
            neural,
            mechanical,
            raw,
            bias,
            biased,
            ramp_fraction,
            output,
        };
        self.tick = self.tick.wrapping_add(1);
        trace!(
            tick = frame.tick,
            error = angle_error,
            ramp = ramp_fraction,
            a = output[0],
            b = output[1],
            c = output[2],
            d = output[3],
            "Controller step"
        );
        frame
    }
}
