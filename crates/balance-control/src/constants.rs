//! Biomechanical constants derived once from [`ControllerConfig`].
//!
//! The body is modeled as an inverted pendulum pivoting at the ankles with
//! mass `m = body_mass · ankle_mass_fraction` at height
//! `h = body_height · com_height_fraction`. A CoP position `y` (ankle frame)
//! corresponds to the sway angle `atan2(y, h)`. Gravitational torque is
//! linearized to `m·g·h·angle`, the same stiffness model the mechanical term
//! uses, so a unit stiffness factor reproduces it exactly.

use balance_errors::{ConfigError, ConfigResult};
use serde::Serialize;
use tracing::debug;

use crate::bias::BiasModel;
use crate::config::ControllerConfig;
use crate::ramp::ramp_ticks;
use crate::types::Channel;

/// Torque ranges (N·m) that map onto a channel's full amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TorqueRanges {
    /// Mechanical plantarflexion: zero to the forward-limit torque
    pub mech_plantarflexion: f64,
    /// Mechanical dorsiflexion: quiet standing down to the backward-limit torque
    pub mech_dorsiflexion: f64,
    /// Neural plantarflexion: quiet standing to the forward limit
    pub neural_plantarflexion: f64,
    /// Neural dorsiflexion: backward limit to quiet standing
    pub neural_dorsiflexion: f64,
}

impl TorqueRanges {
    fn check(&self) -> ConfigResult<()> {
        let named = [
            ("mech_plantarflexion", self.mech_plantarflexion),
            ("mech_dorsiflexion", self.mech_dorsiflexion),
            ("neural_plantarflexion", self.neural_plantarflexion),
            ("neural_dorsiflexion", self.neural_dorsiflexion),
        ];
        for (name, value) in named {
            if !(value.is_finite() && value > f64::EPSILON) {
                return Err(ConfigError::degenerate_range(name, value));
            }
        }
        Ok(())
    }
}

/// Every derived quantity the control law needs, computed once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerConstants {
    /// Center-of-mass height above the ankle (m)
    pub com_height_m: f64,
    /// Mass above the ankles (kg)
    pub moving_mass_kg: f64,
    /// Gravitational stiffness `m·g·h` (N·m/rad)
    pub gravity_stiffness: f64,
    /// Moment of inertia about the ankle (kg·m²)
    pub inertia: f64,
    /// Neural proportional gain (N·m/rad)
    pub neural_kp: f64,
    /// Neural derivative gain (N·m·s/rad)
    pub neural_kd: f64,
    /// Mechanical stiffness (N·m/rad)
    pub mech_kp: f64,
    /// Mechanical damping (N·m·s/rad)
    pub mech_kd: f64,
    /// Board-to-ankle shift (m)
    pub ankle_offset_m: f64,
    /// Sway angle at quiet standing (rad)
    pub quiet_standing_angle: f64,
    /// Sway angle at the forward limit of stability (rad)
    pub forward_angle: f64,
    /// Sway angle at the backward limit of stability (rad)
    pub backward_angle: f64,
    /// Gravitational torque at quiet standing (N·m)
    pub quiet_standing_torque: f64,
    /// Gravitational torque at the forward limit (N·m)
    pub forward_torque: f64,
    /// Gravitational torque at the backward limit (N·m)
    pub backward_torque: f64,
    /// Lateral bias angle bound to the left (deg, positive)
    pub left_bias_limit_deg: f64,
    /// Lateral bias angle bound to the right (deg, positive)
    pub right_bias_limit_deg: f64,
    /// Torque ranges behind the slopes
    pub ranges: TorqueRanges,
    /// Amplitude per N·m of mechanical half-torque, channels a..d
    pub mech_slopes: [f64; 4],
    /// Amplitude per N·m of neural half-torque, channels a..d
    pub neural_slopes: [f64; 4],
    /// Per-channel amplitude ceiling, channels a..d
    pub max_amplitude: [f64; 4],
    /// Fitted bias polynomials
    pub bias: BiasModel,
    /// Tick period (s)
    pub dt: f64,
    /// Ticks for the ramp to reach full scale
    pub ramp_ticks: u32,
}

/// `cm → m`
const CM: f64 = 0.01;

impl ControllerConstants {
    /// Derive constants from a configuration.
    ///
    /// # Errors
    ///
    /// - Any error from [`ControllerConfig::validate`]
    /// - [`ConfigError::DegenerateTorqueRange`] when a torque range used as a
    ///   slope denominator is not strictly positive
    pub fn derive(config: &ControllerConfig) -> ConfigResult<Self> {
        config.validate()?;

        let h = config.com_height_m();
        let m = config.body_mass_kg * config.ankle_mass_fraction;
        let mgh = m * config.gravity * h;
        let inertia = config.inertia_coefficient * m * h * h;
        let ankle_offset_m = config.ankle_offset_cm * CM;

        let angle = |y_m: f64| y_m.atan2(h);
        let quiet_standing_angle = angle(config.quiet_standing_cm * CM);
        let forward_angle = angle(config.los_forward_cm * CM + ankle_offset_m);
        let backward_angle = angle(ankle_offset_m - config.los_backward_cm * CM);

        let torque = |theta: f64| mgh * theta;
        let quiet_standing_torque = torque(quiet_standing_angle);
        let forward_torque = torque(forward_angle);
        let backward_torque = torque(backward_angle);

        let ranges = TorqueRanges {
            mech_plantarflexion: forward_torque,
            mech_dorsiflexion: quiet_standing_torque - backward_torque,
            neural_plantarflexion: forward_torque - quiet_standing_torque,
            neural_dorsiflexion: quiet_standing_torque - backward_torque,
        };
        ranges.check()?;

        let slopes = |pf: f64, df: f64| {
            Channel::ALL.map(|ch| {
                let range = if ch.is_plantarflexion() { pf } else { df };
                config.max_amplitude[ch.index()] / (range / 2.0)
            })
        };
        let mech_slopes = slopes(ranges.mech_plantarflexion, ranges.mech_dorsiflexion);
        let neural_slopes = slopes(ranges.neural_plantarflexion, ranges.neural_dorsiflexion);

        let constants = Self {
            com_height_m: h,
            moving_mass_kg: m,
            gravity_stiffness: mgh,
            inertia,
            neural_kp: config.neural_kp_factor * mgh,
            neural_kd: config.neural_kd_factor * inertia,
            mech_kp: config.mech_stiffness_factor * mgh,
            mech_kd: config.mech_damping,
            ankle_offset_m,
            quiet_standing_angle,
            forward_angle,
            backward_angle,
            quiet_standing_torque,
            forward_torque,
            backward_torque,
            left_bias_limit_deg: (config.los_left_cm * CM).atan2(h).to_degrees(),
            right_bias_limit_deg: (config.los_right_cm * CM).atan2(h).to_degrees(),
            ranges,
            mech_slopes,
            neural_slopes,
            max_amplitude: config.max_amplitude,
            bias: BiasModel::new(config.bias_plantarflexion, config.bias_dorsiflexion),
            dt: config.tick_hz.recip(),
            ramp_ticks: ramp_ticks(config.ramp_duration_s, config.tick_hz),
        };

        debug!(
            mgh = constants.gravity_stiffness,
            inertia = constants.inertia,
            neural_kp = constants.neural_kp,
            neural_kd = constants.neural_kd,
            ramp_ticks = constants.ramp_ticks,
            "Derived controller constants"
        );
        Ok(constants)
    }

    /// Sway angle (rad) of a board y position (cm) in the ankle frame.
    #[inline]
    pub fn sway_angle(&self, board_y_cm: f64) -> f64 {
        (board_y_cm * CM + self.ankle_offset_m).atan2(self.com_height_m)
    }

    /// Lateral angle (deg) between target and CoP, clamped to the lateral limits.
    #[inline]
    pub fn lateral_bias_angle(&self, target_x_cm: f64, cop_x_cm: f64) -> f64 {
        ((target_x_cm - cop_x_cm) * CM)
            .atan2(self.com_height_m)
            .to_degrees()
            .clamp(-self.left_bias_limit_deg, self.right_bias_limit_deg)
    }
}
