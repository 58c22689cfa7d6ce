//! Controller configuration.
//!
//! Distances are in centimeters on the board surface, the body in meters and
//! kilograms. Every field has a default so a partial configuration file only
//! needs to name what differs.

use balance_errors::{ConfigError, ConfigResult, config::check_range, validate};
use fes_protocol::MAX_AMPLITUDE;
use serde::{Deserialize, Serialize};

/// Scalar inputs to [`ControllerConstants`](crate::ControllerConstants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Standing height (m)
    pub body_height_m: f64,
    /// Total body mass (kg)
    pub body_mass_kg: f64,
    /// Fraction of body mass above the ankles
    pub ankle_mass_fraction: f64,
    /// Center-of-mass height as a fraction of body height
    pub com_height_fraction: f64,
    /// Moment of inertia about the ankle as a multiple of `m·h²`
    pub inertia_coefficient: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Distance from the board origin forward to the ankle axis (cm)
    pub ankle_offset_cm: f64,
    /// Quiet-standing CoP position in the ankle frame (cm)
    pub quiet_standing_cm: f64,
    /// Forward limit of stability from the board origin (cm)
    pub los_forward_cm: f64,
    /// Backward limit of stability from the board origin (cm)
    pub los_backward_cm: f64,
    /// Leftward limit of stability (cm)
    pub los_left_cm: f64,
    /// Rightward limit of stability (cm)
    pub los_right_cm: f64,
    /// Per-channel amplitude ceiling, channels a..d
    pub max_amplitude: [f64; 4],
    /// Plantarflexion bias polynomial, ascending powers of the lateral angle in degrees
    pub bias_plantarflexion: [f64; 8],
    /// Dorsiflexion bias polynomial, ascending powers of the lateral angle in degrees
    pub bias_dorsiflexion: [f64; 6],
    /// Neural proportional gain as a multiple of `m·g·h`
    pub neural_kp_factor: f64,
    /// Neural derivative gain as a multiple of the ankle inertia (1/s)
    pub neural_kd_factor: f64,
    /// Mechanical stiffness as a multiple of `m·g·h`
    pub mech_stiffness_factor: f64,
    /// Mechanical damping gain (N·m·s/rad)
    pub mech_damping: f64,
    /// Median window applied to both derivative estimates
    pub derivative_median_window: usize,
    /// Time for the ramp to go from 0 to full scale (s)
    pub ramp_duration_s: f64,
    /// Control tick rate (Hz)
    pub tick_hz: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            body_height_m: 1.75,
            body_mass_kg: 70.0,
            ankle_mass_fraction: 0.971,
            com_height_fraction: 0.5587,
            inertia_coefficient: 1.0,
            gravity: 9.81,
            ankle_offset_cm: 5.0,
            quiet_standing_cm: 5.0,
            los_forward_cm: 12.0,
            los_backward_cm: 6.0,
            los_left_cm: 10.0,
            los_right_cm: 10.0,
            max_amplitude: [40.0, 40.0, 30.0, 30.0],
            bias_plantarflexion: [0.0, 0.35, 0.012, -1.1e-3, -4.0e-5, 2.1e-6, 0.0, 0.0],
            bias_dorsiflexion: [0.0, 0.25, 8.0e-3, -7.0e-4, 0.0, 0.0],
            neural_kp_factor: 1.0,
            neural_kd_factor: 0.5,
            mech_stiffness_factor: 1.0,
            mech_damping: 20.0,
            derivative_median_window: 3,
            ramp_duration_s: 3.0,
            tick_hz: 20.0,
        }
    }
}

impl ControllerConfig {
    /// Check every field is finite and physically plausible.
    ///
    /// Torque ranges are checked separately by
    /// [`ControllerConstants::derive`](crate::ControllerConstants::derive),
    /// which needs the derived angles.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("controller.body_height_m", self.body_height_m, 0.5, 2.5)?;
        check_range("controller.body_mass_kg", self.body_mass_kg, 10.0, 300.0)?;
        check_range("controller.ankle_mass_fraction", self.ankle_mass_fraction, 0.5, 1.0)?;
        check_range("controller.com_height_fraction", self.com_height_fraction, 0.3, 0.8)?;
        check_range("controller.inertia_coefficient", self.inertia_coefficient, 0.1, 5.0)?;
        check_range("controller.gravity", self.gravity, 1.0, 20.0)?;
        check_range("controller.ankle_offset_cm", self.ankle_offset_cm, -30.0, 30.0)?;
        check_range("controller.quiet_standing_cm", self.quiet_standing_cm, -30.0, 30.0)?;
        check_range("controller.los_forward_cm", self.los_forward_cm, 0.0, 50.0)?;
        check_range("controller.los_backward_cm", self.los_backward_cm, 0.0, 50.0)?;
        check_range("controller.los_left_cm", self.los_left_cm, 0.0, 50.0)?;
        check_range("controller.los_right_cm", self.los_right_cm, 0.0, 50.0)?;
        for (i, max) in self.max_amplitude.iter().enumerate() {
            check_range(
                &format!("controller.max_amplitude.{i}"),
                *max,
                0.0,
                f64::from(MAX_AMPLITUDE),
            )?;
        }
        for (i, c) in self.bias_plantarflexion.iter().enumerate() {
            validate!(
                c.is_finite(),
                ConfigError::non_finite(format!("controller.bias_plantarflexion.{i}"))
            );
        }
        for (i, c) in self.bias_dorsiflexion.iter().enumerate() {
            validate!(
                c.is_finite(),
                ConfigError::non_finite(format!("controller.bias_dorsiflexion.{i}"))
            );
        }
        check_range("controller.neural_kp_factor", self.neural_kp_factor, 0.0, 100.0)?;
        check_range("controller.neural_kd_factor", self.neural_kd_factor, 0.0, 100.0)?;
        check_range("controller.mech_stiffness_factor", self.mech_stiffness_factor, 0.0, 100.0)?;
        check_range("controller.mech_damping", self.mech_damping, 0.0, 1000.0)?;
        validate!(
            self.derivative_median_window >= 1,
            ConfigError::invalid_window(
                "controller.derivative_median_window",
                self.derivative_median_window
            )
        );
        check_range("controller.ramp_duration_s", self.ramp_duration_s, 0.0, 600.0)?;
        check_range("controller.tick_hz", self.tick_hz, 1.0, 2000.0)?;
        Ok(())
    }

    /// Center-of-mass height above the ankle (m).
    pub fn com_height_m(&self) -> f64 {
        self.body_height_m * self.com_height_fraction
    }
}
