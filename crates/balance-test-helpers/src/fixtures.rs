//! Controller configurations for scenario tests.
//!
//! The defaults mix neural, mechanical and bias terms, which makes exact
//! expectations awkward. These fixtures switch terms off so a test can
//! isolate one contribution.

use balance_control::ControllerConfig;

/// Default anthropometrics with every bias coefficient zeroed.
pub fn neutral_bias_config() -> ControllerConfig {
    ControllerConfig {
        bias_plantarflexion: [0.0; 8],
        bias_dorsiflexion: [0.0; 6],
        ..ControllerConfig::default()
    }
}

/// Neural law only: no mechanical stiffness or damping, no bias, and the
/// given tick rate and ramp length.
pub fn neural_only_config(tick_hz: f64, ramp_duration_s: f64) -> ControllerConfig {
    ControllerConfig {
        mech_stiffness_factor: 0.0,
        mech_damping: 0.0,
        tick_hz,
        ramp_duration_s,
        ..neutral_bias_config()
    }
}

/// Both laws active with no ramp, for tests that look at steady-state output.
pub fn instant_config(tick_hz: f64) -> ControllerConfig {
    ControllerConfig {
        tick_hz,
        ramp_duration_s: 0.0,
        ..neutral_bias_config()
    }
}
