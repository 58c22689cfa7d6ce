//! Per-tick controller output.

use fes_protocol::quantize_amplitude;
use serde::Serialize;

use crate::types::{Channel, CopPoint};

/// Everything the controller computed for one tick.
///
/// Per-channel arrays are indexed by [`Channel::index`] (wire order a..d).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StimulationFrame {
    /// Tick counter since construction
    pub tick: u64,
    /// Filtered CoP fed to the controller
    pub cop: CopPoint,
    /// Target position used this tick
    pub target: CopPoint,
    /// Whether stimulation was enabled for this tick
    pub active: bool,
    /// Target sway angle (rad)
    pub target_angle: f64,
    /// CoP sway angle (rad)
    pub cop_angle: f64,
    /// Quiet-standing sway angle (rad)
    pub quiet_standing_angle: f64,
    /// `target_angle − cop_angle` (rad)
    pub angle_error: f64,
    /// Delayed CoP angular velocity after median filtering (rad/s)
    pub neural_velocity: f64,
    /// Current CoP angular velocity after median filtering (rad/s)
    pub mech_velocity: f64,
    /// Neural torque (N·m)
    pub neural_torque: f64,
    /// Mechanical torque (N·m)
    pub mech_torque: f64,
    /// Lateral angle fed to the bias polynomials (deg)
    pub bias_angle_deg: f64,
    /// Neural contribution per channel
    pub neural: [f64; 4],
    /// Mechanical contribution per channel
    pub mechanical: [f64; 4],
    /// `neural + mechanical`, before bias
    pub raw: [f64; 4],
    /// Polynomial bias per channel
    pub bias: [f64; 4],
    /// `raw + bias` where `raw > 0`, otherwise 0
    pub biased: [f64; 4],
    /// Ramp fraction applied this tick
    pub ramp_fraction: f64,
    /// Ramped and clamped amplitudes
    pub output: [f64; 4],
}

impl StimulationFrame {
    /// Final amplitudes, channels a..d.
    pub fn final_amplitudes(&self) -> [f64; 4] {
        self.output
    }

    /// Final amplitudes rounded onto the stimulator's integer scale.
    pub fn wire_amplitudes(&self) -> [u8; 4] {
        self.output.map(quantize_amplitude)
    }

    /// Final amplitude of one channel.
    pub fn amplitude(&self, channel: Channel) -> f64 {
        self.output[channel.index()]
    }
}
