//! Sample sources for the control loop.
//!
//! The real balance board is read by an external acquisition process; the
//! trainer only needs something that yields one [`Sample`] per tick.

use balance_control::{CopPoint, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Board width between the left and right load cells (cm).
pub const BOARD_WIDTH_CM: f64 = 43.3;
/// Board depth between the front and back load cells (cm).
pub const BOARD_DEPTH_CM: f64 = 23.8;

/// Produces one sample per control tick.
pub trait SampleSource {
    /// Sample for the tick at `timestamp_s`, or `None` once exhausted.
    fn next_sample(&mut self, timestamp_s: f64) -> Option<Sample>;
}

/// Split `total_kg` over the four corners so the loads reproduce `cop`.
///
/// Corners are ordered top-left, top-right, bottom-left, bottom-right; the
/// CoP is clamped to the board.
pub fn corner_loads(cop: CopPoint, total_kg: f64) -> [f64; 4] {
    let fx = (cop.x / (BOARD_WIDTH_CM / 2.0)).clamp(-1.0, 1.0);
    let fy = (cop.y / (BOARD_DEPTH_CM / 2.0)).clamp(-1.0, 1.0);
    let q = total_kg / 4.0;
    [
        q * (1.0 - fx) * (1.0 + fy),
        q * (1.0 + fx) * (1.0 + fy),
        q * (1.0 - fx) * (1.0 - fy),
        q * (1.0 + fx) * (1.0 - fy),
    ]
}

/// CoP implied by four corner loads, `None` when nobody is on the board.
pub fn cop_from_corner_loads(loads: [f64; 4]) -> Option<CopPoint> {
    let [tl, tr, bl, br] = loads;
    let total = tl + tr + bl + br;
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let x = (BOARD_WIDTH_CM / 2.0) * ((tr + br) - (tl + bl)) / total;
    let y = (BOARD_DEPTH_CM / 2.0) * ((tl + tr) - (bl + br)) / total;
    Some(CopPoint::new(x, y))
}

/// Synthetic sway: two sinusoids plus uniform noise around a mean position.
#[derive(Debug, Clone)]
pub struct SimulatedSway {
    /// Centre of the sway (cm)
    pub mean: CopPoint,
    /// Sway amplitude on each axis (cm)
    pub amplitude: CopPoint,
    /// Sway frequency on each axis (Hz)
    pub frequency_hz: CopPoint,
    /// Half-width of the uniform noise (cm)
    pub noise_cm: f64,
    /// Subject mass on the board (kg)
    pub mass_kg: f64,
    rng: StdRng,
}

impl SimulatedSway {
    /// Quiet standing with gentle anterior-posterior sway.
    pub fn new(seed: u64) -> Self {
        Self {
            mean: CopPoint::new(0.0, 1.0),
            amplitude: CopPoint::new(0.8, 2.5),
            frequency_hz: CopPoint::new(0.13, 0.21),
            noise_cm: 0.3,
            mass_kg: 70.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_noise(mut self, noise_cm: f64) -> Self {
        self.noise_cm = noise_cm.abs();
        self
    }

    #[must_use]
    pub fn with_mass(mut self, mass_kg: f64) -> Self {
        self.mass_kg = mass_kg;
        self
    }

    fn noise(&mut self) -> f64 {
        if self.noise_cm > 0.0 {
            self.rng.random_range(-self.noise_cm..=self.noise_cm)
        } else {
            0.0
        }
    }
}

impl SampleSource for SimulatedSway {
    fn next_sample(&mut self, timestamp_s: f64) -> Option<Sample> {
        use std::f64::consts::TAU;
        let x = self.mean.x
            + self.amplitude.x * (TAU * self.frequency_hz.x * timestamp_s).sin()
            + self.noise();
        let y = self.mean.y
            + self.amplitude.y * (TAU * self.frequency_hz.y * timestamp_s).sin()
            + self.noise();
        let cop = CopPoint::new(x, y);
        Some(Sample::new(timestamp_s, cop, corner_loads(cop, self.mass_kg)))
    }
}
