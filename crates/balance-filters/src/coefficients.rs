//! Butterworth section coefficients via the bilinear transform.
//!
//! An Nth-order Butterworth filter is realized as `ceil(N/2)` sections. For odd
//! `N` section 0 is first order; every other section is a biquad whose damping
//! is `ζ_k = -cos(π·(2k + N - 1) / (2N))`.
//!
//! The analog cutoff is pre-warped so the digital -3 dB point lands exactly at
//! `cutoff_hz`:
//!
//! ```text
//! wc = 2·fs·tan(π·fc/fs)
//! ```
//!
//! Low-pass sections are derived from the ratio `λ = wc/(2·fs)`. High-pass
//! sections use the inverted cutoff ratio `1/λ` and negate every odd power of
//! `z⁻¹`, which is the same substitution as `s → wc/s` in the analog prototype.
//!
//! Coefficients follow the difference equation
//!
//! ```text
//! y[n] = Σ a[i]·x[n-i] − Σ b[j]·y[n-1-j]
//! ```
//!
//! with the leading denominator term normalized to 1 and not stored.

use std::f64::consts::PI;

use balance_errors::{ConfigError, ConfigResult};
use serde::Serialize;

/// Low- or high-pass response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    /// Attenuate above the cutoff
    LowPass,
    /// Attenuate below the cutoff
    HighPass,
}

/// Feed-forward (`a`) and feedback (`b`) taps for one section.
///
/// `a` has one more entry than `b`: `a[0]` weights the current input, `b[0]`
/// weights the previous output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilterCoefficients {
    /// Feed-forward taps, `x[n]` first
    pub a: Vec<f64>,
    /// Feedback taps, `y[n-1]` first, leading unit term omitted
    pub b: Vec<f64>,
}

impl FilterCoefficients {
    /// Section order (1 or 2 for Butterworth sections).
    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Gain at 0 Hz.
    pub fn dc_gain(&self) -> f64 {
        let num: f64 = self.a.iter().sum();
        let den: f64 = 1.0 + self.b.iter().sum::<f64>();
        num / den
    }

    /// Gain at the Nyquist frequency (`z = -1`).
    pub fn nyquist_gain(&self) -> f64 {
        let alternating = |i: usize| if i % 2 == 0 { 1.0 } else { -1.0 };
        let num: f64 = self
            .a
            .iter()
            .enumerate()
            .map(|(i, v)| alternating(i) * v)
            .sum();
        let den: f64 = 1.0
            + self
                .b
                .iter()
                .enumerate()
                .map(|(j, v)| alternating(j + 1) * v)
                .sum::<f64>();
        num / den
    }

    /// Whether every pole lies strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        match self.b.as_slice() {
            [] => true,
            [b1] => b1.abs() < 1.0,
            // Jury conditions for 1 + b1·z⁻¹ + b2·z⁻²
            [b1, b2] => b2.abs() < 1.0 && b1.abs() < 1.0 + b2,
            _ => false,
        }
    }
}

/// Pre-warped analog cutoff `2·fs·tan(π·fc/fs)` in rad/s.
pub fn warped_cutoff(cutoff_hz: f64, sample_hz: f64) -> f64 {
    2.0 * sample_hz * (PI * cutoff_hz / sample_hz).tan()
}

/// Damping of the `k`-th biquad (1-based) of an `order`-pole Butterworth filter.
pub fn pole_zeta(k: usize, order: usize) -> f64 {
    let k = k as f64;
    let n = order as f64;
    -(PI * (2.0 * k + n - 1.0) / (2.0 * n)).cos()
}

/// Coefficient derivation for a single Butterworth section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterStage {
    /// Cutoff frequency in Hz
    pub cutoff_hz: f64,
    /// Sample rate in Hz
    pub sample_hz: f64,
    /// Order of the whole filter this section belongs to
    pub order: usize,
    /// Section index in construction order
    pub section: usize,
    /// Response type
    pub pass: PassType,
}

impl FilterStage {
    /// Derive section `section` of an `order`-pole Butterworth design.
    ///
    /// For odd `order`, section 0 is the first-order section; the remaining
    /// sections are biquads with pole index `k = section` (odd) or
    /// `k = section + 1` (even).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidFilterOrder`] if `order` is zero
    /// - [`ConfigError::InvalidCutoff`] unless `0 < cutoff_hz < sample_hz / 2`
    /// - [`ConfigError::OutOfRange`] if `section >= ceil(order / 2)`
    pub fn derive(
        cutoff_hz: f64,
        sample_hz: f64,
        order: usize,
        section: usize,
        pass: PassType,
    ) -> ConfigResult<FilterCoefficients> {
        let stage = Self {
            cutoff_hz,
            sample_hz,
            order,
            section,
            pass,
        };
        stage.validate()?;
        Ok(stage.coefficients())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.order == 0 {
            return Err(ConfigError::InvalidFilterOrder(self.order));
        }
        let valid_rate = self.sample_hz.is_finite() && self.sample_hz > 0.0;
        let valid_cutoff = self.cutoff_hz.is_finite()
            && self.cutoff_hz > 0.0
            && self.cutoff_hz < self.sample_hz / 2.0;
        if !(valid_rate && valid_cutoff) {
            return Err(ConfigError::InvalidCutoff {
                cutoff_hz: self.cutoff_hz,
                sample_hz: self.sample_hz,
            });
        }
        let sections = self.order.div_ceil(2);
        if self.section >= sections {
            return Err(ConfigError::out_of_range(
                "filter.section",
                self.section,
                0,
                sections - 1,
            ));
        }
        Ok(())
    }

    /// Whether this is the leading first-order section of an odd-order design.
    pub fn is_first_order(&self) -> bool {
        self.order % 2 == 1 && self.section == 0
    }

    /// 1-based biquad pole index, or `None` for the first-order section.
    pub fn pole_index(&self) -> Option<usize> {
        if self.is_first_order() {
            None
        } else if self.order % 2 == 1 {
            Some(self.section)
        } else {
            Some(self.section + 1)
        }
    }

    fn coefficients(&self) -> FilterCoefficients {
        let lambda = warped_cutoff(self.cutoff_hz, self.sample_hz) / (2.0 * self.sample_hz);
        let ratio = match self.pass {
            PassType::LowPass => lambda,
            PassType::HighPass => lambda.recip(),
        };

        let mut coeffs = match self.pole_index() {
            None => first_order_lowpass(ratio),
            Some(k) => biquad_lowpass(ratio, pole_zeta(k, self.order)),
        };

        if self.pass == PassType::HighPass {
            // z⁻¹ → −z⁻¹: a[1] and b[0] carry the odd powers
            for (i, v) in coeffs.a.iter_mut().enumerate() {
                if i % 2 == 1 {
                    *v = -*v;
                }
            }
            for (j, v) in coeffs.b.iter_mut().enumerate() {
                if j % 2 == 0 {
                    *v = -*v;
                }
            }
        }
        coeffs
    }
}

/// `r·(1 + z⁻¹) / ((1 + r) + (r − 1)·z⁻¹)`
fn first_order_lowpass(r: f64) -> FilterCoefficients {
    let a0 = 1.0 + r;
    FilterCoefficients {
        a: vec![r / a0, r / a0],
        b: vec![(r - 1.0) / a0],
    }
}

/// `r²·(1 + 2z⁻¹ + z⁻²) / ((1 + 2ζr + r²) + (2r² − 2)·z⁻¹ + (1 − 2ζr + r²)·z⁻²)`
fn biquad_lowpass(r: f64, zeta: f64) -> FilterCoefficients {
    let r2 = r * r;
    let a0 = 1.0 + 2.0 * zeta * r + r2;
    FilterCoefficients {
        a: vec![r2 / a0, 2.0 * r2 / a0, r2 / a0],
        b: vec![(2.0 * r2 - 2.0) / a0, (1.0 - 2.0 * zeta * r + r2) / a0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(order: usize, section: usize, pass: PassType) -> FilterCoefficients {
        match FilterStage::derive(0.4615, 20.0, order, section, pass) {
            Ok(c) => c,
            Err(e) => panic!("derive failed: {e}"),
        }
    }

    #[test]
    fn test_warped_cutoff_approaches_analog_at_low_frequency() {
        let wc = warped_cutoff(0.1, 1000.0);
        assert!((wc - 2.0 * PI * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_pole_zeta_second_order() {
        assert!((pole_zeta(1, 2) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_pole_zeta_fourth_order() {
        assert!((pole_zeta(1, 4) - 0.382_683_432_365_089_8).abs() < 1e-12);
        assert!((pole_zeta(2, 4) - 0.923_879_532_511_286_7).abs() < 1e-12);
    }

    #[test]
    fn test_pole_zeta_third_order_biquad() {
        assert!((pole_zeta(1, 3) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_lowpass_unit_dc_gain() {
        for order in 1..=6_usize {
            for section in 0..order.div_ceil(2) {
                let c = derive(order, section, PassType::LowPass);
                assert!((c.dc_gain() - 1.0).abs() < 1e-12, "order {order} section {section}");
                assert!(c.nyquist_gain().abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_highpass_blocks_dc() {
        for order in 1..=6_usize {
            for section in 0..order.div_ceil(2) {
                let c = derive(order, section, PassType::HighPass);
                assert!(c.dc_gain().abs() < 1e-12, "order {order} section {section}");
                assert!((c.nyquist_gain() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_sections_are_stable() {
        for order in 1..=8_usize {
            for section in 0..order.div_ceil(2) {
                assert!(derive(order, section, PassType::LowPass).is_stable());
                assert!(derive(order, section, PassType::HighPass).is_stable());
            }
        }
    }

    #[test]
    fn test_odd_order_leading_section_is_first_order() {
        let c = derive(3, 0, PassType::LowPass);
        assert_eq!(c.order(), 1);
        assert_eq!(c.a.len(), 2);
        let c = derive(3, 1, PassType::LowPass);
        assert_eq!(c.order(), 2);
    }

    #[test]
    fn test_rejects_cutoff_at_nyquist() {
        let err = FilterStage::derive(10.0, 20.0, 2, 0, PassType::LowPass);
        assert!(matches!(err, Err(ConfigError::InvalidCutoff { .. })));
    }

    #[test]
    fn test_rejects_section_out_of_range() {
        let err = FilterStage::derive(1.0, 20.0, 2, 1, PassType::LowPass);
        assert!(matches!(err, Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_zero_order() {
        let err = FilterStage::derive(1.0, 20.0, 0, 0, PassType::LowPass);
        assert_eq!(err, Err(ConfigError::InvalidFilterOrder(0)));
    }
}
