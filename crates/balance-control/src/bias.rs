//! Fitted lateral bias polynomials.
//!
//! The bias adds amplitude to the leg on the side the subject needs to shift
//! toward. It is a polynomial in the lateral angle (degrees) between target and
//! CoP, fitted separately for plantarflexion (8 terms) and dorsiflexion
//! (6 terms).

use serde::{Serialize, Serializer};

use crate::types::Channel;

/// Polynomial with coefficients in ascending powers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasPolynomial<const N: usize> {
    coefficients: [f64; N],
}

impl<const N: usize> BiasPolynomial<N> {
    /// Create from `c0 + c1·x + … + c(N-1)·x^(N-1)`.
    pub const fn new(coefficients: [f64; N]) -> Self {
        Self { coefficients }
    }

    /// Evaluate at `x` (Horner's rule).
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc.mul_add(x, *c))
    }

    /// Coefficients, lowest power first.
    pub fn coefficients(&self) -> &[f64; N] {
        &self.coefficients
    }
}

impl<const N: usize> Serialize for BiasPolynomial<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.coefficients.iter())
    }
}

/// Bias polynomials for both muscle groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiasModel {
    /// Plantarflexion channels (a, b)
    pub plantarflexion: BiasPolynomial<8>,
    /// Dorsiflexion channels (c, d)
    pub dorsiflexion: BiasPolynomial<6>,
}

impl BiasModel {
    /// Build from raw coefficient arrays.
    pub const fn new(plantarflexion: [f64; 8], dorsiflexion: [f64; 6]) -> Self {
        Self {
            plantarflexion: BiasPolynomial::new(plantarflexion),
            dorsiflexion: BiasPolynomial::new(dorsiflexion),
        }
    }

    /// Bias for every channel given the signed lateral angle (deg).
    ///
    /// Right-leg channels see `+angle`, left-leg channels `-angle`.
    pub fn channel_bias(&self, lateral_angle_deg: f64) -> [f64; 4] {
        Channel::ALL.map(|ch| {
            let x = if ch.is_right() {
                lateral_angle_deg
            } else {
                -lateral_angle_deg
            };
            if ch.is_plantarflexion() {
                self.plantarflexion.eval(x)
            } else {
                self.dorsiflexion.eval(x)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horner_matches_direct_sum() {
        let p = BiasPolynomial::new([1.0, -2.0, 0.5, 0.25]);
        let x = 1.5f64;
        let direct = 1.0 - 2.0 * x + 0.5 * x * x + 0.25 * x.powi(3);
        assert!((p.eval(x) - direct).abs() < 1e-12);
    }

    #[test]
    fn test_constant_polynomial() {
        let p = BiasPolynomial::new([3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((p.eval(123.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_left_and_right_mirror() {
        let model = BiasModel::new(
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0, 0.0, 0.0],
        );
        let bias = model.channel_bias(3.0);
        assert!((bias[Channel::RightPlantarflexion.index()] - 3.0).abs() < 1e-12);
        assert!((bias[Channel::LeftPlantarflexion.index()] + 3.0).abs() < 1e-12);
        assert!((bias[Channel::RightDorsiflexion.index()] - 6.0).abs() < 1e-12);
        assert!((bias[Channel::LeftDorsiflexion.index()] + 6.0).abs() < 1e-12);
    }
}
