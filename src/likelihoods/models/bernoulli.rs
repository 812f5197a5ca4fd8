//! Bernoulli labels with a probit link: `P(y = 1 | f) = Φ(f)`.
//!
//! Labels are stored internally as `±1` so that `p(y | f) = Φ(y·f)`.
//! Closed-form EP moments and predictive moments exist; the Laplace path is
//! still available through the numerical constructor.
use crate::{
    likelihoods::{
        core::{
            cavity::Cavity,
            mass::{AnalyticalMoments, MassModel},
            results::TiltedMoments,
        },
        errors::{LikError, LikResult},
    },
    optimization::numerical_stability::{
        inv_mills_ratio, inv_mills_shift, log_std_norm_cdf, std_norm_cdf, std_norm_pdf,
    },
};
use ndarray::Array1;

/// Probit-Bernoulli observation model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bernoulli;

impl Bernoulli {
    /// `+1` for positive labels, `−1` otherwise.
    fn sign(obs: f64) -> f64 {
        if obs > 0.0 { 1.0 } else { -1.0 }
    }
}

impl MassModel for Bernoulli {
    fn name(&self) -> &'static str {
        "bernoulli"
    }

    fn is_discrete(&self) -> bool {
        true
    }

    fn validate_observation(&self, obs: f64) -> LikResult<()> {
        if obs == 0.0 || obs == 1.0 || obs == -1.0 {
            return Ok(());
        }
        Err(LikError::InvalidObservation { value: obs, reason: "labels must be 0/1 or -1/1" })
    }

    /// Map `{0, 1}` (or `{−1, 1}`) labels onto `{−1, 1}`.
    fn preprocess_values(&self, y: &Array1<f64>) -> LikResult<Array1<f64>> {
        y.iter()
            .map(|&v| self.validate_observation(v).map(|_| Self::sign(v)))
            .collect::<LikResult<Vec<f64>>>()
            .map(Array1::from)
    }

    fn nlog_mass(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok(-log_std_norm_cdf(Self::sign(obs) * gp))
    }

    fn dnlog_mass_dgp(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let y = Self::sign(obs);
        Ok(-y * inv_mills_ratio(y * gp))
    }

    fn d2nlog_mass_dgp2(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let z = Self::sign(obs) * gp;
        Ok(inv_mills_ratio(z) * inv_mills_shift(z))
    }

    fn mean(&self, gp: f64) -> LikResult<f64> {
        Ok(std_norm_cdf(gp))
    }

    fn dmean_dgp(&self, gp: f64) -> LikResult<f64> {
        Ok(std_norm_pdf(gp))
    }

    fn d2mean_dgp2(&self, gp: f64) -> LikResult<f64> {
        Ok(-gp * std_norm_pdf(gp))
    }

    fn variance(&self, gp: f64) -> LikResult<f64> {
        let p = std_norm_cdf(gp);
        Ok(p * (1.0 - p))
    }

    fn dvariance_dgp(&self, gp: f64) -> LikResult<f64> {
        Ok(std_norm_pdf(gp) * (1.0 - 2.0 * std_norm_cdf(gp)))
    }

    fn d2variance_dgp2(&self, gp: f64) -> LikResult<f64> {
        let phi = std_norm_pdf(gp);
        Ok(-gp * phi * (1.0 - 2.0 * std_norm_cdf(gp)) - 2.0 * phi * phi)
    }
}

impl AnalyticalMoments for Bernoulli {
    fn moments_match_analytical(&self, obs: f64, cavity: &Cavity) -> LikResult<TiltedMoments> {
        self.validate_observation(obs)?;
        let y = Self::sign(obs);
        let s2 = cavity.variance();
        let scale = (1.0 + s2).sqrt();
        let z = y * cavity.mu / scale;
        let r = inv_mills_ratio(z);
        let z_hat = std_norm_cdf(z);
        let mu_hat = cavity.mu + y * s2 * r / scale;
        let sigma2_hat = s2 - s2 * s2 * r * inv_mills_shift(z) / (1.0 + s2);
        TiltedMoments::new(z_hat, mu_hat, sigma2_hat)
    }

    fn predictive_mean_analytical(&self, cavity: &Cavity) -> LikResult<f64> {
        Ok(std_norm_cdf(cavity.mu / (1.0 + cavity.variance()).sqrt()))
    }

    /// A Bernoulli output has `V[Y] = p(1 − p)` with `p = E[Y]`.
    fn predictive_variance_analytical(
        &self, cavity: &Cavity, predictive_mean: Option<f64>,
    ) -> Option<LikResult<f64>> {
        let p = match predictive_mean {
            Some(p) => Ok(p),
            None => self.predictive_mean_analytical(cavity),
        };
        Some(p.map(|p| p * (1.0 - p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Label preprocessing.
    // - Closed-form moments against brute-force quadrature.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `{0, 1}` labels become `{−1, 1}`; anything else is refused.
    //
    // Given
    // -----
    // - `[0, 1, -1]` and `[0, 2]`.
    //
    // Expect
    // ------
    // - `[-1, 1, -1]`, then `InvalidObservation`.
    fn preprocess_maps_labels() {
        let out = Bernoulli.preprocess_values(&array![0.0, 1.0, -1.0]).unwrap();
        assert_eq!(out, array![-1.0, 1.0, -1.0]);
        assert!(matches!(
            Bernoulli.preprocess_values(&array![0.0, 2.0]),
            Err(LikError::InvalidObservation { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Analytical moments agree with a dense Riemann sum of the tilted density.
    //
    // Given
    // -----
    // - Cavity N(0.3, 0.8²), label +1.
    //
    // Expect
    // ------
    // - `Z`, mean and variance within 1e-6.
    fn analytical_moments_match_quadrature() {
        let cavity = Cavity::new(0.3, 0.8).unwrap();
        let m = Bernoulli.moments_match_analytical(1.0, &cavity).unwrap();

        let (lo, hi, n) = (-8.0, 8.0, 160_001);
        let dx = (hi - lo) / (n - 1) as f64;
        let (mut z, mut s1, mut s2) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let f = lo + i as f64 * dx;
            let w = std_norm_pdf(cavity.z(f)) / cavity.sigma * std_norm_cdf(f) * dx;
            z += w;
            s1 += w * f;
            s2 += w * f * f;
        }
        let mean = s1 / z;

        assert_relative_eq!(m.z_hat, z, epsilon = 1e-6);
        assert_relative_eq!(m.mu_hat, mean, epsilon = 1e-6);
        assert_relative_eq!(m.sigma2_hat, s2 / z - mean * mean, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // The site variance stays accurate when the label sits deep in the
    // probit tail.
    //
    // Given
    // -----
    // - Label 1, cavity `tau = 1e-6`, `mu = -1e7`, so `z ≈ -1e4`.
    //
    // Expect
    // ------
    // - `sigma2_hat ≈ (1 + σ²/z²)/(1 + 1/σ²) ≈ 1.01`, the truncated-normal
    //   limit, and a finite `mu_hat` above the cavity mean.
    fn deep_tail_variance_is_accurate() {
        let (tau, mu) = (1e-6, -1e7);
        let cavity = Cavity::from_natural(tau, mu * tau).unwrap();
        let s2 = cavity.variance();
        let z = mu / (1.0 + s2).sqrt();

        let m = Bernoulli.moments_match_analytical(1.0, &cavity).unwrap();

        let expected = (1.0 + s2 / (z * z)) / (1.0 + 1.0 / s2);
        assert_relative_eq!(m.sigma2_hat, expected, max_relative = 1e-6);
        assert!(m.mu_hat.is_finite() && m.mu_hat > mu);
    }
}
