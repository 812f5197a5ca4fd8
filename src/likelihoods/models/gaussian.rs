//! Gaussian noise — `y | f ~ N(f, σ_n²)` with a known noise variance.
//!
//! The conjugate case: tilted moments, predictive mean and predictive
//! variance all have closed forms, and every Laplace step is exact because
//! each objective is quadratic in its arguments.
use crate::{
    likelihoods::{
        core::{
            cavity::Cavity,
            mass::{AnalyticalMoments, MassModel},
            results::TiltedMoments,
        },
        errors::{LikError, LikResult},
    },
    optimization::numerical_stability::LN_2PI,
};

/// Gaussian observation model with noise variance `noise_var`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    noise_var: f64,
}

impl Gaussian {
    /// # Errors
    /// [`LikError::InvalidModelParam`] unless `noise_var` is finite and > 0.
    pub fn new(noise_var: f64) -> LikResult<Self> {
        if !(noise_var.is_finite() && noise_var > 0.0) {
            return Err(LikError::InvalidModelParam {
                name: "noise_var",
                value: noise_var,
                reason: "must be finite and > 0",
            });
        }
        Ok(Self { noise_var })
    }

    pub fn noise_var(&self) -> f64 {
        self.noise_var
    }
}

impl MassModel for Gaussian {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn is_discrete(&self) -> bool {
        false
    }

    fn validate_observation(&self, obs: f64) -> LikResult<()> {
        if !obs.is_finite() {
            return Err(LikError::InvalidObservation { value: obs, reason: "must be finite" });
        }
        Ok(())
    }

    fn nlog_mass(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let r = obs - gp;
        Ok(0.5 * r * r / self.noise_var + 0.5 * (LN_2PI + self.noise_var.ln()))
    }

    fn dnlog_mass_dgp(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok((gp - obs) / self.noise_var)
    }

    fn d2nlog_mass_dgp2(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Ok(1.0 / self.noise_var)
    }

    fn dnlog_mass_dobs(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok((obs - gp) / self.noise_var)
    }

    fn d2nlog_mass_dobs2(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Ok(1.0 / self.noise_var)
    }

    fn d2nlog_mass_dcross(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Ok(-1.0 / self.noise_var)
    }

    fn mean(&self, gp: f64) -> LikResult<f64> {
        Ok(gp)
    }

    fn dmean_dgp(&self, _gp: f64) -> LikResult<f64> {
        Ok(1.0)
    }

    fn d2mean_dgp2(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }

    fn variance(&self, _gp: f64) -> LikResult<f64> {
        Ok(self.noise_var)
    }

    fn dvariance_dgp(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }

    fn d2variance_dgp2(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }
}

impl AnalyticalMoments for Gaussian {
    /// Conjugate update: `Z = N(obs; mu, σ² + σ_n²)`, precision-weighted mean.
    fn moments_match_analytical(&self, obs: f64, cavity: &Cavity) -> LikResult<TiltedMoments> {
        self.validate_observation(obs)?;
        let total = cavity.variance() + self.noise_var;
        let r = obs - cavity.mu;
        let z_hat = (-0.5 * r * r / total - 0.5 * (LN_2PI + total.ln())).exp();
        let precision = cavity.precision() + 1.0 / self.noise_var;
        let mu_hat = (cavity.mu * cavity.precision() + obs / self.noise_var) / precision;
        TiltedMoments::new(z_hat, mu_hat, 1.0 / precision)
    }

    fn predictive_mean_analytical(&self, cavity: &Cavity) -> LikResult<f64> {
        Ok(cavity.mu)
    }

    fn predictive_variance_analytical(
        &self, cavity: &Cavity, _predictive_mean: Option<f64>,
    ) -> Option<LikResult<f64>> {
        Some(Ok(cavity.variance() + self.noise_var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Conjugate moments follow the precision-weighted update.
    //
    // Given
    // -----
    // - Noise variance 0.5, cavity from `tau = 2, v = 1`, obs = 0.5.
    //
    // Expect
    // ------
    // - `mu_hat = (2·0.5 + 0.5/0.5) / (2 + 2) = 0.5`, `sigma2_hat = 0.25`, and
    //   `Z = N(0.5; 0.5, 1)`.
    fn conjugate_moments() {
        let model = Gaussian::new(0.5).unwrap();
        let cavity = Cavity::from_natural(2.0, 1.0).unwrap();

        let m = model.moments_match_analytical(0.5, &cavity).unwrap();

        assert_relative_eq!(m.mu_hat, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.sigma2_hat, 0.25, epsilon = 1e-12);
        assert_relative_eq!(m.z_hat, (-0.5 * LN_2PI).exp(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Constructor rejects invalid noise.
    //
    // Given
    // -----
    // - `noise_var = 0` and `NaN`.
    //
    // Expect
    // ------
    // - `InvalidModelParam` for both.
    fn rejects_non_positive_noise() {
        assert!(matches!(Gaussian::new(0.0), Err(LikError::InvalidModelParam { .. })));
        assert!(matches!(Gaussian::new(f64::NAN), Err(LikError::InvalidModelParam { .. })));
    }
}
