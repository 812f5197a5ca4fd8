//! Cavity — validated Gaussian belief about a scalar latent value.
//!
//! A cavity arrives either in moment form `(mu, sigma)` or in EP's natural
//! form `(tau, v)` with `mu = v / tau` and `sigma = sqrt(1 / tau)`. It is
//! rebuilt on every call and never stored.
use crate::likelihoods::{
    core::validation::{
        validate_cavity_mean, validate_natural_mean, validate_precision, validate_sigma,
    },
    errors::{LikError, LikResult},
};
use statrs::distribution::{ContinuousCDF, Normal};

/// Gaussian cavity `N(mu, sigma²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cavity {
    pub mu: f64,
    pub sigma: f64,
}

impl Cavity {
    /// Build a cavity from its mean and standard deviation.
    ///
    /// # Errors
    /// - [`LikError::InvalidCavityMean`] if `mu` is not finite.
    /// - [`LikError::NonPositiveSigma`] if `sigma` is not finite and > 0.
    pub fn new(mu: f64, sigma: f64) -> LikResult<Self> {
        validate_cavity_mean(mu)?;
        validate_sigma(sigma)?;
        Ok(Self { mu, sigma })
    }

    /// Build a cavity from EP natural parameters `(tau, v)`.
    ///
    /// # Errors
    /// - [`LikError::NonPositivePrecision`] if `tau` is not finite and > 0.
    /// - [`LikError::InvalidNaturalMean`] if `v` is not finite.
    pub fn from_natural(tau: f64, v: f64) -> LikResult<Self> {
        validate_precision(tau)?;
        validate_natural_mean(v)?;
        Self::new(v / tau, (1.0 / tau).sqrt())
    }

    /// `sigma²`.
    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    /// `1 / sigma²`.
    pub fn precision(&self) -> f64 {
        1.0 / self.variance()
    }

    /// Standardized distance `(gp - mu) / sigma`.
    pub fn z(&self, gp: f64) -> f64 {
        (gp - self.mu) / self.sigma
    }

    /// Quantile of the cavity at probability `p`.
    ///
    /// # Errors
    /// Returns [`LikError::NonPositiveSigma`] if `statrs` rejects the
    /// distribution parameters, which validated cavities never trigger.
    pub fn quantile(&self, p: f64) -> LikResult<f64> {
        let normal = Normal::new(self.mu, self.sigma)
            .map_err(|_| LikError::NonPositiveSigma { value: self.sigma })?;
        Ok(normal.inverse_cdf(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Moment and natural constructors, including rejection paths.
    // - Quantiles using `sigma` (not `sigma²`) as the scale.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Natural parameters map to moments as `mu = v/tau`, `sigma = 1/√tau`.
    //
    // Given
    // -----
    // - `tau = 2`, `v = 1`.
    //
    // Expect
    // ------
    // - `mu = 0.5`, `sigma² = 0.5`.
    fn from_natural_maps_to_moments() {
        let c = Cavity::from_natural(2.0, 1.0).unwrap();
        assert_relative_eq!(c.mu, 0.5);
        assert_relative_eq!(c.variance(), 0.5, epsilon = 1e-15);
        assert_relative_eq!(c.precision(), 2.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Invalid inputs produce the matching domain errors.
    //
    // Given
    // -----
    // - `tau = 0`, `tau = -1`, `v = NaN`, `sigma = 0`, `mu = inf`.
    //
    // Expect
    // ------
    // - One specific error variant per case.
    fn constructors_reject_invalid_inputs() {
        let zero_tau = Cavity::from_natural(0.0, 1.0);
        let neg_tau = Cavity::from_natural(-1.0, 1.0);
        let nan_v = Cavity::from_natural(1.0, f64::NAN);
        let zero_sigma = Cavity::new(0.0, 0.0);
        let inf_mu = Cavity::new(f64::INFINITY, 1.0);

        assert!(matches!(zero_tau, Err(LikError::NonPositivePrecision { .. })));
        assert!(matches!(neg_tau, Err(LikError::NonPositivePrecision { .. })));
        assert!(matches!(nan_v, Err(LikError::InvalidNaturalMean { .. })));
        assert!(matches!(zero_sigma, Err(LikError::NonPositiveSigma { .. })));
        assert!(matches!(inf_mu, Err(LikError::InvalidCavityMean { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Quantiles are taken on the standard-deviation scale.
    //
    // Given
    // -----
    // - `N(1, 0.5²)` at `p = 0.975`.
    //
    // Expect
    // ------
    // - `1 + 1.959964 · 0.5`.
    fn quantile_uses_sigma_scale() {
        let c = Cavity::new(1.0, 0.5).unwrap();
        let expected = 1.0 + 1.959_963_984_540_054 * 0.5;
        assert_relative_eq!(c.quantile(0.975).unwrap(), expected, epsilon = 1e-9);
    }
}
