//! Validation helpers for cavity parameters, batches and options.
//!
//! Each helper returns the specific [`LikError`] variant for the offending
//! input so callers can report failures uniformly.
use crate::likelihoods::errors::{LikError, LikResult};

/// `tau` must be finite and strictly positive.
pub fn validate_precision(tau: f64) -> LikResult<()> {
    if !tau.is_finite() || tau <= 0.0 {
        return Err(LikError::NonPositivePrecision { value: tau });
    }
    Ok(())
}

/// `v` must be finite.
pub fn validate_natural_mean(v: f64) -> LikResult<()> {
    if !v.is_finite() {
        return Err(LikError::InvalidNaturalMean { value: v });
    }
    Ok(())
}

/// `mu` must be finite.
pub fn validate_cavity_mean(mu: f64) -> LikResult<()> {
    if !mu.is_finite() {
        return Err(LikError::InvalidCavityMean { value: mu });
    }
    Ok(())
}

/// `sigma` must be finite and strictly positive.
pub fn validate_sigma(sigma: f64) -> LikResult<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(LikError::NonPositiveSigma { value: sigma });
    }
    Ok(())
}

/// Batch variance at `index` must be finite and strictly positive.
pub fn validate_cavity_variance(index: usize, var: f64) -> LikResult<()> {
    if !var.is_finite() || var <= 0.0 {
        return Err(LikError::InvalidCavityVariance { index, value: var });
    }
    Ok(())
}

/// Batches must have matching lengths.
pub fn validate_batch_lengths(mu_len: usize, var_len: usize) -> LikResult<()> {
    if mu_len != var_len {
        return Err(LikError::LengthMismatch { mu_len, var_len });
    }
    Ok(())
}

/// Interval quantiles must satisfy `0 < lower < upper < 1`.
pub fn validate_interval(lower: f64, upper: f64) -> LikResult<()> {
    let ok = lower.is_finite() && upper.is_finite() && 0.0 < lower && lower < upper && upper < 1.0;
    if !ok {
        return Err(LikError::InvalidInterval { lower, upper });
    }
    Ok(())
}

/// Clamp tolerance must be finite and non-negative.
pub fn validate_variance_tol(tol: f64) -> LikResult<()> {
    if !tol.is_finite() || tol < 0.0 {
        return Err(LikError::InvalidVarianceTolerance { value: tol });
    }
    Ok(())
}

/// Laplace curvature must be finite and strictly positive.
pub fn validate_curvature(objective: &'static str, value: f64) -> LikResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LikError::InvalidCurvature { objective, value });
    }
    Ok(())
}

/// Analytical tilted moments must satisfy `Z_hat ≥ 0` and `sigma2_hat > 0`.
pub fn validate_tilted_moments(z_hat: f64, mu_hat: f64, sigma2_hat: f64) -> LikResult<()> {
    let ok = z_hat.is_finite()
        && z_hat >= 0.0
        && mu_hat.is_finite()
        && sigma2_hat.is_finite()
        && sigma2_hat > 0.0;
    if !ok {
        return Err(LikError::InvalidTiltedMoments { z_hat, sigma2_hat });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Interval and tolerance rules reject degenerate inputs.
    //
    // Given
    // -----
    // - Reversed quantiles, a quantile at 1, and a negative tolerance.
    //
    // Expect
    // ------
    // - `InvalidInterval` twice and `InvalidVarianceTolerance`.
    fn interval_and_tolerance_rules() {
        assert!(validate_interval(0.025, 0.975).is_ok());
        assert!(matches!(validate_interval(0.9, 0.1), Err(LikError::InvalidInterval { .. })));
        assert!(matches!(validate_interval(0.1, 1.0), Err(LikError::InvalidInterval { .. })));
        assert!(matches!(
            validate_variance_tol(-1e-9),
            Err(LikError::InvalidVarianceTolerance { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Curvature and tilted-moment checks enforce strict positivity.
    //
    // Given
    // -----
    // - Zero curvature and a zero `sigma2_hat`.
    //
    // Expect
    // ------
    // - `InvalidCurvature` and `InvalidTiltedMoments`.
    fn curvature_and_moments_require_positivity() {
        assert!(matches!(
            validate_curvature("tilted product", 0.0),
            Err(LikError::InvalidCurvature { value, .. }) if value == 0.0
        ));
        assert!(matches!(
            validate_tilted_moments(0.3, 0.0, 0.0),
            Err(LikError::InvalidTiltedMoments { .. })
        ));
        assert!(validate_tilted_moments(0.0, 1.0, 1e-3).is_ok());
    }
}
