//! laplace — Gaussian-integral approximation around a mode.
//!
//! Purpose
//! -------
//! Turn a mode-finder result into an integral estimate. For an objective
//! `n(x)` with mode `x*` and Hessian `H = ∇²n(x*)`,
//!
//! ```text
//! ∫ exp(−n(x)) dx  ≈  exp(−n(x*)) · (2π)^{d/2} · det(H)^{−1/2}.
//! ```
//!
//! Key behaviors
//! -------------
//! - [`laplace_integral`] handles any dimension via a Cholesky factorization
//!   (`nalgebra`), which doubles as the positive-definiteness check.
//! - [`laplace_integral_1d`] is the scalar specialization.
//! - [`laplace_gaussian_expectation`] divides the 1-D integral by the cavity
//!   normalizer `√(2π)·σ` that the objectives omit, giving an expectation
//!   under `N(mu, σ²)`. It is evaluated in log-space.
//!
//! Invariants & assumptions
//! ------------------------
//! - Curvature must be finite and strictly positive; otherwise the
//!   approximation is undefined and [`LikError::InvalidCurvature`] is
//!   returned. No clamping is attempted.
//!
//! Testing notes
//! -------------
//! - Gaussian integrands are reproduced exactly; degenerate Hessians are
//!   rejected.
use crate::{
    likelihoods::{
        core::validation::validate_curvature,
        errors::{LikError, LikResult},
    },
    optimization::{mode_finder::Hessian, numerical_stability::{HALF_LN_2PI, LN_2PI}},
};
use nalgebra::{Cholesky, DMatrix};

/// Multivariate Laplace integral `exp(−n) (2π)^{d/2} det(H)^{−1/2}`.
///
/// # Errors
/// - [`LikError::InvalidCurvature`] if `H` is not square, not finite, or not
///   positive definite. `value` carries the smallest diagonal entry (or the
///   offending entry) for diagnostics.
pub fn laplace_integral(
    objective: &'static str, nlog_at_mode: f64, hessian: &Hessian,
) -> LikResult<f64> {
    let dim = hessian.nrows();
    if dim == 0 || hessian.ncols() != dim {
        return Err(LikError::InvalidCurvature { objective, value: f64::NAN });
    }
    if let Some(&bad) = hessian.iter().find(|v| !v.is_finite()) {
        return Err(LikError::InvalidCurvature { objective, value: bad });
    }
    let h = fill_dmatrix(hessian);
    let chol = Cholesky::new(h).ok_or_else(|| LikError::InvalidCurvature {
        objective,
        value: hessian.diag().fold(f64::INFINITY, |a, &b| a.min(b)),
    })?;
    let log_det: f64 = chol.l().diagonal().iter().map(|d| 2.0 * d.ln()).sum();
    let log_integral = -nlog_at_mode + 0.5 * dim as f64 * LN_2PI - 0.5 * log_det;
    Ok(log_integral.exp())
}

/// One-dimensional Laplace integral `exp(−n) · √(2π / H)`.
///
/// # Errors
/// [`LikError::InvalidCurvature`] if `curvature ≤ 0` or is non-finite.
pub fn laplace_integral_1d(
    objective: &'static str, nlog_at_mode: f64, curvature: f64,
) -> LikResult<f64> {
    validate_curvature(objective, curvature)?;
    Ok((-nlog_at_mode + HALF_LN_2PI - 0.5 * curvature.ln()).exp())
}

/// Expectation under `N(mu, σ²)` from an objective that omits the Gaussian
/// normalizer: `exp(−n) / (σ · √H)`.
///
/// # Errors
/// [`LikError::InvalidCurvature`] if `curvature ≤ 0` or is non-finite.
pub fn laplace_gaussian_expectation(
    objective: &'static str, nlog_at_mode: f64, curvature: f64, sigma: f64,
) -> LikResult<f64> {
    validate_curvature(objective, curvature)?;
    Ok((-nlog_at_mode - sigma.ln() - 0.5 * curvature.ln()).exp())
}

// ---- Helper Methods ----

/// Copy an `ndarray` Hessian into a `nalgebra` matrix.
fn fill_dmatrix(hessian: &Hessian) -> DMatrix<f64> {
    let (rows, cols) = hessian.dim();
    DMatrix::from_fn(rows, cols, |i, j| hessian[[i, j]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exactness on Gaussian integrands in one and two dimensions.
    // - Rejection of non-positive curvature.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The 2-D integral of an unnormalized Gaussian is reproduced exactly.
    //
    // Given
    // -----
    // - `n(x) = ½ xᵀ A x` with `A = [[2, 0.5], [0.5, 1]]`, so `n(x*) = 0`.
    //
    // Expect
    // ------
    // - `2π / √det(A)`.
    fn multivariate_matches_gaussian_integral() {
        let a = array![[2.0, 0.5], [0.5, 1.0]];
        let det: f64 = 2.0 * 1.0 - 0.25;

        let value = laplace_integral("test", 0.0, &a).unwrap();

        assert_relative_eq!(value, 2.0 * PI / det.sqrt(), max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The 1-D forms agree with each other and with the Gaussian normalizer.
    //
    // Given
    // -----
    // - `n(x*) = 0.3`, `H = 4`, `σ = 0.7`.
    //
    // Expect
    // ------
    // - `laplace_integral_1d = exp(−0.3) √(2π/4)` and the expectation equals it
    //   divided by `√(2π) σ`; the 1×1 multivariate call agrees.
    fn one_dimensional_forms_agree() {
        let i1 = laplace_integral_1d("test", 0.3, 4.0).unwrap();
        let e = laplace_gaussian_expectation("test", 0.3, 4.0, 0.7).unwrap();
        let m = laplace_integral("test", 0.3, &array![[4.0]]).unwrap();

        assert_relative_eq!(i1, (-0.3f64).exp() * (2.0 * PI / 4.0).sqrt(), max_relative = 1e-12);
        assert_relative_eq!(e, i1 / ((2.0 * PI).sqrt() * 0.7), max_relative = 1e-12);
        assert_relative_eq!(m, i1, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Non-positive curvature is an error, never a NaN.
    //
    // Given
    // -----
    // - Curvature `-1` in 1-D, and an indefinite 2×2 Hessian.
    //
    // Expect
    // ------
    // - `InvalidCurvature` from every entry point.
    fn negative_curvature_is_rejected() {
        assert!(matches!(
            laplace_integral_1d("test", 0.0, -1.0),
            Err(LikError::InvalidCurvature { .. })
        ));
        assert!(matches!(
            laplace_gaussian_expectation("test", 0.0, 0.0, 1.0),
            Err(LikError::InvalidCurvature { .. })
        ));
        assert!(matches!(
            laplace_integral("test", 0.0, &array![[1.0, 2.0], [2.0, 1.0]]),
            Err(LikError::InvalidCurvature { .. })
        ));
    }
}
