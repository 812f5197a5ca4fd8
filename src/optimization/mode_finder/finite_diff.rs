//! mode_finder::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference derivatives for objectives that do not supply
//! analytic ones, together with validation and symmetry cleanup, so the
//! adapter can serve Newton–CG without depending directly on the
//! `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute central-difference gradients of a scalar objective, falling
//!   back to forward differences when an evaluation fails or the result is
//!   non-finite ([`fd_gradient`]).
//! - Construct central-difference Hessians from a gradient function,
//!   falling back to forward differences when validation fails
//!   ([`compute_hessian`]).
//! - Enforce symmetry of Hessian matrices in-place.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the objective during differencing is routed into a
//!   shared `RefCell` slot; the closure returns `NaN` and the error is
//!   re-raised afterwards.
//! - Returned gradients and Hessians satisfy [`validate_grad`] and
//!   [`validate_hessian`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the quadratic happy path, closure-error propagation,
//!   non-finite rejection, and symmetrization.
use crate::optimization::{
    errors::OptResult,
    mode_finder::{
        types::{Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// fd_gradient — finite-difference gradient with error capture.
///
/// Purpose
/// -------
/// Approximate `∇f(theta)` for a fallible scalar objective. Central
/// differences are tried first; forward differences are used if any
/// evaluation failed or the central result fails validation.
///
/// Errors
/// ------
/// - Any error raised by `func` during the forward-difference pass.
/// - `OptError::InvalidGradient` / `GradientDimMismatch` from
///   [`validate_grad`] on the forward-difference result.
pub fn fd_gradient<G>(theta: &Theta, func: G) -> OptResult<Grad>
where
    G: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let wrapped = |x: &Theta| -> f64 {
        match func(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&wrapped);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &wrapped, &closure_err)
}

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Clears `closure_err`, runs `forward_diff`, re-raises any captured error,
/// then validates the result.
///
/// # Errors
/// - The first error captured inside `func`.
/// - Validation errors for wrong length or non-finite entries.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian — finite-difference Hessian with validation and symmetry.
///
/// Purpose
/// -------
/// Approximate the Hessian by differencing a gradient function at `theta`,
/// preferring central differences and falling back to forward differences
/// when validation fails. The result is symmetrized before being returned.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
///   forward-difference fallback also fails validation.
///
/// Notes
/// -----
/// - The central-difference validation error is discarded; only the
///   fallback's validation result is surfaced.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

// ---- Helper methods ----

/// Replace each off-diagonal pair with its average; diagonal untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use argmin::core::ArgminError;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Finite-difference gradients with and without objective failures.
    // - Finite-difference Hessians, symmetry, and validation.
    //
    // They intentionally DO NOT cover:
    // - How the adapter decides to fall back to these helpers.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The central-difference gradient of a quadratic matches the analytic
    // gradient.
    //
    // Given
    // -----
    // - `f(x) = 0.5 * (x0² + 3 x1²)` at `(1, -2)`.
    //
    // Expect
    // ------
    // - Gradient ≈ `(1, -6)`.
    fn fd_gradient_matches_quadratic() {
        // Arrange
        let theta = array![1.0, -2.0];
        let f = |x: &Theta| -> Result<f64, Error> { Ok(0.5 * (x[0] * x[0] + 3.0 * x[1] * x[1])) };

        // Act
        let grad = fd_gradient(&theta, f).unwrap();

        // Assert
        assert_relative_eq!(grad[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], -6.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An objective failure during differencing is surfaced as an error.
    //
    // Given
    // -----
    // - An objective that always fails with an argmin `NotImplemented` error.
    //
    // Expect
    // ------
    // - `fd_gradient` returns `OptError::NotImplemented`.
    fn fd_gradient_propagates_objective_error() {
        // Arrange
        let theta = array![0.5];
        let f = |_: &Theta| -> Result<f64, Error> {
            Err(ArgminError::NotImplemented { text: "fd test".to_string() }.into())
        };

        // Act
        let err = fd_gradient(&theta, f).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NotImplemented { .. }));
    }

    #[test]
    // Purpose
    // -------
    // `run_fd_diff` rejects non-finite gradients.
    //
    // Given
    // -----
    // - An objective that always returns `NaN`.
    //
    // Expect
    // ------
    // - `OptError::InvalidGradient`.
    fn run_fd_diff_non_finite_gradient_is_rejected() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        // Act
        let result = run_fd_diff(&theta, &f, &closure_err);

        // Assert
        assert!(matches!(result, Err(OptError::InvalidGradient { .. })));
    }

    #[test]
    // Purpose
    // -------
    // `compute_hessian` recovers a known constant Hessian.
    //
    // Given
    // -----
    // - Gradient `g(x) = (2 x0 + x1, x0 + 4 x1)`.
    //
    // Expect
    // ------
    // - Hessian ≈ `[[2, 1], [1, 4]]`, exactly symmetric.
    fn compute_hessian_recovers_linear_gradient() {
        // Arrange
        let theta: Theta = array![0.3, -0.7];
        let grad_fn = |x: &Theta| array![2.0 * x[0] + x[1], x[0] + 4.0 * x[1]];

        // Act
        let hess = compute_hessian(&grad_fn, &theta).unwrap();

        // Assert
        assert_relative_eq!(hess[[0, 0]], 2.0, epsilon = 1e-5);
        assert_relative_eq!(hess[[1, 1]], 4.0, epsilon = 1e-5);
        assert_relative_eq!(hess[[0, 1]], 1.0, epsilon = 1e-5);
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }

    #[test]
    // Purpose
    // -------
    // Non-finite gradients produce `InvalidHessian` after both passes.
    //
    // Given
    // -----
    // - A gradient function returning `NaN`.
    //
    // Expect
    // ------
    // - `OptError::InvalidHessian`.
    fn compute_hessian_non_finite_entries_yield_error() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64]);
        let grad_fn = |_theta: &Theta| Array1::from(vec![f64::NAN]);

        // Act
        let result = compute_hessian(&grad_fn, &theta);

        // Assert
        assert!(matches!(result, Err(OptError::InvalidHessian { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Symmetrization averages off-diagonal pairs and keeps the diagonal.
    //
    // Given
    // -----
    // - `[[1, 2], [0, 3]]`.
    //
    // Expect
    // ------
    // - `[[1, 1], [1, 3]]`.
    fn symmetrize_hess_averages_pairs() {
        // Arrange
        let mut h: Hessian = Array2::from_shape_vec((2, 2), vec![1.0_f64, 2.0, 0.0, 3.0]).unwrap();

        // Act
        symmetrize_hess(&mut h);

        // Assert
        assert_eq!(h, array![[1.0, 1.0], [1.0, 3.0]]);
    }
}
