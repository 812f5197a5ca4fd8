//! Adapter that exposes a [`NegLogDensity`] as an `argmin` problem.
//!
//! The objective is already a cost, so values and analytic derivatives pass
//! through unchanged. Missing gradients are finite-differenced from the
//! cost; missing Hessians are finite-differenced from the gradient (analytic
//! or not).
use crate::optimization::{
    errors::{OptError, OptResult},
    mode_finder::{
        finite_diff::{compute_hessian, fd_gradient},
        traits::NegLogDensity,
        types::{Cost, Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use std::cell::RefCell;

/// Bridges a [`NegLogDensity`] to `argmin`'s `CostFunction`, `Gradient` and
/// `Hessian`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, F: NegLogDensity> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: NegLogDensity> Clone for ArgMinAdapter<'a, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, F: NegLogDensity> Copy for ArgMinAdapter<'a, F> {}

impl<'a, F: NegLogDensity> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over an objective and its payload.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Validated objective value, in crate error terms.
    pub fn eval_cost(&self, x: &Theta) -> OptResult<Cost> {
        let output = self.f.value(x, self.data)?;
        if !output.is_finite() {
            return Err(OptError::NonFiniteCost { value: output });
        }
        Ok(output)
    }

    /// Validated gradient, analytic when available and FD otherwise.
    pub fn eval_gradient(&self, x: &Theta) -> OptResult<Grad> {
        match self.f.grad(x, self.data) {
            Ok(g) => {
                validate_grad(&g, x.len())?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                fd_gradient(x, |p: &Theta| self.eval_cost(p).map_err(Error::from))
            }
            Err(e) => Err(e),
        }
    }

    /// Validated Hessian, analytic when available and FD of the gradient
    /// otherwise.
    ///
    /// The FD closure must return a plain vector, so gradient failures are
    /// captured in a side slot and re-raised after differencing.
    pub fn eval_hessian(&self, x: &Theta) -> OptResult<Hessian> {
        match self.f.hessian(x, self.data) {
            Ok(h) => {
                validate_hessian(&h, x.len())?;
                Ok(h)
            }
            Err(OptError::HessianNotImplemented) => {
                let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
                let grad_fn = |p: &Theta| -> Grad {
                    match self.eval_gradient(p) {
                        Ok(g) => g,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            Grad::from_elem(p.len(), f64::NAN)
                        }
                    }
                };
                let hess = compute_hessian(&grad_fn, x);
                if let Some(err) = closure_err.take() {
                    return Err(err);
                }
                hess
            }
            Err(e) => Err(e),
        }
    }
}

impl<'a, F: NegLogDensity> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.eval_cost(x)?)
    }
}

impl<'a, F: NegLogDensity> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.eval_gradient(x)?)
    }
}

impl<'a, F: NegLogDensity> argmin::core::Hessian for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Hessian = Hessian;

    fn hessian(&self, x: &Self::Param) -> Result<Self::Hessian, Error> {
        Ok(self.eval_hessian(x)?)
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
    // - Pass-through of analytic derivatives.
    // - FD fallbacks for missing gradient and Hessian.
    // - Rejection of non-finite costs and propagation of objective errors.
    // -------------------------------------------------------------------------

    /// `0.5 * a * (x - c)²` with only the value implemented.
    struct ValueOnly {
        a: f64,
        c: f64,
    }

    impl NegLogDensity for ValueOnly {
        type Data = ();
        fn value(&self, x: &Theta, _: &()) -> OptResult<Cost> {
            Ok(0.5 * self.a * (x[0] - self.c).powi(2))
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    /// Always evaluates to NaN.
    struct NanCost;

    impl NegLogDensity for NanCost {
        type Data = ();
        fn value(&self, _: &Theta, _: &()) -> OptResult<Cost> {
            Ok(f64::NAN)
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    /// Gradient fails with a domain error.
    struct BadGrad;

    impl NegLogDensity for BadGrad {
        type Data = ();
        fn value(&self, x: &Theta, _: &()) -> OptResult<Cost> {
            Ok(x[0])
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
        fn grad(&self, x: &Theta, _: &()) -> OptResult<Grad> {
            Err(OptError::DomainViolation { value: x[0], reason: "test".into() })
        }
    }

    #[test]
    // Purpose
    // -------
    // FD fallbacks reproduce the derivatives of a 1-D quadratic.
    //
    // Given
    // -----
    // - `ValueOnly { a: 3, c: 1 }` evaluated at `x = 2`.
    //
    // Expect
    // ------
    // - Gradient ≈ 3, Hessian ≈ 3.
    fn fd_fallbacks_match_quadratic_derivatives() {
        // Arrange
        let f = ValueOnly { a: 3.0, c: 1.0 };
        let adapter = ArgMinAdapter::new(&f, &());
        let x = array![2.0];

        // Act
        let g = adapter.eval_gradient(&x).unwrap();
        let h = adapter.eval_hessian(&x).unwrap();

        // Assert
        assert_relative_eq!(g[0], 3.0, epsilon = 1e-5);
        assert_relative_eq!(h[[0, 0]], 3.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Non-finite costs are reported instead of fed to the solver.
    //
    // Given
    // -----
    // - `NanCost`.
    //
    // Expect
    // ------
    // - `NonFiniteCost` through both the crate and argmin entry points.
    fn non_finite_cost_is_rejected() {
        let adapter = ArgMinAdapter::new(&NanCost, &());
        let x = array![0.0];

        assert!(matches!(adapter.eval_cost(&x), Err(OptError::NonFiniteCost { .. })));
        let boxed = adapter.cost(&x).unwrap_err();
        assert!(matches!(OptError::from(boxed), OptError::NonFiniteCost { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Errors other than "not implemented" propagate, including through the
    // FD Hessian path.
    //
    // Given
    // -----
    // - `BadGrad`, whose gradient always fails.
    //
    // Expect
    // ------
    // - Both gradient and Hessian evaluation return `DomainViolation`.
    fn gradient_errors_propagate_through_hessian_fallback() {
        let adapter = ArgMinAdapter::new(&BadGrad, &());
        let x = array![1.5];

        assert!(matches!(adapter.eval_gradient(&x), Err(OptError::DomainViolation { .. })));
        assert!(matches!(adapter.eval_hessian(&x), Err(OptError::DomainViolation { .. })));
    }
}
