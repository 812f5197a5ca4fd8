//! High-level entry point for locating the mode of a [`NegLogDensity`].
//!
//! Selects Newton–CG with either a Hager–Zhang or More–Thuente line search,
//! wraps the objective in an [`ArgMinAdapter`], and delegates the search to
//! [`run_newton_cg`].
use crate::optimization::{
    errors::OptResult,
    mode_finder::{
        adapter::ArgMinAdapter,
        builders::{build_newton_hager_zhang, build_newton_more_thuente},
        run::run_newton_cg,
        traits::{LineSearcher, ModeOptions, ModeOutcome, NegLogDensity},
        types::Theta,
        validation::validate_start,
    },
};

/// Minimize a negative log-density `n(x)` with Newton–CG.
///
/// # Behavior
/// - Rejects empty or non-finite start points.
/// - Validates the start point and payload via `f.check(x0, data)`.
/// - Builds Newton–CG with the line search named in `opts.line_searcher`.
/// - Runs the stepwise search in [`run_newton_cg`].
///
/// # Errors
/// - Start-point and `check` failures.
/// - Any error from the search, including [`OptError::NotConverged`] when
///   the iteration cap is exhausted.
///
/// # Example
/// ```
/// use ndarray::array;
/// use ep_likelihoods::optimization::errors::OptResult;
/// use ep_likelihoods::optimization::mode_finder::{
///     find_mode, Grad, Hessian, ModeOptions, NegLogDensity, Theta,
/// };
///
/// struct Bowl;
/// impl NegLogDensity for Bowl {
///     type Data = f64;
///     fn value(&self, x: &Theta, c: &f64) -> OptResult<f64> {
///         Ok(0.5 * (x[0] - c).powi(2))
///     }
///     fn check(&self, _: &Theta, _: &f64) -> OptResult<()> {
///         Ok(())
///     }
///     fn grad(&self, x: &Theta, c: &f64) -> OptResult<Grad> {
///         Ok(array![x[0] - c])
///     }
///     fn hessian(&self, _: &Theta, _: &f64) -> OptResult<Hessian> {
///         Ok(array![[1.0]])
///     }
/// }
///
/// let out = find_mode(&Bowl, array![0.0], &2.5, &ModeOptions::default())?;
/// assert!((out.mode[0] - 2.5).abs() < 1e-9);
/// # Ok::<(), ep_likelihoods::optimization::errors::OptError>(())
/// ```
///
/// [`OptError::NotConverged`]: crate::optimization::errors::OptError::NotConverged
pub fn find_mode<F: NegLogDensity>(
    f: &F, x0: Theta, data: &F::Data, opts: &ModeOptions,
) -> OptResult<ModeOutcome> {
    validate_start(&x0)?;
    f.check(&x0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_newton_more_thuente(opts)?;
            run_newton_cg(x0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_newton_hager_zhang(opts)?;
            run_newton_cg(x0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        mode_finder::types::{Cost, Grad, Hessian},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Both line-search wirings on a 2-D convex objective.
    // - FD derivative fallbacks driving a full search.
    // - Start-point and `check` rejection.
    // -------------------------------------------------------------------------

    /// `0.5 (x - c)ᵀ A (x - c)` with `A = [[2, 0.5], [0.5, 1]]`.
    struct Quadratic2d;

    const A: [[f64; 2]; 2] = [[2.0, 0.5], [0.5, 1.0]];

    impl NegLogDensity for Quadratic2d {
        type Data = [f64; 2];
        fn value(&self, x: &Theta, c: &[f64; 2]) -> OptResult<Cost> {
            let d = [x[0] - c[0], x[1] - c[1]];
            Ok(0.5
                * (A[0][0] * d[0] * d[0] + 2.0 * A[0][1] * d[0] * d[1] + A[1][1] * d[1] * d[1]))
        }
        fn check(&self, x: &Theta, _: &[f64; 2]) -> OptResult<()> {
            if x.len() != 2 {
                return Err(OptError::GradientDimMismatch { expected: 2, found: x.len() });
            }
            Ok(())
        }
        fn grad(&self, x: &Theta, c: &[f64; 2]) -> OptResult<Grad> {
            let d = [x[0] - c[0], x[1] - c[1]];
            Ok(array![A[0][0] * d[0] + A[0][1] * d[1], A[1][0] * d[0] + A[1][1] * d[1]])
        }
        fn hessian(&self, _: &Theta, _: &[f64; 2]) -> OptResult<Hessian> {
            Ok(array![[A[0][0], A[0][1]], [A[1][0], A[1][1]]])
        }
    }

    /// Log-cosh bowl with no analytic derivatives.
    struct ValueOnlyBowl;

    impl NegLogDensity for ValueOnlyBowl {
        type Data = f64;
        fn value(&self, x: &Theta, c: &f64) -> OptResult<Cost> {
            Ok((x[0] - c).cosh().ln() + 0.5 * (x[0] - c).powi(2))
        }
        fn check(&self, _: &Theta, _: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches locate the minimizer of a correlated quadratic.
    //
    // Given
    // -----
    // - `Quadratic2d` centred at `(1, -2)`, started at the origin.
    //
    // Expect
    // ------
    // - Mode ≈ `(1, -2)` and value ≈ 0 for each line search.
    fn both_line_searches_find_quadratic_mode() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let opts = ModeOptions { line_searcher: ls, ..ModeOptions::default() };

            // Act
            let out = find_mode(&Quadratic2d, array![0.0, 0.0], &[1.0, -2.0], &opts).unwrap();

            // Assert
            assert_relative_eq!(out.mode[0], 1.0, epsilon = 1e-8);
            assert_relative_eq!(out.mode[1], -2.0, epsilon = 1e-8);
            assert!(out.value.abs() < 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // The FD fallbacks are enough to drive a full Newton search.
    //
    // Given
    // -----
    // - `ValueOnlyBowl` centred at `0.7`, started at `-1.0`, with a loose
    //   gradient tolerance suited to finite differences.
    //
    // Expect
    // ------
    // - Mode ≈ 0.7.
    fn fd_derivatives_drive_search() {
        // Arrange
        let tols = crate::optimization::mode_finder::Tolerances::new(Some(1e-6), None, Some(50))
            .unwrap();
        let opts = ModeOptions { tols, ..ModeOptions::default() };

        // Act
        let out = find_mode(&ValueOnlyBowl, array![-1.0], &0.7, &opts).unwrap();

        // Assert
        assert_relative_eq!(out.mode[0], 0.7, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Invalid start points are rejected before any solver work.
    //
    // Given
    // -----
    // - A NaN start, and a 1-D start for a 2-D objective.
    //
    // Expect
    // ------
    // - `InvalidStart` and the objective's own `check` error.
    fn invalid_starts_are_rejected() {
        let opts = ModeOptions::default();

        let nan = find_mode(&Quadratic2d, array![f64::NAN, 0.0], &[0.0, 0.0], &opts);
        assert!(matches!(nan, Err(OptError::InvalidStart { index: 0, .. })));

        let short = find_mode(&Quadratic2d, array![0.0], &[0.0, 0.0], &opts);
        assert!(matches!(short, Err(OptError::GradientDimMismatch { expected: 2, found: 1 })));
    }
}
