//! Public API surface for mode finding.
//!
//! - [`NegLogDensity`]: trait objectives implement to be minimized.
//! - [`ModeOptions`] and [`Tolerances`]: configuration for the search.
//! - [`LineSearcher`]: choice of line search used by Newton–CG.
//! - [`ModeOutcome`]: normalized result returned by [`find_mode`].
//!
//! Convention: objectives are negative log-densities `n(x)` and are minimized
//! as-is. Analytic gradients and Hessians are those of `n`, with no sign flip.
//!
//! [`find_mode`]: crate::optimization::mode_finder::find_mode
use crate::optimization::{
    errors::{OptError, OptResult},
    mode_finder::{
        types::{Cost, FnEvalMap, Grad, Hessian, Theta},
        validation::{validate_mode, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use std::str::FromStr;

/// Default gradient-norm tolerance for the mode search.
pub const DEFAULT_TOL_GRAD: f64 = 1e-9;

/// Default iteration cap for the mode search.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Objective interface for the mode finder.
///
/// The finder minimizes `value(x)` directly.
///
/// - `type Data`: per-call payload carried into every method (for the
///   likelihood objectives this is the observation plus cavity).
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `n(x)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject obviously invalid
///   starting points or payloads. Called once before the search.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic `∇n(x)`. When left
///   unimplemented a finite-difference gradient of `value` is used.
/// - `hessian(&Theta, &Data) -> OptResult<Hessian>`: analytic `∇²n(x)`. When
///   left unimplemented a finite-difference Hessian of the gradient is used.
pub trait NegLogDensity {
    type Data;

    // Required methods
    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, x: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _x: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }

    fn hessian(&self, _x: &Theta, _data: &Self::Data) -> OptResult<Hessian> {
        Err(OptError::HessianNotImplemented)
    }
}

/// Choice of line search used inside the Newton–CG solver.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Mode-finder configuration.
///
/// Fields:
/// - `tols: Tolerances` — stopping rules and iteration cap.
/// - `line_searcher: LineSearcher` — line search used by Newton–CG.
/// - `verbose: bool` — if `true`, attaches a terminal observer (behind the
///   `obs_slog` feature).
///
/// Default:
/// - `tols`: `tol_grad = 1e-9`, `tol_cost = None`, `max_iter = 100`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct ModeOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
}

impl ModeOptions {
    /// Create a new set of mode-finder options.
    ///
    /// Numeric validation happens in [`Tolerances::new`]; this constructor
    /// only bundles the pieces.
    pub fn new(tols: Tolerances, line_searcher: LineSearcher, verbose: bool) -> Self {
        Self { tols, line_searcher, verbose }
    }

    /// Iteration cap actually applied by the search.
    ///
    /// Falls back to [`DEFAULT_MAX_ITER`] when only tolerances were given, so
    /// every search terminates.
    pub fn iteration_cap(&self) -> usize {
        self.tols.max_iter.unwrap_or(DEFAULT_MAX_ITER)
    }
}

impl Default for ModeOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances {
                tol_grad: Some(DEFAULT_TOL_GRAD),
                tol_cost: None,
                max_iter: Some(DEFAULT_MAX_ITER),
            },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
        }
    }
}

/// Numerical tolerances and iteration limits used by the search.
///
/// - `tol_grad`: stop when the gradient norm falls to or below this value.
/// - `tol_cost`: stop when the absolute change in cost between two steps
///   falls to or below this value.
/// - `max_iter`: hard cap on the number of Newton steps.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `find_mode`.
///
/// - `mode`: located minimizer of the objective.
/// - `value`: objective value `n(mode)`.
/// - `converged`: always `true` for an `Ok` outcome; non-convergence is an
///   error. Kept for symmetry with diagnostics printed by callers.
/// - `status`: which stopping rule fired.
/// - `iterations`: number of Newton steps taken.
/// - `fn_evals`: function-evaluation counters summed over all steps.
/// - `grad_norm`: gradient norm at the returned mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeOutcome {
    pub mode: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: f64,
}

impl ModeOutcome {
    /// Build a validated [`ModeOutcome`] from the final search state.
    ///
    /// # Errors
    /// - Propagates validation errors for `mode` or `value`.
    pub fn new(
        mode: Option<Theta>, value: f64, status: &str, iterations: usize, fn_evals: FnEvalMap,
        grad_norm: f64,
    ) -> OptResult<Self> {
        let mode = validate_mode(mode)?;
        validate_value(value)?;
        Ok(Self {
            mode,
            value,
            converged: true,
            status: status.to_string(),
            iterations,
            fn_evals,
            grad_norm,
        })
    }
}
