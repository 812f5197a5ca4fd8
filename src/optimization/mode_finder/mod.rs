//! mode_finder — argmin-powered Newton–CG search for density modes.
//!
//! Purpose
//! -------
//! Locate the minimizer of a negative log-density `n(x)` using exact (or,
//! as a fallback, finite-difference) first and second derivatives. Callers
//! implement a single trait, [`NegLogDensity`], and invoke [`find_mode`].
//! The Laplace machinery in `likelihoods` builds every integral on top of
//! this search.
//!
//! Key behaviors
//! -------------
//! - Bridge objectives to Argmin through [`adapter::ArgMinAdapter`], which
//!   implements `CostFunction`, `Gradient` and `Hessian`.
//! - Run Newton–CG with a More–Thuente or Hager–Zhang line search
//!   ([`builders`]), one step at a time, applying gradient, cost-change and
//!   stall stopping rules ([`run`]).
//! - Report exhausting the iteration budget as
//!   [`OptError::NotConverged`](crate::optimization::errors::OptError::NotConverged);
//!   callers decide whether to retry.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized directly; no sign conventions are applied.
//! - Objective methods report invalid inputs as [`OptResult`] errors, never
//!   panics.
//! - Every search is bounded by [`ModeOptions::iteration_cap`].
//!
//! Conventions
//! -----------
//! - Points are [`Theta`] (`Array1<f64>`); 1-D objectives use length-1
//!   vectors and `1 × 1` Hessians.
//!
//! Downstream usage
//! ----------------
//! - `likelihoods::core::objectives` implements [`NegLogDensity`] for the
//!   tilted product, conditional moments and the joint predictive.
//! - `likelihoods::approximator` calls [`find_mode`] and turns the outcome
//!   into Laplace integrals.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover adapter fallbacks, stopping rules,
//!   validation and configuration parsing.
//!
//! [`OptResult`]: crate::optimization::errors::OptResult

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::find_mode;
pub use self::traits::{
    DEFAULT_MAX_ITER, DEFAULT_TOL_GRAD, LineSearcher, ModeOptions, ModeOutcome, NegLogDensity,
    Tolerances,
};
pub use self::types::{Cost, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::find_mode;
    pub use super::traits::{LineSearcher, ModeOptions, ModeOutcome, NegLogDensity, Tolerances};
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
