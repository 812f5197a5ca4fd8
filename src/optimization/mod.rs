//! optimization — mode finding, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the numerical engine underneath the Laplace approximations:
//! an Argmin-backed Newton–CG mode finder, tail-safe standard-normal
//! primitives, and a single error/result surface. Callers implement a
//! negative log-density, choose tolerances, and obtain the mode with
//! diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing negative log-densities**
//!   `n(x)` (`mode_finder`), including solver and stopping-rule
//!   configuration.
//! - Supply shared numerical primitives (`numerical_stability`) for the
//!   standard normal: CDF, log-CDF, inverse Mills ratio.
//! - Normalize configuration issues, objective failures, and backend
//!   solver errors into a single enum (`errors::OptError`) with a common
//!   result alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives treat domain violations (e.g., a non-positive weight inside
//!   a logarithm) as recoverable `OptError` values, not panics.
//! - Every search is bounded by an iteration cap; exhausting it is reported
//!   as `OptError::NotConverged`.
//!
//! Conventions
//! -----------
//! - Points, gradients, and Hessians use the `ndarray` aliases `Theta`,
//!   `Grad`, `Hessian`.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Progress is reported through the `log` facade at `debug` level; the
//!   library never installs a logger.
//!
//! Downstream usage
//! ----------------
//! - `likelihoods` implements `NegLogDensity` for its objectives and calls
//!   `find_mode`, mapping `OptError` into its own error type.
//! - Probit likelihood code uses `numerical_stability` for stable EP
//!   moment updates.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules cover solver wiring, stopping rules,
//!   finite-difference fallbacks, tail-safe normal helpers, and error
//!   conversions.

pub mod errors;
pub mod mode_finder;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use ep_likelihoods::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::mode_finder::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
