//! mode_finder::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and Newton–CG solver aliases used by the
//! mode finder so that the rest of the crate stays agnostic to `ndarray`
//! and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for points, gradients, Hessians, and scalar
//!   costs (`Theta`, `Grad`, `Hessian`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired Newton–CG solver aliases for the two supported line
//!   searches.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every objective is a negative log-density minimized directly; `Cost`
//!   is that value, with no sign flip anywhere in the optimizer.
//! - One-dimensional objectives use length-1 `Theta` vectors and `1 × 1`
//!   Hessians, so the same solver path serves 1-D and 2-D searches.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases; correctness is exercised by
//!   the surrounding optimizer tests.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    newton::NewtonCG,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Point in the search space (latent value, or `(latent, output)` pair).
pub type Theta = Array1<f64>;

/// Gradient of the objective at a point; same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense Hessian of the objective; `n × n` for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Scalar objective value (negative log-density up to a constant).
pub type Cost = f64;

/// Function-evaluation counters accumulated over all solver steps.
///
/// Maps Argmin counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// Newton–CG wired to the Hager–Zhang line search.
pub type NewtonCgHagerZhang = NewtonCG<HagerZhangLS, Cost>;

/// Newton–CG wired to the More–Thuente line search.
pub type NewtonCgMoreThuente = NewtonCG<MoreThuenteLS, Cost>;
