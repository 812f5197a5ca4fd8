//! likelihoods::core — building blocks of the Laplace/EP approximator.
//!
//! Purpose
//! -------
//! Hold everything the approximator composes: the cavity type, the
//! mass-model and link traits, the objectives whose modes are searched, the
//! Laplace integrals, and the option and result carriers.
//!
//! Key behaviors
//! -------------
//! - [`cavity`]: validated `N(mu, σ²)` from moment or natural parameters.
//! - [`mass`]: [`MassModel`] and the optional [`AnalyticalMoments`].
//! - [`link`]: [`LinkFunction`] with identity, log and probit links.
//! - [`objectives`]: tilted product, conditional-moment densities and the
//!   joint predictive, all implementing the optimizer's `NegLogDensity`.
//! - [`laplace`]: Gaussian-integral approximations around a mode.
//! - [`options`] / [`results`]: configuration and output types.
//! - [`validation`]: shared input checks returning `LikError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything here is stateless and `Send + Sync`; one failing call never
//!   affects another.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests; end-to-end behavior is
//!   exercised in `tests/integration_ep_pipeline.rs`.

pub mod cavity;
pub mod laplace;
pub mod link;
pub mod mass;
pub mod objectives;
pub mod options;
pub mod results;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cavity::Cavity;
pub use self::laplace::{laplace_gaussian_expectation, laplace_integral, laplace_integral_1d};
pub use self::link::{Identity, LinkFunction, Log, Probit};
pub use self::mass::{AnalyticalMoments, MassModel};
pub use self::objectives::{
    ConditionalMoment, ConditionalMomentDensity, JointPredictive, ObservedCavity, TiltedProduct,
};
pub use self::options::{ApproximatorOptions, PredictiveInterval, VariancePolicy};
pub use self::results::{CavityBatch, JointMode, PredictivePoint, PredictiveValues, TiltedMoments};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use ep_likelihoods::likelihoods::core::prelude::*;
//
// to import the main building blocks in a single line.

pub mod prelude {
    pub use super::cavity::Cavity;
    pub use super::link::{Identity, LinkFunction, Log, Probit};
    pub use super::mass::{AnalyticalMoments, MassModel};
    pub use super::options::{ApproximatorOptions, PredictiveInterval, VariancePolicy};
    pub use super::results::{CavityBatch, PredictivePoint, PredictiveValues, TiltedMoments};
}
