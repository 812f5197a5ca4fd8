//! likelihoods — EP/Laplace likelihood factors for Gaussian-process models.
//!
//! Purpose
//! -------
//! Given a Gaussian cavity belief about a latent value and an observation
//! model, compute the moments of the tilted distribution (for EP site
//! updates) and predictive summaries of the output. When a model has closed
//! forms they are used; otherwise every quantity is a Laplace approximation
//! around a Newton–CG mode.
//!
//! Key behaviors
//! -------------
//! - [`LikelihoodApproximator`] is the entry point. Its dispatch (analytical
//!   or numerical) is fixed by the constructor and checked at compile time:
//!   `analytical` needs a model implementing [`AnalyticalMoments`].
//! - [`core`] holds the building blocks: cavity, mass-model and link traits,
//!   objectives, Laplace integrals, options and result types.
//! - [`models`] bundles Gaussian, probit-Bernoulli, Poisson and Student-t
//!   families.
//! - [`errors`] defines [`LikError`] and the [`LikResult`] alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - Cavities require `tau > 0` (equivalently `sigma > 0`) and finite means.
//! - `sigma2_hat > 0` and `Z_hat ≥ 0` on every successful moment match;
//!   non-positive curvature is an error, never a NaN.
//! - Predictive variances are never negative: tiny negatives are clamped
//!   (and flagged) or rejected according to
//!   [`VariancePolicy`](core::VariancePolicy).
//! - Joint predictive derivatives are refused for discrete models.
//!
//! Conventions
//! -----------
//! - Natural parameters `(tau, v)` for moment matching, `(mu, sigma)` for
//!   scalar predictions, `(mu, var)` for batch predictions.
//! - Batch outputs are `N × 1` columns in input order, with failures keyed by
//!   0-based index.
//! - Mode searches log progress through `log::debug!`; variance clamping logs
//!   a `log::warn!`.
//!
//! Downstream usage
//! ----------------
//! - Typical flow:
//!   1. Pick a model from [`models`] (or implement [`MassModel`]).
//!   2. Build an approximator with `LikelihoodApproximator::analytical` or
//!      `LikelihoodApproximator::numerical(model, link, options)`.
//!   3. Call `moments_match(obs, tau, v)` inside an EP loop and
//!      `predictive_values(mu, var)` for predictions.
//! - Python bindings wrap the bundled models through this module.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; the end-to-end EP pipeline is
//!   covered in `tests/integration_ep_pipeline.rs`.

pub mod approximator;
pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::approximator::{Dispatch, LikelihoodApproximator};
pub use self::core::{
    AnalyticalMoments, ApproximatorOptions, Cavity, CavityBatch, JointMode, LinkFunction,
    MassModel, PredictiveInterval, PredictivePoint, PredictiveValues, TiltedMoments,
    VariancePolicy,
};
pub use self::errors::{LikError, LikResult};
pub use self::models::{Bernoulli, Gaussian, Poisson, StudentT};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use ep_likelihoods::likelihoods::prelude::*;
//
// to import the main likelihood surface in a single line.

pub mod prelude {
    pub use super::core::link::{Identity, Log, Probit};
    pub use super::{
        AnalyticalMoments, ApproximatorOptions, Bernoulli, Cavity, Gaussian, LikError,
        LikResult, LikelihoodApproximator, LinkFunction, MassModel, Poisson, PredictiveValues,
        StudentT, TiltedMoments, VariancePolicy,
    };
}
