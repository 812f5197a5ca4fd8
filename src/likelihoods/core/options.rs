//! Approximator options — dispatch-independent configuration.
//!
//! Purpose
//! -------
//! Collect the knobs that shape how an approximator runs: the mode-finder
//! settings, what to do with slightly negative variances, which cavity
//! quantiles bound the predictive interval, and whether batches fan out
//! across threads.
//!
//! Key behaviors
//! -------------
//! - [`VariancePolicy`] decides between clamping tiny negative variances to
//!   zero (with a flag and a warning) and rejecting them.
//! - [`PredictiveInterval`] holds validated quantile probabilities,
//!   defaulting to `(0.025, 0.975)`.
//! - [`ApproximatorOptions`] bundles the pieces with sensible defaults.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every constructor validates its inputs; `Default` values are valid by
//!   construction.
//!
//! Testing notes
//! -------------
//! - Unit tests check defaults, validation, and both variance policies.
use crate::{
    likelihoods::{
        core::validation::{validate_interval, validate_variance_tol},
        errors::{LikError, LikResult},
    },
    optimization::{mode_finder::ModeOptions, numerical_stability::VARIANCE_CLAMP_TOL},
};

/// Handling of negative predictive variances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariancePolicy {
    /// Clamp values in `[−tol · scale, 0)` to `0`, where
    /// `scale = max(1, E[V(Y|f)], E[E(Y|f)²])` on the Laplace path and `1`
    /// for closed-form variances; reject anything below.
    Clamp { tol: f64 },
    /// Reject every negative value.
    Fail,
}

impl VariancePolicy {
    /// Clamp policy with a validated tolerance.
    ///
    /// # Errors
    /// [`LikError::InvalidVarianceTolerance`] if `tol` is negative or
    /// non-finite.
    pub fn clamp(tol: f64) -> LikResult<Self> {
        validate_variance_tol(tol)?;
        Ok(VariancePolicy::Clamp { tol })
    }

    /// Apply the policy to a computed variance.
    ///
    /// Returns the (possibly clamped) variance and whether clamping happened.
    ///
    /// # Errors
    /// [`LikError::NegativeVariance`] when the value is rejected.
    pub fn apply(&self, value: f64, scale: f64) -> LikResult<(f64, bool)> {
        if value >= 0.0 {
            return Ok((value, false));
        }
        match *self {
            VariancePolicy::Clamp { tol } if value >= -tol * scale.max(1.0) => {
                log::warn!("clamping negative predictive variance {value:.3e} to 0");
                Ok((0.0, true))
            }
            _ => Err(LikError::NegativeVariance { value }),
        }
    }
}

impl Default for VariancePolicy {
    fn default() -> Self {
        VariancePolicy::Clamp { tol: VARIANCE_CLAMP_TOL }
    }
}

/// Cavity quantile probabilities bounding the predictive interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictiveInterval {
    pub lower: f64,
    pub upper: f64,
}

impl PredictiveInterval {
    /// # Errors
    /// [`LikError::InvalidInterval`] unless `0 < lower < upper < 1`.
    pub fn new(lower: f64, upper: f64) -> LikResult<Self> {
        validate_interval(lower, upper)?;
        Ok(Self { lower, upper })
    }
}

impl Default for PredictiveInterval {
    fn default() -> Self {
        Self { lower: 0.025, upper: 0.975 }
    }
}

/// Configuration for a likelihood approximator.
///
/// Fields:
/// - `mode`: options forwarded to every mode search.
/// - `variance_policy`: handling of negative predictive variances.
/// - `interval`: quantiles used for `lower`/`upper` predictions.
/// - `parallel`: distribute batch elements with `rayon`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApproximatorOptions {
    pub mode: ModeOptions,
    pub variance_policy: VariancePolicy,
    pub interval: PredictiveInterval,
    pub parallel: bool,
}

impl ApproximatorOptions {
    pub fn new(
        mode: ModeOptions, variance_policy: VariancePolicy, interval: PredictiveInterval,
        parallel: bool,
    ) -> Self {
        Self { mode, variance_policy, interval, parallel }
    }
}
