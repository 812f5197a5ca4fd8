//! Mass-model interface — the observation model `p(y | f)` and its derivatives.
//!
//! Purpose
//! -------
//! Describe everything the Laplace engine needs from an observation model:
//! the negative log-mass with first and second derivatives in the latent
//! value (and, for continuous models, in the observation), plus the
//! conditional mean and variance of the output with their derivatives.
//!
//! Key behaviors
//! -------------
//! - [`MassModel`] is the required surface. Observation-side partials default
//!   to [`LikError::CapabilityMissing`]; only continuous models used with the
//!   joint predictive need them.
//! - [`AnalyticalMoments`] is an optional extension for models with closed
//!   forms. The approximator's analytical constructor is only available for
//!   types implementing it, so the capability is checked at compile time.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nlog_mass(gp, obs) = −ln p(obs | gp)` including its normalizing
//!   constant, so Laplace normalizers are true probabilities.
//! - `mean(gp)` and `variance(gp)` are `E[Y | f = gp]` and `V[Y | f = gp]`.
//! - All methods report domain problems as errors rather than panicking.
//!
//! Conventions
//! -----------
//! - `gp` is the latent value, `obs` an observation already passed through
//!   [`MassModel::preprocess_values`].
//! - Implementations must be `Send + Sync` so batch prediction can fan out
//!   across threads.
//!
//! Downstream usage
//! ----------------
//! - `objectives` composes these methods into negative log-densities.
//! - Bundled families live in `likelihoods::models`.
use crate::likelihoods::{
    core::{cavity::Cavity, results::TiltedMoments},
    errors::{LikError, LikResult},
};
use ndarray::Array1;

/// Observation model `p(y | f)` with the derivatives needed for Laplace.
pub trait MassModel: Send + Sync {
    /// Short family name used in diagnostics.
    fn name(&self) -> &'static str;

    /// `true` when observations are discrete (counts, labels).
    fn is_discrete(&self) -> bool;

    /// Reject observations outside the model's support.
    fn validate_observation(&self, obs: f64) -> LikResult<()>;

    /// Map raw observations onto the model's internal encoding.
    ///
    /// The default validates each entry and returns the values unchanged.
    ///
    /// # Errors
    /// The first [`LikError::InvalidObservation`] encountered.
    fn preprocess_values(&self, y: &Array1<f64>) -> LikResult<Array1<f64>> {
        for &value in y.iter() {
            self.validate_observation(value)?;
        }
        Ok(y.clone())
    }

    /// `p(obs | gp)`; defaults to `exp(−nlog_mass)`.
    fn mass(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok((-self.nlog_mass(gp, obs)?).exp())
    }

    // ---- Latent-side derivatives ----
    fn nlog_mass(&self, gp: f64, obs: f64) -> LikResult<f64>;
    fn dnlog_mass_dgp(&self, gp: f64, obs: f64) -> LikResult<f64>;
    fn d2nlog_mass_dgp2(&self, gp: f64, obs: f64) -> LikResult<f64>;

    // ---- Observation-side derivatives (continuous models only) ----
    fn dnlog_mass_dobs(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Err(LikError::CapabilityMissing { operation: "dnlog_mass_dobs", mode: self.name() })
    }

    fn d2nlog_mass_dobs2(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Err(LikError::CapabilityMissing { operation: "d2nlog_mass_dobs2", mode: self.name() })
    }

    fn d2nlog_mass_dcross(&self, _gp: f64, _obs: f64) -> LikResult<f64> {
        Err(LikError::CapabilityMissing { operation: "d2nlog_mass_dcross", mode: self.name() })
    }

    // ---- Conditional moments of the output ----
    fn mean(&self, gp: f64) -> LikResult<f64>;
    fn dmean_dgp(&self, gp: f64) -> LikResult<f64>;
    fn d2mean_dgp2(&self, gp: f64) -> LikResult<f64>;
    fn variance(&self, gp: f64) -> LikResult<f64>;
    fn dvariance_dgp(&self, gp: f64) -> LikResult<f64>;
    fn d2variance_dgp2(&self, gp: f64) -> LikResult<f64>;
}

/// Closed-form EP moments and predictions.
pub trait AnalyticalMoments: MassModel {
    /// Exact `(Z_hat, mu_hat, sigma2_hat)` of `N(f; cavity) · p(obs | f)`.
    fn moments_match_analytical(&self, obs: f64, cavity: &Cavity) -> LikResult<TiltedMoments>;

    /// Exact `E[Y]` under `f ~ cavity`.
    fn predictive_mean_analytical(&self, cavity: &Cavity) -> LikResult<f64>;

    /// Exact `V[Y]` under `f ~ cavity`, if the family has one.
    ///
    /// `None` (the default) sends the approximator down the Laplace path.
    fn predictive_variance_analytical(
        &self, _cavity: &Cavity, _predictive_mean: Option<f64>,
    ) -> Option<LikResult<f64>> {
        None
    }
}
