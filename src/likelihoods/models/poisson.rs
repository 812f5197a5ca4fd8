//! Poisson counts with a log link: `y | f ~ Poisson(eᶠ)`.
//!
//! No closed-form EP moments exist, so this family runs through the Laplace
//! path. Mean and variance are both `eᶠ`, which makes every conditional
//! objective exactly quadratic and the predictive quantities exact.
use crate::likelihoods::{
    core::mass::MassModel,
    errors::{LikError, LikResult},
};
use statrs::function::gamma::ln_gamma;

/// Poisson observation model with rate `exp(f)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Poisson;

impl MassModel for Poisson {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn is_discrete(&self) -> bool {
        true
    }

    fn validate_observation(&self, obs: f64) -> LikResult<()> {
        if !obs.is_finite() || obs < 0.0 {
            return Err(LikError::InvalidObservation {
                value: obs,
                reason: "counts must be finite and >= 0",
            });
        }
        if obs.fract() != 0.0 {
            return Err(LikError::InvalidObservation { value: obs, reason: "counts must be whole" });
        }
        Ok(())
    }

    fn nlog_mass(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok(gp.exp() - obs * gp + ln_gamma(obs + 1.0))
    }

    fn dnlog_mass_dgp(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok(gp.exp() - obs)
    }

    fn d2nlog_mass_dgp2(&self, gp: f64, _obs: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn mean(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn dmean_dgp(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn d2mean_dgp2(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn variance(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn dvariance_dgp(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }

    fn d2variance_dgp2(&self, gp: f64) -> LikResult<f64> {
        Ok(gp.exp())
    }
}
