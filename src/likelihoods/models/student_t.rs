//! Student-t noise — `y | f ~ t_ν(f, s²)`.
//!
//! A heavy-tailed continuous model without closed-form EP moments. The
//! negative log-mass is non-convex in `f` for large residuals
//! (`r² > ν s²`), so tilted curvature can vanish; that case surfaces as
//! [`LikError::InvalidCurvature`](crate::likelihoods::errors::LikError).
use crate::likelihoods::{
    core::mass::MassModel,
    errors::{LikError, LikResult},
};
use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;

/// Student-t observation model with `nu` degrees of freedom and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentT {
    nu: f64,
    scale: f64,
}

impl StudentT {
    /// # Errors
    /// [`LikError::InvalidModelParam`] unless `nu > 2` (finite variance) and
    /// `scale > 0`, both finite.
    pub fn new(nu: f64, scale: f64) -> LikResult<Self> {
        if !(nu.is_finite() && nu > 2.0) {
            return Err(LikError::InvalidModelParam {
                name: "nu",
                value: nu,
                reason: "must be finite and > 2",
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(LikError::InvalidModelParam {
                name: "scale",
                value: scale,
                reason: "must be finite and > 0",
            });
        }
        Ok(Self { nu, scale })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `ν s²`.
    fn spread(&self) -> f64 {
        self.nu * self.scale * self.scale
    }
}

impl MassModel for StudentT {
    fn name(&self) -> &'static str {
        "student-t"
    }

    fn is_discrete(&self) -> bool {
        false
    }

    fn validate_observation(&self, obs: f64) -> LikResult<()> {
        if !obs.is_finite() {
            return Err(LikError::InvalidObservation { value: obs, reason: "must be finite" });
        }
        Ok(())
    }

    fn nlog_mass(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let r = obs - gp;
        let a = self.spread();
        let norm = -ln_gamma(0.5 * (self.nu + 1.0))
            + ln_gamma(0.5 * self.nu)
            + 0.5 * (a * PI).ln();
        Ok(norm + 0.5 * (self.nu + 1.0) * (r * r / a).ln_1p())
    }

    fn dnlog_mass_dgp(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let r = obs - gp;
        Ok(-(self.nu + 1.0) * r / (self.spread() + r * r))
    }

    fn d2nlog_mass_dgp2(&self, gp: f64, obs: f64) -> LikResult<f64> {
        let r = obs - gp;
        let a = self.spread();
        let denom = a + r * r;
        Ok((self.nu + 1.0) * (a - r * r) / (denom * denom))
    }

    fn dnlog_mass_dobs(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok(-self.dnlog_mass_dgp(gp, obs)?)
    }

    fn d2nlog_mass_dobs2(&self, gp: f64, obs: f64) -> LikResult<f64> {
        self.d2nlog_mass_dgp2(gp, obs)
    }

    fn d2nlog_mass_dcross(&self, gp: f64, obs: f64) -> LikResult<f64> {
        Ok(-self.d2nlog_mass_dgp2(gp, obs)?)
    }

    fn mean(&self, gp: f64) -> LikResult<f64> {
        Ok(gp)
    }

    fn dmean_dgp(&self, _gp: f64) -> LikResult<f64> {
        Ok(1.0)
    }

    fn d2mean_dgp2(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }

    fn variance(&self, _gp: f64) -> LikResult<f64> {
        Ok(self.scale * self.scale * self.nu / (self.nu - 2.0))
    }

    fn dvariance_dgp(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }

    fn d2variance_dgp2(&self, _gp: f64) -> LikResult<f64> {
        Ok(0.0)
    }
}
