//! Objectives — negative log-densities whose modes drive every Laplace step.
//!
//! Purpose
//! -------
//! Combine the cavity Gaussian with a [`MassModel`] into the scalar (or 2-D)
//! functions the mode finder minimizes. Each objective equals
//! `−ln(N(x; mu, σ²) · g(x))` up to the Gaussian normalizer, which is left out
//! and restored by the Laplace integrator.
//!
//! Key behaviors
//! -------------
//! - [`TiltedProduct`]: `g = p(obs | gp)`; integrates to `Z_hat`.
//! - [`ConditionalMomentDensity`]: `g` is `E[Y|f]`, `E[Y|f]²` or `V[Y|f]`,
//!   selected by [`ConditionalMoment`]; integrates to the matching predictive
//!   term.
//! - [`JointPredictive`]: the tilted product over the pair `(gp, obs)`, with
//!   an exact 2-vector gradient and a symmetric 2×2 Hessian.
//! - Every objective implements [`NegLogDensity`] with exact derivatives, so
//!   the mode finder never falls back to finite differences here.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weighted objectives need `g(x) > 0` wherever they are evaluated;
//!   otherwise a [`LikError::DomainViolation`] is raised (and rejected up
//!   front in `check` at the starting point).
//! - Joint derivatives exist only for continuous models; discrete models get
//!   [`LikError::DiscreteUnsupported`].
//! - The joint Hessian stores one cross partial in both off-diagonal slots,
//!   so it is symmetric by construction.
//!
//! Conventions
//! -----------
//! - Inherent methods return [`LikResult`]; the trait impls convert into the
//!   optimizer's error type with `?`.
//! - Objective names double as the `objective` field of errors.
//!
//! Testing notes
//! -------------
//! - Analytic derivatives are checked against central differences, and the
//!   Gaussian tilted product against its closed-form mode.
use crate::{
    likelihoods::{
        core::{cavity::Cavity, mass::MassModel},
        errors::{LikError, LikResult},
    },
    optimization::{
        errors::{OptError, OptResult},
        mode_finder::{Cost, Grad, Hessian, NegLogDensity, Theta},
        numerical_stability::std_norm_pdf,
    },
};
use ndarray::{array, Array1};

pub const TILTED_PRODUCT: &str = "tilted product";
pub const JOINT_PREDICTIVE: &str = "joint predictive";

/// Observation paired with its cavity; the data of the tilted product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedCavity {
    pub obs: f64,
    pub cavity: Cavity,
}

impl ObservedCavity {
    pub fn new(obs: f64, cavity: Cavity) -> Self {
        Self { obs, cavity }
    }
}

// ---- Tilted product ----

/// `n(gp) = ½((gp − mu)/σ)² + nlog_mass(gp, obs)`.
#[derive(Debug)]
pub struct TiltedProduct<'m, M: MassModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: MassModel + ?Sized> TiltedProduct<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn nlog(&self, gp: f64, data: &ObservedCavity) -> LikResult<f64> {
        let z = data.cavity.z(gp);
        Ok(0.5 * z * z + self.model.nlog_mass(gp, data.obs)?)
    }

    pub fn dnlog(&self, gp: f64, data: &ObservedCavity) -> LikResult<f64> {
        let gauss = (gp - data.cavity.mu) * data.cavity.precision();
        Ok(gauss + self.model.dnlog_mass_dgp(gp, data.obs)?)
    }

    pub fn d2nlog(&self, gp: f64, data: &ObservedCavity) -> LikResult<f64> {
        Ok(data.cavity.precision() + self.model.d2nlog_mass_dgp2(gp, data.obs)?)
    }

    /// Tilted density `N(gp; mu, σ²) · p(obs | gp)`, normalizer included.
    pub fn product(&self, gp: f64, data: &ObservedCavity) -> LikResult<f64> {
        let gauss = std_norm_pdf(data.cavity.z(gp)) / data.cavity.sigma;
        Ok(gauss * self.model.mass(gp, data.obs)?)
    }
}

impl<'m, M: MassModel + ?Sized> NegLogDensity for TiltedProduct<'m, M> {
    type Data = ObservedCavity;

    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost> {
        Ok(self.nlog(x[0], data)?)
    }

    fn check(&self, x: &Theta, data: &Self::Data) -> OptResult<()> {
        check_dim(x, 1)?;
        self.model.validate_observation(data.obs)?;
        Ok(())
    }

    fn grad(&self, x: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(array![self.dnlog(x[0], data)?])
    }

    fn hessian(&self, x: &Theta, data: &Self::Data) -> OptResult<Hessian> {
        Ok(array![[self.d2nlog(x[0], data)?]])
    }
}

// ---- Conditional moments ----

/// Output moment used as the weight of a conditional objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalMoment {
    /// `E[Y | f]`, integrating to `E[Y]`.
    Mean,
    /// `E[Y | f]²`, integrating to `E[E[Y|f]²]`.
    MeanSquared,
    /// `V[Y | f]`, integrating to `E[V[Y|f]]`.
    Variance,
}

impl ConditionalMoment {
    pub fn name(self) -> &'static str {
        match self {
            ConditionalMoment::Mean => "conditional mean",
            ConditionalMoment::MeanSquared => "conditional mean squared",
            ConditionalMoment::Variance => "conditional variance",
        }
    }

    /// Power of the base function inside the logarithm.
    fn power(self) -> f64 {
        match self {
            ConditionalMoment::MeanSquared => 2.0,
            _ => 1.0,
        }
    }
}

/// `n(gp) = ½((gp − mu)/σ)² − k·ln w(gp)` with `w` the conditional mean or
/// variance and `k` its power.
#[derive(Debug)]
pub struct ConditionalMomentDensity<'m, M: MassModel + ?Sized> {
    model: &'m M,
    moment: ConditionalMoment,
}

/// `(w, w', w'')` at one latent value.
type Weight = (f64, f64, f64);

impl<'m, M: MassModel + ?Sized> ConditionalMomentDensity<'m, M> {
    pub fn new(model: &'m M, moment: ConditionalMoment) -> Self {
        Self { model, moment }
    }

    pub fn moment(&self) -> ConditionalMoment {
        self.moment
    }

    /// Mode-search seed: `mean(mu)` for the mean-based weights and
    /// `variance(mu)` for the variance weight.
    pub fn start(&self, cavity: &Cavity) -> LikResult<f64> {
        match self.moment {
            ConditionalMoment::Variance => self.model.variance(cavity.mu),
            _ => self.model.mean(cavity.mu),
        }
    }

    pub fn nlog(&self, gp: f64, cavity: &Cavity) -> LikResult<f64> {
        let (w, _, _) = self.weight(gp, 0)?;
        let z = cavity.z(gp);
        Ok(0.5 * z * z - self.moment.power() * w.ln())
    }

    pub fn dnlog(&self, gp: f64, cavity: &Cavity) -> LikResult<f64> {
        let (w, dw, _) = self.weight(gp, 1)?;
        Ok((gp - cavity.mu) * cavity.precision() - self.moment.power() * dw / w)
    }

    pub fn d2nlog(&self, gp: f64, cavity: &Cavity) -> LikResult<f64> {
        let (w, dw, d2w) = self.weight(gp, 2)?;
        let ratio = dw / w;
        Ok(cavity.precision() - self.moment.power() * (d2w / w - ratio * ratio))
    }

    /// Weight and as many derivatives as `order` asks for; the rest are 0.
    fn weight(&self, gp: f64, order: u8) -> LikResult<Weight> {
        let m = self.model;
        let (w, dw, d2w) = match self.moment {
            ConditionalMoment::Variance => (
                m.variance(gp)?,
                if order >= 1 { m.dvariance_dgp(gp)? } else { 0.0 },
                if order >= 2 { m.d2variance_dgp2(gp)? } else { 0.0 },
            ),
            _ => (
                m.mean(gp)?,
                if order >= 1 { m.dmean_dgp(gp)? } else { 0.0 },
                if order >= 2 { m.d2mean_dgp2(gp)? } else { 0.0 },
            ),
        };
        if !(w.is_finite() && w > 0.0) {
            return Err(LikError::DomainViolation {
                value: gp,
                reason: format!("{} weight is {w}; must be finite and > 0", self.moment.name()),
            });
        }
        Ok((w, dw, d2w))
    }
}

impl<'m, M: MassModel + ?Sized> NegLogDensity for ConditionalMomentDensity<'m, M> {
    type Data = Cavity;

    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost> {
        Ok(self.nlog(x[0], data)?)
    }

    fn check(&self, x: &Theta, _data: &Self::Data) -> OptResult<()> {
        check_dim(x, 1)?;
        self.weight(x[0], 0)?;
        Ok(())
    }

    fn grad(&self, x: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(array![self.dnlog(x[0], data)?])
    }

    fn hessian(&self, x: &Theta, data: &Self::Data) -> OptResult<Hessian> {
        Ok(array![[self.d2nlog(x[0], data)?]])
    }
}

// ---- Joint predictive ----

/// Tilted product over the pair `x = (gp, obs)`.
#[derive(Debug)]
pub struct JointPredictive<'m, M: MassModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: MassModel + ?Sized> JointPredictive<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn value(&self, gp: f64, obs: f64, cavity: &Cavity) -> LikResult<f64> {
        TiltedProduct::new(self.model).nlog(gp, &ObservedCavity::new(obs, *cavity))
    }

    /// `(∂n/∂gp, ∂n/∂obs)`.
    ///
    /// # Errors
    /// [`LikError::DiscreteUnsupported`] for discrete models.
    pub fn gradient(&self, gp: f64, obs: f64, cavity: &Cavity) -> LikResult<Array1<f64>> {
        self.require_continuous("joint predictive gradient")?;
        let data = ObservedCavity::new(obs, *cavity);
        let d_gp = TiltedProduct::new(self.model).dnlog(gp, &data)?;
        let d_obs = self.model.dnlog_mass_dobs(gp, obs)?;
        Ok(array![d_gp, d_obs])
    }

    /// `[[∂²n/∂gp², c], [c, ∂²n/∂obs²]]` with `c` the cross partial.
    ///
    /// # Errors
    /// [`LikError::DiscreteUnsupported`] for discrete models.
    pub fn hessian(&self, gp: f64, obs: f64, cavity: &Cavity) -> LikResult<Hessian> {
        self.require_continuous("joint predictive hessian")?;
        let data = ObservedCavity::new(obs, *cavity);
        let h_gp = TiltedProduct::new(self.model).d2nlog(gp, &data)?;
        let cross = self.model.d2nlog_mass_dcross(gp, obs)?;
        let h_obs = self.model.d2nlog_mass_dobs2(gp, obs)?;
        Ok(array![[h_gp, cross], [cross, h_obs]])
    }

    fn require_continuous(&self, operation: &'static str) -> LikResult<()> {
        if self.model.is_discrete() {
            return Err(LikError::DiscreteUnsupported { operation });
        }
        Ok(())
    }
}

impl<'m, M: MassModel + ?Sized> NegLogDensity for JointPredictive<'m, M> {
    type Data = Cavity;

    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost> {
        Ok(JointPredictive::value(self, x[0], x[1], data)?)
    }

    fn check(&self, x: &Theta, _data: &Self::Data) -> OptResult<()> {
        check_dim(x, 2)?;
        self.require_continuous("joint predictive mode")?;
        Ok(())
    }

    fn grad(&self, x: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(self.gradient(x[0], x[1], data)?)
    }

    fn hessian(&self, x: &Theta, data: &Self::Data) -> OptResult<Hessian> {
        Ok(JointPredictive::hessian(self, x[0], x[1], data)?)
    }
}

// ---- Helper Methods ----

fn check_dim(x: &Theta, expected: usize) -> OptResult<()> {
    if x.len() != expected {
        return Err(OptError::GradientDimMismatch { expected, found: x.len() });
    }
    Ok(())
}
