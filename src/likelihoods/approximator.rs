//! Likelihood approximator: EP moment matching and predictive summaries.
//!
//! This module wires a [`MassModel`] to the mode finder and the Laplace
//! integrals. Every public method is a pure function of its arguments and of
//! the dispatch fixed at construction:
//!
//! - **Analytical** (`LikelihoodApproximator::analytical`): only for models
//!   implementing [`AnalyticalMoments`]. Moment matching and the predictive
//!   mean use the closed forms; the predictive variance uses the closed form
//!   when the model offers one and the Laplace path otherwise.
//! - **Numerical** (`LikelihoodApproximator::numerical`): every quantity is a
//!   Laplace approximation around a Newton–CG mode. A link function seeds the
//!   joint predictive search.
//!
//! Key formulas (cavity `N(mu, σ²)`, `τ = 1/σ²`):
//! - tilted moments: mode `f*` of `½τ(f − mu)² + nlog_mass(f, obs)`,
//!   `sigma2_hat = 1 / (τ + ∂²nlog_mass(f*))`,
//!   `Z_hat = exp(−n(f*)) / (σ √(τ + ∂²nlog_mass(f*)))`;
//! - `V[Y] = E[V(Y|f)] + E[E(Y|f)²] − E[Y]²`, each expectation a 1-D Laplace
//!   integral of a weighted cavity density.
//!
//! Batch prediction isolates failures per element and can fan out over
//! `rayon` workers; results always come back in input order.
use crate::{
    likelihoods::{
        core::{
            cavity::Cavity,
            laplace::{laplace_gaussian_expectation, laplace_integral},
            link::LinkFunction,
            mass::{AnalyticalMoments, MassModel},
            objectives::{
                ConditionalMoment, ConditionalMomentDensity, JOINT_PREDICTIVE, JointPredictive,
                ObservedCavity, TILTED_PRODUCT, TiltedProduct,
            },
            options::ApproximatorOptions,
            results::{CavityBatch, JointMode, PredictivePoint, PredictiveValues, TiltedMoments},
            validation::{validate_batch_lengths, validate_cavity_variance, validate_curvature},
        },
        errors::{LikError, LikResult},
    },
    optimization::{
        mode_finder::{ModeOutcome, NegLogDensity, Theta, find_mode},
        numerical_stability::HALF_LN_2PI,
    },
};
use ndarray::{Array1, array};
use rayon::prelude::*;

type MomentsFn<M> = fn(&M, f64, &Cavity) -> LikResult<TiltedMoments>;
type MeanFn<M> = fn(&M, &Cavity) -> LikResult<f64>;
type VarianceFn<M> = fn(&M, &Cavity, Option<f64>) -> Option<LikResult<f64>>;

/// Closed-form operations captured from an [`AnalyticalMoments`] impl.
pub struct AnalyticalOps<M> {
    moments_match: MomentsFn<M>,
    predictive_mean: MeanFn<M>,
    predictive_variance: VarianceFn<M>,
}

impl<M: AnalyticalMoments> AnalyticalOps<M> {
    fn capture() -> Self {
        Self {
            moments_match: M::moments_match_analytical,
            predictive_mean: M::predictive_mean_analytical,
            predictive_variance: M::predictive_variance_analytical,
        }
    }
}

impl<M> Clone for AnalyticalOps<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for AnalyticalOps<M> {}

impl<M> std::fmt::Debug for AnalyticalOps<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AnalyticalOps")
    }
}

/// Construction-time choice between closed forms and Laplace.
#[derive(Debug)]
pub enum Dispatch<M> {
    Analytical(AnalyticalOps<M>),
    Numerical { link: Box<dyn LinkFunction> },
}

/// EP/Laplace approximator around one observation model.
#[derive(Debug)]
pub struct LikelihoodApproximator<M: MassModel> {
    model: M,
    dispatch: Dispatch<M>,
    options: ApproximatorOptions,
}

impl<M: AnalyticalMoments> LikelihoodApproximator<M> {
    /// Approximator using the model's closed forms.
    pub fn analytical(model: M, options: ApproximatorOptions) -> Self {
        Self { model, dispatch: Dispatch::Analytical(AnalyticalOps::capture()), options }
    }
}

impl<M: MassModel> LikelihoodApproximator<M> {
    /// Approximator computing everything by Laplace.
    ///
    /// `link` is only used to seed the joint predictive search at
    /// `(mu, link.inv_transf(mu))`.
    pub fn numerical<L: LinkFunction + 'static>(
        model: M, link: L, options: ApproximatorOptions,
    ) -> Self {
        Self { model, dispatch: Dispatch::Numerical { link: Box::new(link) }, options }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn options(&self) -> &ApproximatorOptions {
        &self.options
    }

    pub fn is_analytical(&self) -> bool {
        matches!(self.dispatch, Dispatch::Analytical(_))
    }

    /// Link of a numerical approximator; `None` in analytical mode.
    pub fn link(&self) -> Option<&dyn LinkFunction> {
        match &self.dispatch {
            Dispatch::Numerical { link } => Some(link.as_ref()),
            Dispatch::Analytical(_) => None,
        }
    }

    /// Map raw observations onto the model's encoding.
    ///
    /// # Errors
    /// The model's [`LikError::InvalidObservation`] for the first bad entry.
    pub fn preprocess_values(&self, y: &Array1<f64>) -> LikResult<Array1<f64>> {
        self.model.preprocess_values(y)
    }

    // ---- Moment matching ----

    /// Tilted moments for `obs` under the cavity `(tau, v)`, using the
    /// construction-time dispatch.
    ///
    /// # Errors
    /// - Cavity validation errors for `tau ≤ 0` or non-finite `v`.
    /// - Anything [`moments_match_numerical`](Self::moments_match_numerical)
    ///   or the model's closed form returns.
    pub fn moments_match(&self, obs: f64, tau: f64, v: f64) -> LikResult<TiltedMoments> {
        match &self.dispatch {
            Dispatch::Analytical(ops) => {
                let cavity = Cavity::from_natural(tau, v)?;
                (ops.moments_match)(&self.model, obs, &cavity)
            }
            Dispatch::Numerical { .. } => self.moments_match_numerical(obs, tau, v),
        }
    }

    /// Laplace approximation of the tilted moments.
    ///
    /// Available in both modes so closed forms can be checked against it.
    ///
    /// # Errors
    /// - Cavity and observation validation errors.
    /// - [`LikError::ConvergenceFailed`] / [`LikError::ModeNotFound`] from
    ///   the mode search.
    /// - [`LikError::InvalidCurvature`] if `tau + ∂²nlog_mass` at the mode
    ///   is not positive.
    pub fn moments_match_numerical(&self, obs: f64, tau: f64, v: f64) -> LikResult<TiltedMoments> {
        let cavity = Cavity::from_natural(tau, v)?;
        self.model.validate_observation(obs)?;
        let data = ObservedCavity::new(obs, cavity);
        let objective = TiltedProduct::new(&self.model);

        let outcome = self.search(&objective, array![cavity.mu], &data, TILTED_PRODUCT)?;
        let mode = outcome.mode[0];
        let curvature = tau + self.model.d2nlog_mass_dgp2(mode, obs)?;
        validate_curvature(TILTED_PRODUCT, curvature)?;
        let nlog = objective.nlog(mode, &data)?;
        let z_hat = laplace_gaussian_expectation(TILTED_PRODUCT, nlog, curvature, cavity.sigma)?;
        TiltedMoments::new(z_hat, mode, 1.0 / curvature)
    }

    // ---- Predictive moments ----

    /// `E[Y]` under `f ~ N(mu, sigma²)`, using the construction-time dispatch.
    pub fn predictive_mean(&self, mu: f64, sigma: f64) -> LikResult<f64> {
        self.predictive_mean_at(&Cavity::new(mu, sigma)?)
    }

    /// Laplace approximation of `E[Y] = E[E(Y|f)]`.
    ///
    /// # Errors
    /// [`LikError::DomainViolation`] if `E(Y|f)` is not positive along the
    /// search, plus the usual search and curvature errors.
    pub fn predictive_mean_numerical(&self, mu: f64, sigma: f64) -> LikResult<f64> {
        self.laplace_moment(ConditionalMoment::Mean, &Cavity::new(mu, sigma)?)
    }

    /// Laplace approximation of `E[E(Y|f)²]`.
    pub fn predictive_mean_sq(&self, mu: f64, sigma: f64) -> LikResult<f64> {
        self.laplace_moment(ConditionalMoment::MeanSquared, &Cavity::new(mu, sigma)?)
    }

    /// Laplace approximation of `E[V(Y|f)]`.
    pub fn expected_conditional_variance(&self, mu: f64, sigma: f64) -> LikResult<f64> {
        self.laplace_moment(ConditionalMoment::Variance, &Cavity::new(mu, sigma)?)
    }

    /// `V[Y] = E[V(Y|f)] + V[E(Y|f)]`.
    ///
    /// `predictive_mean` is reused when given and computed otherwise. Slightly
    /// negative results are handled by the configured
    /// [`VariancePolicy`](crate::likelihoods::core::VariancePolicy).
    ///
    /// # Errors
    /// - [`LikError::NegativeVariance`] when the policy rejects the value.
    /// - [`LikError::DomainViolation`] for a non-finite `predictive_mean`.
    /// - Search and curvature errors of the three underlying integrals.
    pub fn predictive_variance(
        &self, mu: f64, sigma: f64, predictive_mean: Option<f64>,
    ) -> LikResult<f64> {
        let cavity = Cavity::new(mu, sigma)?;
        Ok(self.variance_at(&cavity, predictive_mean)?.0)
    }

    // ---- Joint predictive ----

    /// Mode of the joint density of `(f, y)`, its Hessian and the Laplace
    /// normalizer of the joint.
    ///
    /// # Errors
    /// - [`LikError::CapabilityMissing`] in analytical mode (no link).
    /// - [`LikError::DiscreteUnsupported`] for discrete models.
    /// - Search and curvature errors.
    pub fn joint_predictive_mode(&self, mu: f64, sigma: f64) -> LikResult<JointMode> {
        let link = self.link().ok_or(LikError::CapabilityMissing {
            operation: "joint_predictive_mode",
            mode: "analytical",
        })?;
        if self.model.is_discrete() {
            return Err(LikError::DiscreteUnsupported { operation: "joint_predictive_mode" });
        }
        let cavity = Cavity::new(mu, sigma)?;
        let objective = JointPredictive::new(&self.model);

        let x0 = array![mu, link.inv_transf(mu)];
        let outcome = self.search(&objective, x0, &cavity, JOINT_PREDICTIVE)?;
        let (gp, obs) = (outcome.mode[0], outcome.mode[1]);
        let hessian = JointPredictive::hessian(&objective, gp, obs, &cavity)?;
        let nlog = JointPredictive::value(&objective, gp, obs, &cavity)?;
        let integral = laplace_integral(JOINT_PREDICTIVE, nlog, &hessian)?;
        let normalizer = (integral.ln() - HALF_LN_2PI - sigma.ln()).exp();
        Ok(JointMode { gp, obs, hessian, normalizer })
    }

    // ---- Batch prediction ----

    /// Mean, variance and quantile-conditioned means for one cavity given by
    /// its mean and variance.
    pub fn predictive_point(&self, mu: f64, var: f64) -> LikResult<PredictivePoint> {
        self.point_at(0, mu, var)
    }

    /// Per-element predictions in input order.
    ///
    /// # Errors
    /// [`LikError::LengthMismatch`] when `mu` and `var` differ in length;
    /// element failures are returned in place instead.
    pub fn predictive_points(
        &self, mu: &[f64], var: &[f64],
    ) -> LikResult<Vec<LikResult<PredictivePoint>>> {
        validate_batch_lengths(mu.len(), var.len())?;
        let points: Vec<_> = if self.options.parallel {
            mu.par_iter()
                .zip(var.par_iter())
                .enumerate()
                .map(|(i, (&m, &v))| self.point_at(i, m, v))
                .collect()
        } else {
            mu.iter().zip(var).enumerate().map(|(i, (&m, &v))| self.point_at(i, m, v)).collect()
        };
        Ok(points)
    }

    /// Predictive mean, variance and interval bounds as `N × 1` columns.
    ///
    /// `mu` and `var` accept a scalar or any sequence convertible into
    /// [`CavityBatch`]; a scalar behaves as a length-1 sequence.
    ///
    /// # Errors
    /// [`LikError::LengthMismatch`]; per-element errors land in
    /// [`PredictiveValues::failures`]. A bound that cannot be computed is
    /// `NaN` with its error in [`PredictiveValues::interval_failures`],
    /// leaving the row's mean and variance intact.
    pub fn predictive_values(
        &self, mu: impl Into<CavityBatch>, var: impl Into<CavityBatch>,
    ) -> LikResult<PredictiveValues> {
        let (mu, var) = (mu.into(), var.into());
        let values = PredictiveValues::from_points(self.predictive_points(&mu.0, &var.0)?);
        if !values.all_ok() {
            log::debug!(
                "predictive values: {} of {} elements failed, {} interval bounds failed",
                values.failures.len(),
                values.len(),
                values.interval_failures.len()
            );
        }
        Ok(values)
    }

    // ---- Helper Methods ----

    fn predictive_mean_at(&self, cavity: &Cavity) -> LikResult<f64> {
        match &self.dispatch {
            Dispatch::Analytical(ops) => (ops.predictive_mean)(&self.model, cavity),
            Dispatch::Numerical { .. } => self.laplace_moment(ConditionalMoment::Mean, cavity),
        }
    }

    /// Variance after the clamp policy, with the clamp flag.
    fn variance_at(&self, cavity: &Cavity, predictive_mean: Option<f64>) -> LikResult<(f64, bool)> {
        if let Some(mean) = predictive_mean {
            if !mean.is_finite() {
                return Err(LikError::DomainViolation {
                    value: mean,
                    reason: "predictive mean must be finite".to_string(),
                });
            }
        }
        if let Dispatch::Analytical(ops) = &self.dispatch {
            let closed_form = (ops.predictive_variance)(&self.model, cavity, predictive_mean);
            if let Some(variance) = closed_form {
                return self.options.variance_policy.apply(variance?, 1.0);
            }
        }

        let exp_var = self.laplace_moment(ConditionalMoment::Variance, cavity)?;
        let exp_mean_sq = self.laplace_moment(ConditionalMoment::MeanSquared, cavity)?;
        let mean = match predictive_mean {
            Some(mean) => mean,
            None => self.predictive_mean_at(cavity)?,
        };
        let variance = exp_var + exp_mean_sq - mean * mean;
        self.options.variance_policy.apply(variance, exp_var.max(exp_mean_sq))
    }

    /// One batch element; `index` only labels variance errors.
    fn point_at(&self, index: usize, mu: f64, var: f64) -> LikResult<PredictivePoint> {
        validate_cavity_variance(index, var)?;
        let cavity = Cavity::new(mu, var.sqrt())?;
        let mean = self.predictive_mean_at(&cavity)?;
        let (variance, variance_clamped) = self.variance_at(&cavity, Some(mean))?;

        let interval = self.options.interval;
        let lower = self.bound_at(&cavity, interval.lower);
        let upper = self.bound_at(&cavity, interval.upper);
        let interval_error = lower.as_ref().err().or(upper.as_ref().err()).cloned();
        if let Some(err) = &interval_error {
            log::debug!("predictive interval at index {index}: {err}");
        }
        Ok(PredictivePoint {
            mean,
            variance,
            lower: lower.unwrap_or(f64::NAN),
            upper: upper.unwrap_or(f64::NAN),
            variance_clamped,
            interval_error,
        })
    }

    /// Predictive mean of the cavity shifted to its quantile at `p`.
    fn bound_at(&self, cavity: &Cavity, p: f64) -> LikResult<f64> {
        let shifted = Cavity::new(cavity.quantile(p)?, cavity.sigma)?;
        self.predictive_mean_at(&shifted)
    }

    /// `∫ N(f; cavity) w(f) df` for the weight selected by `moment`.
    fn laplace_moment(&self, moment: ConditionalMoment, cavity: &Cavity) -> LikResult<f64> {
        let objective = ConditionalMomentDensity::new(&self.model, moment);
        let x0 = objective.start(cavity)?;
        let outcome = self.search(&objective, array![x0], cavity, moment.name())?;
        let mode = outcome.mode[0];
        let nlog = objective.nlog(mode, cavity)?;
        let curvature = objective.d2nlog(mode, cavity)?;
        laplace_gaussian_expectation(moment.name(), nlog, curvature, cavity.sigma)
    }

    fn search<F: NegLogDensity>(
        &self, objective: &F, x0: Theta, data: &F::Data, name: &'static str,
    ) -> LikResult<ModeOutcome> {
        let outcome = find_mode(objective, x0, data, &self.options.mode)
            .map_err(|err| LikError::from_search(name, err))?;
        log::debug!(
            "{name}: mode {} after {} iterations ({})",
            outcome.mode,
            outcome.iterations,
            outcome.status
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihoods::{
        core::{
            link::{Identity, Log},
            options::VariancePolicy,
        },
        models::{Bernoulli, Gaussian, Poisson, StudentT},
    };
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Dispatch: analytical closed forms vs the Laplace path.
    // - Capability guards (`CapabilityMissing`, `DiscreteUnsupported`).
    // - Error isolation in batches.
    //
    // Exactness checks rely on the Gaussian and Poisson families, where every
    // objective is quadratic and Laplace has no approximation error.
    // -------------------------------------------------------------------------

    fn gaussian_numerical() -> LikelihoodApproximator<Gaussian> {
        let model = Gaussian::new(0.5).unwrap();
        LikelihoodApproximator::numerical(model, Identity, ApproximatorOptions::default())
    }

    #[test]
    // Purpose
    // -------
    // The Laplace tilted moments of a Gaussian mass equal the conjugate ones.
    //
    // Given
    // -----
    // - Noise 0.5; `tau = 2`, `v = 1`, `obs = 0.5`.
    //
    // Expect
    // ------
    // - `mu_hat = (tau·mu + obs/0.5)/(tau + 2)`, equal analytical and
    //   numerical triples within 1e-6.
    fn gaussian_numerical_matches_analytical() {
        let model = Gaussian::new(0.5).unwrap();
        let analytical = LikelihoodApproximator::analytical(model, ApproximatorOptions::default());
        let numerical = gaussian_numerical();

        let a = analytical.moments_match(0.5, 2.0, 1.0).unwrap();
        let n = numerical.moments_match(0.5, 2.0, 1.0).unwrap();

        let mu = 0.5;
        assert_relative_eq!(n.mu_hat, (2.0 * mu + 0.5 / 0.5) / (2.0 + 2.0), epsilon = 1e-6);
        assert_relative_eq!(n.mu_hat, a.mu_hat, epsilon = 1e-6);
        assert_relative_eq!(n.sigma2_hat, a.sigma2_hat, epsilon = 1e-6);
        assert_relative_eq!(n.z_hat, a.z_hat, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Poisson predictive moments are exact lognormal moments.
    //
    // Given
    // -----
    // - Cavity N(0.3, 0.5²).
    //
    // Expect
    // ------
    // - `E[Y] = exp(mu + σ²/2)` and `V[Y] = m + m²(exp(σ²) − 1)`.
    fn poisson_predictive_moments_are_exact() {
        let lik =
            LikelihoodApproximator::numerical(Poisson, Log, ApproximatorOptions::default());
        let (mu, sigma) = (0.3, 0.5);
        let s2: f64 = sigma * sigma;
        let m = (mu + 0.5 * s2).exp();

        let mean = lik.predictive_mean(mu, sigma).unwrap();
        let variance = lik.predictive_variance(mu, sigma, None).unwrap();

        assert_relative_eq!(mean, m, max_relative = 1e-6);
        assert_relative_eq!(variance, m + m * m * (s2.exp() - 1.0), max_relative = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // The Bernoulli closed-form variance override is used in analytical mode.
    //
    // Given
    // -----
    // - Analytical probit approximator, cavity N(0.2, 1).
    //
    // Expect
    // ------
    // - `V[Y] = p(1 − p)` with `p = Φ(0.2/√2)`.
    fn analytical_variance_override_is_used() {
        let lik = LikelihoodApproximator::analytical(Bernoulli, ApproximatorOptions::default());
        let p = lik.predictive_mean(0.2, 1.0).unwrap();

        let variance = lik.predictive_variance(0.2, 1.0, None).unwrap();

        assert_relative_eq!(variance, p * (1.0 - p), epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // The joint mode needs a link and a continuous model.
    //
    // Given
    // -----
    // - An analytical Gaussian approximator and a numerical Poisson one.
    //
    // Expect
    // ------
    // - `CapabilityMissing` and `DiscreteUnsupported` respectively.
    fn joint_mode_guards() {
        let analytical = LikelihoodApproximator::analytical(
            Gaussian::new(1.0).unwrap(),
            ApproximatorOptions::default(),
        );
        let poisson =
            LikelihoodApproximator::numerical(Poisson, Log, ApproximatorOptions::default());

        assert!(matches!(
            analytical.joint_predictive_mode(0.0, 1.0),
            Err(LikError::CapabilityMissing { .. })
        ));
        assert!(matches!(
            poisson.joint_predictive_mode(0.0, 1.0),
            Err(LikError::DiscreteUnsupported { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The Gaussian joint predictive sits at `(mu, mu)` with unit mass.
    //
    // Given
    // -----
    // - Noise 0.5, cavity N(0.4, 0.8²).
    //
    // Expect
    // ------
    // - Mode `(0.4, 0.4)`, symmetric Hessian, normalizer ≈ 1.
    fn gaussian_joint_mode_is_normalized() {
        let joint = gaussian_numerical().joint_predictive_mode(0.4, 0.8).unwrap();

        assert_relative_eq!(joint.gp, 0.4, epsilon = 1e-8);
        assert_relative_eq!(joint.obs, 0.4, epsilon = 1e-8);
        assert_eq!(joint.hessian[[0, 1]], joint.hessian[[1, 0]]);
        assert_relative_eq!(joint.normalizer, 1.0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Batch failures stay local to their index.
    //
    // Given
    // -----
    // - Student-t (identity mean) with `mu = [-1, 2]`, `var = 0.1`.
    //
    // Expect
    // ------
    // - Index 0 fails with `DomainViolation` (non-positive mean weight);
    //   index 1 succeeds with finite entries.
    fn batch_failures_are_isolated() {
        let lik = LikelihoodApproximator::numerical(
            StudentT::new(4.0, 0.5).unwrap(),
            Identity,
            ApproximatorOptions::default(),
        );

        let values = lik.predictive_values(vec![-1.0, 2.0], vec![0.1, 0.1]).unwrap();

        assert!(matches!(values.failures.get(&0), Some(LikError::DomainViolation { .. })));
        assert!(!values.failures.contains_key(&1));
        assert!(values.mean[[1, 0]].is_finite() && values.variance[[1, 0]] >= 0.0);
        assert!(values.mean[[0, 0]].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // A bound that leaves the mean weight's domain does not discard the
    // element's mean and variance.
    //
    // Given
    // -----
    // - Student-t (ν = 4, s = 0.5) with identity mean, cavity `mu = 0.5`,
    //   `var = 1`; the 2.5% quantile is near -1.46, where the weight `f`
    //   is negative.
    //
    // Expect
    // ------
    // - Mean and variance equal the scalar operations, `upper` is finite,
    //   `lower` is NaN with a `DomainViolation` under `interval_failures`,
    //   and `failures` is empty.
    fn failed_bound_keeps_mean_and_variance() {
        let lik = LikelihoodApproximator::numerical(
            StudentT::new(4.0, 0.5).unwrap(),
            Identity,
            ApproximatorOptions::default(),
        );
        let mean = lik.predictive_mean(0.5, 1.0).unwrap();
        let variance = lik.predictive_variance(0.5, 1.0, Some(mean)).unwrap();

        let values = lik.predictive_values(0.5, 1.0).unwrap();

        assert!(values.failures.is_empty());
        assert_relative_eq!(values.mean[[0, 0]], mean, epsilon = 1e-12);
        assert_relative_eq!(values.variance[[0, 0]], variance, epsilon = 1e-12);
        assert!(values.upper[[0, 0]].is_finite() && values.upper[[0, 0]] > mean);
        assert!(values.lower[[0, 0]].is_nan());
        assert!(matches!(
            values.interval_failures.get(&0),
            Some(LikError::DomainViolation { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Parallel and sequential batches agree element-wise.
    //
    // Given
    // -----
    // - Poisson, five cavities, `parallel` on and off.
    //
    // Expect
    // ------
    // - Identical `PredictiveValues`.
    fn parallel_batch_matches_sequential() {
        let opts = ApproximatorOptions { parallel: true, ..Default::default() };
        let par = LikelihoodApproximator::numerical(Poisson, Log, opts);
        let seq = LikelihoodApproximator::numerical(Poisson, Log, ApproximatorOptions::default());
        let mu = [-0.5, 0.0, 0.5, 1.0, 1.5];
        let var = [0.2, 0.3, 0.1, 0.4, 0.05];

        let a = par.predictive_values(mu, var).unwrap();
        let b = seq.predictive_values(mu, var).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    // Purpose
    // -------
    // A negative variance is reported, never returned.
    //
    // Given
    // -----
    // - `VariancePolicy::Fail`, Poisson cavity N(0, 0.1²) and an inflated
    //   `predictive_mean = 10`, so `E[E(Y|f)²] − mean²` is far below zero.
    //
    // Expect
    // ------
    // - `NegativeVariance`.
    fn fail_policy_reports_negative_variance() {
        let opts =
            ApproximatorOptions { variance_policy: VariancePolicy::Fail, ..Default::default() };
        let lik = LikelihoodApproximator::numerical(Poisson, Log, opts);

        assert!(matches!(
            lik.predictive_variance(0.0, 0.1, Some(10.0)),
            Err(LikError::NegativeVariance { .. })
        ));
    }
}
