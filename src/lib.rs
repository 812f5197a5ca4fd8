//! ep_likelihoods — Laplace-approximated likelihood factors for Expectation
//! Propagation, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the likelihood approximator to Python via the `_ep_likelihoods`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing class and submodule used by the
//! `ep_likelihoods` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`likelihoods` and `optimization`) as
//!   the public crate surface.
//! - Define the `Likelihood` `#[pyclass]` wrapping the bundled observation
//!   models and the `#[pymodule]` initializer for `_ep_likelihoods`.
//! - Register the `likelihoods` submodule in `sys.modules` so dotted imports
//!   work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Errors from core code are rich Rust types internally and become
//!   `ValueError`s at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`likelihoods`] directly and can
//!   ignore everything guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_ep_pipeline.rs`.

pub mod likelihoods;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    likelihoods::{
        core::link::{Identity, Log, Probit},
        Bernoulli, Gaussian, LikelihoodApproximator, MassModel, Poisson, PredictiveValues,
        StudentT,
    },
    utils::{extract_f64_vec, extract_options},
};

#[cfg(feature = "python-bindings")]
#[derive(Debug)]
enum Approximator {
    Gaussian(LikelihoodApproximator<Gaussian>),
    Bernoulli(LikelihoodApproximator<Bernoulli>),
    Poisson(LikelihoodApproximator<Poisson>),
    StudentT(LikelihoodApproximator<StudentT>),
}

/// Forward a call to whichever approximator is wrapped.
#[cfg(feature = "python-bindings")]
macro_rules! dispatch {
    ($inner:expr, $lik:ident => $body:expr) => {
        match $inner {
            Approximator::Gaussian($lik) => $body,
            Approximator::Bernoulli($lik) => $body,
            Approximator::Poisson($lik) => $body,
            Approximator::StudentT($lik) => $body,
        }
    };
}

/// Likelihood — Python-facing wrapper around a likelihood approximator.
///
/// Purpose
/// -------
/// Expose moment matching and predictive summaries for the bundled
/// observation models to Python EP loops.
///
/// Key behaviors
/// -------------
/// - Built through factory constructors (`gaussian`, `bernoulli`, `poisson`,
///   `student_t`). Models with closed forms use them unless
///   `numerical=True`; Student-t is always numerical.
/// - `moments_match` returns `(Z_hat, mu_hat, sigma2_hat)`.
/// - `predictive_values` returns mean, variance, lower and upper lists plus
///   `(index, message)` pairs for elements that failed; failed rows are NaN.
///   A failed interval bound only blanks that bound and is reported the
///   same way.
///
/// Parameters
/// ----------
/// Every constructor accepts the optimizer and approximator options
/// `tol_grad`, `tol_cost`, `max_iter`, `line_searcher`,
/// `variance_clamp_tol`, `interval` and `parallel`, forwarded to
/// [`extract_options`].
///
/// Notes
/// -----
/// - Rust callers should use [`LikelihoodApproximator`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "ep_likelihoods.likelihoods", frozen)]
pub struct Likelihood {
    inner: Approximator,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl Likelihood {
    #[staticmethod]
    #[pyo3(
        signature = (
            noise_var,
            numerical = false,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            variance_clamp_tol = None,
            interval = None,
            parallel = None,
        ),
        text_signature = "(noise_var, /, numerical=False, tol_grad=None, tol_cost=None, \
                          max_iter=None, line_searcher=None, variance_clamp_tol=None, \
                          interval=None, parallel=False)"
    )]
    pub fn gaussian(
        noise_var: f64, numerical: bool, tol_grad: Option<f64>, tol_cost: Option<f64>,
        max_iter: Option<usize>, line_searcher: Option<&str>, variance_clamp_tol: Option<f64>,
        interval: Option<(f64, f64)>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let options = extract_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            variance_clamp_tol,
            interval,
            parallel,
        )?;
        let model = Gaussian::new(noise_var)?;
        let lik = if numerical {
            LikelihoodApproximator::numerical(model, Identity, options)
        } else {
            LikelihoodApproximator::analytical(model, options)
        };
        Ok(Likelihood { inner: Approximator::Gaussian(lik) })
    }

    #[staticmethod]
    #[pyo3(
        signature = (
            numerical = false,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            variance_clamp_tol = None,
            interval = None,
            parallel = None,
        ),
        text_signature = "(numerical=False, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher=None, variance_clamp_tol=None, interval=None, \
                          parallel=False)"
    )]
    pub fn bernoulli(
        numerical: bool, tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
        line_searcher: Option<&str>, variance_clamp_tol: Option<f64>,
        interval: Option<(f64, f64)>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let options = extract_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            variance_clamp_tol,
            interval,
            parallel,
        )?;
        let lik = if numerical {
            LikelihoodApproximator::numerical(Bernoulli, Probit, options)
        } else {
            LikelihoodApproximator::analytical(Bernoulli, options)
        };
        Ok(Likelihood { inner: Approximator::Bernoulli(lik) })
    }

    #[staticmethod]
    #[pyo3(
        signature = (
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            variance_clamp_tol = None,
            interval = None,
            parallel = None,
        ),
        text_signature = "(tol_grad=None, tol_cost=None, max_iter=None, line_searcher=None, \
                          variance_clamp_tol=None, interval=None, parallel=False)"
    )]
    pub fn poisson(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
        line_searcher: Option<&str>, variance_clamp_tol: Option<f64>,
        interval: Option<(f64, f64)>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let options = extract_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            variance_clamp_tol,
            interval,
            parallel,
        )?;
        let lik = LikelihoodApproximator::numerical(Poisson, Log, options);
        Ok(Likelihood { inner: Approximator::Poisson(lik) })
    }

    #[staticmethod]
    #[pyo3(
        signature = (
            nu,
            scale,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            variance_clamp_tol = None,
            interval = None,
            parallel = None,
        ),
        text_signature = "(nu, scale, /, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher=None, variance_clamp_tol=None, interval=None, \
                          parallel=False)"
    )]
    pub fn student_t(
        nu: f64, scale: f64, tol_grad: Option<f64>, tol_cost: Option<f64>,
        max_iter: Option<usize>, line_searcher: Option<&str>, variance_clamp_tol: Option<f64>,
        interval: Option<(f64, f64)>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let options = extract_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            variance_clamp_tol,
            interval,
            parallel,
        )?;
        let model = StudentT::new(nu, scale)?;
        let lik = LikelihoodApproximator::numerical(model, Identity, options);
        Ok(Likelihood { inner: Approximator::StudentT(lik) })
    }

    /// Name of the wrapped observation model.
    #[getter]
    pub fn name(&self) -> &'static str {
        dispatch!(&self.inner, lik => lik.model().name())
    }

    #[getter]
    pub fn is_analytical(&self) -> bool {
        dispatch!(&self.inner, lik => lik.is_analytical())
    }

    /// Tilted moments `(Z_hat, mu_hat, sigma2_hat)` for one EP site.
    #[pyo3(text_signature = "(self, obs, tau, v)")]
    pub fn moments_match(&self, obs: f64, tau: f64, v: f64) -> PyResult<(f64, f64, f64)> {
        let m = dispatch!(&self.inner, lik => lik.moments_match(obs, tau, v))?;
        Ok((m.z_hat, m.mu_hat, m.sigma2_hat))
    }

    #[pyo3(text_signature = "(self, mu, sigma)")]
    pub fn predictive_mean(&self, mu: f64, sigma: f64) -> PyResult<f64> {
        Ok(dispatch!(&self.inner, lik => lik.predictive_mean(mu, sigma))?)
    }

    #[pyo3(
        signature = (mu, sigma, predictive_mean = None),
        text_signature = "(self, mu, sigma, /, predictive_mean=None)"
    )]
    pub fn predictive_variance(
        &self, mu: f64, sigma: f64, predictive_mean: Option<f64>,
    ) -> PyResult<f64> {
        Ok(dispatch!(&self.inner, lik => lik.predictive_variance(mu, sigma, predictive_mean))?)
    }

    /// Predictive mean, variance and interval bounds for a batch of cavities.
    #[pyo3(text_signature = "(self, mu, var)")]
    #[allow(clippy::type_complexity)]
    pub fn predictive_values<'py>(
        &self, py: Python<'py>, mu: &Bound<'py, PyAny>, var: &Bound<'py, PyAny>,
    ) -> PyResult<(Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<(usize, String)>)> {
        let mu = extract_f64_vec(py, mu)?;
        let var = extract_f64_vec(py, var)?;
        let values: PredictiveValues =
            dispatch!(&self.inner, lik => lik.predictive_values(mu, var))?;

        let failures = values
            .failures
            .iter()
            .chain(values.interval_failures.iter())
            .map(|(i, err)| (*i, err.to_string()))
            .collect::<Vec<_>>();
        Ok((
            values.mean.column(0).to_vec(),
            values.variance.column(0).to_vec(),
            values.lower.column(0).to_vec(),
            values.upper.column(0).to_vec(),
            failures,
        ))
    }

    /// Observations mapped onto the model's encoding (e.g. labels to ±1).
    #[pyo3(text_signature = "(self, y)")]
    pub fn preprocess_values<'py>(
        &self, py: Python<'py>, y: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<f64>> {
        let y = Array1::from(extract_f64_vec(py, y)?);
        let out = dispatch!(&self.inner, lik => lik.preprocess_values(&y))?;
        Ok(out.to_vec())
    }
}

/// _ep_likelihoods — PyO3 module initializer for the Python extension.
///
/// Creates the `likelihoods` submodule, attaches it to `_ep_likelihoods` and
/// registers it in `sys.modules` so it is importable via a dotted path.
///
/// # Errors
/// `PyErr` if creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _ep_likelihoods<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let likelihoods_mod = PyModule::new(_py, "likelihoods")?;
    likelihoods_submodule(_py, m, &likelihoods_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("ep_likelihoods.likelihoods", likelihoods_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn likelihoods_submodule<'py>(
    _py: Python, ep_likelihoods: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<Likelihood>()?;
    ep_likelihoods.add_submodule(m)?;
    Ok(())
}
