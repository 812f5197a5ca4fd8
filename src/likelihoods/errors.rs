//! Errors for the likelihood layer (cavity and observation validation,
//! capability checks, Laplace curvature, and mode-finder failures).
//!
//! This module defines [`LikError`], used by mass models, objectives, the
//! Laplace integrator and the approximator. It implements `Display`/`Error`,
//! converts to and from the optimizer's [`OptError`], and converts to `PyErr`
//! when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - `objective` fields name the density whose mode was sought
//!   (`"tilted product"`, `"conditional mean"`, ...).
//! - Optimizer failures are normalized to [`LikError::ConvergenceFailed`]
//!   when the iteration cap ran out, and to [`LikError::ModeNotFound`]
//!   otherwise; objective domain violations keep their own variant.
use crate::optimization::errors::OptError;

/// Result alias for likelihood operations that may produce [`LikError`].
pub type LikResult<T> = Result<T, LikError>;

/// Unified error type for the likelihood layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LikError {
    // ---- Capability ----
    /// The operation needs something the approximator was not built with
    /// (e.g. a link function in analytical mode).
    CapabilityMissing { operation: &'static str, mode: &'static str },

    /// Derivatives with respect to the observation are meaningless for a
    /// discrete mass model.
    DiscreteUnsupported { operation: &'static str },

    // ---- Mode finding ----
    /// Mode search exhausted its iteration budget.
    ConvergenceFailed { objective: &'static str, iterations: usize, grad_norm: f64 },

    /// Mode search failed for another reason.
    ModeNotFound { objective: &'static str, source: OptError },

    /// Curvature at the mode is not strictly positive (or not finite), so the
    /// Laplace approximation is undefined.
    InvalidCurvature { objective: &'static str, value: f64 },

    // ---- Cavity validation ----
    /// Cavity precision `tau` must be finite and > 0.
    NonPositivePrecision { value: f64 },

    /// Cavity natural mean `v` must be finite.
    InvalidNaturalMean { value: f64 },

    /// Cavity mean `mu` must be finite.
    InvalidCavityMean { value: f64 },

    /// Cavity standard deviation must be finite and > 0.
    NonPositiveSigma { value: f64 },

    /// Cavity variance must be finite and > 0.
    InvalidCavityVariance { index: usize, value: f64 },

    // ---- Model evaluation ----
    /// A computed variance fell below zero beyond the clamp tolerance.
    NegativeVariance { value: f64 },

    /// Observation outside the support of the mass model.
    InvalidObservation { value: f64, reason: &'static str },

    /// A model quantity left its domain (e.g. a non-positive weight whose
    /// logarithm is needed).
    DomainViolation { value: f64, reason: String },

    // ---- Configuration ----
    /// `mu` and `var` batches differ in length.
    LengthMismatch { mu_len: usize, var_len: usize },

    /// Predictive interval quantiles must satisfy `0 < lower < upper < 1`.
    InvalidInterval { lower: f64, upper: f64 },

    /// Variance clamp tolerance must be finite and ≥ 0.
    InvalidVarianceTolerance { value: f64 },

    /// Mass-model parameter out of range.
    InvalidModelParam { name: &'static str, value: f64, reason: &'static str },

    /// Analytical moment matching returned an inconsistent triple.
    InvalidTiltedMoments { z_hat: f64, sigma2_hat: f64 },
}

impl std::error::Error for LikError {}

impl std::fmt::Display for LikError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Capability ----
            LikError::CapabilityMissing { operation, mode } => {
                write!(f, "Operation '{operation}' is not available in {mode} mode")
            }
            LikError::DiscreteUnsupported { operation } => {
                write!(f, "Operation '{operation}' is not supported for discrete mass models")
            }

            // ---- Mode finding ----
            LikError::ConvergenceFailed { objective, iterations, grad_norm } => {
                write!(
                    f,
                    "Mode search for the {objective} did not converge in {iterations} iterations \
                     (gradient norm {grad_norm})"
                )
            }
            LikError::ModeNotFound { objective, source } => {
                write!(f, "Mode search for the {objective} failed: {source}")
            }
            LikError::InvalidCurvature { objective, value } => {
                write!(
                    f,
                    "Curvature of the {objective} at its mode is {value}; must be finite and > 0"
                )
            }

            // ---- Cavity validation ----
            LikError::NonPositivePrecision { value } => {
                write!(f, "Cavity precision must be finite and > 0, got {value}")
            }
            LikError::InvalidNaturalMean { value } => {
                write!(f, "Cavity natural mean must be finite, got {value}")
            }
            LikError::InvalidCavityMean { value } => {
                write!(f, "Cavity mean must be finite, got {value}")
            }
            LikError::NonPositiveSigma { value } => {
                write!(f, "Cavity standard deviation must be finite and > 0, got {value}")
            }
            LikError::InvalidCavityVariance { index, value } => {
                write!(f, "Cavity variance at index {index} must be finite and > 0, got {value}")
            }

            // ---- Model evaluation ----
            LikError::NegativeVariance { value } => {
                write!(f, "Computed variance is negative: {value}")
            }
            LikError::InvalidObservation { value, reason } => {
                write!(f, "Invalid observation {value}: {reason}")
            }
            LikError::DomainViolation { value, reason } => {
                write!(f, "Domain violation at {value}: {reason}")
            }

            // ---- Configuration ----
            LikError::LengthMismatch { mu_len, var_len } => {
                write!(f, "Length mismatch: mu has {mu_len} entries, var has {var_len}")
            }
            LikError::InvalidInterval { lower, upper } => {
                write!(
                    f,
                    "Invalid predictive interval ({lower}, {upper}); need 0 < lower < upper < 1"
                )
            }
            LikError::InvalidVarianceTolerance { value } => {
                write!(f, "Variance clamp tolerance must be finite and >= 0, got {value}")
            }
            LikError::InvalidModelParam { name, value, reason } => {
                write!(f, "Invalid model parameter {name} = {value}: {reason}")
            }
            LikError::InvalidTiltedMoments { z_hat, sigma2_hat } => {
                write!(
                    f,
                    "Invalid tilted moments: Z_hat = {z_hat} (need >= 0), \
                     sigma2_hat = {sigma2_hat} (need > 0)"
                )
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<LikError> for pyo3::PyErr {
    fn from(err: LikError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

impl From<LikError> for OptError {
    fn from(err: LikError) -> OptError {
        match err {
            LikError::DomainViolation { value, reason } => {
                OptError::DomainViolation { value, reason }
            }
            other => OptError::ObjectiveFailed { text: other.to_string() },
        }
    }
}

impl LikError {
    /// Attach an objective name to a mode-finder failure.
    ///
    /// - `NotConverged` → [`LikError::ConvergenceFailed`]
    /// - `DomainViolation` → [`LikError::DomainViolation`]
    /// - anything else → [`LikError::ModeNotFound`]
    pub fn from_search(objective: &'static str, err: OptError) -> LikError {
        match err {
            OptError::NotConverged { iterations, grad_norm } => {
                LikError::ConvergenceFailed { objective, iterations, grad_norm }
            }
            OptError::DomainViolation { value, reason } => {
                LikError::DomainViolation { value, reason }
            }
            source => LikError::ModeNotFound { objective, source },
        }
    }
}
