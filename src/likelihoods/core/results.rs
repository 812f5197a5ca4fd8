//! Result carriers for moment matching and prediction, plus the batch input
//! type accepted by `predictive_values`.
//!
//! Purpose
//! -------
//! Give each output a small, immutable type: [`TiltedMoments`] for EP site
//! updates, [`JointMode`] for the joint predictive search, [`PredictivePoint`]
//! for one cavity, and [`PredictiveValues`] for a batch laid out as `N × 1`
//! columns in input order.
//!
//! Invariants & assumptions
//! ------------------------
//! - `TiltedMoments` satisfies `z_hat ≥ 0` and `sigma2_hat > 0`; constructors
//!   enforce it.
//! - In `PredictiveValues`, a failed index holds `NaN` in all four columns
//!   and its error in `failures`; successful indices never appear there.
//! - A failed interval bound only blanks that bound: mean and variance are
//!   kept and the error goes to `interval_failures` under the same index.
//!
//! Conventions
//! -----------
//! - Batch inputs accept a scalar or a sequence through [`CavityBatch`];
//!   a scalar behaves exactly like a length-1 sequence.
use crate::{
    likelihoods::{
        core::validation::validate_tilted_moments,
        errors::{LikError, LikResult},
    },
    optimization::mode_finder::Hessian,
};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Moments of the tilted distribution `N(f; cavity) · p(obs | f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltedMoments {
    pub z_hat: f64,
    pub mu_hat: f64,
    pub sigma2_hat: f64,
}

impl TiltedMoments {
    /// Build validated tilted moments.
    ///
    /// # Errors
    /// [`LikError::InvalidTiltedMoments`] when `z_hat < 0`, `sigma2_hat ≤ 0`,
    /// or any entry is non-finite.
    pub fn new(z_hat: f64, mu_hat: f64, sigma2_hat: f64) -> LikResult<Self> {
        validate_tilted_moments(z_hat, mu_hat, sigma2_hat)?;
        Ok(Self { z_hat, mu_hat, sigma2_hat })
    }
}

/// Mode of the joint predictive over `(gp, obs)`.
///
/// - `gp` / `obs`: coordinates of the mode.
/// - `hessian`: symmetric `2 × 2` Hessian of the objective there.
/// - `normalizer`: Laplace estimate of `∫∫ N(f; cavity) p(y | f) df dy`,
///   which is `1` for a proper model.
#[derive(Debug, Clone, PartialEq)]
pub struct JointMode {
    pub gp: f64,
    pub obs: f64,
    pub hessian: Hessian,
    pub normalizer: f64,
}

/// Predictive summary for one cavity.
///
/// - `mean`: `E[Y]`.
/// - `variance`: `V[Y]`, never negative.
/// - `lower` / `upper`: predictive means at the cavity's lower and upper
///   quantiles; `NaN` when that bound could not be computed.
/// - `variance_clamped`: `true` if a slightly negative variance was clamped
///   to zero.
/// - `interval_error`: first error raised by a bound, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictivePoint {
    pub mean: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
    pub variance_clamped: bool,
    pub interval_error: Option<LikError>,
}

/// Predictive summaries for a batch, as `N × 1` columns in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveValues {
    pub mean: Array2<f64>,
    pub variance: Array2<f64>,
    pub lower: Array2<f64>,
    pub upper: Array2<f64>,
    pub clamped: Vec<bool>,
    pub failures: BTreeMap<usize, LikError>,
    pub interval_failures: BTreeMap<usize, LikError>,
}

impl PredictiveValues {
    /// Assemble columns from per-element results, keeping input order.
    pub fn from_points(points: Vec<LikResult<PredictivePoint>>) -> Self {
        let n = points.len();
        let mut mean = Array2::from_elem((n, 1), f64::NAN);
        let mut variance = Array2::from_elem((n, 1), f64::NAN);
        let mut lower = Array2::from_elem((n, 1), f64::NAN);
        let mut upper = Array2::from_elem((n, 1), f64::NAN);
        let mut clamped = vec![false; n];
        let mut failures = BTreeMap::new();
        let mut interval_failures = BTreeMap::new();

        for (i, point) in points.into_iter().enumerate() {
            match point {
                Ok(p) => {
                    mean[[i, 0]] = p.mean;
                    variance[[i, 0]] = p.variance;
                    lower[[i, 0]] = p.lower;
                    upper[[i, 0]] = p.upper;
                    clamped[i] = p.variance_clamped;
                    if let Some(e) = p.interval_error {
                        interval_failures.insert(i, e);
                    }
                }
                Err(e) => {
                    failures.insert(i, e);
                }
            }
        }
        Self { mean, variance, lower, upper, clamped, failures, interval_failures }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.mean.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when every element succeeded, interval bounds included.
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty() && self.interval_failures.is_empty()
    }
}

/// Scalar-or-sequence input for batch prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct CavityBatch(pub Vec<f64>);

impl CavityBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<f64> for CavityBatch {
    fn from(x: f64) -> Self {
        CavityBatch(vec![x])
    }
}

impl From<Vec<f64>> for CavityBatch {
    fn from(v: Vec<f64>) -> Self {
        CavityBatch(v)
    }
}

impl From<&[f64]> for CavityBatch {
    fn from(v: &[f64]) -> Self {
        CavityBatch(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for CavityBatch {
    fn from(v: [f64; N]) -> Self {
        CavityBatch(v.to_vec())
    }
}

impl From<Array1<f64>> for CavityBatch {
    fn from(v: Array1<f64>) -> Self {
        CavityBatch(v.to_vec())
    }
}

impl From<&Array1<f64>> for CavityBatch {
    fn from(v: &Array1<f64>) -> Self {
        CavityBatch(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Failed elements become NaN rows with an index-keyed error.
    //
    // Given
    // -----
    // - One success followed by one failure.
    //
    // Expect
    // ------
    // - Row 0 holds the point; row 1 is NaN and `failures` has key 1 only.
    fn from_points_isolates_failures() {
        let ok = PredictivePoint {
            mean: 1.0,
            variance: 2.0,
            lower: 0.5,
            upper: 1.5,
            variance_clamped: true,
            interval_error: None,
        };
        let err = LikError::NegativeVariance { value: -1.0 };

        let pv = PredictiveValues::from_points(vec![Ok(ok), Err(err.clone())]);

        assert_eq!(pv.len(), 2);
        assert_eq!(pv.mean[[0, 0]], 1.0);
        assert!(pv.clamped[0]);
        assert!(pv.mean[[1, 0]].is_nan() && pv.upper[[1, 0]].is_nan());
        assert_eq!(pv.failures.get(&1), Some(&err));
        assert!(!pv.failures.contains_key(&0));
        assert!(pv.interval_failures.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A failed interval bound keeps the row's mean and variance.
    //
    // Given
    // -----
    // - A point whose lower bound is `NaN` with an attached error.
    //
    // Expect
    // ------
    // - Mean, variance and upper are kept; the error is under
    //   `interval_failures`, not `failures`, and `all_ok` is false.
    fn from_points_keeps_rows_with_failed_bounds() {
        let err = LikError::DomainViolation { value: -1.0, reason: "weight".to_string() };
        let point = PredictivePoint {
            mean: 0.7,
            variance: 1.1,
            lower: f64::NAN,
            upper: 2.4,
            variance_clamped: false,
            interval_error: Some(err.clone()),
        };

        let pv = PredictiveValues::from_points(vec![Ok(point)]);

        assert_eq!(pv.mean[[0, 0]], 0.7);
        assert_eq!(pv.variance[[0, 0]], 1.1);
        assert_eq!(pv.upper[[0, 0]], 2.4);
        assert!(pv.lower[[0, 0]].is_nan());
        assert!(pv.failures.is_empty());
        assert_eq!(pv.interval_failures.get(&0), Some(&err));
        assert!(!pv.all_ok());
    }

    #[test]
    // Purpose
    // -------
    // A scalar converts to a length-1 batch.
    //
    // Given
    // -----
    // - `0.3` and `vec![0.3]`.
    //
    // Expect
    // ------
    // - Equal batches.
    fn scalar_is_length_one_batch() {
        assert_eq!(CavityBatch::from(0.3), CavityBatch::from(vec![0.3]));
        assert_eq!(CavityBatch::from([1.0, 2.0]).len(), 2);
    }
}
