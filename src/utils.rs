//! Python-side conversion helpers for the `python-bindings` feature.
//!
//! - [`extract_f64_array`] accepts NumPy arrays, pandas Series and plain
//!   sequences and returns a contiguous read-only `f64` view.
//! - [`extract_options`] builds validated [`ApproximatorOptions`] from
//!   keyword arguments.
#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    likelihoods::core::options::{ApproximatorOptions, PredictiveInterval, VariancePolicy},
    optimization::mode_finder::{LineSearcher, ModeOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    if let Ok(scalar) = raw_data.extract::<f64>() {
        return Ok(vec![scalar].into_pyarray(py).readonly());
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a float, 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a Python array-like into an owned vector.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(py: Python<'py>, raw_data: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    Ok(arr.as_slice()?.to_vec())
}

#[cfg(feature = "python-bindings")]
pub fn extract_options(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, variance_clamp_tol: Option<f64>,
    interval: Option<(f64, f64)>, parallel: Option<bool>,
) -> PyResult<ApproximatorOptions> {
    use std::str::FromStr;

    let defaults = ApproximatorOptions::default();

    // Fall back to the default tolerances only when nothing was passed.
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        defaults.mode.tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter)?
    };
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name)?,
        None => LineSearcher::MoreThuente,
    };
    let variance_policy = match variance_clamp_tol {
        Some(tol) => VariancePolicy::clamp(tol)?,
        None => defaults.variance_policy,
    };
    let interval = match interval {
        Some((lower, upper)) => PredictiveInterval::new(lower, upper)?,
        None => defaults.interval,
    };

    Ok(ApproximatorOptions::new(
        ModeOptions::new(tols, ls, false),
        variance_policy,
        interval,
        parallel.unwrap_or(false),
    ))
}
