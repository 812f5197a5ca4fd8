//! numerical_stability — tail-safe standard-normal primitives.
//!
//! Purpose
//! -------
//! Collect the standard-normal density, CDF, log-CDF and inverse Mills
//! ratio used by the probit likelihood and the predictive quantile logic,
//! evaluated so that they neither underflow nor cancel in the tails.
//!
//! Key behaviors
//! -------------
//! - `Φ(x)` through `statrs`' `erfc`, accurate for negative arguments.
//! - `ln Φ(x)` with an asymptotic lower tail past
//!   [`LOG_CDF_TAIL_CUTOFF`](normal::LOG_CDF_TAIL_CUTOFF).
//! - `φ(x)/Φ(x)` computed in log-space, and `x + φ(x)/Φ(x)` from the tail
//!   series where direct addition would cancel.
//! - Shared constants (`LN_2PI`, `HALF_LN_2PI`, `VARIANCE_CLAMP_TOL`).
//!
//! Conventions
//! -----------
//! - Pure scalar functions over `f64`; no logging, no allocation.
//! - Inputs are assumed finite; domain checks live with the callers.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`normal`] check known values, branch continuity, and
//!   tail finiteness.

pub mod normal;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::normal::{
    HALF_LN_2PI, LN_2PI, LOG_CDF_TAIL_CUTOFF, VARIANCE_CLAMP_TOL, inv_mills_ratio,
    inv_mills_shift, ln_std_norm_pdf, log_std_norm_cdf, std_norm_cdf, std_norm_pdf,
};

pub mod prelude {
    pub use super::normal::{
        HALF_LN_2PI, LN_2PI, inv_mills_ratio, log_std_norm_cdf, std_norm_cdf, std_norm_pdf,
    };
}
