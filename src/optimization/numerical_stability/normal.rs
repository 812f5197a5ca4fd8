//! Standard-normal helpers that stay accurate in the tails.
//!
//! Naïve `ln Φ(x)` and `φ(x)/Φ(x)` lose all precision once `Φ(x)` underflows
//! (around `x ≈ -38`) and degrade well before that. The helpers here switch to
//! asymptotic expansions past a fixed cutoff, the same guarded strategy used
//! for softplus-style transforms.
//!
//! # Provided items
//! - [`LN_2PI`], [`HALF_LN_2PI`]: normalizing constants.
//! - [`std_norm_pdf`], [`ln_std_norm_pdf`]: density and log-density.
//! - [`std_norm_cdf`]: `Φ(x)` through `erfc`, accurate for negative `x`.
//! - [`log_std_norm_cdf`]: `ln Φ(x)` with an asymptotic lower tail.
//! - [`inv_mills_ratio`]: `φ(x)/Φ(x)` computed in log-space.
//! - [`inv_mills_shift`]: `x + φ(x)/Φ(x)` without tail cancellation.
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// `ln(2π)`.
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// `0.5 · ln(2π)`.
pub const HALF_LN_2PI: f64 = 0.918_938_533_204_672_7;

/// Below this point `ln Φ(x)` uses the asymptotic series.
pub const LOG_CDF_TAIL_CUTOFF: f64 = -20.0;

/// Relative tolerance for treating a slightly negative variance as zero.
pub const VARIANCE_CLAMP_TOL: f64 = 1e-8;

/// Standard normal density `φ(x)`.
pub fn std_norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal log-density `ln φ(x)`.
pub fn ln_std_norm_pdf(x: f64) -> f64 {
    -0.5 * x * x - HALF_LN_2PI
}

/// Standard normal CDF `Φ(x) = ½ · erfc(−x/√2)`.
///
/// Using `erfc` keeps full relative precision for negative `x`, where
/// `1 − ½·erfc(x/√2)` would cancel.
pub fn std_norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// `S(x) − 1` for the lower-tail expansion `Φ(x) ≈ φ(x)/(−x) · S(x)`,
/// `S(x) = 1 − 1/x² + 3/x⁴ − 15/x⁶ + 105/x⁸ − 945/x¹⁰`.
fn tail_series(x: f64) -> f64 {
    let inv2 = 1.0 / (x * x);
    inv2 * (-1.0 + inv2 * (3.0 + inv2 * (-15.0 + inv2 * (105.0 - 945.0 * inv2))))
}

/// Natural log of the standard normal CDF.
///
/// - For `x ≥ LOG_CDF_TAIL_CUTOFF`, `ln(½·erfc(−x/√2))`.
/// - Below it, the Mills-ratio expansion `ln φ(x) − ln(−x) + ln S(x)`.
pub fn log_std_norm_cdf(x: f64) -> f64 {
    if x >= LOG_CDF_TAIL_CUTOFF {
        return std_norm_cdf(x).ln();
    }
    ln_std_norm_pdf(x) - (-x).ln() + tail_series(x).ln_1p()
}

/// Inverse Mills ratio `φ(x)/Φ(x)`.
///
/// Evaluated as `exp(ln φ − ln Φ)` above the tail cutoff and as `−x / S(x)`
/// below it. Behaves like `−x` for very negative `x` and decays to `0` for
/// large `x`.
pub fn inv_mills_ratio(x: f64) -> f64 {
    if x >= LOG_CDF_TAIL_CUTOFF {
        return (ln_std_norm_pdf(x) - log_std_norm_cdf(x)).exp();
    }
    -x / (1.0 + tail_series(x))
}

/// `x + φ(x)/Φ(x)`, the factor in the probit variance update.
///
/// In the lower tail the two terms nearly cancel (`≈ −1/x`), so below the
/// cutoff the sum comes from the series as `x·(S − 1)/S`.
pub fn inv_mills_shift(x: f64) -> f64 {
    if x >= LOG_CDF_TAIL_CUTOFF {
        return x + inv_mills_ratio(x);
    }
    let s = tail_series(x);
    x * s / (1.0 + s)
}
