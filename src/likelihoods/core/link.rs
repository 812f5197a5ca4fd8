//! Link functions between the output-mean scale and the latent scale.
//!
//! `transf` maps an output-space value onto the latent scale (`g`), and
//! `inv_transf` maps a latent value back (`g⁻¹`). The joint predictive seeds
//! its observation coordinate with `inv_transf(mu)`.
use crate::optimization::numerical_stability::std_norm_cdf;
use statrs::distribution::{ContinuousCDF, Normal};

/// Monotone link `g` with inverse `g⁻¹`.
pub trait LinkFunction: Send + Sync + std::fmt::Debug {
    /// `g(mean)`: output scale → latent scale.
    fn transf(&self, mean: f64) -> f64;

    /// `g⁻¹(gp)`: latent scale → output scale.
    fn inv_transf(&self, gp: f64) -> f64;
}

/// `g(m) = m`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl LinkFunction for Identity {
    fn transf(&self, mean: f64) -> f64 {
        mean
    }

    fn inv_transf(&self, gp: f64) -> f64 {
        gp
    }
}

/// `g(m) = ln m`; `g⁻¹(f) = eᶠ`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Log;

impl LinkFunction for Log {
    fn transf(&self, mean: f64) -> f64 {
        mean.ln()
    }

    fn inv_transf(&self, gp: f64) -> f64 {
        gp.exp()
    }
}

/// `g(p) = Φ⁻¹(p)`; `g⁻¹(f) = Φ(f)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Probit;

impl LinkFunction for Probit {
    /// Returns `NaN` outside `[0, 1]`.
    fn transf(&self, mean: f64) -> f64 {
        match Normal::new(0.0, 1.0) {
            Ok(std) if (0.0..=1.0).contains(&mean) => std.inverse_cdf(mean),
            _ => f64::NAN,
        }
    }

    fn inv_transf(&self, gp: f64) -> f64 {
        std_norm_cdf(gp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Each link's `inv_transf` undoes `transf`.
    //
    // Given
    // -----
    // - Interior points for each link.
    //
    // Expect
    // ------
    // - `inv_transf(transf(m)) ≈ m`.
    fn links_invert() {
        let links: [&dyn LinkFunction; 3] = [&Identity, &Log, &Probit];
        for link in links {
            for m in [0.1, 0.5, 0.9] {
                assert_relative_eq!(link.inv_transf(link.transf(m)), m, epsilon = 1e-10);
            }
        }
        assert!(Probit.transf(1.5).is_nan());
    }
}
