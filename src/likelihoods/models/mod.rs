//! likelihoods::models — bundled observation families.
//!
//! - [`Gaussian`]: conjugate noise, analytical, continuous.
//! - [`Bernoulli`]: probit labels, analytical, discrete.
//! - [`Poisson`]: log-link counts, numerical, discrete.
//! - [`StudentT`]: heavy-tailed noise, numerical, continuous.
//!
//! Each family implements [`MassModel`](crate::likelihoods::core::MassModel);
//! the analytical ones also implement
//! [`AnalyticalMoments`](crate::likelihoods::core::AnalyticalMoments).

pub mod bernoulli;
pub mod gaussian;
pub mod poisson;
pub mod student_t;

pub use self::bernoulli::Bernoulli;
pub use self::gaussian::Gaussian;
pub use self::poisson::Poisson;
pub use self::student_t::StudentT;
