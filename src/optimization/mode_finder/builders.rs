//! mode_finder::builders — Newton–CG solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small builders for the Newton–CG solvers used by the mode
//! finder, hiding Argmin's generic wiring behind the crate's aliases.
//!
//! Key behaviors
//! -------------
//! - Construct Newton–CG with either Hager–Zhang or More–Thuente line
//!   search.
//! - Leave the start point, iteration cap and stopping rules to the runner,
//!   which drives the solver one Newton step at a time.
//!
//! Conventions
//! -----------
//! - Builders return `OptResult` even though construction cannot currently
//!   fail, so callers treat every builder uniformly and future options
//!   (e.g., a curvature threshold) can be validated here.
use crate::optimization::{
    errors::OptResult,
    mode_finder::{
        traits::ModeOptions,
        types::{HagerZhangLS, MoreThuenteLS, NewtonCgHagerZhang, NewtonCgMoreThuente},
    },
};

/// Construct Newton–CG with a Hager–Zhang line search.
pub fn build_newton_hager_zhang(_opts: &ModeOptions) -> OptResult<NewtonCgHagerZhang> {
    Ok(NewtonCgHagerZhang::new(HagerZhangLS::new()))
}

/// Construct Newton–CG with a More–Thuente line search.
pub fn build_newton_more_thuente(_opts: &ModeOptions) -> OptResult<NewtonCgMoreThuente> {
    Ok(NewtonCgMoreThuente::new(MoreThuenteLS::new()))
}
