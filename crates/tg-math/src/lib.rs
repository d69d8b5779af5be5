//! # tg-math
//!
//! Numerical building blocks for gridded tensors: 1D interpolation schemes,
//! interval search, Kriging, dense LU inversion (over nalgebra) and a small
//! expression calculator.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Arithmetic expression evaluator.
pub mod calculator;

/// 1D interpolation schemes, including Kriging.
pub mod interpolations;

/// Dense matrix helpers.
pub mod matrix_utilities;

/// Interval search over monotonic grids.
pub mod search;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use interpolations::{
    Covariance, InterpType, Interpolation1D, Interpolator, KrigingInterpolation, KrigingOptim,
    KrigingSearch, LinearInterpolation, RbfCovariance,
};
pub use search::find_interval;
