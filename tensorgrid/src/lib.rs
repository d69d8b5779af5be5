//! # tensorgrid
//!
//! Dense N-dimensional tensors carrying a coordinate grid per axis, with
//! nearest-point access, multilinear and spline interpolation, projection
//! onto named 2D tables and a small language of axis rearrangements. A 1D
//! Kriging interpolator with hyperparameter search is included.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `tg-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use tensorgrid::{GriddedTensor, IndexSpec, RearrangeOptions};
//!
//! let mut t = GriddedTensor::new(&[2, 3]).unwrap();
//! t.set_grid(&[vec![0.0, 1.0], vec![0.0, 1.0, 2.0]]).unwrap();
//! t.set_all(1.0);
//!
//! assert_eq!(t.interp_linear(&[0.5, 1.5]).unwrap(), 1.0);
//!
//! let summed = t
//!     .rearrange_and_copy(&[IndexSpec::sum(0), IndexSpec::index(1)], RearrangeOptions::default())
//!     .unwrap();
//! assert_eq!(summed.sizes(), &[3]);
//! assert_eq!(summed.total_sum(), 6.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use tg_core as core;

/// One-dimensional interpolation, Kriging, search and expression evaluation.
pub use tg_math as math;

/// Tensors, grids, tables and rearrangement.
pub use tg_tensor as tensor;

pub use tg_core::{Error, Real, Result};
pub use tg_math::{InterpType, KrigingInterpolation, KrigingOptim, RbfCovariance};
pub use tg_tensor::{
    GriddedTensor, IndexSpec, InterpScratch, RearrangeOptions, Table3D, Tensor, UniformGrid,
};
