//! # tg-tensor
//!
//! Dense N-dimensional tensors with per-axis coordinate grids:
//! nearest-point access, multilinear and spline interpolation, projection
//! onto 2D tables and axis rearrangement (permute, reverse, slice, sum,
//! trace, fix, interpolate, resample).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Uniform grid descriptors.
pub mod grid;

/// Axis specifications for rearrangement.
pub mod index_spec;

/// Interpolation on gridded tensors.
pub mod interp;

/// Projection onto `Table3D` slices.
pub mod projection;

/// Axis rearrangement.
pub mod rearrange;

/// Named 2D slices over an x/y grid.
pub mod table3d;

/// Flat row-major tensors.
pub mod tensor;

/// Tensors with coordinate grids.
pub mod tensor_grid;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use grid::UniformGrid;
pub use index_spec::IndexSpec;
pub use interp::InterpScratch;
pub use rearrange::RearrangeOptions;
pub use table3d::Table3D;
pub use tensor::Tensor;
pub use tensor_grid::GriddedTensor;
pub use tg_math::InterpType;
