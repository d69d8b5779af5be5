//! Error types for tensorgrid.
//!
//! Every fallible operation in the workspace returns [`Result`]. The error
//! taxonomy separates caller mistakes (`InvalidArgument`, `IndexOutOfRange`),
//! missing state (`Precondition`) and broken internal invariants (`Sanity`).
//! The `ensure!`, `ensure_arg!` and `fail!` macros keep the check sites short.

use thiserror::Error;

/// The top-level error type used throughout tensorgrid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General numerical failure.
    #[error("{0}")]
    Runtime(String),

    /// A required state was not established first (for example, the grid
    /// was never set, or a covariance matrix turned out singular).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Discrete index out of range along one axis.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the axis.
        size: usize,
    },

    /// Internal consistency check failed. Indicates a bug, not user error.
    #[error("sanity check failed: {0}")]
    Sanity(String),

    /// Text could not be parsed (expressions, index specifications).
    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand `Result` type used throughout tensorgrid.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use tg_core::{ensure, errors::Error};
/// fn grid_ready(set: bool) -> tg_core::errors::Result<()> {
///     ensure!(set, "grid not set in grid_ready()");
///     Ok(())
/// }
/// assert!(grid_ready(true).is_ok());
/// assert!(matches!(grid_ready(false), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::InvalidArgument(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use tg_core::{ensure_arg, errors::Error};
/// fn axis(i: usize, rank: usize) -> tg_core::errors::Result<usize> {
///     ensure_arg!(i < rank, "axis {i} not less than rank {rank}");
///     Ok(i)
/// }
/// assert!(axis(0, 2).is_ok());
/// assert!(matches!(axis(3, 2), Err(Error::InvalidArgument(_))));
/// ```
#[macro_export]
macro_rules! ensure_arg {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use tg_core::{fail, errors::Error};
/// fn always_err() -> tg_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
