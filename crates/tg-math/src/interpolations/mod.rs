//! 1D interpolation trait, the linear scheme, and the closed set of schemes
//! selectable on a gridded tensor.
//!
//! [`InterpType`] names a scheme; [`InterpType::build`] constructs the
//! matching [`Interpolator`], which dispatches by `match` rather than through
//! a trait object since the set of schemes is fixed.

pub mod akima;
pub mod cubic;
pub mod kriging;
pub mod monotone;

use tg_core::{errors::Result, Real};

use crate::search::{ascending_copy, find_interval};

pub use akima::AkimaSpline;
pub use cubic::CubicNaturalSpline;
pub use kriging::{Covariance, KrigingInterpolation, KrigingOptim, KrigingSearch, RbfCovariance};
pub use monotone::MonotoneCubicSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Evaluate a cubic Hermite segment given knot slopes `ts`.
///
/// Outside the data the boundary values are returned.
pub(crate) fn hermite_eval(xs: &[Real], ys: &[Real], ts: &[Real], x: Real) -> Real {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let lo = find_interval(xs, x);
    let hi = lo + 1;
    let h = xs[hi] - xs[lo];
    let t = (x - xs[lo]) / h;
    let h00 = (1.0 + 2.0 * t) * (1.0 - t) * (1.0 - t);
    let h10 = t * (1.0 - t) * (1.0 - t);
    let h01 = t * t * (3.0 - 2.0 * t);
    let h11 = t * t * (t - 1.0);
    h00 * ys[lo] + h10 * h * ts[lo] + h01 * ys[hi] + h11 * h * ts[hi]
}

/// Secant slopes between consecutive points.
pub(crate) fn secants(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
        .collect()
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation with linear extrapolation from the boundary
/// intervals.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from monotonic `xs` and
    /// corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths or fewer than 2 points.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        tg_core::ensure_arg!(
            xs.len() >= 2,
            "need at least 2 points for linear interpolation, got {}",
            xs.len()
        );
        tg_core::ensure_arg!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must have the same length",
            xs.len(),
            ys.len()
        );
        let (xs, ys) = ascending_copy(xs, ys);
        Ok(Self { xs, ys })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = find_interval(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        if dx.abs() < f64::EPSILON {
            return self.ys[i];
        }
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

// ── Scheme selection ──────────────────────────────────────────────────────────

/// Interpolation scheme used by recursive tensor interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpType {
    /// Piecewise linear.
    #[default]
    Linear,
    /// Natural cubic spline.
    Cubic,
    /// Akima spline.
    Akima,
    /// Monotone (Fritsch-Carlson) cubic Hermite spline.
    Monotone,
}

impl InterpType {
    /// Minimum number of points the scheme needs.
    pub fn min_size(self) -> usize {
        match self {
            InterpType::Cubic => 3,
            InterpType::Linear | InterpType::Akima | InterpType::Monotone => 2,
        }
    }

    /// Build an interpolator of this type through `(xs, ys)`.
    pub fn build(self, xs: &[Real], ys: &[Real]) -> Result<Interpolator> {
        Ok(match self {
            InterpType::Linear => Interpolator::Linear(LinearInterpolation::new(xs, ys)?),
            InterpType::Cubic => Interpolator::Cubic(CubicNaturalSpline::new(xs, ys)?),
            InterpType::Akima => Interpolator::Akima(AkimaSpline::new(xs, ys)?),
            InterpType::Monotone => Interpolator::Monotone(MonotoneCubicSpline::new(xs, ys)?),
        })
    }
}

impl std::fmt::Display for InterpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InterpType::Linear => "linear",
            InterpType::Cubic => "cubic",
            InterpType::Akima => "akima",
            InterpType::Monotone => "monotone",
        };
        f.write_str(name)
    }
}

/// A constructed interpolator for one of the [`InterpType`] schemes.
#[derive(Debug, Clone)]
pub enum Interpolator {
    /// Piecewise linear.
    Linear(LinearInterpolation),
    /// Natural cubic spline.
    Cubic(CubicNaturalSpline),
    /// Akima spline.
    Akima(AkimaSpline),
    /// Monotone cubic spline.
    Monotone(MonotoneCubicSpline),
}

impl Interpolation1D for Interpolator {
    fn operator(&self, x: Real) -> Real {
        match self {
            Interpolator::Linear(i) => i.operator(x),
            Interpolator::Cubic(i) => i.operator(x),
            Interpolator::Akima(i) => i.operator(x),
            Interpolator::Monotone(i) => i.operator(x),
        }
    }

    fn x_min(&self) -> Real {
        match self {
            Interpolator::Linear(i) => i.x_min(),
            Interpolator::Cubic(i) => i.x_min(),
            Interpolator::Akima(i) => i.x_min(),
            Interpolator::Monotone(i) => i.x_min(),
        }
    }

    fn x_max(&self) -> Real {
        match self {
            Interpolator::Linear(i) => i.x_max(),
            Interpolator::Cubic(i) => i.x_max(),
            Interpolator::Akima(i) => i.x_max(),
            Interpolator::Monotone(i) => i.x_max(),
        }
    }
}
