//! Interval search over monotonic abscissae.
//!
//! Grids may run in either direction. [`find_interval`] returns the lower
//! corner `i` of the bracketing interval `[x_i, x_{i+1}]`, clamped to the
//! first or last interval when the point lies outside the grid, so callers
//! extrapolate from the boundary interval.

use tg_core::Real;

/// Return `true` if the first point is not larger than the last one.
#[inline]
pub fn is_increasing(xs: &[Real]) -> bool {
    xs.len() < 2 || xs[0] <= xs[xs.len() - 1]
}

/// Binary search: find `i` with `x` between `xs[i]` and `xs[i+1]`, clamped
/// to `[0, n-2]`.
///
/// `xs` must contain at least two points and be monotonic (increasing or
/// decreasing).
pub fn find_interval(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    debug_assert!(n >= 2, "find_interval needs at least 2 points");
    let increasing = is_increasing(xs);
    let (first, last) = if increasing {
        (x <= xs[0], x >= xs[n - 1])
    } else {
        (x >= xs[0], x <= xs[n - 1])
    };
    if first {
        return 0;
    }
    if last {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        let below = if increasing { xs[mid] <= x } else { xs[mid] >= x };
        if below {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Copy `(xs, ys)` so that the abscissae are increasing.
pub fn ascending_copy(xs: &[Real], ys: &[Real]) -> (Vec<Real>, Vec<Real>) {
    if is_increasing(xs) {
        (xs.to_vec(), ys.to_vec())
    } else {
        (xs.iter().rev().copied().collect(), ys.iter().rev().copied().collect())
    }
}
