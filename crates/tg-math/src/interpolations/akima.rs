//! Akima spline interpolation.
//!
//! The tangent at each knot is a weighted average of neighbouring secants,
//! which avoids the overshoot of natural cubic splines near outliers.

use tg_core::{errors::Result, Real};

use super::{hermite_eval, secants, Interpolation1D};
use crate::search::ascending_copy;

/// Akima spline interpolation.
#[derive(Debug, Clone)]
pub struct AkimaSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Hermite slopes at each knot
    ts: Vec<Real>,
}

impl AkimaSpline {
    /// Build an Akima spline through the given data points.
    ///
    /// With two points the spline degenerates to the straight line.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        let n = xs.len();
        tg_core::ensure_arg!(n >= 2, "Akima spline requires at least 2 points, got {n}");
        tg_core::ensure_arg!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) lengths must match",
            xs.len(),
            ys.len()
        );
        let (xs, ys) = ascending_copy(xs, ys);
        let m = secants(&xs, &ys);
        let nm = m.len();

        // Two phantom secants on each side, linearly extrapolated
        let (before, after) = if nm >= 2 {
            (
                [3.0 * m[0] - 2.0 * m[1], 2.0 * m[0] - m[1]],
                [2.0 * m[nm - 1] - m[nm - 2], 3.0 * m[nm - 1] - 2.0 * m[nm - 2]],
            )
        } else {
            ([m[0]; 2], [m[0]; 2])
        };
        let me: Vec<Real> = before
            .iter()
            .chain(m.iter())
            .chain(after.iter())
            .copied()
            .collect();

        let ts = (0..n)
            .map(|i| {
                let idx = i + 2;
                let w1 = (me[idx + 1] - me[idx]).abs();
                let w2 = (me[idx - 1] - me[idx - 2]).abs();
                if w1 + w2 < 1e-30 {
                    0.5 * (me[idx - 1] + me[idx])
                } else {
                    (w1 * me[idx - 1] + w2 * me[idx]) / (w1 + w2)
                }
            })
            .collect();

        Ok(Self { xs, ys, ts })
    }
}

impl Interpolation1D for AkimaSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        hermite_eval(&self.xs, &self.ys, &self.ts, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn akima_exact_on_nodes() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0, 1.0, 0.5, 2.0, 1.5, 3.0];
        let s = AkimaSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let v = s.operator(x);
            assert!((v - y).abs() < 1e-12, "at x={x}: expected {y}, got {v}");
        }
    }

    #[test]
    fn akima_linear_data() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        let s = AkimaSpline::new(&xs, &ys).unwrap();
        let v = s.operator(2.5);
        assert!((v - 1.25).abs() < 1e-10, "expected 1.25, got {v}");
    }

    #[test]
    fn akima_two_points_is_a_line() {
        let s = AkimaSpline::new(&[0.0, 2.0], &[1.0, 3.0]).unwrap();
        assert!((s.operator(0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn akima_clamps_outside_range() {
        let s = AkimaSpline::new(&[0.0, 1.0, 2.0], &[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.operator(-3.0), 1.0);
        assert_eq!(s.operator(9.0), 4.0);
    }
}
