//! Natural cubic spline.
//!
//! Second derivatives `M_i` at the knots solve the tridiagonal system
//!
//!   `h_{i-1} M_{i-1} + 2 (h_{i-1} + h_i) M_i + h_i M_{i+1} = 6 (S_i - S_{i-1})`
//!
//! with `M_0 = M_{n-1} = 0`. Outside the data the boundary cubic is used.

use tg_core::{errors::Result, Real};

use super::{secants, Interpolation1D};
use crate::search::{ascending_copy, find_interval};

/// Natural cubic spline interpolation.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivatives at each knot
    m: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build a natural cubic spline. Requires at least 3 points.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        let n = xs.len();
        tg_core::ensure_arg!(n >= 3, "cubic spline requires at least 3 points, got {n}");
        tg_core::ensure_arg!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must have the same length",
            xs.len(),
            ys.len()
        );
        let (xs, ys) = ascending_copy(xs, ys);

        let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s = secants(&xs, &ys);

        // Thomas algorithm on the interior unknowns M_1 .. M_{n-2}
        let k = n - 2;
        let mut diag = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for j in 0..k {
            let i = j + 1;
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            rhs[j] = 6.0 * (s[i] - s[i - 1]);
        }
        for j in 1..k {
            let w = h[j] / diag[j - 1];
            diag[j] -= w * h[j];
            rhs[j] -= w * rhs[j - 1];
        }
        let mut m = vec![0.0; n];
        for j in (0..k).rev() {
            let upper = if j + 1 < k { h[j + 1] * m[j + 2] } else { 0.0 };
            m[j + 1] = (rhs[j] - upper) / diag[j];
        }

        Ok(Self { xs, ys, m })
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = find_interval(&self.xs, x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;
        m0 * a * a * a / (6.0 * h)
            + m1 * b * b * b / (6.0 * h)
            + (self.ys[i] / h - m0 * h / 6.0) * a
            + (self.ys[i + 1] / h - m1 * h / 6.0) * b
    }
}
