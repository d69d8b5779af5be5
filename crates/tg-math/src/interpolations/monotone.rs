//! Monotone-preserving cubic Hermite interpolation (Fritsch-Carlson).
//!
//! Slopes start from the average of adjacent secants and are then rescaled
//! so that `α² + β² ≤ 9` on every interval, which keeps each piece monotone
//! wherever the data is.

use tg_core::{errors::Result, Real};

use super::{hermite_eval, secants, Interpolation1D};
use crate::search::ascending_copy;

/// Monotone-preserving cubic Hermite spline.
#[derive(Debug, Clone)]
pub struct MonotoneCubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Adjusted tangent at each knot
    ts: Vec<Real>,
}

impl MonotoneCubicSpline {
    /// Build a monotone cubic spline through the given data.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        let n = xs.len();
        tg_core::ensure_arg!(n >= 2, "monotone spline requires at least 2 points, got {n}");
        tg_core::ensure_arg!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must match in length",
            xs.len(),
            ys.len()
        );
        let (xs, ys) = ascending_copy(xs, ys);
        let delta = secants(&xs, &ys);

        let mut ts = vec![0.0; n];
        ts[0] = delta[0];
        ts[n - 1] = delta[n - 2];
        for i in 1..n - 1 {
            // local extremum: flat tangent
            ts[i] = if delta[i - 1] * delta[i] <= 0.0 {
                0.0
            } else {
                0.5 * (delta[i - 1] + delta[i])
            };
        }

        for i in 0..n - 1 {
            if delta[i].abs() < 1e-30 {
                ts[i] = 0.0;
                ts[i + 1] = 0.0;
            } else {
                let alpha = ts[i] / delta[i];
                let beta = ts[i + 1] / delta[i];
                let r2 = alpha * alpha + beta * beta;
                if r2 > 9.0 {
                    let tau = 3.0 / r2.sqrt();
                    ts[i] = tau * alpha * delta[i];
                    ts[i + 1] = tau * beta * delta[i];
                }
            }
        }

        Ok(Self { xs, ys, ts })
    }
}

impl Interpolation1D for MonotoneCubicSpline {
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
