//! One-dimensional interpolation by Kriging (Gaussian-process mean
//! prediction).
//!
//! Given training pairs `(x_i, y_i)` and a covariance function `k`, the
//! Gram matrix `K_ij = k(x_i, x_j) + σ² δ_ij` is inverted once and the
//! prediction at `x0` is
//!
//!   `f(x0) = Σ_i k(x0, x_i) (K⁻¹ y)_i`
//!
//! No predictive variance is computed.
//!
//! [`KrigingOptim`] fits the amplitude and length scale of an
//! [`RbfCovariance`] by a grid search scored with leave-one-out
//! cross-validation, then refits on the full data.

use nalgebra::DMatrix;
use statrs::statistics::Statistics;
use tracing::debug;

use tg_core::{
    errors::{Error, Result},
    Real,
};

use super::Interpolation1D;
use crate::matrix_utilities::inverse_times;

/// A covariance (kernel) function `k(x1, x2)`.
pub trait Covariance {
    /// Evaluate the covariance between `x1` and `x2`.
    fn covar(&self, x1: Real, x2: Real) -> Real;
}

impl<F: Fn(Real, Real) -> Real> Covariance for F {
    fn covar(&self, x1: Real, x2: Real) -> Real {
        self(x1, x2)
    }
}

/// Squared-exponential covariance `amplitude * exp(-((x1 - x2) / length)²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RbfCovariance {
    /// Overall scale of the covariance.
    pub amplitude: Real,
    /// Correlation length.
    pub length: Real,
}

impl Covariance for RbfCovariance {
    fn covar(&self, x1: Real, x2: Real) -> Real {
        let d = (x1 - x2) / self.length;
        self.amplitude * (-d * d).exp()
    }
}

/// Solve for `K⁻¹ y` with `noise_var` added to the diagonal.
fn kriging_weights<C: Covariance>(
    xs: &[Real],
    ys: &[Real],
    covar: &C,
    noise_var: Real,
) -> Result<Vec<Real>> {
    let n = xs.len();
    let mut kxx = DMatrix::<Real>::zeros(n, n);
    for irow in 0..n {
        for icol in irow..n {
            let mut k = covar.covar(xs[irow], xs[icol]);
            if irow == icol {
                k += noise_var;
            }
            kxx[(irow, icol)] = k;
            kxx[(icol, irow)] = k;
        }
    }
    inverse_times(&kxx, ys).map_err(|e| match e {
        Error::Precondition(msg) => {
            Error::Precondition(format!("Kriging covariance matrix: {msg}"))
        }
        other => other,
    })
}

/// Kriging interpolation with a user-specified covariance function.
pub struct KrigingInterpolation<C> {
    xs: Vec<Real>,
    kinv_y: Vec<Real>,
    covar: C,
}

impl<C: Covariance> KrigingInterpolation<C> {
    /// Fit through `(xs, ys)` without a noise term.
    pub fn new(xs: &[Real], ys: &[Real], covar: C) -> Result<Self> {
        Self::with_noise(xs, ys, covar, 0.0)
    }

    /// Fit through `(xs, ys)` adding `noise_var` to the diagonal of the
    /// covariance matrix.
    ///
    /// # Errors
    /// `InvalidArgument` for fewer than 2 points or mismatched lengths,
    /// `Precondition` if the covariance matrix is singular.
    pub fn with_noise(xs: &[Real], ys: &[Real], covar: C, noise_var: Real) -> Result<Self> {
        tg_core::ensure_arg!(
            xs.len() >= 2,
            "Kriging needs at least 2 points, got {}",
            xs.len()
        );
        tg_core::ensure_arg!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must have the same length",
            xs.len(),
            ys.len()
        );
        let kinv_y = kriging_weights(xs, ys, &covar, noise_var)?;
        Ok(Self {
            xs: xs.to_vec(),
            kinv_y,
            covar,
        })
    }

    /// The cached vector `K⁻¹ y`.
    pub fn weights(&self) -> &[Real] {
        &self.kinv_y
    }

    /// The covariance function.
    pub fn covariance(&self) -> &C {
        &self.covar
    }
}

impl<C> std::fmt::Debug for KrigingInterpolation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrigingInterpolation")
            .field("xs", &self.xs)
            .field("kinv_y", &self.kinv_y)
            .field("covar", &"<covariance function>")
            .finish()
    }
}

impl<C: Covariance> Interpolation1D for KrigingInterpolation<C> {
    fn operator(&self, x: Real) -> Real {
        self.xs
            .iter()
            .zip(self.kinv_y.iter())
            .map(|(&xi, &w)| self.covar.covar(x, xi) * w)
            .sum()
    }

    fn x_min(&self) -> Real {
        self.xs.iter().copied().fold(Real::INFINITY, Real::min)
    }

    fn x_max(&self) -> Real {
        self.xs.iter().copied().fold(Real::NEG_INFINITY, Real::max)
    }
}

// ── Optimized covariance ──────────────────────────────────────────────────────

/// Grid-search settings for [`KrigingOptim`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrigingSearch {
    /// Number of amplitudes tried.
    pub n_var: usize,
    /// Number of length scales tried.
    pub n_len: usize,
    /// Ratio between the largest and the smallest amplitude.
    pub var_ratio: Real,
}

impl Default for KrigingSearch {
    fn default() -> Self {
        Self {
            n_var: 10,
            n_len: 10,
            var_ratio: 1.0e2,
        }
    }
}

/// Geometric sweep point `i` of `n` between `lo` and `lo * ratio`.
fn sweep(lo: Real, ratio: Real, i: usize, n: usize) -> Real {
    if n <= 1 {
        lo
    } else {
        lo * ratio.powf(i as Real / (n - 1) as Real)
    }
}

/// Kriging interpolation with an [`RbfCovariance`] tuned by leave-one-out
/// cross-validation.
#[derive(Debug)]
pub struct KrigingOptim {
    inner: KrigingInterpolation<RbfCovariance>,
    quality: Real,
}

impl KrigingOptim {
    /// Fit with the default search and no noise term.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::with_config(xs, ys, 0.0, KrigingSearch::default())
    }

    /// Fit with an explicit noise variance and search configuration.
    ///
    /// Amplitudes sweep geometrically from the sample variance of `ys` up by
    /// `var_ratio`; lengths sweep from a third of the smallest spacing to
    /// three times the data range. Candidates whose leave-one-out matrices
    /// are singular are skipped; `Runtime` is returned when none is left.
    pub fn with_config(
        xs: &[Real],
        ys: &[Real],
        noise_var: Real,
        search: KrigingSearch,
    ) -> Result<Self> {
        let n = xs.len();
        tg_core::ensure_arg!(
            n >= 3,
            "optimized Kriging needs at least 3 points, got {n}"
        );
        tg_core::ensure_arg!(
            n == ys.len(),
            "xs ({n}) and ys ({}) must have the same length",
            ys.len()
        );
        tg_core::ensure_arg!(
            search.n_var >= 1 && search.n_len >= 1,
            "grid search needs at least one amplitude and one length, got {}×{}",
            search.n_var,
            search.n_len
        );

        let sample_var = ys.iter().variance();
        let var_min = if sample_var.is_finite() && sample_var > 0.0 {
            sample_var
        } else {
            1.0
        };
        let len_min = xs
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(Real::INFINITY, Real::min)
            / 3.0;
        tg_core::ensure_arg!(
            len_min > 0.0,
            "optimized Kriging requires distinct consecutive abscissae"
        );
        let len_max = (xs[n - 1] - xs[0]).abs() * 3.0;
        let len_ratio = len_max / len_min;

        let mut best: Option<(RbfCovariance, Real)> = None;
        let mut x2 = Vec::with_capacity(n - 1);
        let mut y2 = Vec::with_capacity(n - 1);
        for i in 0..search.n_var {
            let amplitude = sweep(var_min, search.var_ratio, i, search.n_var);
            for j in 0..search.n_len {
                let length = sweep(len_min, len_ratio, j, search.n_len);
                let cov = RbfCovariance { amplitude, length };

                let mut qual = 0.0;
                let mut singular = false;
                for k in 0..n {
                    x2.clear();
                    y2.clear();
                    for m in (0..n).filter(|&m| m != k) {
                        x2.push(xs[m]);
                        y2.push(ys[m]);
                    }
                    let w = match kriging_weights(&x2, &y2, &cov, noise_var) {
                        Ok(w) => w,
                        Err(Error::Precondition(_)) => {
                            singular = true;
                            break;
                        }
                        Err(e) => return Err(e),
                    };
                    let ypred: Real = x2
                        .iter()
                        .zip(w.iter())
                        .map(|(&xi, &wi)| cov.covar(xs[k], xi) * wi)
                        .sum();
                    qual += (ys[k] - ypred).powi(2);
                }
                if singular || !qual.is_finite() {
                    continue;
                }
                if best.map_or(true, |(_, q)| qual < q) {
                    best = Some((cov, qual));
                }
            }
        }

        let Some((cov, quality)) = best else {
            tg_core::fail!(
                "no candidate covariance gave a finite leave-one-out error over {}×{} candidates",
                search.n_var,
                search.n_len
            );
        };
        debug!(
            amplitude = cov.amplitude,
            length = cov.length,
            quality,
            "Kriging covariance selected by leave-one-out search"
        );

        Ok(Self {
            inner: KrigingInterpolation::with_noise(xs, ys, cov, noise_var)?,
            quality,
        })
    }

    /// Selected covariance amplitude.
    pub fn amplitude(&self) -> Real {
        self.inner.covar.amplitude
    }

    /// Selected covariance length scale.
    pub fn length_scale(&self) -> Real {
        self.inner.covar.length
    }

    /// Leave-one-out sum of squared errors of the selected parameters.
    pub fn quality(&self) -> Real {
        self.quality
    }
}

impl Interpolation1D for KrigingOptim {
    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x)
    }

    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gaussian(a: Real, b: Real) -> Real {
        (-(a - b) * (a - b)).exp()
    }

    #[test]
    fn reproduces_training_points() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 2.0, 0.5];
        let k = KrigingInterpolation::new(&xs, &ys, gaussian).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_abs_diff_eq!(k.operator(x), y, epsilon = 1e-9);
        }
        assert_eq!(k.x_min(), 0.0);
        assert_eq!(k.x_max(), 3.0);
    }

    #[test]
    fn noise_smooths_the_fit() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 0.0];
        let k = KrigingInterpolation::with_noise(&xs, &ys, gaussian, 0.5).unwrap();
        assert!(k.operator(1.0) < 1.0);
    }

    #[test]
    fn singular_covariance_is_reported() {
        let xs = [1.0, 1.0];
        let ys = [2.0, 2.0];
        let err = KrigingInterpolation::new(&xs, &ys, gaussian).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)), "{err}");
    }

    #[test]
    fn search_without_finite_candidate_fails() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, f64::NAN, 1.0, 2.0];
        let err = KrigingOptim::new(&xs, &ys).unwrap_err();
        assert!(matches!(err, Error::Runtime(_)), "{err}");
    }

    #[test]
    fn rejects_short_input() {
        assert!(KrigingInterpolation::new(&[1.0], &[2.0], gaussian).is_err());
        assert!(KrigingOptim::new(&[1.0, 2.0], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn rbf_covariance() {
        let c = RbfCovariance {
            amplitude: 2.0,
            length: 0.5,
        };
        assert_abs_diff_eq!(c.covar(1.0, 1.0), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(c.covar(0.0, 0.5), 2.0 * (-1.0f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn optimized_fit_tracks_smooth_function() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64 * 0.4).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let k = KrigingOptim::new(&xs, &ys).unwrap();
        assert!(k.length_scale() > 0.0);
        assert!(k.amplitude() > 0.0);
        assert!(k.quality().is_finite());
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_abs_diff_eq!(k.operator(x), y, epsilon = 1e-3);
        }
        assert_abs_diff_eq!(k.operator(1.3), 1.3f64.sin(), epsilon = 0.1);
    }

    #[test]
    fn sweep_endpoints() {
        assert_abs_diff_eq!(sweep(1.0, 100.0, 0, 10), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(sweep(1.0, 100.0, 9, 10), 100.0, epsilon = 1e-12);
        assert_eq!(sweep(2.0, 100.0, 0, 1), 2.0);
    }
}
