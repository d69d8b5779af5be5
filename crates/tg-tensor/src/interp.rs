//! Interpolation on gridded tensors.
//!
//! Two families:
//!
//! - [`GriddedTensor::interpolate`] collapses axis 0 with a full 1D
//!   interpolator (any [`InterpType`](tg_math::InterpType)) for every
//!   combination of the remaining axes, then recurses on the smaller tensor.
//!   Cost grows with `Π size[1..]` interpolator builds, so it is meant for
//!   small grids.
//! - The multilinear family brackets each interpolated axis, gathers the
//!   `2^k` corner values into a hypercube and collapses it one axis at a
//!   time, last axis first, with `lo + frac * (hi - lo)`. Points outside the
//!   grid extrapolate from the boundary interval.
//!
//! The hypercube buffers live in an [`InterpScratch`] that callers doing many
//! evaluations can keep and pass to the `*_with` variants.

use tg_core::{
    errors::{Error, Result},
    Real,
};
use tg_math::{find_interval, InterpType, Interpolation1D};

use crate::tensor_grid::GriddedTensor;

/// Reusable buffers for multilinear interpolation.
#[derive(Debug, Default, Clone)]
pub struct InterpScratch {
    cube: Vec<Real>,
    lo: Vec<usize>,
    frac: Vec<Real>,
    strides: Vec<usize>,
    axes: Vec<usize>,
    index: Vec<usize>,
}

impl InterpScratch {
    /// Empty scratch space; buffers grow on first use.
    pub fn new() -> Self {
        Self::default()
    }
}

fn fill_strides(sizes: &[usize], strides: &mut Vec<usize>) {
    strides.clear();
    strides.resize(sizes.len(), 1);
    for k in (0..sizes.len().saturating_sub(1)).rev() {
        strides[k] = strides[k + 1] * sizes[k + 1];
    }
}

/// Copy the `2^k` corner values starting at flat offset `base` into `cube`,
/// the last listed axis varying fastest.
fn gather(data: &[Real], strides: &[usize], axes: &[usize], base: usize, cube: &mut [Real]) {
    let k = axes.len();
    for (c, slot) in cube.iter_mut().enumerate() {
        let mut off = base;
        for (j, &a) in axes.iter().enumerate() {
            if (c >> (k - 1 - j)) & 1 == 1 {
                off += strides[a];
            }
        }
        *slot = data[off];
    }
}

/// Collapse a `2^k` hypercube in place, last axis first.
fn collapse(cube: &mut [Real], frac: &[Real]) -> Real {
    let mut len = cube.len();
    for &f in frac.iter().rev() {
        len /= 2;
        for i in 0..len {
            let (lo, hi) = (cube[2 * i], cube[2 * i + 1]);
            cube[i] = lo + f * (hi - lo);
        }
    }
    cube[0]
}

impl GriddedTensor {
    /// Lower bracketing index and fractional position of `value` on `axis`.
    fn bracket(&self, axis: usize, value: Real, op: &str) -> Result<(usize, Real)> {
        let g = self.grid_axis(axis)?;
        tg_core::ensure_arg!(
            g.len() >= 2,
            "axis {axis} has {} grid point(s); at least 2 are needed in {op}()",
            g.len()
        );
        let lo = find_interval(g, value);
        let width = g[lo + 1] - g[lo];
        tg_core::ensure_arg!(
            width != 0.0,
            "axis {axis} repeats grid coordinate {} at points {lo} and {} in {op}()",
            g[lo],
            lo + 1
        );
        Ok((lo, (value - g[lo]) / width))
    }

    /// Bracket every axis in `axes`, filling `lo` and `frac`, and return the
    /// flat offset of the lower corner with all other axes taken from
    /// `index`.
    #[allow(clippy::too_many_arguments)]
    fn locate(
        &self,
        axes: &[usize],
        index: &[usize],
        values: &[Real],
        strides: &[usize],
        lo: &mut Vec<usize>,
        frac: &mut Vec<Real>,
        op: &str,
    ) -> Result<usize> {
        lo.clear();
        frac.clear();
        for (&a, &v) in axes.iter().zip(values) {
            let (l, f) = self.bracket(a, v, op)?;
            lo.push(l);
            frac.push(f);
        }
        let mut base = 0;
        for (axis, (&i, &n)) in index.iter().zip(self.sizes()).enumerate() {
            let i = match axes.iter().position(|&a| a == axis) {
                Some(j) => lo[j],
                None if i < n => i,
                None => return Err(Error::IndexOutOfRange { index: i, size: n }),
            };
            base += i * strides[axis];
        }
        Ok(base)
    }

    fn check_axes(&self, axes: &[usize], op: &str) -> Result<()> {
        tg_core::ensure_arg!(
            !axes.is_empty() && axes.len() <= self.rank(),
            "{} axes requested for a rank {} tensor in {op}()",
            axes.len(),
            self.rank()
        );
        for (j, &a) in axes.iter().enumerate() {
            self.check_axis(a, op)?;
            tg_core::ensure_arg!(
                !axes[..j].contains(&a),
                "axis {a} listed twice in {op}()"
            );
        }
        Ok(())
    }

    // ── Multilinear ───────────────────────────────────────────────────────────

    /// Multilinear interpolation at a full-rank point.
    ///
    /// ```
    /// # use tg_tensor::GriddedTensor;
    /// let mut t = GriddedTensor::new(&[2, 2]).unwrap();
    /// t.default_grid().unwrap();
    /// t.data_mut().copy_from_slice(&[0.0, 1.0, 1.0, 2.0]);
    /// assert_eq!(t.interp_linear(&[0.5, 0.5]).unwrap(), 1.0);
    /// ```
    pub fn interp_linear(&self, point: &[Real]) -> Result<Real> {
        self.interp_linear_with(point, &mut InterpScratch::new())
    }

    /// [`interp_linear`](Self::interp_linear) with caller-owned buffers.
    pub fn interp_linear_with(&self, point: &[Real], scratch: &mut InterpScratch) -> Result<Real> {
        self.require_grid("interp_linear")?;
        tg_core::ensure_arg!(
            self.rank() > 0 && point.len() == self.rank(),
            "point has {} coordinates but the tensor has rank {} in interp_linear()",
            point.len(),
            self.rank()
        );
        let mut axes = std::mem::take(&mut scratch.axes);
        axes.clear();
        axes.extend(0..self.rank());
        let mut index = std::mem::take(&mut scratch.index);
        index.clear();
        index.resize(self.rank(), 0);
        let res = self.partial_unchecked(&axes, &index, point, scratch, "interp_linear");
        scratch.axes = axes;
        scratch.index = index;
        res
    }

    /// Interpolate along `axes` only, holding every other axis at the
    /// discrete position given by `index`.
    ///
    /// `index` has one entry per axis; entries for the interpolated axes are
    /// ignored. `values` holds one coordinate per entry of `axes`.
    pub fn interp_linear_partial(
        &self,
        axes: &[usize],
        index: &[usize],
        values: &[Real],
    ) -> Result<Real> {
        self.interp_linear_partial_with(axes, index, values, &mut InterpScratch::new())
    }

    /// [`interp_linear_partial`](Self::interp_linear_partial) with
    /// caller-owned buffers.
    pub fn interp_linear_partial_with(
        &self,
        axes: &[usize],
        index: &[usize],
        values: &[Real],
        scratch: &mut InterpScratch,
    ) -> Result<Real> {
        const OP: &str = "interp_linear_partial";
        self.require_grid(OP)?;
        tg_core::ensure_arg!(
            values.len() == axes.len(),
            "{} values for {} axes in {OP}()",
            values.len(),
            axes.len()
        );
        self.check_axes(axes, OP)?;
        tg_core::ensure_arg!(
            index.len() == self.rank(),
            "index has {} entries but the tensor has rank {} in {OP}()",
            index.len(),
            self.rank()
        );
        self.partial_unchecked(axes, index, values, scratch, OP)
    }

    pub(crate) fn partial_unchecked(
        &self,
        axes: &[usize],
        index: &[usize],
        values: &[Real],
        scratch: &mut InterpScratch,
        op: &str,
    ) -> Result<Real> {
        let InterpScratch {
            cube,
            lo,
            frac,
            strides,
            ..
        } = scratch;
        fill_strides(self.sizes(), strides);
        let base = self.locate(axes, index, values, strides, lo, frac, op)?;
        cube.clear();
        cube.resize(1 << axes.len(), 0.0);
        gather(self.data(), strides, axes, base, cube);
        Ok(collapse(cube, frac))
    }

    /// Interpolate every axis except axis 0 at `point[1..]`, returning one
    /// value per grid point of axis 0. `point[0]` is ignored.
    pub fn interp_linear_vec0(&self, point: &[Real]) -> Result<Vec<Real>> {
        self.interp_linear_vec(point, 0)
    }

    /// Interpolate every axis except `free` at `point`, returning one value
    /// per grid point of `free`. `point[free]` is ignored.
    pub fn interp_linear_vec(&self, point: &[Real], free: usize) -> Result<Vec<Real>> {
        self.interp_linear_vec_with(point, free, &mut InterpScratch::new())
    }

    /// [`interp_linear_vec`](Self::interp_linear_vec) with caller-owned
    /// buffers.
    pub fn interp_linear_vec_with(
        &self,
        point: &[Real],
        free: usize,
        scratch: &mut InterpScratch,
    ) -> Result<Vec<Real>> {
        const OP: &str = "interp_linear_vec";
        self.require_grid(OP)?;
        self.check_axis(free, OP)?;
        tg_core::ensure_arg!(
            point.len() == self.rank(),
            "point has {} coordinates but the tensor has rank {} in {OP}()",
            point.len(),
            self.rank()
        );
        if self.rank() == 1 {
            return Ok(self.data().to_vec());
        }

        let InterpScratch {
            cube,
            lo,
            frac,
            strides,
            axes,
            index,
        } = scratch;
        axes.clear();
        axes.extend((0..self.rank()).filter(|&a| a != free));
        let values: Vec<Real> = axes.iter().map(|&a| point[a]).collect();
        index.clear();
        index.resize(self.rank(), 0);
        fill_strides(self.sizes(), strides);
        let base = self.locate(axes, index, &values, strides, lo, frac, OP)?;

        let n = self.size(free);
        let block = 1 << axes.len();
        cube.clear();
        cube.resize(n * block, 0.0);
        for (i, chunk) in cube.chunks_exact_mut(block).enumerate() {
            gather(self.data(), strides, axes, base + i * strides[free], chunk);
        }
        let frac: &[Real] = frac;
        Ok(cube
            .chunks_exact_mut(block)
            .map(|chunk| collapse(chunk, frac))
            .collect())
    }

    /// Fix `axes` at continuous `values` by multilinear interpolation,
    /// returning a tensor over the remaining axes with their grids.
    pub fn copy_slice_interp(&self, axes: &[usize], values: &[Real]) -> Result<GriddedTensor> {
        const OP: &str = "copy_slice_interp";
        self.require_grid(OP)?;
        tg_core::ensure_arg!(
            values.len() == axes.len(),
            "{} values for {} axes in {OP}()",
            values.len(),
            axes.len()
        );
        self.check_axes(axes, OP)?;
        tg_core::ensure_arg!(
            axes.len() < self.rank(),
            "fixing {} axes of a rank {} tensor leaves nothing in {OP}()",
            axes.len(),
            self.rank()
        );

        let kept: Vec<usize> = (0..self.rank()).filter(|a| !axes.contains(a)).collect();
        let sizes: Vec<usize> = kept.iter().map(|&a| self.size(a)).collect();
        let mut out = GriddedTensor::new(&sizes)?;
        let grids = kept
            .iter()
            .map(|&a| self.grid_axis(a))
            .collect::<Result<Vec<_>>>()?;
        out.set_grid(&grids)?;
        out.set_interp_type(self.interp_type());

        let mut scratch = InterpScratch::new();
        let mut ix_new = vec![0; kept.len()];
        let mut ix_old = vec![0; self.rank()];
        for k in 0..out.total_size() {
            out.unpack_index(k, &mut ix_new);
            for (&a, &i) in kept.iter().zip(&ix_new) {
                ix_old[a] = i;
            }
            out.data_mut()[k] = self.partial_unchecked(axes, &ix_old, values, &mut scratch, OP)?;
        }
        Ok(out)
    }

    /// Rank-1 multilinear interpolation.
    pub fn interp_linear_1d(&self, x: Real) -> Result<Real> {
        self.require_exact_rank(1, "interp_linear_1d")?;
        self.interp_linear(&[x])
    }

    /// Rank-2 multilinear interpolation.
    pub fn interp_linear_2d(&self, x: Real, y: Real) -> Result<Real> {
        self.require_exact_rank(2, "interp_linear_2d")?;
        self.interp_linear(&[x, y])
    }

    /// Rank-3 multilinear interpolation.
    pub fn interp_linear_3d(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.require_exact_rank(3, "interp_linear_3d")?;
        self.interp_linear(&[x, y, z])
    }

    fn require_exact_rank(&self, rank: usize, op: &str) -> Result<()> {
        tg_core::ensure_arg!(
            self.rank() == rank,
            "{op}() needs a rank {rank} tensor, got rank {}",
            self.rank()
        );
        Ok(())
    }

    // ── General recursive ─────────────────────────────────────────────────────

    /// Interpolate at a full-rank point with the tensor's
    /// [`InterpType`](tg_math::InterpType), one axis at a time.
    pub fn interpolate(&self, point: &[Real]) -> Result<Real> {
        self.require_grid("interpolate")?;
        tg_core::ensure_arg!(
            self.rank() > 0 && point.len() == self.rank(),
            "point has {} coordinates but the tensor has rank {} in interpolate()",
            point.len(),
            self.rank()
        );
        interpolate_axis0(
            self.interp_type(),
            self.sizes(),
            self.grid_packed(),
            self.data(),
            point,
        )
    }
}

fn interpolate_axis0(
    itype: InterpType,
    sizes: &[usize],
    grid: &[Real],
    data: &[Real],
    point: &[Real],
) -> Result<Real> {
    let n0 = sizes[0];
    let g0 = &grid[..n0];
    if sizes.len() == 1 {
        return Ok(itype.build(g0, data)?.operator(point[0]));
    }
    let inner: usize = sizes[1..].iter().product();
    let mut ys = vec![0.0; n0];
    let mut reduced = Vec::with_capacity(inner);
    for c in 0..inner {
        for (i, y) in ys.iter_mut().enumerate() {
            *y = data[i * inner + c];
        }
        reduced.push(itype.build(g0, &ys)?.operator(point[0]));
    }
    interpolate_axis0(itype, &sizes[1..], &grid[n0..], &reduced, &point[1..])
}
