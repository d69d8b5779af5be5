//! `GriddedTensor`: a tensor whose axes carry coordinate grids.
//!
//! The grid is stored packed: segment `i` of the flat vector, starting at
//! `Σ_{k<i} size[k]`, holds the `size[i]` coordinates of axis `i`. A freshly
//! created or resized tensor has no grid; one must be assigned before any
//! coordinate-based operation.
//!
//! Coordinates are expected to be monotonic on each axis (in either
//! direction) but this is not enforced.

use tg_core::{
    errors::{Error, Result},
    Real,
};
use tg_math::{calculator, InterpType};

use crate::{grid::UniformGrid, tensor::Tensor};

/// A dense tensor of reals with a coordinate grid per axis.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GriddedTensor {
    tensor: Tensor<Real>,
    grid: Vec<Real>,
    grid_set: bool,
    interp_type: InterpType,
}

impl GriddedTensor {
    /// Create a zero-filled tensor with the given axis sizes and no grid.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        Ok(Self {
            tensor: Tensor::new(sizes)?,
            ..Self::default()
        })
    }

    /// Create a zero-filled tensor shaped and gridded by `grids`.
    pub fn from_uniform(grids: &[UniformGrid]) -> Result<Self> {
        let sizes: Vec<usize> = grids.iter().map(UniformGrid::npoints).collect();
        let mut t = Self::new(&sizes)?;
        t.set_grid_uniform(grids)?;
        Ok(t)
    }

    /// Reshape and zero the tensor, removing its grid.
    ///
    /// On error (an axis of size zero) nothing is modified.
    pub fn resize(&mut self, sizes: &[usize]) -> Result<()> {
        self.tensor.resize(sizes)?;
        self.grid.clear();
        self.grid_set = false;
        Ok(())
    }

    /// Drop all data and the grid, returning to rank 0.
    pub fn clear(&mut self) {
        self.tensor.clear();
        self.grid.clear();
        self.grid_set = false;
    }

    // ── Tensor delegation ─────────────────────────────────────────────────────

    /// The underlying tensor.
    pub fn tensor(&self) -> &Tensor<Real> {
        &self.tensor
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.tensor.rank()
    }

    /// Size of axis `i`. Panics if `i >= rank`.
    #[inline]
    pub fn size(&self, i: usize) -> usize {
        self.tensor.size(i)
    }

    /// All axis sizes.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        self.tensor.sizes()
    }

    /// Number of elements.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.tensor.total_size()
    }

    /// Flat data, row-major.
    #[inline]
    pub fn data(&self) -> &[Real] {
        self.tensor.data()
    }

    /// Mutable flat data, row-major.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [Real] {
        self.tensor.data_mut()
    }

    /// Convert a multi-index to a flat offset.
    pub fn pack_index(&self, index: &[usize]) -> Result<usize> {
        self.tensor.pack_index(index)
    }

    /// Convert a flat offset to a multi-index.
    pub fn unpack_index(&self, offset: usize, index: &mut [usize]) {
        self.tensor.unpack_index(offset, index)
    }

    /// Element at a discrete multi-index.
    pub fn get(&self, index: &[usize]) -> Result<Real> {
        self.tensor.get(index)
    }

    /// Overwrite the element at a discrete multi-index.
    pub fn set(&mut self, index: &[usize], value: Real) -> Result<()> {
        self.tensor.set(index, value)
    }

    /// Set every element to `value`.
    pub fn set_all(&mut self, value: Real) {
        self.tensor.set_all(value)
    }

    /// Sum of all elements.
    pub fn total_sum(&self) -> Real {
        self.tensor.total_sum()
    }

    /// Interpolation scheme used by [`GriddedTensor::interpolate`].
    pub fn interp_type(&self) -> InterpType {
        self.interp_type
    }

    /// Select the scheme used by [`GriddedTensor::interpolate`].
    pub fn set_interp_type(&mut self, interp_type: InterpType) {
        self.interp_type = interp_type;
    }

    // ── Grid assignment ───────────────────────────────────────────────────────

    /// `true` once a grid has been assigned.
    pub fn is_grid_set(&self) -> bool {
        self.grid_set
    }

    fn grid_len(&self) -> usize {
        self.sizes().iter().sum()
    }

    fn require_rank(&self, op: &str) -> Result<()> {
        tg_core::ensure_arg!(self.rank() > 0, "tensor has rank 0 in {op}()");
        Ok(())
    }

    pub(crate) fn require_grid(&self, op: &str) -> Result<()> {
        tg_core::ensure!(self.grid_set, "grid not set in {op}()");
        Ok(())
    }

    pub(crate) fn check_axis(&self, axis: usize, op: &str) -> Result<()> {
        tg_core::ensure_arg!(
            axis < self.rank(),
            "axis {axis} out of range for rank {} in {op}()",
            self.rank()
        );
        Ok(())
    }

    /// Offset of axis `axis` in the packed grid.
    #[inline]
    pub(crate) fn grid_offset(&self, axis: usize) -> usize {
        self.sizes()[..axis].iter().sum()
    }

    /// Assign the grid from one coordinate vector per axis.
    pub fn set_grid<V: AsRef<[Real]>>(&mut self, grids: &[V]) -> Result<()> {
        self.require_rank("set_grid")?;
        tg_core::ensure_arg!(
            grids.len() == self.rank(),
            "{} grid vectors supplied for a rank {} tensor in set_grid()",
            grids.len(),
            self.rank()
        );
        for (axis, (g, &n)) in grids.iter().zip(self.sizes()).enumerate() {
            tg_core::ensure_arg!(
                g.as_ref().len() == n,
                "grid for axis {axis} has {} points, expected {n} in set_grid()",
                g.as_ref().len()
            );
        }
        self.grid.clear();
        for g in grids {
            self.grid.extend_from_slice(g.as_ref());
        }
        self.grid_set = true;
        Ok(())
    }

    /// Assign the grid from a packed vector of length `Σ size[i]`.
    pub fn set_grid_packed(&mut self, packed: &[Real]) -> Result<()> {
        self.require_rank("set_grid_packed")?;
        let expected = self.grid_len();
        tg_core::ensure_arg!(
            packed.len() == expected,
            "packed grid has {} points, expected {expected} in set_grid_packed()",
            packed.len()
        );
        self.grid.clear();
        self.grid.extend_from_slice(packed);
        self.grid_set = true;
        Ok(())
    }

    /// Assign the grid from one uniform descriptor per axis.
    pub fn set_grid_uniform(&mut self, grids: &[UniformGrid]) -> Result<()> {
        let vecs: Vec<Vec<Real>> = grids.iter().map(UniformGrid::values).collect();
        self.set_grid(&vecs)
    }

    /// Assign the index grid `grid[i][j] = j`.
    pub fn default_grid(&mut self) -> Result<()> {
        self.require_rank("default_grid")?;
        self.grid.clear();
        for &n in self.tensor.sizes() {
            self.grid.extend((0..n).map(|j| j as Real));
        }
        self.grid_set = true;
        Ok(())
    }

    /// Overwrite the grid of one axis. The grid must already be set.
    pub fn set_grid_i_vec(&mut self, axis: usize, values: &[Real]) -> Result<()> {
        self.require_grid("set_grid_i_vec")?;
        self.check_axis(axis, "set_grid_i_vec")?;
        let n = self.size(axis);
        tg_core::ensure_arg!(
            values.len() == n,
            "{} values supplied for axis {axis} of size {n} in set_grid_i_vec()",
            values.len()
        );
        let off = self.grid_offset(axis);
        self.grid[off..off + n].copy_from_slice(values);
        Ok(())
    }

    /// Overwrite the grid of one axis with `expr` evaluated at `i = 0, 1, …`.
    ///
    /// ```
    /// # use tg_tensor::GriddedTensor;
    /// let mut t = GriddedTensor::new(&[3]).unwrap();
    /// t.default_grid().unwrap();
    /// t.set_grid_i_func(0, "2^i").unwrap();
    /// assert_eq!(t.grid_axis(0).unwrap(), &[1.0, 2.0, 4.0]);
    /// ```
    pub fn set_grid_i_func(&mut self, axis: usize, expr: &str) -> Result<()> {
        self.require_grid("set_grid_i_func")?;
        self.check_axis(axis, "set_grid_i_func")?;
        let values = (0..self.size(axis))
            .map(|j| calculator::eval(expr, &[("i", j as Real)]))
            .collect::<Result<Vec<_>>>()?;
        self.set_grid_i_vec(axis, &values)
    }

    /// Overwrite a single grid coordinate.
    pub fn set_grid_value(&mut self, axis: usize, j: usize, value: Real) -> Result<()> {
        self.require_grid("set_grid_value")?;
        self.check_axis(axis, "set_grid_value")?;
        let n = self.size(axis);
        if j >= n {
            return Err(Error::IndexOutOfRange { index: j, size: n });
        }
        let off = self.grid_offset(axis);
        self.grid[off + j] = value;
        Ok(())
    }

    // ── Grid queries ──────────────────────────────────────────────────────────

    /// Coordinate `j` of axis `axis`.
    pub fn get_grid(&self, axis: usize, j: usize) -> Result<Real> {
        let g = self.grid_axis(axis)?;
        g.get(j).copied().ok_or(Error::IndexOutOfRange {
            index: j,
            size: g.len(),
        })
    }

    /// Borrow the coordinates of one axis.
    pub fn grid_axis(&self, axis: usize) -> Result<&[Real]> {
        self.require_grid("grid_axis")?;
        self.check_axis(axis, "grid_axis")?;
        let off = self.grid_offset(axis);
        Ok(&self.grid[off..off + self.size(axis)])
    }

    /// Copy the coordinates of one axis.
    pub fn copy_grid(&self, axis: usize) -> Result<Vec<Real>> {
        self.grid_axis(axis).map(<[Real]>::to_vec)
    }

    /// The packed grid (empty when unset).
    pub fn grid_packed(&self) -> &[Real] {
        &self.grid
    }

    /// Index and coordinate of the grid point on `axis` nearest to `value`.
    ///
    /// Ties go to the lowest index. Values beyond either end of the grid map
    /// to the nearest boundary point.
    pub fn lookup_grid_val(&self, axis: usize, value: Real) -> Result<(usize, Real)> {
        self.check_axis(axis, "lookup_grid")?;
        self.require_grid("lookup_grid")?;
        let g = self.grid_axis(axis)?;
        let mut best = 0;
        let mut best_diff = (value - g[0]).abs();
        for (j, &x) in g.iter().enumerate().skip(1) {
            let diff = (value - x).abs();
            if diff < best_diff {
                best = j;
                best_diff = diff;
            }
        }
        Ok((best, g[best]))
    }

    /// Index of the grid point on `axis` nearest to `value`.
    pub fn lookup_grid(&self, axis: usize, value: Real) -> Result<usize> {
        self.lookup_grid_val(axis, value).map(|(j, _)| j)
    }

    /// As [`lookup_grid_val`](Self::lookup_grid_val), but the index refers to
    /// the packed grid.
    pub fn lookup_grid_packed_val(&self, axis: usize, value: Real) -> Result<(usize, Real)> {
        let (j, x) = self.lookup_grid_val(axis, value)?;
        Ok((self.grid_offset(axis) + j, x))
    }

    /// As [`lookup_grid`](Self::lookup_grid), but the index refers to the
    /// packed grid.
    pub fn lookup_grid_packed(&self, axis: usize, value: Real) -> Result<usize> {
        self.lookup_grid_packed_val(axis, value).map(|(k, _)| k)
    }

    /// Nearest grid index on every axis for a full-rank point.
    pub fn lookup_grid_vec(&self, point: &[Real]) -> Result<Vec<usize>> {
        tg_core::ensure_arg!(
            point.len() == self.rank(),
            "point has {} coordinates but the tensor has rank {}",
            point.len(),
            self.rank()
        );
        point
            .iter()
            .enumerate()
            .map(|(axis, &v)| self.lookup_grid(axis, v))
            .collect()
    }

    // ── Nearest-point access ──────────────────────────────────────────────────

    /// Value at the grid point nearest to `point`.
    pub fn get_val(&self, point: &[Real]) -> Result<Real> {
        let ix = self.lookup_grid_vec(point)?;
        self.get(&ix)
    }

    /// Value at the grid point nearest to `point`, with that point's
    /// coordinates.
    pub fn get_val_closest(&self, point: &[Real]) -> Result<(Real, Vec<Real>)> {
        let (ix, closest) = self.closest(point)?;
        Ok((self.get(&ix)?, closest))
    }

    /// Overwrite the value at the grid point nearest to `point`.
    pub fn set_val(&mut self, point: &[Real], value: Real) -> Result<()> {
        let ix = self.lookup_grid_vec(point)?;
        self.set(&ix, value)
    }

    /// Overwrite the value at the grid point nearest to `point`, returning
    /// the coordinates of the point written.
    pub fn set_val_closest(&mut self, point: &[Real], value: Real) -> Result<Vec<Real>> {
        let (ix, closest) = self.closest(point)?;
        self.set(&ix, value)?;
        Ok(closest)
    }

    fn closest(&self, point: &[Real]) -> Result<(Vec<usize>, Vec<Real>)> {
        tg_core::ensure_arg!(
            point.len() == self.rank(),
            "point has {} coordinates but the tensor has rank {}",
            point.len(),
            self.rank()
        );
        point
            .iter()
            .enumerate()
            .map(|(axis, &v)| self.lookup_grid_val(axis, v))
            .collect::<Result<Vec<_>>>()
            .map(|pairs| pairs.into_iter().unzip())
    }

    // ── Consistency ───────────────────────────────────────────────────────────

    /// Check the grid/size invariants.
    ///
    /// Failures are `Error::Sanity` and indicate a bug.
    pub fn is_valid(&self) -> Result<()> {
        self.tensor.is_valid()?;
        if self.rank() > 0 && self.grid_set && self.grid.len() != self.grid_len() {
            return Err(Error::Sanity(format!(
                "grid has {} points but sizes {:?} need {}",
                self.grid.len(),
                self.sizes(),
                self.grid_len()
            )));
        }
        if !self.grid_set && !self.grid.is_empty() {
            return Err(Error::Sanity(format!(
                "grid not set but holds {} points",
                self.grid.len()
            )));
        }
        Ok(())
    }
}
