//! Projecting a gridded tensor onto a [`Table3D`] slice.
//!
//! Two axes (`ix_x`, `ix_y`) become the table's x and y; every other axis is
//! either held at a discrete index, held at a continuous value, or summed.

use tracing::trace;

use tg_core::{errors::Result, Real};

use crate::{interp::InterpScratch, table3d::Table3D, tensor_grid::GriddedTensor};

fn name_or<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() {
        fallback
    } else {
        name
    }
}

impl GriddedTensor {
    fn check_xy(&self, ix_x: usize, ix_y: usize, op: &str) -> Result<()> {
        tg_core::ensure_arg!(
            ix_x < self.rank() && ix_y < self.rank() && ix_x != ix_y,
            "x axis {ix_x} and y axis {ix_y} must be distinct and below rank {} in {op}()",
            self.rank()
        );
        Ok(())
    }

    fn check_table_size(&self, ix_x: usize, ix_y: usize, tab: &Table3D, op: &str) -> Result<()> {
        let (nx, ny) = tab.size();
        tg_core::ensure_arg!(
            nx == self.size(ix_x) && ny == self.size(ix_y),
            "table is {nx}×{ny} but axes {ix_x} and {ix_y} have sizes {}×{} in {op}()",
            self.size(ix_x),
            self.size(ix_y)
        );
        Ok(())
    }

    /// Give an empty table the grids of axes `ix_x` and `ix_y`.
    fn propagate_xy(
        &self,
        ix_x: usize,
        ix_y: usize,
        tab: &mut Table3D,
        x_name: &str,
        y_name: &str,
    ) -> Result<()> {
        if tab.size() == (0, 0) {
            tab.set_xy(
                name_or(x_name, "x"),
                self.grid_axis(ix_x)?,
                name_or(y_name, "y"),
                self.grid_axis(ix_y)?,
            )?;
        }
        Ok(())
    }

    /// Copy the `(ix_x, ix_y)` plane at the discrete position `index` into
    /// slice `slice` of a table of matching shape.
    ///
    /// Entries of `index` for the two free axes are ignored.
    pub fn copy_table3d_align(
        &self,
        ix_x: usize,
        ix_y: usize,
        index: &[usize],
        tab: &mut Table3D,
        slice: &str,
    ) -> Result<()> {
        const OP: &str = "copy_table3d_align";
        self.check_xy(ix_x, ix_y, OP)?;
        tg_core::ensure_arg!(
            index.len() == self.rank(),
            "index has {} entries but the tensor has rank {} in {OP}()",
            index.len(),
            self.rank()
        );
        self.check_table_size(ix_x, ix_y, tab, OP)?;
        let k = tab.ensure_slice(slice)?;
        let (nx, ny) = tab.size();
        let mut ix = index.to_vec();
        let mut values = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                ix[ix_x] = i;
                ix[ix_y] = j;
                values.push(self.get(&ix)?);
            }
        }
        tab.slice_mut_at(k).copy_from_slice(&values);
        Ok(())
    }

    /// As [`copy_table3d_align`](Self::copy_table3d_align), first giving an
    /// empty table the tensor's grids on the two free axes.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_table3d_align_setxy(
        &self,
        ix_x: usize,
        ix_y: usize,
        index: &[usize],
        tab: &mut Table3D,
        x_name: &str,
        y_name: &str,
        slice: &str,
    ) -> Result<()> {
        self.check_xy(ix_x, ix_y, "copy_table3d_align_setxy")?;
        self.propagate_xy(ix_x, ix_y, tab, x_name, y_name)?;
        self.copy_table3d_align(ix_x, ix_y, index, tab, slice)
    }

    /// Fill slice `slice` by multilinear interpolation at the table's grid,
    /// holding the other axes at the grid coordinates selected by `index`.
    ///
    /// A table without a grid receives the tensor's grids on the two free
    /// axes (named `x` and `y`) and is filled by the aligned copy instead.
    pub fn copy_table3d_interp(
        &self,
        ix_x: usize,
        ix_y: usize,
        index: &[usize],
        tab: &mut Table3D,
        slice: &str,
    ) -> Result<()> {
        const OP: &str = "copy_table3d_interp";
        self.check_xy(ix_x, ix_y, OP)?;
        if tab.size() == (0, 0) {
            return self.copy_table3d_align_setxy(ix_x, ix_y, index, tab, "", "", slice);
        }
        tg_core::ensure_arg!(
            index.len() == self.rank(),
            "index has {} entries but the tensor has rank {} in {OP}()",
            index.len(),
            self.rank()
        );
        let mut values = vec![0.0; self.rank()];
        for (axis, v) in values.iter_mut().enumerate() {
            if axis != ix_x && axis != ix_y {
                *v = self.get_grid(axis, index[axis])?;
            }
        }
        self.fill_interp(ix_x, ix_y, &values, tab, slice)
    }

    /// Fill slice `slice` by multilinear interpolation at the table's grid,
    /// holding the other axes at the continuous coordinates in `values`.
    ///
    /// `values` has one entry per axis; entries for the free axes are
    /// ignored. The table grid must be set.
    pub fn copy_table3d_interp_values(
        &self,
        ix_x: usize,
        ix_y: usize,
        values: &[Real],
        tab: &mut Table3D,
        slice: &str,
    ) -> Result<()> {
        const OP: &str = "copy_table3d_interp_values";
        self.check_xy(ix_x, ix_y, OP)?;
        tg_core::ensure_arg!(
            values.len() == self.rank(),
            "{} values supplied for a rank {} tensor in {OP}()",
            values.len(),
            self.rank()
        );
        tg_core::ensure!(tab.is_xy_set(), "table grid not set in {OP}()");
        self.fill_interp(ix_x, ix_y, values, tab, slice)
    }

    /// As [`copy_table3d_interp_values`](Self::copy_table3d_interp_values),
    /// first giving an empty table the tensor's grids on the two free axes.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_table3d_interp_values_setxy(
        &self,
        ix_x: usize,
        ix_y: usize,
        values: &[Real],
        tab: &mut Table3D,
        x_name: &str,
        y_name: &str,
        slice: &str,
    ) -> Result<()> {
        self.check_xy(ix_x, ix_y, "copy_table3d_interp_values_setxy")?;
        self.propagate_xy(ix_x, ix_y, tab, x_name, y_name)?;
        self.copy_table3d_interp_values(ix_x, ix_y, values, tab, slice)
    }

    fn fill_interp(
        &self,
        ix_x: usize,
        ix_y: usize,
        values: &[Real],
        tab: &mut Table3D,
        slice: &str,
    ) -> Result<()> {
        let k = tab.ensure_slice(slice)?;
        let (nx, ny) = tab.size();
        let mut point = values.to_vec();
        let mut scratch = InterpScratch::new();
        let mut out = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            point[ix_x] = tab.grid_x(i)?;
            for j in 0..ny {
                point[ix_y] = tab.grid_y(j)?;
                let v = self.interp_linear_with(&point, &mut scratch)?;
                trace!(i, j, slice, ?point, value = v, "interpolated table cell");
                out.push(v);
            }
        }
        tab.slice_mut_at(k).copy_from_slice(&out);
        Ok(())
    }

    /// Sum over every axis except `ix_x` and `ix_y` into slice `slice`.
    ///
    /// An empty table receives the tensor's grids on the two free axes;
    /// otherwise its shape must match.
    pub fn convert_table3d_sum(
        &self,
        ix_x: usize,
        ix_y: usize,
        tab: &mut Table3D,
        x_name: &str,
        y_name: &str,
        slice: &str,
    ) -> Result<()> {
        const OP: &str = "convert_table3d_sum";
        self.check_xy(ix_x, ix_y, OP)?;
        self.propagate_xy(ix_x, ix_y, tab, x_name, y_name)?;
        self.check_table_size(ix_x, ix_y, tab, OP)?;
        tab.set_slice_all(slice, 0.0)?;
        let k = tab.ensure_slice(slice)?;
        let (_, ny) = tab.size();
        let out = tab.slice_mut_at(k);
        let mut ix = vec![0; self.rank()];
        for (n, &v) in self.data().iter().enumerate() {
            self.unpack_index(n, &mut ix);
            out[ix[ix_x] * ny + ix[ix_y]] += v;
        }
        Ok(())
    }
}
