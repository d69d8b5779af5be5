//! `Table3D`: named 2D slices over a shared x/y grid.

use tg_core::{
    errors::{Error, Result},
    Real,
};

/// A set of named `nx × ny` slices sharing one x grid and one y grid.
///
/// Slices are stored row-major: cell `(i, j)` is at `i * ny + j`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table3D {
    x_name: String,
    y_name: String,
    xs: Vec<Real>,
    ys: Vec<Real>,
    slice_names: Vec<String>,
    slices: Vec<Vec<Real>>,
}

impl Table3D {
    /// An empty table with no grid and no slices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the x and y grids.
    ///
    /// Existing slices are kept only if the shape does not change.
    pub fn set_xy(&mut self, x_name: &str, xs: &[Real], y_name: &str, ys: &[Real]) -> Result<()> {
        tg_core::ensure_arg!(
            !xs.is_empty() && !ys.is_empty(),
            "table grids must be non-empty, got {} x points and {} y points",
            xs.len(),
            ys.len()
        );
        tg_core::ensure_arg!(
            self.slices.is_empty() || (xs.len(), ys.len()) == self.size(),
            "cannot reshape a table with slices from {:?} to ({}, {})",
            self.size(),
            xs.len(),
            ys.len()
        );
        self.x_name = x_name.to_owned();
        self.y_name = y_name.to_owned();
        self.xs = xs.to_vec();
        self.ys = ys.to_vec();
        Ok(())
    }

    /// `(nx, ny)`, `(0, 0)` before a grid is assigned.
    pub fn size(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    /// `true` once the grids have been assigned.
    pub fn is_xy_set(&self) -> bool {
        !self.xs.is_empty() && !self.ys.is_empty()
    }

    /// Name of the x axis.
    pub fn x_name(&self) -> &str {
        &self.x_name
    }

    /// Name of the y axis.
    pub fn y_name(&self) -> &str {
        &self.y_name
    }

    /// x coordinate `i`.
    pub fn grid_x(&self, i: usize) -> Result<Real> {
        self.xs.get(i).copied().ok_or(Error::IndexOutOfRange {
            index: i,
            size: self.xs.len(),
        })
    }

    /// y coordinate `j`.
    pub fn grid_y(&self, j: usize) -> Result<Real> {
        self.ys.get(j).copied().ok_or(Error::IndexOutOfRange {
            index: j,
            size: self.ys.len(),
        })
    }

    /// Number of slices.
    pub fn n_slices(&self) -> usize {
        self.slices.len()
    }

    /// Position of the slice called `name`.
    pub fn slice_index(&self, name: &str) -> Option<usize> {
        self.slice_names.iter().position(|n| n == name)
    }

    /// Add a zero-filled slice.
    pub fn new_slice(&mut self, name: &str) -> Result<usize> {
        tg_core::ensure!(self.is_xy_set(), "table grid not set in new_slice()");
        tg_core::ensure_arg!(
            self.slice_index(name).is_none(),
            "slice '{name}' already exists"
        );
        let (nx, ny) = self.size();
        self.slice_names.push(name.to_owned());
        self.slices.push(vec![0.0; nx * ny]);
        Ok(self.slices.len() - 1)
    }

    /// Index of slice `name`, creating it if needed.
    pub(crate) fn ensure_slice(&mut self, name: &str) -> Result<usize> {
        match self.slice_index(name) {
            Some(k) => Ok(k),
            None => self.new_slice(name),
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.slice_index(name)
            .ok_or_else(|| Error::InvalidArgument(format!("no slice named '{name}'")))
    }

    fn cell(&self, i: usize, j: usize) -> Result<usize> {
        let (nx, ny) = self.size();
        if i >= nx {
            return Err(Error::IndexOutOfRange { index: i, size: nx });
        }
        if j >= ny {
            return Err(Error::IndexOutOfRange { index: j, size: ny });
        }
        Ok(i * ny + j)
    }

    /// Value at `(i, j)` of slice `name`.
    pub fn get(&self, i: usize, j: usize, name: &str) -> Result<Real> {
        let k = self.lookup(name)?;
        Ok(self.slices[k][self.cell(i, j)?])
    }

    /// Overwrite `(i, j)` of slice `name`.
    pub fn set(&mut self, i: usize, j: usize, name: &str, value: Real) -> Result<()> {
        let k = self.lookup(name)?;
        let c = self.cell(i, j)?;
        self.slices[k][c] = value;
        Ok(())
    }

    /// Set every cell of slice `name`, creating it if needed.
    pub fn set_slice_all(&mut self, name: &str, value: Real) -> Result<()> {
        let k = self.ensure_slice(name)?;
        self.slices[k].iter_mut().for_each(|v| *v = value);
        Ok(())
    }

    /// Borrow slice `name`, row-major.
    pub fn slice(&self, name: &str) -> Result<&[Real]> {
        let k = self.lookup(name)?;
        Ok(&self.slices[k])
    }

    pub(crate) fn slice_mut_at(&mut self, k: usize) -> &mut [Real] {
        &mut self.slices[k]
    }
}
