//! Dense matrix helpers over nalgebra.

use nalgebra::{DMatrix, DVector};
use tg_core::{
    errors::{Error, Result},
    Real,
};

/// Invert a square matrix through an LU decomposition with partial pivoting.
///
/// # Errors
/// `InvalidArgument` if the matrix is not square, `Precondition` if the LU
/// factor has a zero on its diagonal (the matrix is singular).
pub fn lu_invert(m: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err(Error::InvalidArgument(format!(
            "matrix must be square, got {}×{}",
            n,
            m.ncols()
        )));
    }
    let lu = m.clone().lu();
    let u = lu.u();
    if let Some(i) = (0..n).find(|&i| u[(i, i)] == 0.0) {
        return Err(Error::Precondition(format!(
            "matrix is singular (zero pivot in row {i} of the LU factor)"
        )));
    }
    lu.try_inverse()
        .ok_or_else(|| Error::Precondition("matrix is singular (LU inversion failed)".into()))
}

/// Solve `m * w = rhs` by explicit inversion, returning `w`.
pub fn inverse_times(m: &DMatrix<Real>, rhs: &[Real]) -> Result<Vec<Real>> {
    if rhs.len() != m.nrows() {
        return Err(Error::InvalidArgument(format!(
            "right-hand side has length {}, expected {}",
            rhs.len(),
            m.nrows()
        )));
    }
    let inv = lu_invert(m)?;
    let w = inv * DVector::from_column_slice(rhs);
    Ok(w.iter().copied().collect())
}
