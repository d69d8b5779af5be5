//! `Tensor`: a flat, row-major N-dimensional array.
//!
//! The last index varies fastest, so the cell `(i_0, …, i_{r-1})` lives at
//! offset `Σ_k i_k · Π_{m>k} size[m]`. A rank-0 tensor holds no data and
//! serves as the empty value.

use num_traits::Zero;
use tg_core::{
    errors::{Error, Result},
    Real,
};

/// A dense N-dimensional array with row-major packing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tensor<T = Real> {
    sizes: Vec<usize>,
    data: Vec<T>,
}

impl<T> Default for Tensor<T> {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            data: Vec::new(),
        }
    }
}

fn check_sizes(sizes: &[usize]) -> Result<usize> {
    if let Some(axis) = sizes.iter().position(|&n| n == 0) {
        return Err(Error::InvalidArgument(format!(
            "size of axis {axis} is zero in sizes {sizes:?}"
        )));
    }
    if sizes.is_empty() {
        return Ok(0);
    }
    sizes
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| {
            Error::InvalidArgument(format!("sizes {sizes:?} overflow the element count"))
        })
}

impl<T: Zero + Copy> Tensor<T> {
    /// Create a zero-filled tensor with the given axis sizes.
    ///
    /// An empty `sizes` gives the rank-0 tensor.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        let total = check_sizes(sizes)?;
        Ok(Self {
            sizes: sizes.to_vec(),
            data: vec![T::zero(); total],
        })
    }

    /// Create a tensor from existing row-major data.
    pub fn from_data(sizes: &[usize], data: Vec<T>) -> Result<Self> {
        let total = check_sizes(sizes)?;
        tg_core::ensure_arg!(
            data.len() == total,
            "data has length {}, expected {total} for sizes {sizes:?}",
            data.len()
        );
        Ok(Self {
            sizes: sizes.to_vec(),
            data,
        })
    }

    /// Reshape and zero the tensor.
    ///
    /// On error the tensor is left unchanged.
    pub fn resize(&mut self, sizes: &[usize]) -> Result<()> {
        let total = check_sizes(sizes)?;
        self.sizes.clear();
        self.sizes.extend_from_slice(sizes);
        self.data.clear();
        self.data.resize(total, T::zero());
        Ok(())
    }

    /// Set every element to `value`.
    pub fn set_all(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Sum of all elements.
    pub fn total_sum(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &v| acc + v)
    }
}

impl<T> Tensor<T> {
    /// Drop all data and return to rank 0.
    pub fn clear(&mut self) {
        self.sizes.clear();
        self.data.clear();
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    /// Size of axis `i`. Panics if `i >= rank`.
    #[inline]
    pub fn size(&self, i: usize) -> usize {
        self.sizes[i]
    }

    /// All axis sizes.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of elements.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    /// Flat data, row-major.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat data, row-major.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor and return its data.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Convert a multi-index to a flat offset.
    ///
    /// A rank-0 tensor has no elements, so every lookup is out of range.
    pub fn pack_index(&self, index: &[usize]) -> Result<usize> {
        tg_core::ensure_arg!(
            index.len() == self.rank(),
            "index has {} entries but the tensor has rank {}",
            index.len(),
            self.rank()
        );
        if self.data.is_empty() {
            return Err(Error::IndexOutOfRange { index: 0, size: 0 });
        }
        let mut offset = 0;
        for (&i, &n) in index.iter().zip(self.sizes.iter()) {
            if i >= n {
                return Err(Error::IndexOutOfRange { index: i, size: n });
            }
            offset = offset * n + i;
        }
        Ok(offset)
    }

    /// Flat offset without bounds checks.
    #[inline]
    pub(crate) fn pack_unchecked(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(self.sizes.iter())
            .fold(0, |acc, (&i, &n)| acc * n + i)
    }

    /// Convert a flat offset to a multi-index, written into `index`.
    ///
    /// `index` must have length `rank`.
    pub fn unpack_index(&self, offset: usize, index: &mut [usize]) {
        debug_assert_eq!(index.len(), self.rank());
        let mut rem = offset;
        for k in (0..self.rank()).rev() {
            index[k] = rem % self.sizes[k];
            rem /= self.sizes[k];
        }
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Result<T>
    where
        T: Copy,
    {
        Ok(self.data[self.pack_index(index)?])
    }

    /// Mutable reference to the element at a multi-index.
    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut T> {
        let k = self.pack_index(index)?;
        Ok(&mut self.data[k])
    }

    /// Overwrite the element at a multi-index.
    pub fn set(&mut self, index: &[usize], value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Smallest element, `None` for an empty tensor.
    pub fn min_value(&self) -> Option<T>
    where
        T: Copy + PartialOrd,
    {
        self.data
            .iter()
            .copied()
            .fold(None, |m, v| match m {
                Some(m) if m <= v => Some(m),
                _ => Some(v),
            })
    }

    /// Largest element, `None` for an empty tensor.
    pub fn max_value(&self) -> Option<T>
    where
        T: Copy + PartialOrd,
    {
        self.data
            .iter()
            .copied()
            .fold(None, |m, v| match m {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    /// Check that the data length agrees with the shape.
    pub fn is_valid(&self) -> Result<()> {
        let expected = if self.sizes.is_empty() {
            Some(0)
        } else {
            self.sizes.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
        };
        if expected != Some(self.data.len()) {
            return Err(Error::Sanity(format!(
                "tensor data length {} does not match sizes {:?} (expected {expected:?})",
                self.data.len(),
                self.sizes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let t = Tensor::<f64>::new(&[2, 3, 4]).unwrap();
        assert_eq!(t.total_size(), 24);
        assert_eq!(t.pack_index(&[1, 2, 3]).unwrap(), 23);
        assert_eq!(t.pack_index(&[0, 1, 0]).unwrap(), 4);
        let mut ix = [0; 3];
        t.unpack_index(17, &mut ix);
        assert_eq!(ix, [1, 1, 1]);
        for k in 0..t.total_size() {
            t.unpack_index(k, &mut ix);
            assert_eq!(t.pack_index(&ix).unwrap(), k);
        }
    }

    #[test]
    fn out_of_range_index() {
        let t = Tensor::<f64>::new(&[2, 3]).unwrap();
        assert_eq!(
            t.pack_index(&[0, 3]),
            Err(Error::IndexOutOfRange { index: 3, size: 3 })
        );
        assert!(matches!(t.pack_index(&[0]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn zero_size_rejected_and_resize_is_atomic() {
        assert!(Tensor::<f64>::new(&[2, 0]).is_err());
        let mut t = Tensor::from_data(&[2], vec![1.0, 2.0]).unwrap();
        assert!(t.resize(&[3, 0]).is_err());
        assert_eq!(t.sizes(), &[2]);
        assert_eq!(t.data(), &[1.0, 2.0]);
        t.resize(&[3]).unwrap();
        assert_eq!(t.data(), &[0.0; 3]);
    }

    #[test]
    fn rank_zero() {
        let t = Tensor::<f64>::new(&[]).unwrap();
        assert_eq!(t.rank(), 0);
        assert_eq!(t.total_size(), 0);
        assert!(t.is_valid().is_ok());
        assert_eq!(t.min_value(), None);
        assert_eq!(
            t.get(&[]),
            Err(Error::IndexOutOfRange { index: 0, size: 0 })
        );
        let mut t = Tensor::<f64>::default();
        assert!(t.set(&[], 1.0).is_err());
        assert!(t.get_mut(&[]).is_err());
    }

    #[test]
    fn overflowing_shape_rejected() {
        assert!(matches!(
            Tensor::<f64>::new(&[usize::MAX, 2]),
            Err(Error::InvalidArgument(_))
        ));
        let mut t = Tensor::from_data(&[2], vec![1.0, 2.0]).unwrap();
        assert!(t.resize(&[usize::MAX / 2 + 1, 2, 1]).is_err());
        assert_eq!(t.data(), &[1.0, 2.0]);
    }

    #[test]
    fn set_get_and_reductions() {
        let mut t = Tensor::<f64>::new(&[2, 2]).unwrap();
        t.set(&[0, 1], 3.0).unwrap();
        t.set(&[1, 0], -1.0).unwrap();
        assert_eq!(t.get(&[0, 1]).unwrap(), 3.0);
        assert_eq!(t.total_sum(), 2.0);
        assert_eq!(t.min_value(), Some(-1.0));
        assert_eq!(t.max_value(), Some(3.0));
        t.set_all(1.5);
        assert_eq!(t.total_sum(), 6.0);
        t.clear();
        assert_eq!(t.rank(), 0);
    }

    #[test]
    fn integer_elements() {
        let mut t = Tensor::<i64>::new(&[3]).unwrap();
        *t.get_mut(&[2]).unwrap() = 7;
        assert_eq!(t.total_sum(), 7);
    }
}
