//! Dense matrix with explicitly tracked storage order
//!
//! A [`Matrix`] is a fixed-shape rectangular array over a flat buffer.
//! The linearization convention (row-major or column-major) is part of
//! the value, never implied by context: every element access goes
//! through [`Layout::index`], and converting between conventions is an
//! explicit, lossless operation.

use crate::error::SolveError;
use crate::layout::{Layout, relinearize};
use num_traits::{Float, NumAssign};

/// Dense `m x n` matrix over a flat buffer with explicit [`Layout`].
///
/// Shape is immutable after construction; contents are mutable. The
/// buffer is always exactly `m * n` elements with the natural leading
/// dimension (no padding).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    nrows: usize,
    ncols: usize,
    layout: Layout,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Build a matrix from a flat buffer in the stated layout.
    ///
    /// The buffer length must be exactly `nrows * ncols`.
    pub fn from_vec(
        nrows: usize,
        ncols: usize,
        layout: Layout,
        data: Vec<T>,
    ) -> Result<Self, SolveError> {
        if data.len() != nrows * ncols {
            return Err(SolveError::DimensionMismatch {
                expected: nrows * ncols,
                got: data.len(),
            });
        }
        Ok(Self {
            nrows,
            ncols,
            layout,
            data,
        })
    }

    /// Build a row-major matrix from nested row data.
    ///
    /// All rows must have the same length and at least one row with at
    /// least one element must be present.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, SolveError> {
        let nrows = rows.len();
        if nrows == 0 {
            return Err(SolveError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }
        let ncols = rows[0].len();
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in &rows {
            if row.len() != ncols {
                return Err(SolveError::DimensionMismatch {
                    expected: ncols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(nrows, ncols, Layout::RowMajor, data)
    }

    /// Number of rows
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Storage order of the underlying buffer
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Leading dimension of the underlying buffer
    #[inline]
    pub fn leading_dim(&self) -> usize {
        self.layout.leading_dim(self.nrows, self.ncols)
    }

    /// Element at `(i, j)`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.nrows && j < self.ncols, "index out of bounds");
        self.data[self.layout.index(i, j, self.leading_dim())]
    }

    /// Overwrite element at `(i, j)`
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.nrows && j < self.ncols, "index out of bounds");
        let idx = self.layout.index(i, j, self.leading_dim());
        self.data[idx] = value;
    }

    /// Flat view of the buffer in its current layout
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view of the buffer in its current layout
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Convert the buffer to the given layout in place.
    ///
    /// A no-op when the layout already matches; otherwise a
    /// transpose-on-copy re-linearization that preserves every value
    /// bit-for-bit. Converting there and back restores the original
    /// buffer exactly.
    pub fn convert_to(&mut self, layout: Layout) {
        if self.layout != layout {
            self.data = relinearize(&self.data, self.nrows, self.ncols, self.layout);
            self.layout = layout;
        }
    }

    /// Copy of this matrix with its buffer in the given layout.
    pub fn to_layout(&self, layout: Layout) -> Self {
        let mut out = self.clone();
        out.convert_to(layout);
        out
    }
}

impl<T: Float> Matrix<T> {
    /// All-zeros matrix in the given layout
    pub fn zeros(nrows: usize, ncols: usize, layout: Layout) -> Self {
        Self {
            nrows,
            ncols,
            layout,
            data: vec![T::zero(); nrows * ncols],
        }
    }

    /// `n x n` identity matrix (row-major)
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n, Layout::RowMajor);
        for i in 0..n {
            m.set(i, i, T::one());
        }
        m
    }
}

impl<T: Float + NumAssign> Matrix<T> {
    /// Matrix product `self * rhs`.
    ///
    /// Used by residual checks and the demo report; shapes must agree
    /// (`self.ncols == rhs.nrows`). Result is row-major.
    pub fn matmul(&self, rhs: &Self) -> Result<Self, SolveError> {
        if self.ncols != rhs.nrows {
            return Err(SolveError::DimensionMismatch {
                expected: self.ncols,
                got: rhs.nrows,
            });
        }
        let mut out = Self::zeros(self.nrows, rhs.ncols, Layout::RowMajor);
        for i in 0..self.nrows {
            for j in 0..rhs.ncols {
                let mut acc = T::zero();
                for k in 0..self.ncols {
                    acc += self.get(i, k) * rhs.get(k, j);
                }
                out.set(i, j, acc);
            }
        }
        Ok(out)
    }
}
