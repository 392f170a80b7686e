//! Storage-order tracking for dense matrices
//!
//! A 2-D array linearizes into a flat buffer in one of two conventions:
//! row-major (consecutive addresses walk across a row) or column-major
//! (consecutive addresses walk down a column). The solve kernel requires
//! column-major input, so the layout of every buffer is tracked
//! explicitly and converted at the boundary rather than assumed.

/// Memory layout of a dense matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Row-major (C-style): elements of a row are contiguous.
    RowMajor,
    /// Column-major (Fortran-style): elements of a column are contiguous.
    ColMajor,
}

impl Default for Layout {
    fn default() -> Self {
        Self::RowMajor
    }
}

impl Layout {
    /// Natural leading dimension (stride between successive rows or
    /// columns) for an unpadded `rows x cols` matrix.
    #[inline(always)]
    pub fn leading_dim(self, rows: usize, cols: usize) -> usize {
        match self {
            Layout::RowMajor => cols,
            Layout::ColMajor => rows,
        }
    }

    /// Flat index of element `(i, j)` given the leading dimension.
    #[inline(always)]
    pub fn index(self, i: usize, j: usize, ld: usize) -> usize {
        match self {
            Layout::RowMajor => i * ld + j,
            Layout::ColMajor => j * ld + i,
        }
    }

    /// The opposite convention.
    #[inline(always)]
    pub fn transposed(self) -> Layout {
        match self {
            Layout::RowMajor => Layout::ColMajor,
            Layout::ColMajor => Layout::RowMajor,
        }
    }
}

/// Re-linearize `src` (laid out as `from`, shape `rows x cols`) into the
/// opposite convention. Pure element moves: values are copied bit-for-bit,
/// no arithmetic is performed, and applying the conversion twice restores
/// the original buffer exactly.
pub fn relinearize<T: Copy>(src: &[T], rows: usize, cols: usize, from: Layout) -> Vec<T> {
    let to = from.transposed();
    let ld_src = from.leading_dim(rows, cols);
    debug_assert!(src.len() >= rows * cols);

    let mut dst = Vec::with_capacity(rows * cols);
    match to {
        Layout::RowMajor => {
            for i in 0..rows {
                for j in 0..cols {
                    dst.push(src[from.index(i, j, ld_src)]);
                }
            }
        }
        Layout::ColMajor => {
            for j in 0..cols {
                for i in 0..rows {
                    dst.push(src[from.index(i, j, ld_src)]);
                }
            }
        }
    }
    debug_assert_eq!(dst.len(), rows * cols);
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_dim() {
        assert_eq!(Layout::RowMajor.leading_dim(2, 5), 5);
        assert_eq!(Layout::ColMajor.leading_dim(2, 5), 2);
    }

    #[test]
    fn test_index_conventions() {
        // 2x3 matrix [[a b c], [d e f]]
        // row-major buffer: a b c d e f
        // col-major buffer: a d b e c f
        assert_eq!(Layout::RowMajor.index(1, 2, 3), 5);
        assert_eq!(Layout::ColMajor.index(1, 2, 2), 5);
        assert_eq!(Layout::RowMajor.index(0, 1, 3), 1);
        assert_eq!(Layout::ColMajor.index(0, 1, 2), 2);
    }

    #[test]
    fn test_relinearize_2x3() {
        let row_major = [1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let col_major = relinearize(&row_major, 2, 3, Layout::RowMajor);
        assert_eq!(col_major, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_relinearize_round_trip_exact() {
        // Values chosen so any arithmetic would perturb the bits
        let src = [0.1_f64, -0.3, 1.0 / 3.0, f64::MIN_POSITIVE, 7e300, -2.5e-17];
        let there = relinearize(&src, 3, 2, Layout::RowMajor);
        let back = relinearize(&there, 3, 2, Layout::ColMajor);
        for (a, b) in src.iter().zip(back.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
