//! LU decomposition solver
//!
//! Solves dense square systems `A · X = B` by LU factorization with
//! partial (row) pivoting. The kernel works in place on column-major
//! flat buffers and reports outcomes through the status-code convention
//! of the classic general-solve routine: `0` for success, `k` (1-based)
//! for an exactly-zero pivot at elimination step `k`, `-i` when the
//! `i`-th argument is illegal. The caller-facing functions translate
//! status codes into [`SolveError`] and handle storage-order conversion
//! at the boundary.

use crate::error::SolveError;
use crate::layout::Layout;
use crate::matrix::Matrix;
use num_traits::{Float, NumAssign};
use std::ops::Index;

/// Row-exchange record of one factorization.
///
/// Entry `k` (1-based value) names the row exchanged into position `k`
/// at elimination step `k`. The vector always has exactly `n` entries
/// after a completed factorization, singular or not, each in `[1, n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotVector(Vec<usize>);

impl PivotVector {
    pub(crate) fn new(ipiv: Vec<usize>) -> Self {
        Self(ipiv)
    }

    /// Number of recorded elimination steps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 1-based pivot entries, in elimination order
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps that actually exchanged two distinct rows
    pub fn swap_count(&self) -> usize {
        self.0.iter().enumerate().filter(|&(k, &p)| p != k + 1).count()
    }

    /// Sign of the row permutation: `+1` for an even number of
    /// exchanges, `-1` for odd. Used for determinant reconstruction.
    pub fn permutation_sign<T: Float>(&self) -> T {
        if self.swap_count() % 2 == 0 {
            T::one()
        } else {
            -T::one()
        }
    }
}

impl Index<usize> for PivotVector {
    type Output = usize;

    fn index(&self, k: usize) -> &usize {
        &self.0[k]
    }
}

/// LU factorization with partial pivoting, in place on a column-major
/// `n x n` buffer.
///
/// On return `a` holds the packed factors: strictly-lower entries are
/// the multipliers of unit-lower-triangular `L`, the upper triangle
/// including the diagonal is `U`. `ipiv[k]` receives the 1-based row
/// exchanged into position `k`.
///
/// Returns `0` on success; `k` (1-based) when the largest-magnitude
/// candidate pivot at step `k` is exactly zero (the factorization still
/// runs to completion so `ipiv` is fully populated, but `U` is
/// singular); `-i` when the `i`-th argument is illegal.
pub fn getrf<T: Float + NumAssign>(n: usize, a: &mut [T], lda: usize, ipiv: &mut [usize]) -> i32 {
    if n == 0 {
        return -1;
    }
    if lda < n {
        return -3;
    }
    if a.len() < lda * n {
        return -2;
    }
    if ipiv.len() < n {
        return -4;
    }

    let mut info = 0i32;
    for k in 0..n {
        // Pivot search: largest |a[i, k]| for i >= k
        let mut max_val = T::zero();
        let mut max_row = k;
        for i in k..n {
            let val = a[k * lda + i].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }
        ipiv[k] = max_row + 1;

        if max_val.is_zero() {
            // Record the first zero pivot and move on, so the pivot
            // vector still ends up fully populated
            if info == 0 {
                info = (k + 1) as i32;
            }
            continue;
        }

        // Swap rows k and max_row across all columns
        if max_row != k {
            for j in 0..n {
                a.swap(j * lda + k, j * lda + max_row);
            }
        }

        // Multipliers go into the L part below the pivot
        let pivot = a[k * lda + k];
        for i in (k + 1)..n {
            a[k * lda + i] /= pivot;
        }

        // Trailing submatrix update: a[i, j] -= a[i, k] * a[k, j]
        for j in (k + 1)..n {
            let ukj = a[j * lda + k];
            for i in (k + 1)..n {
                let lik = a[k * lda + i];
                a[j * lda + i] -= lik * ukj;
            }
        }
    }
    info
}

/// Solve `A · X = B` from the packed factors produced by [`getrf`],
/// in place on a column-major `n x nrhs` right-hand-side buffer.
///
/// Applies the recorded row exchanges to `b`, then forward substitution
/// with unit-lower `L` and back substitution with `U`, column by
/// column. `b` ends holding the solution `X`.
///
/// Returns `0` on success, `-i` when the `i`-th argument is illegal.
/// The factors are assumed nonsingular (a successful `getrf` call).
pub fn getrs<T: Float + NumAssign>(
    n: usize,
    nrhs: usize,
    lu: &[T],
    lda: usize,
    ipiv: &[usize],
    b: &mut [T],
    ldb: usize,
) -> i32 {
    if n == 0 {
        return -1;
    }
    if nrhs == 0 {
        return -2;
    }
    if lda < n {
        return -4;
    }
    if lu.len() < lda * n {
        return -3;
    }
    if ipiv.len() < n {
        return -5;
    }
    if ldb < n {
        return -7;
    }
    if b.len() < ldb * nrhs {
        return -6;
    }

    // Replay the row exchanges on every right-hand side
    for k in 0..n {
        let r = ipiv[k] - 1;
        if r != k {
            for j in 0..nrhs {
                b.swap(j * ldb + k, j * ldb + r);
            }
        }
    }

    for j in 0..nrhs {
        let col = &mut b[j * ldb..j * ldb + n];

        // Forward substitution: L y = P b (unit diagonal)
        for i in 1..n {
            let mut acc = col[i];
            for p in 0..i {
                acc -= lu[p * lda + i] * col[p];
            }
            col[i] = acc;
        }

        // Back substitution: U x = y
        for i in (0..n).rev() {
            let mut acc = col[i];
            for p in (i + 1)..n {
                acc -= lu[p * lda + i] * col[p];
            }
            col[i] = acc / lu[i * lda + i];
        }
    }
    0
}

/// A completed LU factorization, reusable for further right-hand sides
///
/// Owns its packed-factor and pivot buffers; retains nothing of the
/// matrix it was built from.
#[derive(Debug, Clone)]
pub struct LuFactors<T> {
    lu: Matrix<T>,
    pivots: PivotVector,
}

impl<T: Float + NumAssign> LuFactors<T> {
    /// Factorize a square matrix. The input is copied; see
    /// [`lu_solve_in_place`] for the allocation-free in-place contract.
    pub fn factorize(a: &Matrix<T>) -> Result<Self, SolveError> {
        if a.nrows() == 0 {
            return Err(SolveError::IllegalArgument {
                arg: 1,
                reason: "coefficient matrix must have at least one row",
            });
        }
        if a.nrows() != a.ncols() {
            return Err(SolveError::IllegalArgument {
                arg: 1,
                reason: "coefficient matrix must be square",
            });
        }

        let n = a.nrows();
        let mut lu = a.to_layout(Layout::ColMajor);
        let mut ipiv = vec![0usize; n];
        let info = getrf(n, lu.as_mut_slice(), n, &mut ipiv);
        if info > 0 {
            log::warn!("matrix of order {} is singular at pivot {}", n, info);
            return Err(SolveError::Singular {
                pivot: info as usize,
            });
        }
        if info < 0 {
            return Err(SolveError::IllegalArgument {
                arg: (-info) as usize,
                reason: "rejected by the factorization kernel",
            });
        }
        log::debug!("LU factorization of order {} complete", n);
        Ok(Self {
            lu,
            pivots: PivotVector::new(ipiv),
        })
    }

    /// Matrix order
    pub fn order(&self) -> usize {
        self.lu.nrows()
    }

    /// Packed L/U factors, column-major
    pub fn packed(&self) -> &Matrix<T> {
        &self.lu
    }

    /// Row-exchange record of the factorization
    pub fn pivots(&self) -> &PivotVector {
        &self.pivots
    }

    /// Determinant of the original matrix: permutation sign times the
    /// product of the diagonal of `U`.
    pub fn det(&self) -> T {
        let mut det = self.pivots.permutation_sign::<T>();
        for i in 0..self.order() {
            det = det * self.lu.get(i, i);
        }
        det
    }

    /// Solve for a fresh right-hand side using the stored factors.
    /// The result is returned in `b`'s layout; `b` is not modified.
    pub fn solve(&self, b: &Matrix<T>) -> Result<Matrix<T>, SolveError> {
        let n = self.order();
        if b.nrows() != n {
            return Err(SolveError::DimensionMismatch {
                expected: n,
                got: b.nrows(),
            });
        }
        if b.ncols() == 0 {
            return Err(SolveError::IllegalArgument {
                arg: 2,
                reason: "right-hand side must have at least one column",
            });
        }

        let mut x = b.to_layout(Layout::ColMajor);
        let info = getrs(
            n,
            x.ncols(),
            self.lu.as_slice(),
            n,
            self.pivots.as_slice(),
            x.as_mut_slice(),
            n,
        );
        if info < 0 {
            return Err(SolveError::IllegalArgument {
                arg: (-info) as usize,
                reason: "rejected by the substitution kernel",
            });
        }
        x.convert_to(b.layout());
        Ok(x)
    }
}

fn check_system<T: Copy>(a: &Matrix<T>, b: &Matrix<T>) -> Result<(), SolveError> {
    if a.nrows() == 0 {
        return Err(SolveError::IllegalArgument {
            arg: 1,
            reason: "coefficient matrix must have at least one row",
        });
    }
    if a.nrows() != a.ncols() {
        return Err(SolveError::IllegalArgument {
            arg: 1,
            reason: "coefficient matrix must be square",
        });
    }
    if b.nrows() != a.nrows() {
        return Err(SolveError::IllegalArgument {
            arg: 2,
            reason: "right-hand side row count must match the coefficient matrix",
        });
    }
    if b.ncols() == 0 {
        return Err(SolveError::IllegalArgument {
            arg: 2,
            reason: "right-hand side must have at least one column",
        });
    }
    Ok(())
}

/// Solve `A · X = B` in place.
///
/// Mirrors the external routine's contract: on success `a`'s buffer is
/// overwritten with the packed L/U factors, `b`'s buffer with the
/// solution `X`, and the pivot vector of the factorization is returned.
/// Both operands are converted to column-major for the kernel and
/// converted back to their original layouts afterwards; the conversion
/// is exact in both directions.
///
/// All shape preconditions are checked before any computation runs. On
/// [`SolveError::Singular`] the contents of `a` and `b` are left in an
/// unspecified partially-factored state.
pub fn lu_solve_in_place<T: Float + NumAssign>(
    a: &mut Matrix<T>,
    b: &mut Matrix<T>,
) -> Result<PivotVector, SolveError> {
    check_system(a, b)?;

    let n = a.nrows();
    let nrhs = b.ncols();
    let a_layout = a.layout();
    let b_layout = b.layout();
    a.convert_to(Layout::ColMajor);
    b.convert_to(Layout::ColMajor);

    let mut ipiv = vec![0usize; n];
    let info = getrf(n, a.as_mut_slice(), n, &mut ipiv);
    if info > 0 {
        log::warn!("matrix of order {} is singular at pivot {}", n, info);
        return Err(SolveError::Singular {
            pivot: info as usize,
        });
    }
    if info < 0 {
        return Err(SolveError::IllegalArgument {
            arg: (-info) as usize,
            reason: "rejected by the factorization kernel",
        });
    }

    let info = getrs(n, nrhs, a.as_slice(), n, &ipiv, b.as_mut_slice(), n);
    if info < 0 {
        return Err(SolveError::IllegalArgument {
            arg: (-info) as usize,
            reason: "rejected by the substitution kernel",
        });
    }

    a.convert_to(a_layout);
    b.convert_to(b_layout);
    log::debug!(
        "solved {}x{} system with {} right-hand side(s)",
        n,
        n,
        nrhs
    );
    Ok(PivotVector::new(ipiv))
}

/// Solve `A · X = B` without touching the inputs.
///
/// This is a convenience wrapper over [`lu_solve_in_place`] that clones
/// both operands and returns the solution in `b`'s layout.
pub fn lu_solve<T: Float + NumAssign>(
    a: &Matrix<T>,
    b: &Matrix<T>,
) -> Result<Matrix<T>, SolveError> {
    let mut a_work = a.clone();
    let mut x = b.clone();
    lu_solve_in_place(&mut a_work, &mut x)?;
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_residual_small(a: &Matrix<f64>, x: &Matrix<f64>, b: &Matrix<f64>, tol: f64) {
        let ax = a.matmul(x).expect("shapes agree");
        for i in 0..b.nrows() {
            for j in 0..b.ncols() {
                assert_relative_eq!(ax.get(i, j), b.get(i, j), epsilon = tol);
            }
        }
    }

    #[test]
    fn test_getrf_records_pivots_and_factors() {
        // Column-major buffer for [[1,3,0],[2,4,-4],[-1,9,8]]
        let mut a = vec![1.0_f64, 2.0, -1.0, 3.0, 4.0, 9.0, 0.0, -4.0, 8.0];
        let mut ipiv = vec![0usize; 3];

        let info = getrf(3, &mut a, 3, &mut ipiv);
        assert_eq!(info, 0);
        assert_eq!(ipiv, vec![2, 3, 3]);

        // Packed factors, column-major: U rows [2,4,-4],[_,11,6],[_,_,16/11],
        // L multipliers -0.5, 0.5, 1/11 below the diagonal
        assert_relative_eq!(a[0], 2.0);
        assert_relative_eq!(a[1], -0.5);
        assert_relative_eq!(a[2], 0.5);
        assert_relative_eq!(a[3], 4.0);
        assert_relative_eq!(a[4], 11.0);
        assert_relative_eq!(a[5], 1.0 / 11.0);
        assert_relative_eq!(a[6], -4.0);
        assert_relative_eq!(a[7], 6.0);
        assert_relative_eq!(a[8], 16.0 / 11.0);
    }

    #[test]
    fn test_getrf_zero_pivot_status() {
        // Second column is zero below and on the diagonal after step 1
        let mut a = vec![1.0_f64, 0.0, 0.0, 0.0];
        let mut ipiv = vec![0usize; 2];
        let info = getrf(2, &mut a, 2, &mut ipiv);
        assert_eq!(info, 2);
        // Pivot vector is still fully populated
        assert_eq!(ipiv.len(), 2);
        assert!(ipiv.iter().all(|&p| (1..=2).contains(&p)));
    }

    #[test]
    fn test_getrf_reports_first_zero_pivot() {
        let mut a = vec![0.0_f64; 9];
        let mut ipiv = vec![0usize; 3];
        let info = getrf(3, &mut a, 3, &mut ipiv);
        assert_eq!(info, 1);
        assert_eq!(ipiv, vec![1, 2, 3]);
    }

    #[test]
    fn test_getrf_illegal_arguments() {
        let mut a = vec![1.0_f64; 4];
        let mut ipiv = vec![0usize; 2];
        assert_eq!(getrf(0, &mut a, 2, &mut ipiv), -1);
        assert_eq!(getrf(2, &mut a, 1, &mut ipiv), -3);
        assert_eq!(getrf(2, &mut a[..3], 2, &mut ipiv), -2);
        assert_eq!(getrf(2, &mut a, 2, &mut ipiv[..1]), -4);
    }

    #[test]
    fn test_getrs_illegal_arguments() {
        let lu = vec![1.0_f64; 4];
        let ipiv = vec![1usize, 2];
        let mut b = vec![1.0_f64; 2];
        assert_eq!(getrs(0, 1, &lu, 2, &ipiv, &mut b, 2), -1);
        assert_eq!(getrs(2, 0, &lu, 2, &ipiv, &mut b, 2), -2);
        assert_eq!(getrs(2, 1, &lu, 1, &ipiv, &mut b, 2), -4);
        assert_eq!(getrs(2, 1, &lu, 2, &ipiv[..1], &mut b, 2), -5);
        assert_eq!(getrs(2, 1, &lu, 2, &ipiv, &mut b, 1), -7);
        assert_eq!(getrs(2, 1, &lu, 2, &ipiv, &mut b[..1], 2), -6);
    }

    #[test]
    fn test_lu_solve_2x2() {
        let a = Matrix::from_rows(vec![vec![4.0_f64, 1.0], vec![1.0, 3.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0]]).unwrap();

        let x = lu_solve(&a, &b).expect("LU solve should succeed");
        assert_residual_small(&a, &x, &b, 1e-12);
    }

    #[test]
    fn test_lu_solve_identity() {
        let n = 5;
        let a: Matrix<f64> = Matrix::identity(n);
        let b =
            Matrix::from_vec(n, 1, Layout::ColMajor, (1..=n).map(|i| i as f64).collect()).unwrap();

        let x = lu_solve(&a, &b).expect("LU solve should succeed");
        for i in 0..n {
            assert_relative_eq!(x.get(i, 0), (i + 1) as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_solve_singular() {
        // Second row is twice the first
        let a = Matrix::from_rows(vec![vec![1.0_f64, 2.0], vec![2.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0]]).unwrap();

        let err = lu_solve(&a, &b).unwrap_err();
        assert_eq!(err, SolveError::Singular { pivot: 2 });
    }

    #[test]
    fn test_in_place_contract() {
        let mut a = Matrix::from_rows(vec![vec![4.0_f64, 1.0], vec![1.0, 3.0]]).unwrap();
        let mut b = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0]]).unwrap();
        let a_orig = a.clone();
        let b_orig = b.clone();

        let pivots = lu_solve_in_place(&mut a, &mut b).expect("solve should succeed");

        // Layouts restored, contents replaced
        assert_eq!(a.layout(), a_orig.layout());
        assert_eq!(b.layout(), b_orig.layout());
        assert_eq!(pivots.len(), 2);
        assert_residual_small(&a_orig, &b, &b_orig, 1e-12);

        // a now holds packed factors: pivot row first, multiplier below
        assert_relative_eq!(a.get(0, 0), 4.0);
        assert_relative_eq!(a.get(1, 0), 0.25);
        assert_relative_eq!(a.get(1, 1), 3.0 - 0.25);
    }

    #[test]
    fn test_shape_preconditions_rejected() {
        let mut square = Matrix::from_rows(vec![vec![1.0_f64, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut rect = Matrix::from_rows(vec![vec![1.0_f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let mut b2 = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0]]).unwrap();
        let mut b3 = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0], vec![3.0]]).unwrap();

        assert!(matches!(
            lu_solve_in_place(&mut rect, &mut b2),
            Err(SolveError::IllegalArgument { arg: 1, .. })
        ));
        assert!(matches!(
            lu_solve_in_place(&mut square, &mut b3),
            Err(SolveError::IllegalArgument { arg: 2, .. })
        ));

        let mut empty_rhs = Matrix::zeros(2, 0, Layout::RowMajor);
        assert!(matches!(
            lu_solve_in_place(&mut square, &mut empty_rhs),
            Err(SolveError::IllegalArgument { arg: 2, .. })
        ));
    }

    #[test]
    fn test_factors_reused_for_multiple_rhs() {
        let a = Matrix::from_rows(vec![
            vec![4.0_f64, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ])
        .unwrap();

        let factors = LuFactors::factorize(&a).expect("factorization should succeed");
        assert_eq!(factors.order(), 3);
        assert_eq!(factors.pivots().len(), 3);

        let b1 = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0], vec![3.0]]).unwrap();
        let x1 = factors.solve(&b1).expect("solve should succeed");
        assert_residual_small(&a, &x1, &b1, 1e-10);

        let b2 = Matrix::from_rows(vec![vec![4.0_f64], vec![5.0], vec![6.0]]).unwrap();
        let x2 = factors.solve(&b2).expect("solve should succeed");
        assert_residual_small(&a, &x2, &b2, 1e-10);
    }

    #[test]
    fn test_det_from_factors() {
        let a = Matrix::from_rows(vec![
            vec![1.0_f64, 3.0, 0.0],
            vec![2.0, 4.0, -4.0],
            vec![-1.0, 9.0, 8.0],
        ])
        .unwrap();
        let factors = LuFactors::factorize(&a).unwrap();
        assert_relative_eq!(factors.det(), 32.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pivot_sign() {
        let pivots = PivotVector::new(vec![2, 3, 3]);
        assert_eq!(pivots.swap_count(), 2);
        assert_relative_eq!(pivots.permutation_sign::<f64>(), 1.0);

        let pivots = PivotVector::new(vec![2, 2, 3]);
        assert_eq!(pivots.swap_count(), 1);
        assert_relative_eq!(pivots.permutation_sign::<f64>(), -1.0);
    }

    #[test]
    fn test_lu_solve_f32() {
        let a = Matrix::from_rows(vec![vec![2.0_f32, 1.0], vec![1.0, 3.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![3.0_f32], vec![5.0]]).unwrap();
        let x = lu_solve(&a, &b).expect("LU solve should succeed");
        // A is [[2,1],[1,3]], b = [3,5] -> x = [0.8, 1.4]
        assert_relative_eq!(x.get(0, 0), 0.8, epsilon = 1e-5);
        assert_relative_eq!(x.get(1, 0), 1.4, epsilon = 1e-5);
    }
}
