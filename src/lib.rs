//! Dense linear-system solver
//!
//! This crate solves dense square systems `A · X = B` by LU decomposition
//! with partial pivoting, following the in-place, status-coded calling
//! convention of the classic double-precision general-solve routine.
//!
//! # Features
//!
//! - **Direct Solver**: LU decomposition with partial (row) pivoting
//! - **Explicit Storage Order**: matrices track row-major vs column-major
//!   layout; conversion at the solver boundary is lossless and exact
//! - **In-Place Contract**: the coefficient matrix is overwritten with its
//!   packed L/U factors and the right-hand side with the solution
//! - **Generic Scalar Types**: works with f64 (primary) and f32
//!
//! # Example
//!
//! ```
//! use dense_solvers::{Matrix, lu_solve};
//!
//! let a = Matrix::from_rows(vec![vec![4.0_f64, 1.0], vec![1.0, 3.0]]).unwrap();
//! let b = Matrix::from_rows(vec![vec![1.0_f64], vec![2.0]]).unwrap();
//!
//! let x = lu_solve(&a, &b).unwrap();
//! assert!((x.get(0, 0) - 1.0 / 11.0).abs() < 1e-12);
//! ```

pub mod direct;
pub mod error;
pub mod layout;
pub mod matrix;

// Re-export main types
pub use error::SolveError;
pub use layout::Layout;
pub use matrix::Matrix;

// Re-export direct solvers
pub use direct::{LuFactors, PivotVector, lu_solve, lu_solve_in_place};
