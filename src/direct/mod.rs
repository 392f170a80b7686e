//! Direct solvers for dense linear systems
//!
//! This module provides the direct (non-iterative) solve path:
//! - [`lu_solve`] / [`lu_solve_in_place`]: LU decomposition with partial pivoting
//! - [`LuFactors`]: a reusable factorization for repeated right-hand sides

mod lu;

pub use lu::{LuFactors, PivotVector, getrf, getrs, lu_solve, lu_solve_in_place};
