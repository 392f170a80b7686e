//! Error types for matrix construction and the solve operation
//!
//! Two failure classes exist: contract violations (bad shapes or
//! dimensions, detected before any computation runs) and exact
//! singularity (a zero pivot during elimination). There is no I/O and
//! no other runtime failure path.

use thiserror::Error;

/// Errors that can occur while building matrices or solving a system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// A precondition on a call argument was violated. `arg` is the
    /// 1-based position of the offending argument, mirroring the
    /// negative-status convention of the underlying routine.
    #[error("illegal value for argument {arg}: {reason}")]
    IllegalArgument { arg: usize, reason: &'static str },

    /// The coefficient matrix is exactly singular: elimination hit a
    /// zero pivot at the given 1-based step. The system has no unique
    /// solution; retrying with the same input cannot succeed.
    #[error("matrix is singular: zero pivot at elimination step {pivot}")]
    Singular { pivot: usize },

    /// Matrix shapes are inconsistent with the requested operation
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
