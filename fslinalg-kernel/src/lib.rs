//! Leaf storage and generalized dense kernels for fslinalg.
//!
//! The kernels compute `Y = alpha * op(A) * op(B)` (GEMM) and
//! `y = alpha * op(A) * op(x)` (GEMV), optionally accumulating into the
//! destination, where `op` is an optional transpose and/or conjugation.
//! Each kernel has four overloads selected by operand kind: dense buffers
//! and zero-storage [`Unit`] operands, whose single non-zero entry collapses
//! one or more loop levels.
//!
//! Kernels assume conforming shapes (checked with `debug_assert!` only) and a
//! destination that does not share storage with either operand.

/// Generalized matrix-matrix product.
pub mod gemm;
/// Generalized matrix-vector product.
pub mod gemv;
/// Dense and unit leaf storage.
pub mod leaf;
/// Borrowed kernel operands with transpose/conjugate flags.
pub mod operand;

pub use gemm::gemm;
pub use gemv::gemv;
pub use leaf::{Dense, Shape, Unit};
pub use operand::{MatOperand, Operand, VecOperand};

/// Errors raised while constructing leaf storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Buffer length does not match `rows * cols`.
    #[error("buffer length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Index pair lies outside the shape.
    #[error("index ({row}, {col}) out of range for shape {shape}")]
    IndexOutOfRange { row: usize, col: usize, shape: Shape },
}

/// Convenience alias for `Result<T, StorageError>`.
pub type Result<T> = std::result::Result<T, StorageError>;
