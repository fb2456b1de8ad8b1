//! Lazy fixed-shape linear algebra expressions.
//!
//! Composing vectors and matrices builds an expression tree; nothing is
//! computed until the tree is assigned into a dense leaf. Assignment is
//! alias-safe (`A := A * B` reads `A` completely before overwriting it) and
//! product chains are re-associated into their cheapest bracketing before
//! the kernels run.
//!
//! # Core Types
//!
//! - [`Dense`]: row-major fixed-size storage; [`Unit`]: one-hot operand without storage
//! - [`Expr`]: expression node carrying its [`Shape`] and [`Capabilities`]
//! - [`DenseExt`]: `assign`/`incr`/`decr` entry points on dense leaves
//!
//! # Example
//!
//! ```rust
//! use fslinalg::{outer, Dense, DenseExt, Expr, Unit};
//!
//! let e0 = Unit::vector(4, 0).unwrap();
//! let a = Dense::vector(vec![2.0, 3.0, 0.0]);
//! let y = Dense::zeros(4, 1);
//!
//! // 0.5 * (e0 a^T) a, evaluated without forming the 4x3 matrix
//! let e = (0.5_f64 * outer(e0, &a).unwrap() * &a).unwrap();
//! y.assign(e).unwrap();
//! assert_eq!(y.to_vec(), vec![6.5, 0.0, 0.0, 0.0]);
//! ```
//!
//! # Matrix chains
//!
//! ```rust
//! use fslinalg::{Dense, DenseExt};
//!
//! let a = Dense::<f64>::zeros(12, 3);
//! let b = Dense::zeros(3, 8);
//! let c = Dense::zeros(8, 5);
//! let d = Dense::zeros(5, 2);
//! let e = (((a.expr() * &b).unwrap() * &c).unwrap() * &d).unwrap();
//!
//! assert_eq!(e.chain_dims(), Some(vec![12, 3, 8, 5, 2]));
//! assert_eq!(e.optimal_cost(), Some(200));
//! assert!(!e.is_optimally_bracketed());
//! ```
//!
//! # Configuration
//!
//! - Cargo feature `plan-cache` (default): memoize chain plans per thread
//! - `FSLINALG_REBRACKET=0`: evaluate every product exactly as written
//! - [`config::with_rebracketing`]: the same switch, scoped to a closure on one thread

mod alias;
mod assign;
mod chain;
pub mod config;
mod error;
mod expr;
mod linalg;
mod ops;
mod product;
mod strip;

// ============================================================================
// Expressions and assignment
// ============================================================================
pub use assign::{AssignMode, DenseExt};
pub use error::{Capability, LinalgError, Result};
pub use expr::{Capabilities, Expr};
pub use linalg::{inner, norm, squared_norm};

// ============================================================================
// Leaves, scalars and chain plans
// ============================================================================
pub use fslinalg_chain::{
    cached_plan, clear_plan_cache, plan_cache_len, Bracketing, ChainError, ChainPlan,
};
pub use fslinalg_kernel::{Dense, Shape, StorageError, Unit};
pub use fslinalg_traits::Scalar;

// ============================================================================
// Free-function constructors
// ============================================================================

/// Transpose of `e`.
pub fn transpose<'a, T>(e: impl Into<Expr<'a, T>>) -> Expr<'a, T> {
    e.into().transpose()
}

/// Elementwise conjugate of `e`.
pub fn conj<'a, T>(e: impl Into<Expr<'a, T>>) -> Expr<'a, T> {
    e.into().conj()
}

/// Conjugate transpose of `e`.
pub fn adjoint<'a, T>(e: impl Into<Expr<'a, T>>) -> Expr<'a, T> {
    e.into().adjoint()
}

/// Outer product `lhs * rhs^T` of two column vectors.
pub fn outer<'a, T>(
    lhs: impl Into<Expr<'a, T>>,
    rhs: impl Into<Expr<'a, T>>,
) -> Result<Expr<'a, T>> {
    Expr::outer(lhs.into(), rhs.into())
}

/// Cross product of two 3-vectors.
pub fn cross<'a, T>(
    lhs: impl Into<Expr<'a, T>>,
    rhs: impl Into<Expr<'a, T>>,
) -> Result<Expr<'a, T>> {
    Expr::cross(lhs.into(), rhs.into())
}

/// Pin the bracketing of a product so it is evaluated as written.
pub fn keep_brackets<'a, T>(e: impl Into<Expr<'a, T>>) -> Result<Expr<'a, T>> {
    e.into().keep_brackets()
}
