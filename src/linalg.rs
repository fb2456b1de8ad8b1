//! Reductions over expressions: inner product and Frobenius norm.
//!
//! Operands without read access are materialized first.

use num_traits::{Float, Zero};

use fslinalg_traits::Scalar;

use crate::assign::Readable;
use crate::error::{LinalgError, Result};
use crate::expr::Expr;

/// Frobenius inner product `sum_ij conj(lhs_ij) * rhs_ij` of two operands of
/// the same shape. For vectors this is the usual dot product.
pub fn inner<T: Scalar>(lhs: &Expr<'_, T>, rhs: &Expr<'_, T>) -> Result<T> {
    if lhs.shape() != rhs.shape() {
        return Err(LinalgError::ShapeMismatch {
            op: "inner",
            lhs: lhs.shape(),
            rhs: rhs.shape(),
        });
    }
    let (l, r) = (Readable::of(lhs), Readable::of(rhs));
    let mut acc = T::zero();
    for i in 0..lhs.rows() {
        for j in 0..lhs.cols() {
            acc += l.read(i, j).conj() * r.read(i, j);
        }
    }
    Ok(acc)
}

/// Sum of `abs2` over all elements.
pub fn squared_norm<T: Scalar>(e: &Expr<'_, T>) -> T::Real {
    let v = Readable::of(e);
    let mut acc = T::Real::zero();
    for i in 0..e.rows() {
        for j in 0..e.cols() {
            acc = acc + v.read(i, j).abs2();
        }
    }
    acc
}

/// Frobenius norm.
pub fn norm<T: Scalar>(e: &Expr<'_, T>) -> T::Real {
    squared_norm(e).sqrt()
}
