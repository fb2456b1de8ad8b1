//! Generalized matrix-matrix product.
//!
//! `Y = alpha * op(A) * op(B)` or, with `increment`, `Y += alpha * op(A) * op(B)`.
//! Four overloads are selected by operand kind:
//! - dense x dense: i, k, j loop; `alpha * op(A[i,k])` is hoisted out of the j loop
//! - dense x unit: a single column of Y is written
//! - unit x dense: a single row of Y is written
//! - unit x unit: a single cell of Y is updated when the contracted indices agree

use fslinalg_traits::{product, Conj, ElementOp, Identity, Scalar};

use crate::leaf::{Dense, Shape, Unit};
use crate::operand::{MatOperand, Operand};

/// Generalized GEMM: `Y (+)= alpha * op(A) * op(B)`.
///
/// `y` must have shape `op(A).rows x op(B).cols` and must not share storage
/// with either operand.
pub fn gemm<T: Scalar>(
    alpha: T,
    a: &MatOperand<'_, T>,
    b: &MatOperand<'_, T>,
    y: &Dense<T>,
    increment: bool,
) {
    debug_assert_eq!(a.cols(), b.rows());
    debug_assert_eq!(y.shape(), Shape::new(a.rows(), b.cols()));

    if !increment {
        y.set_zero();
    }

    match (a.conjugated, b.conjugated) {
        (false, false) => gemm_op::<T, Identity, Identity>(alpha, a, b, y),
        (false, true) => gemm_op::<T, Identity, Conj>(alpha, a, b, y),
        (true, false) => gemm_op::<T, Conj, Identity>(alpha, a, b, y),
        (true, true) => gemm_op::<T, Conj, Conj>(alpha, a, b, y),
    }
}

fn gemm_op<T, OpA, OpB>(alpha: T, a: &MatOperand<'_, T>, b: &MatOperand<'_, T>, y: &Dense<T>)
where
    T: Scalar,
    OpA: ElementOp<T>,
    OpB: ElementOp<T>,
{
    match (a.operand, b.operand) {
        (Operand::Dense(da), Operand::Dense(db)) => {
            gemm_dense_dense::<T, OpA, OpB>(alpha, da, a.transposed, db, b.transposed, y)
        }
        (Operand::Dense(da), Operand::Unit(ub)) => {
            gemm_dense_unit::<T, OpA>(alpha, da, a.transposed, &ub, b.transposed, y)
        }
        (Operand::Unit(ua), Operand::Dense(db)) => {
            gemm_unit_dense::<T, OpB>(alpha, &ua, a.transposed, db, b.transposed, y)
        }
        (Operand::Unit(ua), Operand::Unit(ub)) => {
            gemm_unit_unit(alpha, &ua, a.transposed, &ub, b.transposed, y)
        }
    }
}

/// Row and inner strides of a row-major `rows x cols` buffer read as `op(A)`.
#[inline(always)]
fn strides(cols: usize, transposed: bool) -> (usize, usize) {
    if transposed {
        (1, cols)
    } else {
        (cols, 1)
    }
}

fn gemm_dense_dense<T, OpA, OpB>(
    alpha: T,
    a: &Dense<T>,
    ta: bool,
    b: &Dense<T>,
    tb: bool,
    y: &Dense<T>,
) where
    T: Scalar,
    OpA: ElementOp<T>,
    OpB: ElementOp<T>,
{
    let (a_i, a_k) = strides(a.cols(), ta);
    let (b_k, b_j) = strides(b.cols(), tb);
    let n_inner = if ta { a.rows() } else { a.cols() };
    let n_cols = y.cols();

    let a_data = a.cells();
    let b_data = b.cells();
    let y_data = y.cells();

    for i in 0..y.rows() {
        let y_row = &y_data[i * n_cols..(i + 1) * n_cols];
        for k in 0..n_inner {
            let alpha_a = product::<T, Identity, OpA>(alpha, a_data[i * a_i + k * a_k].get());
            for (j, yij) in y_row.iter().enumerate() {
                let bkj = b_data[k * b_k + j * b_j].get();
                yij.set(yij.get() + product::<T, Identity, OpB>(alpha_a, bkj));
            }
        }
    }
}

fn gemm_dense_unit<T, OpA>(alpha: T, a: &Dense<T>, ta: bool, b: &Unit, tb: bool, y: &Dense<T>)
where
    T: Scalar,
    OpA: ElementOp<T>,
{
    let (a_i, a_k) = strides(a.cols(), ta);
    let (k, j) = b.index(tb);
    let a_data = a.cells();
    let y_shape = y.shape();

    for i in 0..y.rows() {
        let aik = a_data[i * a_i + k * a_k].get();
        y.add_at(y_shape.flat_index(i, j), product::<T, Identity, OpA>(alpha, aik));
    }
}

fn gemm_unit_dense<T, OpB>(alpha: T, a: &Unit, ta: bool, b: &Dense<T>, tb: bool, y: &Dense<T>)
where
    T: Scalar,
    OpB: ElementOp<T>,
{
    let (b_k, b_j) = strides(b.cols(), tb);
    let (i, k) = a.index(ta);
    let b_data = b.cells();
    let y_shape = y.shape();

    for j in 0..y.cols() {
        let bkj = b_data[k * b_k + j * b_j].get();
        y.add_at(y_shape.flat_index(i, j), product::<T, Identity, OpB>(alpha, bkj));
    }
}

fn gemm_unit_unit<T: Scalar>(alpha: T, a: &Unit, ta: bool, b: &Unit, tb: bool, y: &Dense<T>) {
    let (i, k1) = a.index(ta);
    let (k2, j) = b.index(tb);
    if k1 == k2 {
        y.add_at(y.shape().flat_index(i, j), alpha);
    }
}
