//! Generalized matrix-vector product.
//!
//! `y = alpha * op(A) * op(x)` or, with `increment`, `y += alpha * op(A) * op(x)`.
//! Same four-way split as [`gemm`](crate::gemm) with one loop level removed.

use fslinalg_traits::{product, triple_product, Conj, ElementOp, Identity, Scalar};

use crate::leaf::{Dense, Unit};
use crate::operand::{MatOperand, Operand, VecOperand};

/// Generalized GEMV: `y (+)= alpha * op(A) * op(x)`.
///
/// `y` is read by flat index and must hold `op(A).rows` elements; it must not
/// share storage with `A` or `x`.
pub fn gemv<T: Scalar>(
    alpha: T,
    a: &MatOperand<'_, T>,
    x: &VecOperand<'_, T>,
    y: &Dense<T>,
    increment: bool,
) {
    debug_assert_eq!(a.cols(), x.len());
    debug_assert_eq!(a.rows(), y.len());

    if !increment {
        y.set_zero();
    }

    match (a.conjugated, x.conjugated) {
        (false, false) => gemv_op::<T, Identity, Identity>(alpha, a, x, y),
        (false, true) => gemv_op::<T, Identity, Conj>(alpha, a, x, y),
        (true, false) => gemv_op::<T, Conj, Identity>(alpha, a, x, y),
        (true, true) => gemv_op::<T, Conj, Conj>(alpha, a, x, y),
    }
}

fn gemv_op<T, OpA, OpX>(alpha: T, a: &MatOperand<'_, T>, x: &VecOperand<'_, T>, y: &Dense<T>)
where
    T: Scalar,
    OpA: ElementOp<T>,
    OpX: ElementOp<T>,
{
    match (a.operand, x.operand) {
        (Operand::Dense(da), Operand::Dense(dx)) => {
            gemv_dense_dense::<T, OpA, OpX>(alpha, da, a.transposed, dx, y)
        }
        (Operand::Dense(da), Operand::Unit(ux)) => {
            gemv_dense_unit::<T, OpA>(alpha, da, a.transposed, &ux, y)
        }
        (Operand::Unit(ua), Operand::Dense(dx)) => {
            gemv_unit_dense::<T, OpX>(alpha, &ua, a.transposed, dx, y)
        }
        (Operand::Unit(ua), Operand::Unit(ux)) => gemv_unit_unit(alpha, &ua, a.transposed, &ux, y),
    }
}

#[inline(always)]
fn strides(cols: usize, transposed: bool) -> (usize, usize) {
    if transposed {
        (1, cols)
    } else {
        (cols, 1)
    }
}

fn gemv_dense_dense<T, OpA, OpX>(alpha: T, a: &Dense<T>, ta: bool, x: &Dense<T>, y: &Dense<T>)
where
    T: Scalar,
    OpA: ElementOp<T>,
    OpX: ElementOp<T>,
{
    let (a_i, a_j) = strides(a.cols(), ta);
    let a_data = a.cells();
    let x_data = x.cells();

    for (i, yi) in y.cells().iter().enumerate() {
        let mut acc = T::zero();
        for (j, xj) in x_data.iter().enumerate() {
            acc += triple_product::<T, Identity, OpA, OpX>(
                alpha,
                a_data[i * a_i + j * a_j].get(),
                xj.get(),
            );
        }
        yi.set(yi.get() + acc);
    }
}

fn gemv_dense_unit<T, OpA>(alpha: T, a: &Dense<T>, ta: bool, x: &Unit, y: &Dense<T>)
where
    T: Scalar,
    OpA: ElementOp<T>,
{
    let (a_i, a_j) = strides(a.cols(), ta);
    let j = x.flat_index();
    let a_data = a.cells();

    for (i, yi) in y.cells().iter().enumerate() {
        yi.set(yi.get() + product::<T, Identity, OpA>(alpha, a_data[i * a_i + j * a_j].get()));
    }
}

fn gemv_unit_dense<T, OpX>(alpha: T, a: &Unit, ta: bool, x: &Dense<T>, y: &Dense<T>)
where
    T: Scalar,
    OpX: ElementOp<T>,
{
    let (i, j) = a.index(ta);
    y.add_at(i, product::<T, Identity, OpX>(alpha, x.at(j)));
}

fn gemv_unit_unit<T: Scalar>(alpha: T, a: &Unit, ta: bool, x: &Unit, y: &Dense<T>) {
    let (i, j) = a.index(ta);
    if j == x.flat_index() {
        y.add_at(i, alpha);
    }
}
