//! Matrix-matrix and matrix-vector product evaluation.
//!
//! A product first asks the chain optimizer whether it is optimally
//! bracketed. If not, the rebracketed tree is evaluated instead. Otherwise
//! both sides are stripped to kernel operands and the generalized kernel
//! writes straight into the destination, or into a temporary when the
//! destination is aliased or viewed transposed.

use log::trace;

use fslinalg_kernel::{gemm, gemv, Dense};
use fslinalg_traits::Scalar;

use crate::assign::{AssignMode, Readable, Target};
use crate::chain::rebracket;
use crate::expr::{Brackets, Expr};
use crate::strip::{strip, strip_outer, Stripped, StrippedOuter};

/// Kernel scalar and accumulate flag realizing `mode`.
fn kernel_mode<T: Scalar>(mode: AssignMode, beta: T) -> (T, bool) {
    match mode {
        AssignMode::Assign => (beta, false),
        AssignMode::Increment => (beta, true),
        AssignMode::Decrement => (-beta, true),
    }
}

fn aliased<T: Scalar>(
    check: bool,
    lhs: &Stripped<'_, T>,
    rhs: &Stripped<'_, T>,
    dst: &Dense<T>,
) -> bool {
    check && (lhs.is_aliased_to(dst) || rhs.is_aliased_to(dst))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn eval_product<T: Scalar>(
    node: &Expr<'_, T>,
    lhs: &Expr<'_, T>,
    rhs: &Expr<'_, T>,
    brackets: Brackets,
    mode: AssignMode,
    alpha: T,
    dst: &Target<'_, T>,
    check: bool,
) {
    if brackets == Brackets::Free {
        if let Some(optimal) = rebracket(node) {
            optimal.eval(mode, alpha, dst, check);
            return;
        }
    }

    let l = strip(lhs);
    let r = strip(rhs);
    let beta = alpha * l.alpha * r.alpha;

    match dst.plain() {
        Some(y) if !aliased(check, &l, &r, y) => {
            let (beta, increment) = kernel_mode(mode, beta);
            gemm(beta, &l.mat_operand(), &r.mat_operand(), y, increment);
        }
        _ => {
            trace!("Product: writing through a temporary");
            let tmp = Dense::zeros_like(node.shape());
            gemm(beta, &l.mat_operand(), &r.mat_operand(), &tmp, false);
            dst.combine(mode, T::one(), &tmp);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn eval_matvec<T: Scalar>(
    node: &Expr<'_, T>,
    lhs: &Expr<'_, T>,
    rhs: &Expr<'_, T>,
    brackets: Brackets,
    mode: AssignMode,
    alpha: T,
    dst: &Target<'_, T>,
    check: bool,
) {
    if brackets == Brackets::Free {
        if let Some(optimal) = rebracket(node) {
            optimal.eval(mode, alpha, dst, check);
            return;
        }
    }

    if let Some(outer) = strip_outer(lhs) {
        eval_rank_one(node, outer, rhs, mode, alpha, dst, check);
        return;
    }

    let l = strip(lhs);
    let r = strip(rhs);
    let beta = alpha * l.alpha * r.alpha;

    // a vector has the same flat layout whether or not it is viewed transposed
    let y = dst.dense;
    if aliased(check, &l, &r, y) {
        trace!("MatVec: operand aliases destination, using a temporary");
        let tmp = Dense::zeros_like(node.shape());
        gemv(beta, &l.mat_operand(), &r.vec_operand(), &tmp, false);
        dst.combine(mode, T::one(), &tmp);
    } else {
        let (beta, increment) = kernel_mode(mode, beta);
        gemv(beta, &l.mat_operand(), &r.vec_operand(), y, increment);
    }
}

/// `op(s * u * v^T) * x` as `s * (c(w) . x) * c(z)` without forming the matrix,
/// where `(z, w)` is `(u, v)`, swapped when transposed, and `c` conjugates
/// when the outer product is conjugated.
fn eval_rank_one<T: Scalar>(
    node: &Expr<'_, T>,
    outer: StrippedOuter<'_, T>,
    rhs: &Expr<'_, T>,
    mode: AssignMode,
    alpha: T,
    dst: &Target<'_, T>,
    check: bool,
) {
    let (z, w) = if outer.transposed {
        (outer.rhs, outer.lhs)
    } else {
        (outer.lhs, outer.rhs)
    };
    let c = |v: T| if outer.conjugated { v.conj() } else { v };

    let x = Readable::of(rhs);
    let w = Readable::of(w);
    let mut dot = T::zero();
    for k in 0..rhs.rows() {
        dot += c(w.read_flat(k)) * x.read_flat(k);
    }
    let scale = alpha * outer.alpha * dot;

    let z = Readable::detached(z, dst.dense, check);
    for i in 0..node.rows() {
        dst.write(mode, i, 0, scale * c(z.read_flat(i)));
    }
}
