//! Operand normalization.
//!
//! A chain of `Scale`, `Negate`, `Conj` and `Transpose` wrappers around one
//! leaf collapses into `(leaf, alpha, transposed, conjugated)`, the form the
//! kernels consume. A wrapped node that is not a leaf is materialized once
//! into a temporary and treated as the leaf.

use fslinalg_kernel::{Dense, MatOperand, Operand, Unit, VecOperand};
use fslinalg_traits::Scalar;

use crate::expr::{Expr, ExprKind};

pub(crate) enum StrippedOperand<'e, T> {
    Dense(&'e Dense<T>),
    Unit(Unit),
    Temporary(Dense<T>),
}

pub(crate) struct Stripped<'e, T> {
    pub(crate) operand: StrippedOperand<'e, T>,
    pub(crate) alpha: T,
    pub(crate) transposed: bool,
    pub(crate) conjugated: bool,
}

impl<'e, T: Scalar> Stripped<'e, T> {
    fn leaf(operand: StrippedOperand<'e, T>) -> Self {
        Self {
            operand,
            alpha: T::one(),
            transposed: false,
            conjugated: false,
        }
    }

    fn kernel_operand(&self) -> Operand<'_, T> {
        match &self.operand {
            StrippedOperand::Dense(d) => Operand::Dense(d),
            StrippedOperand::Unit(u) => Operand::Unit(*u),
            StrippedOperand::Temporary(d) => Operand::Dense(d),
        }
    }

    pub(crate) fn mat_operand(&self) -> MatOperand<'_, T> {
        MatOperand::new(self.kernel_operand(), self.transposed, self.conjugated)
    }

    /// Vectors have the same flat layout either way, so `transposed` is dropped.
    pub(crate) fn vec_operand(&self) -> VecOperand<'_, T> {
        VecOperand::new(self.kernel_operand(), self.conjugated)
    }

    /// Temporaries are private to the evaluation and never alias.
    pub(crate) fn is_aliased_to(&self, other: &Dense<T>) -> bool {
        match &self.operand {
            StrippedOperand::Dense(d) => d.is_same_storage(other),
            _ => false,
        }
    }
}

/// Normalize `expr` into a kernel operand descriptor.
pub(crate) fn strip<'e, T: Scalar>(expr: &'e Expr<'_, T>) -> Stripped<'e, T> {
    match &expr.kind {
        ExprKind::Dense(d) => Stripped::leaf(StrippedOperand::Dense(d)),
        ExprKind::Unit(u) => Stripped::leaf(StrippedOperand::Unit(*u)),
        ExprKind::Ref(e) => strip(e),
        ExprKind::Scale(a, e) => {
            let mut s = strip(e);
            s.alpha = s.alpha * *a;
            s
        }
        ExprKind::Negate(e) => {
            let mut s = strip(e);
            s.alpha = -s.alpha;
            s
        }
        ExprKind::Conj(e) => {
            let mut s = strip(e);
            s.alpha = s.alpha.conj();
            s.conjugated = !s.conjugated;
            s
        }
        ExprKind::Transpose(e) => {
            let mut s = strip(e);
            s.transposed = !s.transposed;
            s
        }
        _ => Stripped::leaf(StrippedOperand::Temporary(expr.evaluate())),
    }
}

/// Whether `expr` strips down to a leaf without materializing anything.
pub(crate) fn strips_to_leaf<T>(expr: &Expr<'_, T>) -> bool {
    match &expr.kind {
        ExprKind::Dense(_) | ExprKind::Unit(_) => true,
        ExprKind::Ref(e) => strips_to_leaf(e),
        ExprKind::Scale(_, e)
        | ExprKind::Negate(e)
        | ExprKind::Conj(e)
        | ExprKind::Transpose(e) => strips_to_leaf(e),
        _ => false,
    }
}

/// `op(alpha * u * v^T)` recognized through its wrappers.
pub(crate) struct StrippedOuter<'e, T> {
    pub(crate) lhs: &'e Expr<'e, T>,
    pub(crate) rhs: &'e Expr<'e, T>,
    pub(crate) alpha: T,
    pub(crate) transposed: bool,
    pub(crate) conjugated: bool,
}

pub(crate) fn strip_outer<'e, T: Scalar>(expr: &'e Expr<'_, T>) -> Option<StrippedOuter<'e, T>> {
    let outer = match &expr.kind {
        ExprKind::Outer(l, r) => StrippedOuter {
            lhs: l,
            rhs: r,
            alpha: T::one(),
            transposed: false,
            conjugated: false,
        },
        ExprKind::Ref(e) => strip_outer(e)?,
        ExprKind::Scale(a, e) => {
            let mut s = strip_outer(e)?;
            s.alpha = s.alpha * *a;
            s
        }
        ExprKind::Negate(e) => {
            let mut s = strip_outer(e)?;
            s.alpha = -s.alpha;
            s
        }
        ExprKind::Conj(e) => {
            let mut s = strip_outer(e)?;
            s.alpha = s.alpha.conj();
            s.conjugated = !s.conjugated;
            s
        }
        ExprKind::Transpose(e) => {
            let mut s = strip_outer(e)?;
            s.transposed = !s.transposed;
            s
        }
        _ => return None,
    };
    Some(outer)
}

impl<T> Expr<'_, T> {
    /// Whether evaluating the left operand of this product needs a temporary.
    /// `false` for anything that is not a product.
    pub fn creates_temporary_lhs(&self) -> bool {
        match &self.kind {
            ExprKind::Ref(e) => e.creates_temporary_lhs(),
            ExprKind::Product { lhs, .. } | ExprKind::MatVec { lhs, .. } => !strips_to_leaf(lhs),
            _ => false,
        }
    }

    /// Whether evaluating the right operand of this product needs a temporary.
    pub fn creates_temporary_rhs(&self) -> bool {
        match &self.kind {
            ExprKind::Ref(e) => e.creates_temporary_rhs(),
            ExprKind::Product { rhs, .. } | ExprKind::MatVec { rhs, .. } => !strips_to_leaf(rhs),
            _ => false,
        }
    }
}
