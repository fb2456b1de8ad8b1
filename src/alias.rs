//! Storage-overlap queries.

use fslinalg_kernel::Dense;
use fslinalg_traits::Scalar;

use crate::expr::{Expr, ExprKind};

impl<T: Scalar> Expr<'_, T> {
    /// Whether evaluating `self` reads storage that writing `other` overwrites.
    ///
    /// Dense leaves compare storage identity, unit leaves never alias and
    /// composite nodes alias iff one of their children does.
    pub fn is_aliased_to(&self, other: &Dense<T>) -> bool {
        match &self.kind {
            ExprKind::Dense(d) => d.is_same_storage(other),
            ExprKind::Unit(_) => false,
            ExprKind::Ref(e) => e.is_aliased_to(other),
            ExprKind::Scale(_, e)
            | ExprKind::Negate(e)
            | ExprKind::Conj(e)
            | ExprKind::Transpose(e) => e.is_aliased_to(other),
            ExprKind::Sum(l, r)
            | ExprKind::Difference(l, r)
            | ExprKind::Outer(l, r)
            | ExprKind::Cross(l, r)
            | ExprKind::Product { lhs: l, rhs: r, .. }
            | ExprKind::MatVec { lhs: l, rhs: r, .. } => {
                l.is_aliased_to(other) || r.is_aliased_to(other)
            }
        }
    }
}
