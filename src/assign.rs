//! Three-mode assignment protocol.
//!
//! Every node evaluates as `dst := alpha * node`, `dst += alpha * node` or
//! `dst -= alpha * node`. Nodes with read access share a default path that
//! walks the destination cells; the others delegate to their children.
//!
//! The `check` flag passed down the tree asks for aliasing checks. It is
//! cleared whenever the destination is a fresh temporary.

use log::trace;

use fslinalg_kernel::{Dense, Shape};
use fslinalg_traits::Scalar;

use crate::error::{Capability, LinalgError, Result};
use crate::expr::{Expr, ExprKind};
use crate::product::{eval_matvec, eval_product};

/// How evaluated values are combined with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignMode {
    Assign,
    Increment,
    Decrement,
}

impl AssignMode {
    /// Modes for the two operands of a sum.
    fn sum_modes(self) -> (Self, Self) {
        match self {
            AssignMode::Assign => (AssignMode::Assign, AssignMode::Increment),
            mode => (mode, mode),
        }
    }

    /// Modes for the two operands of a difference.
    fn difference_modes(self) -> (Self, Self) {
        match self {
            AssignMode::Assign => (AssignMode::Assign, AssignMode::Decrement),
            AssignMode::Increment => (AssignMode::Increment, AssignMode::Decrement),
            AssignMode::Decrement => (AssignMode::Decrement, AssignMode::Increment),
        }
    }
}

/// Writable destination: a dense leaf, possibly viewed transposed.
pub(crate) struct Target<'d, T> {
    pub(crate) dense: &'d Dense<T>,
    pub(crate) transposed: bool,
}

impl<T> Clone for Target<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Target<'_, T> {}

impl<'d, T: Scalar> Target<'d, T> {
    pub(crate) fn new(dense: &'d Dense<T>) -> Self {
        Self {
            dense,
            transposed: false,
        }
    }

    /// Resolve the leaf behind a writable expression.
    pub(crate) fn from_expr(dst: &'d Expr<'_, T>) -> Result<Self> {
        match &dst.kind {
            ExprKind::Dense(d) => Ok(Self::new(d)),
            ExprKind::Transpose(e) => Ok(Self::from_expr(e)?.flipped()),
            ExprKind::Ref(e) => Self::from_expr(e),
            _ => Err(LinalgError::MissingCapability {
                capability: Capability::Write,
                node: dst.node_name(),
            }),
        }
    }

    pub(crate) fn flipped(self) -> Self {
        Self {
            dense: self.dense,
            transposed: !self.transposed,
        }
    }

    /// Logical shape seen by the writer.
    pub(crate) fn shape(&self) -> Shape {
        if self.transposed {
            self.dense.shape().transposed()
        } else {
            self.dense.shape()
        }
    }

    /// Leaf written without index remapping.
    pub(crate) fn plain(&self) -> Option<&'d Dense<T>> {
        (!self.transposed).then_some(self.dense)
    }

    #[inline]
    pub(crate) fn write(&self, mode: AssignMode, i: usize, j: usize, value: T) {
        let idx = if self.transposed {
            self.dense.shape().flat_index(j, i)
        } else {
            self.dense.shape().flat_index(i, j)
        };
        self.write_flat(mode, idx, value);
    }

    /// Write by flat index of the underlying leaf.
    #[inline]
    pub(crate) fn write_flat(&self, mode: AssignMode, idx: usize, value: T) {
        match mode {
            AssignMode::Assign => self.dense.set_at(idx, value),
            AssignMode::Increment => self.dense.add_at(idx, value),
            AssignMode::Decrement => self.dense.sub_at(idx, value),
        }
    }

    /// Transfer `alpha * src` into the destination; `src` has the logical shape.
    pub(crate) fn combine(&self, mode: AssignMode, alpha: T, src: &Dense<T>) {
        debug_assert_eq!(src.shape(), self.shape());
        if mode == AssignMode::Assign && !self.transposed && alpha == T::one() {
            self.dense.copy_from(src);
        } else if self.transposed {
            for i in 0..src.rows() {
                for j in 0..src.cols() {
                    self.write(mode, i, j, alpha * src.get(i, j));
                }
            }
        } else {
            for (idx, cell) in src.cells().iter().enumerate() {
                self.write_flat(mode, idx, alpha * cell.get());
            }
        }
    }
}

/// A node's values, read in place when possible and materialized otherwise.
pub(crate) enum Readable<'e, T> {
    Borrowed(&'e Expr<'e, T>),
    Owned(Dense<T>),
}

impl<'e, T: Scalar> Readable<'e, T> {
    pub(crate) fn of(expr: &'e Expr<'_, T>) -> Self {
        if expr.capabilities().read {
            Readable::Borrowed(expr)
        } else {
            Readable::Owned(expr.evaluate())
        }
    }

    /// Like [`Readable::of`], but also materializes a node that reads `dst`.
    pub(crate) fn detached(expr: &'e Expr<'_, T>, dst: &Dense<T>, check: bool) -> Self {
        if check && expr.capabilities().read && expr.is_aliased_to(dst) {
            Readable::Owned(expr.evaluate())
        } else {
            Self::of(expr)
        }
    }

    #[inline]
    pub(crate) fn read(&self, i: usize, j: usize) -> T {
        match self {
            Readable::Borrowed(e) => e.read(i, j),
            Readable::Owned(d) => d.get(i, j),
        }
    }

    #[inline]
    pub(crate) fn read_flat(&self, idx: usize) -> T {
        match self {
            Readable::Borrowed(e) => e.read_flat(idx),
            Readable::Owned(d) => d.at(idx),
        }
    }

    pub(crate) fn is_aliased_to(&self, dst: &Dense<T>) -> bool {
        match self {
            Readable::Borrowed(e) => e.is_aliased_to(dst),
            Readable::Owned(_) => false,
        }
    }
}

impl<'a, T: Scalar> Expr<'a, T> {
    /// `dst := alpha * self`.
    pub fn assign_to(&self, alpha: T, dst: &Expr<'_, T>) -> Result<()> {
        self.eval_checked("assign", AssignMode::Assign, alpha, dst)
    }

    /// `dst += alpha * self`.
    pub fn incr_to(&self, alpha: T, dst: &Expr<'_, T>) -> Result<()> {
        self.eval_checked("increment", AssignMode::Increment, alpha, dst)
    }

    /// `dst -= alpha * self`.
    pub fn decr_to(&self, alpha: T, dst: &Expr<'_, T>) -> Result<()> {
        self.eval_checked("decrement", AssignMode::Decrement, alpha, dst)
    }

    fn eval_checked(
        &self,
        op: &'static str,
        mode: AssignMode,
        alpha: T,
        dst: &Expr<'_, T>,
    ) -> Result<()> {
        dst.require(Capability::Write)?;
        if dst.shape() != self.shape() {
            return Err(LinalgError::ShapeMismatch {
                op,
                lhs: dst.shape(),
                rhs: self.shape(),
            });
        }
        let target = Target::from_expr(dst)?;
        self.eval(mode, alpha, &target, true);
        Ok(())
    }

    /// Materialize into a fresh leaf.
    pub fn evaluate(&self) -> Dense<T> {
        let out = Dense::zeros_like(self.shape());
        self.eval(AssignMode::Assign, T::one(), &Target::new(&out), false);
        out
    }

    pub(crate) fn eval(&self, mode: AssignMode, alpha: T, dst: &Target<'_, T>, check: bool) {
        debug_assert_eq!(dst.shape(), self.shape());
        if self.capabilities().read {
            self.eval_default(mode, alpha, dst, check);
            return;
        }
        match &self.kind {
            ExprKind::Ref(e) => e.eval(mode, alpha, dst, check),
            ExprKind::Scale(a, e) => e.eval(mode, alpha * *a, dst, check),
            ExprKind::Negate(e) => e.eval(mode, -alpha, dst, check),
            ExprKind::Conj(e) => self.eval_conj(e, mode, alpha, dst, check),
            ExprKind::Transpose(e) => match mode {
                AssignMode::Assign => e.eval(mode, alpha, &dst.flipped(), check),
                _ => {
                    let tmp = e.evaluate();
                    dst.flipped().combine(mode, alpha, &tmp);
                }
            },
            ExprKind::Sum(l, r) => {
                self.eval_pair(l, r, mode.sum_modes(), mode, alpha, dst, check)
            }
            ExprKind::Difference(l, r) => {
                self.eval_pair(l, r, mode.difference_modes(), mode, alpha, dst, check)
            }
            ExprKind::Outer(l, r) => {
                let lv = Readable::of(l);
                let rv = Readable::of(r);
                if check && (lv.is_aliased_to(dst.dense) || rv.is_aliased_to(dst.dense)) {
                    trace!("Outer: operand aliases destination, using a temporary");
                    let tmp = Dense::zeros_like(self.shape());
                    write_outer(&lv, &rv, AssignMode::Assign, T::one(), &Target::new(&tmp));
                    dst.combine(mode, alpha, &tmp);
                } else {
                    write_outer(&lv, &rv, mode, alpha, dst);
                }
            }
            ExprKind::Cross(l, r) => {
                // every input is read before the first write
                let lv = Readable::of(l);
                let rv = Readable::of(r);
                let a = [lv.read_flat(0), lv.read_flat(1), lv.read_flat(2)];
                let b = [rv.read_flat(0), rv.read_flat(1), rv.read_flat(2)];
                let c = [
                    a[1] * b[2] - a[2] * b[1],
                    a[2] * b[0] - a[0] * b[2],
                    a[0] * b[1] - a[1] * b[0],
                ];
                for (i, v) in c.into_iter().enumerate() {
                    dst.write(mode, i, 0, alpha * v);
                }
            }
            ExprKind::Product { lhs, rhs, brackets } => {
                eval_product(self, lhs, rhs, *brackets, mode, alpha, dst, check)
            }
            ExprKind::MatVec { lhs, rhs, brackets } => {
                eval_matvec(self, lhs, rhs, *brackets, mode, alpha, dst, check)
            }
            ExprKind::Dense(_) | ExprKind::Unit(_) => {
                unreachable!("leaves always support read access")
            }
        }
    }

    /// Cell-by-cell evaluation of a readable node.
    fn eval_default(&self, mode: AssignMode, alpha: T, dst: &Target<'_, T>, check: bool) {
        if check
            && (self.capabilities().may_alias || dst.transposed)
            && self.is_aliased_to(dst.dense)
        {
            trace!("{}: source aliases destination, using a temporary", self.node_name());
            let tmp = self.evaluate();
            dst.combine(mode, alpha, &tmp);
            return;
        }
        if self.capabilities().flat && !dst.transposed {
            for idx in 0..self.shape().len() {
                dst.write_flat(mode, idx, alpha * self.read_flat(idx));
            }
        } else {
            for i in 0..self.rows() {
                for j in 0..self.cols() {
                    dst.write(mode, i, j, alpha * self.read(i, j));
                }
            }
        }
    }

    fn eval_conj(
        &self,
        child: &Expr<'_, T>,
        mode: AssignMode,
        alpha: T,
        dst: &Target<'_, T>,
        check: bool,
    ) {
        if !T::IS_COMPLEX {
            child.eval(mode, alpha, dst, check);
            return;
        }
        match mode {
            AssignMode::Assign => {
                child.eval(mode, alpha.conj(), dst, check);
                dst.dense.conj_in_place();
            }
            _ => {
                let tmp = child.evaluate();
                tmp.conj_in_place();
                dst.combine(mode, alpha, &tmp);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_pair(
        &self,
        lhs: &Expr<'_, T>,
        rhs: &Expr<'_, T>,
        (lhs_mode, rhs_mode): (AssignMode, AssignMode),
        mode: AssignMode,
        alpha: T,
        dst: &Target<'_, T>,
        check: bool,
    ) {
        // rhs would observe what lhs already wrote
        if check && rhs.is_aliased_to(dst.dense) {
            trace!("{}: right operand aliases destination, using a temporary", self.node_name());
            let tmp = self.evaluate();
            dst.combine(mode, alpha, &tmp);
            return;
        }
        lhs.eval(lhs_mode, alpha, dst, check);
        rhs.eval(rhs_mode, alpha, dst, check);
    }
}

fn write_outer<T: Scalar>(
    lhs: &Readable<'_, T>,
    rhs: &Readable<'_, T>,
    mode: AssignMode,
    alpha: T,
    dst: &Target<'_, T>,
) {
    let shape = dst.shape();
    for i in 0..shape.rows {
        let li = alpha * lhs.read_flat(i);
        for j in 0..shape.cols {
            dst.write(mode, i, j, li * rhs.read_flat(j));
        }
    }
}

/// Assignment entry points on dense leaves, with `alpha = 1`.
pub trait DenseExt<T> {
    /// View as an expression leaf.
    fn expr(&self) -> Expr<'_, T>;

    /// `self := src`.
    fn assign<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e;

    /// `self += src`.
    fn incr<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e;

    /// `self -= src`.
    fn decr<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e;
}

impl<T: Scalar> DenseExt<T> for Dense<T> {
    fn expr(&self) -> Expr<'_, T> {
        Expr::dense(self)
    }

    fn assign<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e,
    {
        src.into().assign_to(T::one(), &self.expr())
    }

    fn incr<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e,
    {
        src.into().incr_to(T::one(), &self.expr())
    }

    fn decr<'e>(&self, src: impl Into<Expr<'e, T>>) -> Result<()>
    where
        T: 'e,
    {
        src.into().decr_to(T::one(), &self.expr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fslinalg_kernel::Unit;
    use num_complex::Complex64;

    fn m22(data: [f64; 4]) -> Dense<f64> {
        Dense::from_row_major(2, 2, data.to_vec()).unwrap()
    }

    #[test]
    fn test_three_modes() {
        let a = m22([1.0, 2.0, 3.0, 4.0]);
        let c = m22([10.0, 10.0, 10.0, 10.0]);
        let dst = c.expr();

        a.expr().incr_to(2.0, &dst).unwrap();
        assert_eq!(c.to_vec(), vec![12.0, 14.0, 16.0, 18.0]);
        a.expr().decr_to(1.0, &dst).unwrap();
        assert_eq!(c.to_vec(), vec![11.0, 12.0, 13.0, 14.0]);
        a.expr().assign_to(-1.0, &dst).unwrap();
        assert_eq!(c.to_vec(), vec![-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_destination_must_be_writable() {
        let a = m22([1.0, 2.0, 3.0, 4.0]);
        let b = m22([0.0; 4]);
        let dst = Expr::sum(b.expr(), b.expr()).unwrap();
        assert_eq!(
            a.expr().assign_to(1.0, &dst).unwrap_err(),
            LinalgError::MissingCapability {
                capability: Capability::Write,
                node: "Sum",
            }
        );
        let v = Dense::vector(vec![1.0, 2.0]);
        assert!(matches!(
            b.assign(&v),
            Err(LinalgError::ShapeMismatch { op: "assign", .. })
        ));
    }

    #[test]
    fn test_transposed_destination() {
        let a = Dense::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let c = Dense::zeros(2, 3);
        // c^T := a^T
        a.expr().transpose().assign_to(1.0, &c.expr().transpose()).unwrap();
        assert_eq!(c, a);

        // a^T := a on a square leaf needs the alias check
        let s = m22([1.0, 2.0, 3.0, 4.0]);
        s.expr().assign_to(1.0, &s.expr().transpose()).unwrap();
        assert_eq!(s.to_vec(), vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_sum_and_difference_delegation() {
        let a = m22([1.0, 2.0, 3.0, 4.0]);
        let b = m22([1.0, 0.0, 0.0, 1.0]);
        let c = m22([0.0; 4]);

        // products have no read access, so the sum delegates
        let ab = Expr::product(a.expr(), b.expr().transpose()).unwrap();
        let e = Expr::difference(ab, a.expr().scale(2.0)).unwrap();
        c.assign(e).unwrap();
        assert_eq!(c.to_vec(), vec![-1.0, -2.0, -3.0, -4.0]);

        let ab = Expr::product(a.expr(), b.expr().transpose()).unwrap();
        let e = Expr::sum(ab, a.expr()).unwrap();
        c.decr(e).unwrap();
        assert_eq!(c.to_vec(), vec![-3.0, -6.0, -9.0, -12.0]);
    }

    #[test]
    fn test_sum_with_aliased_rhs() {
        let a = m22([1.0, 2.0, 3.0, 4.0]);
        let b = m22([0.0, 1.0, 1.0, 0.0]);
        // a := a*b + a
        let e = Expr::sum(Expr::product(a.expr(), b.expr()).unwrap(), a.expr()).unwrap();
        a.assign(e).unwrap();
        assert_eq!(a.to_vec(), vec![3.0, 3.0, 7.0, 7.0]);
    }

    #[test]
    fn test_conjugate_modes() {
        let a = Dense::from_row_major(
            2,
            2,
            vec![
                Complex64::new(1.0, 1.0),
                Complex64::new(2.0, -3.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(1.0, 0.0),
            ],
        )
        .unwrap();
        let id = Dense::<Complex64>::identity(2);
        let c = Dense::zeros(2, 2);

        // a product has no read access, so conjugation delegates to it
        let p = || Expr::product(Expr::dense(&a), Expr::dense(&id)).unwrap();
        let alpha = Complex64::new(0.0, 2.0);

        p().conj().assign_to(alpha, &c.expr()).unwrap();
        assert_eq!(c.get(0, 0), Complex64::new(2.0, 2.0));
        assert_eq!(c.get(0, 1), Complex64::new(-6.0, 4.0));
        assert_eq!(c.get(1, 0), Complex64::new(0.0, 0.0));

        p().conj().incr_to(alpha, &c.expr()).unwrap();
        assert_eq!(c.get(0, 1), Complex64::new(-12.0, 8.0));
        assert_eq!(c.get(1, 1), Complex64::new(0.0, 4.0));

        p().conj().decr_to(alpha, &c.expr()).unwrap();
        assert_eq!(c.get(0, 0), Complex64::new(2.0, 2.0));
        assert_eq!(c.get(0, 1), Complex64::new(-6.0, 4.0));
        assert_eq!(c.get(1, 1), Complex64::new(0.0, 2.0));
        p().conj().decr_to(alpha, &c.expr()).unwrap();
        assert_eq!(c, Dense::zeros(2, 2));
    }

    #[test]
    fn test_transpose_of_product_modes() {
        let a = Dense::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Dense::from_row_major(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let c = Dense::zeros(2, 2);
        let ab = || Expr::product(a.expr(), b.expr()).unwrap();
        // a*b = [[4, 5], [10, 11]]
        c.assign(ab().transpose()).unwrap();
        assert_eq!(c.to_vec(), vec![4.0, 10.0, 5.0, 11.0]);
        c.incr(ab().transpose()).unwrap();
        assert_eq!(c.to_vec(), vec![8.0, 20.0, 10.0, 22.0]);
        c.decr(ab().transpose()).unwrap();
        assert_eq!(c.to_vec(), vec![4.0, 10.0, 5.0, 11.0]);
        c.decr(ab().transpose().scale(2.0)).unwrap();
        assert_eq!(c.to_vec(), vec![-4.0, -10.0, -5.0, -11.0]);
    }

    #[test]
    fn test_combine_modes() {
        let src = Dense::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let c = Dense::filled(2, 3, 9.0);
        let plain = Target::new(&c);
        plain.combine(AssignMode::Assign, 1.0, &src);
        assert_eq!(c, src);
        plain.combine(AssignMode::Assign, 2.0, &src);
        assert_eq!(c.to_vec(), vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        plain.combine(AssignMode::Decrement, 1.0, &src);
        assert_eq!(c, src);

        let t = Dense::zeros(3, 2);
        let flipped = Target::new(&t).flipped();
        flipped.combine(AssignMode::Assign, 1.0, &src);
        assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        flipped.combine(AssignMode::Increment, -1.0, &src);
        assert_eq!(t, Dense::zeros(3, 2));
    }

    #[test]
    fn test_cross_reads_before_writing() {
        let a = Dense::vector(vec![2.0, 3.0, 1.0]);
        let b = Dense::vector(vec![4.0, 6.0, 5.0]);
        let e = Expr::cross(a.expr(), b.expr()).unwrap().scale(-2.0);
        a.assign(e).unwrap();
        assert_eq!(a.to_vec(), vec![-18.0, 12.0, 0.0]);
    }

    #[test]
    fn test_outer_with_unit() {
        let a = Dense::vector(vec![2.0, 3.0]);
        let c = Dense::zeros(3, 2);
        let e = Expr::outer(Unit::vector(3, 1).unwrap().into(), a.expr()).unwrap();
        c.assign(e).unwrap();
        assert_eq!(c.to_vec(), vec![0.0, 0.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_evaluate_matches_assign() {
        let a = m22([1.0, 2.0, 3.0, 4.0]);
        let e = Expr::sum(a.expr().transpose(), a.expr().negate()).unwrap();
        let c = m22([0.0; 4]);
        c.assign(&e).unwrap();
        assert_eq!(e.evaluate(), c);
        assert_eq!(c.to_vec(), vec![0.0, 1.0, -1.0, 0.0]);
    }
}
