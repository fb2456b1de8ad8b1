//! Operator overloads for building expressions.
//!
//! Binary operators take any right operand convertible into an [`Expr`] and
//! return `Result<Expr>`, since shapes are checked when the node is built.
//! Scalars multiply from the left.

use std::ops::{Add, Mul, Neg, Sub};

use num_complex::{Complex32, Complex64};

use fslinalg_traits::Scalar;

use crate::error::Result;
use crate::expr::Expr;

impl<'a, T: Scalar, R: Into<Expr<'a, T>>> Add<R> for Expr<'a, T> {
    type Output = Result<Expr<'a, T>>;

    fn add(self, rhs: R) -> Self::Output {
        Expr::sum(self, rhs.into())
    }
}

impl<'a, T: Scalar, R: Into<Expr<'a, T>>> Sub<R> for Expr<'a, T> {
    type Output = Result<Expr<'a, T>>;

    fn sub(self, rhs: R) -> Self::Output {
        Expr::difference(self, rhs.into())
    }
}

/// Matrix product; see [`Expr::product`].
impl<'a, T: Scalar, R: Into<Expr<'a, T>>> Mul<R> for Expr<'a, T> {
    type Output = Result<Expr<'a, T>>;

    fn mul(self, rhs: R) -> Self::Output {
        Expr::product(self, rhs.into())
    }
}

impl<T: Scalar> Neg for Expr<'_, T> {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {
        $(
            impl<'a> Mul<Expr<'a, $t>> for $t {
                type Output = Expr<'a, $t>;

                fn mul(self, rhs: Expr<'a, $t>) -> Expr<'a, $t> {
                    rhs.scale(self)
                }
            }
        )*
    };
}

impl_scalar_mul!(f32, f64, Complex32, Complex64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DenseExt, LinalgError};
    use fslinalg_kernel::{Dense, Unit};

    #[test]
    fn test_operators_build_checked_nodes() {
        let a = Dense::from_row_major(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Dense::identity(2);
        let x = Dense::vector(vec![1.0, -1.0]);

        let e = (a.expr() + &b).unwrap();
        assert_eq!(e.evaluate().to_vec(), vec![2.0, 2.0, 3.0, 5.0]);

        let e = (2.0_f64 * a.expr() - &b).unwrap();
        assert_eq!(e.evaluate().to_vec(), vec![1.0, 4.0, 6.0, 7.0]);

        let e = (-a.expr() * &x).unwrap();
        assert_eq!(e.node_name(), "MatVec");
        assert_eq!(e.evaluate().to_vec(), vec![1.0, 1.0]);

        let e = (a.expr() * Unit::new(2, 2, 1, 0).unwrap()).unwrap();
        assert_eq!(e.evaluate().to_vec(), vec![2.0, 0.0, 4.0, 0.0]);

        assert!(matches!(
            a.expr() + &x,
            Err(LinalgError::ShapeMismatch { op: "sum", .. })
        ));
    }

    #[test]
    fn test_borrowed_subexpression() {
        let a = Dense::from_row_major(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let twice = 2.0_f64 * a.expr();
        let e = (Expr::from(&twice) + &twice).unwrap();
        let c = Dense::zeros(2, 2);
        c.assign(e).unwrap();
        assert_eq!(c.to_vec(), vec![4.0, 8.0, 12.0, 16.0]);
    }
}
