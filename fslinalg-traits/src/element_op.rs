//! Element-wise operations applied to kernel operands.
//!
//! A stripped operand carries a runtime conjugate flag. The kernels turn that
//! flag into one of two marker types before entering their loops, so the
//! inner loops are monomorphized and never branch on conjugation:
//! - [`Identity`]: f(x) = x
//! - [`Conj`]: f(x) = conj(x)
//!
//! [`product`] and [`triple_product`] centralize every combination of
//! operations on two or three factors.

use crate::scalar::Scalar;

// ---------------------------------------------------------------------------
// Marker types
// ---------------------------------------------------------------------------

/// Identity operation: f(x) = x
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Complex conjugate operation: f(x) = conj(x)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conj;

// ---------------------------------------------------------------------------
// ElementOp<T>
// ---------------------------------------------------------------------------

/// Trait for element-wise operations applied before multiplication.
///
/// `Identity` works with any `T: Copy`; `Conj` requires `T: Scalar`.
pub trait ElementOp<T>: Copy + Default + 'static {
    /// Apply the operation to a value.
    fn apply(value: T) -> T;
}

impl<T: Copy> ElementOp<T> for Identity {
    #[inline(always)]
    fn apply(value: T) -> T {
        value
    }
}

impl<T: Scalar> ElementOp<T> for Conj {
    #[inline(always)]
    fn apply(value: T) -> T {
        value.conj()
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// `OpA(a) * OpB(b)`
#[inline(always)]
pub fn product<T, OpA, OpB>(a: T, b: T) -> T
where
    T: Scalar,
    OpA: ElementOp<T>,
    OpB: ElementOp<T>,
{
    OpA::apply(a) * OpB::apply(b)
}

/// `OpA(a) * OpB(b) * OpC(c)`
#[inline(always)]
pub fn triple_product<T, OpA, OpB, OpC>(a: T, b: T, c: T) -> T
where
    T: Scalar,
    OpA: ElementOp<T>,
    OpB: ElementOp<T>,
    OpC: ElementOp<T>,
{
    OpA::apply(a) * OpB::apply(b) * OpC::apply(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_conj_real_is_noop() {
        assert_eq!(<Conj as ElementOp<f64>>::apply(2.5), 2.5);
    }

    #[test]
    fn test_product_combinations() {
        let a = Complex64::new(1.0, 2.0);
        let b = Complex64::new(3.0, -1.0);
        assert_eq!(product::<_, Identity, Identity>(a, b), a * b);
        assert_eq!(product::<_, Identity, Conj>(a, b), a * b.conj());
        assert_eq!(product::<_, Conj, Identity>(a, b), a.conj() * b);
        assert_eq!(product::<_, Conj, Conj>(a, b), a.conj() * b.conj());
    }

    #[test]
    fn test_triple_product_combinations() {
        let a = Complex64::new(0.5, 0.0);
        let b = Complex64::new(1.0, 1.0);
        let c = Complex64::new(2.0, -3.0);
        assert_eq!(triple_product::<_, Identity, Identity, Identity>(a, b, c), a * b * c);
        assert_eq!(triple_product::<_, Identity, Conj, Identity>(a, b, c), a * b.conj() * c);
        assert_eq!(triple_product::<_, Identity, Identity, Conj>(a, b, c), a * b * c.conj());
        assert_eq!(
            triple_product::<_, Conj, Conj, Conj>(a, b, c),
            a.conj() * b.conj() * c.conj()
        );
    }
}
