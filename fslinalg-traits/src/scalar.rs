//! Scalar classification for real and complex element types.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_complex::Complex;
use num_traits::{Float, One, Zero};

/// Element types usable in fslinalg expressions.
///
/// Implemented for `f32`, `f64`, `Complex<f32>` and `Complex<f64>`. The
/// associated `Real` type is the underlying real field; it is what
/// [`abs`](Scalar::abs), [`abs2`](Scalar::abs2), [`real`](Scalar::real) and
/// [`imag`](Scalar::imag) return, and what the numeric limits are expressed in.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Zero
    + One
{
    /// Underlying real field.
    type Real: Float + Debug + Send + Sync + 'static;

    /// Whether conjugation is a non-trivial operation for this type.
    const IS_COMPLEX: bool;

    /// Complex conjugate; identity for real types.
    fn conj(self) -> Self;

    fn real(self) -> Self::Real;

    fn imag(self) -> Self::Real;

    /// Modulus.
    fn abs(self) -> Self::Real;

    /// Squared modulus, computed without a square root.
    fn abs2(self) -> Self::Real;

    /// Embed a real value.
    fn from_real(re: Self::Real) -> Self;

    /// Machine epsilon of the real field.
    #[inline]
    fn epsilon() -> Self::Real {
        <Self::Real as Float>::epsilon()
    }

    /// Largest finite value of the real field.
    #[inline]
    fn max_value() -> Self::Real {
        <Self::Real as Float>::max_value()
    }

    /// Smallest positive normal value of the real field.
    #[inline]
    fn min_positive() -> Self::Real {
        <Self::Real as Float>::min_positive_value()
    }

    #[inline]
    fn infinity() -> Self::Real {
        <Self::Real as Float>::infinity()
    }

    #[inline]
    fn conj_in_place(&mut self) {
        *self = self.conj();
    }
}

macro_rules! impl_scalar_real {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                type Real = $t;
                const IS_COMPLEX: bool = false;

                #[inline(always)]
                fn conj(self) -> Self {
                    self
                }

                #[inline(always)]
                fn real(self) -> $t {
                    self
                }

                #[inline(always)]
                fn imag(self) -> $t {
                    0.0
                }

                #[inline(always)]
                fn abs(self) -> $t {
                    <$t>::abs(self)
                }

                #[inline(always)]
                fn abs2(self) -> $t {
                    self * self
                }

                #[inline(always)]
                fn from_real(re: $t) -> Self {
                    re
                }
            }
        )*
    };
}

macro_rules! impl_scalar_complex {
    ($($t:ty),*) => {
        $(
            impl Scalar for Complex<$t> {
                type Real = $t;
                const IS_COMPLEX: bool = true;

                #[inline(always)]
                fn conj(self) -> Self {
                    Complex::conj(&self)
                }

                #[inline(always)]
                fn real(self) -> $t {
                    self.re
                }

                #[inline(always)]
                fn imag(self) -> $t {
                    self.im
                }

                #[inline(always)]
                fn abs(self) -> $t {
                    self.norm()
                }

                #[inline(always)]
                fn abs2(self) -> $t {
                    self.norm_sqr()
                }

                #[inline(always)]
                fn from_real(re: $t) -> Self {
                    Complex::new(re, 0.0)
                }
            }
        )*
    };
}

impl_scalar_real!(f32, f64);
impl_scalar_complex!(f32, f64);
