//! Kernel operand descriptors.
//!
//! A stripped expression side reaches the kernels as a leaf reference plus
//! the flags describing `op`. Dense operands are read through their row-major
//! buffer; unit operands only contribute their index pair.

use std::fmt;

use crate::leaf::{Dense, Shape, Unit};

/// Borrowed leaf operand.
pub enum Operand<'a, T> {
    Dense(&'a Dense<T>),
    Unit(Unit),
}

impl<T> Clone for Operand<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Operand<'_, T> {}

impl<T> Operand<'_, T> {
    /// Storage shape (before any transpose).
    #[inline]
    pub fn shape(&self) -> Shape {
        match self {
            Operand::Dense(d) => d.shape(),
            Operand::Unit(u) => u.shape(),
        }
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, Operand::Unit(_))
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Operand<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Dense(d) => f.debug_tuple("Dense").field(d).finish(),
            Operand::Unit(u) => f.debug_tuple("Unit").field(u).finish(),
        }
    }
}

/// Matrix operand `op(A)`.
pub struct MatOperand<'a, T> {
    pub operand: Operand<'a, T>,
    pub transposed: bool,
    pub conjugated: bool,
}

impl<T> Clone for MatOperand<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatOperand<'_, T> {}

impl<T: Copy + fmt::Debug> fmt::Debug for MatOperand<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatOperand")
            .field("operand", &self.operand)
            .field("transposed", &self.transposed)
            .field("conjugated", &self.conjugated)
            .finish()
    }
}

impl<'a, T> MatOperand<'a, T> {
    pub fn new(operand: Operand<'a, T>, transposed: bool, conjugated: bool) -> Self {
        Self {
            operand,
            transposed,
            conjugated,
        }
    }

    /// Plain operand: no transpose, no conjugation.
    pub fn plain(operand: Operand<'a, T>) -> Self {
        Self::new(operand, false, false)
    }

    /// Shape of `op(A)`.
    #[inline]
    pub fn shape(&self) -> Shape {
        let s = self.operand.shape();
        if self.transposed {
            s.transposed()
        } else {
            s
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape().rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape().cols
    }
}

/// Vector operand `op(x)`.
///
/// Vectors are read by flat index, so an `n x 1` and a `1 x n` operand are
/// interchangeable and only conjugation is tracked.
pub struct VecOperand<'a, T> {
    pub operand: Operand<'a, T>,
    pub conjugated: bool,
}

impl<T> Clone for VecOperand<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VecOperand<'_, T> {}

impl<T: Copy + fmt::Debug> fmt::Debug for VecOperand<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecOperand")
            .field("operand", &self.operand)
            .field("conjugated", &self.conjugated)
            .finish()
    }
}

impl<'a, T> VecOperand<'a, T> {
    pub fn new(operand: Operand<'a, T>, conjugated: bool) -> Self {
        Self {
            operand,
            conjugated,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operand.shape().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_operand_shape() {
        let a = Dense::<f64>::zeros(2, 5);
        let op = MatOperand::new(Operand::Dense(&a), true, false);
        assert_eq!(op.shape(), Shape::new(5, 2));
        assert_eq!(MatOperand::plain(Operand::Dense(&a)).rows(), 2);

        let u = Unit::new(3, 4, 0, 0).unwrap();
        let op: MatOperand<'_, f64> = MatOperand::new(Operand::Unit(u), true, true);
        assert_eq!((op.rows(), op.cols()), (4, 3));
        assert!(op.operand.is_unit());
    }

    #[test]
    fn test_vec_operand_len() {
        let row = Dense::<f64>::zeros(1, 7);
        assert_eq!(VecOperand::new(Operand::Dense(&row), false).len(), 7);
    }
}
