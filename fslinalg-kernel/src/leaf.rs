//! Leaf storage types.
//!
//! - [`Dense`]: owned row-major buffer with interior mutability
//! - [`Unit`]: zero-storage one-hot matrix or vector
//!
//! `Dense` stores its elements in `Cell`s so that the same leaf can be read
//! as a source operand and written as the destination within one assignment.
//! The expression layer decides when that overlap needs a temporary.

use std::cell::Cell;
use std::fmt;
use std::ops::{DivAssign, MulAssign};

use fslinalg_traits::Scalar;

use crate::{Result, StorageError};

// ============================================================================
// Shape
// ============================================================================

/// Matrix shape. Vectors are `n x 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Column vector shape `n x 1`.
    #[inline]
    pub const fn vector(n: usize) -> Self {
        Self { rows: n, cols: 1 }
    }

    /// Number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub const fn is_vector(&self) -> bool {
        self.cols == 1
    }

    #[inline]
    pub const fn transposed(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
        }
    }

    #[inline]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Row-major linear index of `(row, col)`.
    #[inline(always)]
    pub const fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

// ============================================================================
// Dense
// ============================================================================

/// Owned dense matrix in row-major order.
pub struct Dense<T> {
    shape: Shape,
    data: Box<[Cell<T>]>,
}

impl<T> Dense<T> {
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw cell slice in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell<T>] {
        &self.data
    }

    /// Whether `self` and `other` are backed by the same buffer.
    ///
    /// Empty matrices never share storage: nothing can be overwritten.
    #[inline]
    pub fn is_same_storage(&self, other: &Dense<T>) -> bool {
        !self.data.is_empty() && std::ptr::eq(self.data.as_ptr(), other.data.as_ptr())
    }
}

impl<T: Scalar> Dense<T> {
    /// Matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        let data = (0..rows * cols).map(|_| Cell::new(value)).collect();
        Self {
            shape: Shape::new(rows, cols),
            data,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Zero matrix of the given shape.
    pub fn zeros_like(shape: Shape) -> Self {
        Self::zeros(shape.rows, shape.cols)
    }

    /// Square identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Build from a row-major buffer of length `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(StorageError::LengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            shape: Shape::new(rows, cols),
            data: data.into_iter().map(Cell::new).collect(),
        })
    }

    /// Build with values produced by `f(row, col)`, called in row-major order.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(Cell::new(f(i, j)));
            }
        }
        Self {
            shape: Shape::new(rows, cols),
            data: data.into_boxed_slice(),
        }
    }

    /// Column vector (`n x 1`) from its entries.
    pub fn vector(data: Vec<T>) -> Self {
        let n = data.len();
        Self {
            shape: Shape::vector(n),
            data: data.into_iter().map(Cell::new).collect(),
        }
    }

    /// Element at `(row, col)`. Panics when out of range.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.shape.flat_index(row, col)].get()
    }

    /// Element at `(row, col)`, or an error when out of range.
    pub fn try_get(&self, row: usize, col: usize) -> Result<T> {
        if !self.shape.contains(row, col) {
            return Err(StorageError::IndexOutOfRange {
                row,
                col,
                shape: self.shape,
            });
        }
        Ok(self.get(row, col))
    }

    #[inline(always)]
    pub fn set(&self, row: usize, col: usize, value: T) {
        self.data[self.shape.flat_index(row, col)].set(value);
    }

    /// Element at flat (row-major) index `idx`.
    #[inline(always)]
    pub fn at(&self, idx: usize) -> T {
        self.data[idx].get()
    }

    #[inline(always)]
    pub fn set_at(&self, idx: usize, value: T) {
        self.data[idx].set(value);
    }

    #[inline(always)]
    pub fn add_at(&self, idx: usize, value: T) {
        let cell = &self.data[idx];
        cell.set(cell.get() + value);
    }

    #[inline(always)]
    pub fn sub_at(&self, idx: usize, value: T) {
        let cell = &self.data[idx];
        cell.set(cell.get() - value);
    }

    /// Copy of the elements in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().map(Cell::get).collect()
    }

    pub fn fill(&self, value: T) {
        for cell in self.data.iter() {
            cell.set(value);
        }
    }

    pub fn set_zero(&self) {
        self.fill(T::zero());
    }

    /// Overwrite with the contents of `src`, which must have the same shape.
    pub fn copy_from(&self, src: &Dense<T>) {
        debug_assert_eq!(self.shape, src.shape);
        for (dst, s) in self.data.iter().zip(src.data.iter()) {
            dst.set(s.get());
        }
    }

    /// Conjugate every element. No-op for real scalars.
    pub fn conj_in_place(&self) {
        if !T::IS_COMPLEX {
            return;
        }
        for cell in self.data.iter() {
            cell.set(cell.get().conj());
        }
    }

    pub fn scale_in_place(&self, alpha: T) {
        for cell in self.data.iter() {
            cell.set(cell.get() * alpha);
        }
    }

    pub fn div_in_place(&self, alpha: T) {
        for cell in self.data.iter() {
            cell.set(cell.get() / alpha);
        }
    }
}

impl<T: Copy> Clone for Dense<T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            data: self.data.clone(),
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Dense<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data: Vec<T> = self.data.iter().map(Cell::get).collect();
        f.debug_struct("Dense")
            .field("shape", &self.shape)
            .field("data", &data)
            .finish()
    }
}

impl<T: Copy + PartialEq> PartialEq for Dense<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.get() == b.get())
    }
}

impl<T: Scalar> MulAssign<T> for Dense<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.scale_in_place(rhs);
    }
}

impl<T: Scalar> DivAssign<T> for Dense<T> {
    fn div_assign(&mut self, rhs: T) {
        self.div_in_place(rhs);
    }
}

// ============================================================================
// Unit
// ============================================================================

/// One-hot matrix: 1 at `(row, col)`, 0 elsewhere, with no storage.
///
/// A unit vector `e_k` of size `n` is the `n x 1` unit at `(k, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    shape: Shape,
    row: usize,
    col: usize,
}

impl Unit {
    pub fn new(rows: usize, cols: usize, row: usize, col: usize) -> Result<Self> {
        let shape = Shape::new(rows, cols);
        if !shape.contains(row, col) {
            return Err(StorageError::IndexOutOfRange { row, col, shape });
        }
        Ok(Self { shape, row, col })
    }

    /// Unit column vector of length `size` with its 1 at `index`.
    pub fn vector(size: usize, index: usize) -> Result<Self> {
        Self::new(size, 1, index, 0)
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn col(&self) -> usize {
        self.col
    }

    /// Row-major linear index of the non-zero entry.
    #[inline]
    pub fn flat_index(&self) -> usize {
        self.shape.flat_index(self.row, self.col)
    }

    /// Index pair of the non-zero entry of `op(self)`.
    #[inline]
    pub fn index(&self, transposed: bool) -> (usize, usize) {
        if transposed {
            (self.col, self.row)
        } else {
            (self.row, self.col)
        }
    }

    #[inline]
    pub fn get<T: Scalar>(&self, row: usize, col: usize) -> T {
        if row == self.row && col == self.col {
            T::one()
        } else {
            T::zero()
        }
    }

    #[inline]
    pub fn at<T: Scalar>(&self, idx: usize) -> T {
        if idx == self.flat_index() {
            T::one()
        } else {
            T::zero()
        }
    }
}
