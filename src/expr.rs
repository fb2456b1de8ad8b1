//! Expression nodes.
//!
//! An [`Expr`] is an immutable description of a pending computation. Leaves
//! are borrowed (`&'a Dense<T>`) or carried by value when they have no storage
//! ([`Unit`]); every composite node owns its children. Shape and
//! [`Capabilities`] are computed once, when the node is built, from the
//! children's metadata.

use std::fmt;

use fslinalg_kernel::{Dense, Shape, Unit};
use fslinalg_traits::Scalar;

use crate::error::{Capability, LinalgError, Result};

/// Capability flags of a node.
///
/// | flag | meaning |
/// |---|---|
/// | `read` | any `(i, j)` element can be read without evaluating the node |
/// | `write` | the node can be an assignment destination |
/// | `flat` | elements can be read by row-major flat index |
/// | `may_alias` | evaluation may read storage the destination overwrites |
/// | `leaf` | the node is a dense or unit leaf |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub flat: bool,
    pub may_alias: bool,
    pub leaf: bool,
}

/// Bracketing state of a product node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Brackets {
    /// Part of a chain the optimizer may re-associate.
    Free,
    /// Pinned by the caller; evaluated as written and opaque to the optimizer.
    Pinned,
    /// Built by the optimizer; already in optimal shape.
    Planned,
}

pub(crate) enum ExprKind<'a, T> {
    Dense(&'a Dense<T>),
    Unit(Unit),
    /// Borrowed subexpression, evaluated in place.
    Ref(&'a Expr<'a, T>),
    Scale(T, Box<Expr<'a, T>>),
    Negate(Box<Expr<'a, T>>),
    Conj(Box<Expr<'a, T>>),
    Transpose(Box<Expr<'a, T>>),
    Sum(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    Difference(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    Outer(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    Cross(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    Product {
        lhs: Box<Expr<'a, T>>,
        rhs: Box<Expr<'a, T>>,
        brackets: Brackets,
    },
    MatVec {
        lhs: Box<Expr<'a, T>>,
        rhs: Box<Expr<'a, T>>,
        brackets: Brackets,
    },
}

/// Lazy linear-algebra expression over scalars of type `T`.
///
/// Nothing is computed until the expression is assigned into a destination
/// with [`Expr::assign_to`] (or one of its siblings) or materialized with
/// [`Expr::evaluate`].
///
/// ```
/// use fslinalg::{Dense, DenseExt};
///
/// let a = Dense::from_row_major(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Dense::identity(2);
/// let c = Dense::zeros(2, 2);
/// c.assign((a.expr() + &b).unwrap()).unwrap();
/// assert_eq!(c.to_vec(), vec![2.0, 2.0, 3.0, 5.0]);
/// ```
pub struct Expr<'a, T> {
    pub(crate) kind: ExprKind<'a, T>,
    shape: Shape,
    caps: Capabilities,
}

impl<'a, T> Expr<'a, T> {
    fn build(kind: ExprKind<'a, T>, shape: Shape, caps: Capabilities) -> Self {
        Self { kind, shape, caps }
    }

    pub fn dense(leaf: &'a Dense<T>) -> Self {
        let caps = Capabilities {
            read: true,
            write: true,
            flat: true,
            may_alias: false,
            leaf: true,
        };
        Self::build(ExprKind::Dense(leaf), leaf.shape(), caps)
    }

    pub fn unit(leaf: Unit) -> Self {
        let caps = Capabilities {
            read: true,
            leaf: true,
            ..Capabilities::default()
        };
        Self::build(ExprKind::Unit(leaf), leaf.shape(), caps)
    }

    /// Borrow an existing expression as an operand.
    pub fn reference(expr: &'a Expr<'a, T>) -> Self {
        Self::build(ExprKind::Ref(expr), expr.shape, expr.caps)
    }

    /// `alpha * self`.
    pub fn scale(self, alpha: T) -> Self {
        let (shape, caps) = (self.shape, Self::wrapper_caps(&self));
        Self::build(ExprKind::Scale(alpha, Box::new(self)), shape, caps)
    }

    /// `-self`.
    pub fn negate(self) -> Self {
        let (shape, caps) = (self.shape, Self::wrapper_caps(&self));
        Self::build(ExprKind::Negate(Box::new(self)), shape, caps)
    }

    /// Elementwise complex conjugate.
    pub fn conj(self) -> Self {
        let (shape, caps) = (self.shape, Self::wrapper_caps(&self));
        Self::build(ExprKind::Conj(Box::new(self)), shape, caps)
    }

    pub fn transpose(self) -> Self {
        let caps = Capabilities {
            read: self.caps.read,
            write: self.caps.write,
            flat: false,
            may_alias: true,
            leaf: false,
        };
        let shape = self.shape.transposed();
        Self::build(ExprKind::Transpose(Box::new(self)), shape, caps)
    }

    /// Conjugate transpose.
    pub fn adjoint(self) -> Self {
        self.transpose().conj()
    }

    fn wrapper_caps(child: &Self) -> Capabilities {
        Capabilities {
            read: child.caps.read,
            write: false,
            flat: child.caps.flat,
            may_alias: child.caps.may_alias,
            leaf: false,
        }
    }

    fn elementwise_caps(lhs: &Self, rhs: &Self) -> Capabilities {
        Capabilities {
            read: lhs.caps.read && rhs.caps.read,
            write: false,
            flat: lhs.caps.flat && rhs.caps.flat,
            may_alias: lhs.caps.may_alias || rhs.caps.may_alias,
            leaf: false,
        }
    }

    fn ensure_same_shape(op: &'static str, lhs: &Self, rhs: &Self) -> Result<()> {
        if lhs.shape != rhs.shape {
            return Err(LinalgError::ShapeMismatch {
                op,
                lhs: lhs.shape,
                rhs: rhs.shape,
            });
        }
        Ok(())
    }

    fn ensure_vector(op: &'static str, e: &Self) -> Result<()> {
        if !e.shape.is_vector() {
            return Err(LinalgError::InvalidShape {
                op,
                expected: "a column vector",
                got: e.shape,
            });
        }
        Ok(())
    }

    /// `lhs + rhs`.
    pub fn sum(lhs: Self, rhs: Self) -> Result<Self> {
        Self::ensure_same_shape("sum", &lhs, &rhs)?;
        let (shape, caps) = (lhs.shape, Self::elementwise_caps(&lhs, &rhs));
        Ok(Self::build(
            ExprKind::Sum(Box::new(lhs), Box::new(rhs)),
            shape,
            caps,
        ))
    }

    /// `lhs - rhs`.
    pub fn difference(lhs: Self, rhs: Self) -> Result<Self> {
        Self::ensure_same_shape("difference", &lhs, &rhs)?;
        let (shape, caps) = (lhs.shape, Self::elementwise_caps(&lhs, &rhs));
        Ok(Self::build(
            ExprKind::Difference(Box::new(lhs), Box::new(rhs)),
            shape,
            caps,
        ))
    }

    /// `lhs * rhs^T` for two column vectors.
    pub fn outer(lhs: Self, rhs: Self) -> Result<Self> {
        Self::ensure_vector("outer", &lhs)?;
        Self::ensure_vector("outer", &rhs)?;
        let shape = Shape::new(lhs.shape.rows, rhs.shape.rows);
        let caps = Capabilities {
            read: lhs.caps.read && rhs.caps.read,
            write: false,
            flat: false,
            may_alias: lhs.caps.may_alias || rhs.caps.may_alias,
            leaf: false,
        };
        Ok(Self::build(
            ExprKind::Outer(Box::new(lhs), Box::new(rhs)),
            shape,
            caps,
        ))
    }

    /// Cross product of two 3-vectors.
    pub fn cross(lhs: Self, rhs: Self) -> Result<Self> {
        for e in [&lhs, &rhs] {
            if e.shape != Shape::vector(3) {
                return Err(LinalgError::InvalidShape {
                    op: "cross",
                    expected: "a 3x1 vector",
                    got: e.shape,
                });
            }
        }
        let caps = Capabilities {
            may_alias: true,
            ..Capabilities::default()
        };
        Ok(Self::build(
            ExprKind::Cross(Box::new(lhs), Box::new(rhs)),
            Shape::vector(3),
            caps,
        ))
    }

    /// Matrix product. A column-vector right operand yields a matrix-vector
    /// node.
    pub fn product(lhs: Self, rhs: Self) -> Result<Self> {
        if lhs.shape.cols != rhs.shape.rows {
            return Err(LinalgError::ShapeMismatch {
                op: "product",
                lhs: lhs.shape,
                rhs: rhs.shape,
            });
        }
        Ok(Self::product_node(lhs, rhs, Brackets::Free))
    }

    /// Matrix-vector product; `rhs` must be a column vector.
    pub fn matvec(lhs: Self, rhs: Self) -> Result<Self> {
        Self::ensure_vector("matvec", &rhs)?;
        Self::product(lhs, rhs)
    }

    /// Product node for already conforming operands.
    pub(crate) fn product_node(lhs: Self, rhs: Self, brackets: Brackets) -> Self {
        debug_assert_eq!(lhs.shape.cols, rhs.shape.rows);
        let shape = Shape::new(lhs.shape.rows, rhs.shape.cols);
        if rhs.shape.is_vector() {
            let caps = Capabilities {
                may_alias: true,
                ..Capabilities::default()
            };
            return Self::build(
                ExprKind::MatVec {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    brackets,
                },
                shape,
                caps,
            );
        }
        // column vector times row vector: every cell is a scalar product
        let read = lhs.shape.cols == 1 && rhs.shape.rows == 1 && lhs.caps.flat && rhs.caps.flat;
        let caps = Capabilities {
            read,
            may_alias: true,
            ..Capabilities::default()
        };
        Self::build(
            ExprKind::Product {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                brackets,
            },
            shape,
            caps,
        )
    }

    /// Pin the bracketing of a product so it is evaluated exactly as written.
    pub fn keep_brackets(mut self) -> Result<Self> {
        match &mut self.kind {
            ExprKind::Product { brackets, .. } | ExprKind::MatVec { brackets, .. } => {
                *brackets = Brackets::Pinned;
                Ok(self)
            }
            _ => Err(LinalgError::NotAProduct {
                node: self.node_name(),
            }),
        }
    }

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
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Fail with [`LinalgError::MissingCapability`] unless the node has `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        let present = match capability {
            Capability::Read => self.caps.read,
            Capability::Write => self.caps.write,
            Capability::Flat => self.caps.flat,
        };
        if present {
            Ok(())
        } else {
            Err(LinalgError::MissingCapability {
                capability,
                node: self.node_name(),
            })
        }
    }

    pub fn node_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Dense(_) => "Dense",
            ExprKind::Unit(_) => "Unit",
            ExprKind::Ref(e) => e.node_name(),
            ExprKind::Scale(..) => "Scale",
            ExprKind::Negate(_) => "Negate",
            ExprKind::Conj(_) => "Conj",
            ExprKind::Transpose(_) => "Transpose",
            ExprKind::Sum(..) => "Sum",
            ExprKind::Difference(..) => "Difference",
            ExprKind::Outer(..) => "Outer",
            ExprKind::Cross(..) => "Cross",
            ExprKind::Product { .. } => "Product",
            ExprKind::MatVec { .. } => "MatVec",
        }
    }
}

impl<T: Scalar> Expr<'_, T> {
    /// Element `(i, j)` of a node with read access.
    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        self.require(Capability::Read)?;
        if !self.shape.contains(i, j) {
            return Err(fslinalg_kernel::StorageError::IndexOutOfRange {
                row: i,
                col: j,
                shape: self.shape,
            }
            .into());
        }
        Ok(self.read(i, j))
    }

    /// Unchecked read. Panics on nodes without read access.
    pub(crate) fn read(&self, i: usize, j: usize) -> T {
        match &self.kind {
            ExprKind::Dense(d) => d.get(i, j),
            ExprKind::Unit(u) => u.get(i, j),
            ExprKind::Ref(e) => e.read(i, j),
            ExprKind::Scale(a, e) => *a * e.read(i, j),
            ExprKind::Negate(e) => -e.read(i, j),
            ExprKind::Conj(e) => e.read(i, j).conj(),
            ExprKind::Transpose(e) => e.read(j, i),
            ExprKind::Sum(l, r) => l.read(i, j) + r.read(i, j),
            ExprKind::Difference(l, r) => l.read(i, j) - r.read(i, j),
            ExprKind::Outer(l, r) => l.read_flat(i) * r.read_flat(j),
            ExprKind::Product { lhs, rhs, .. } if self.caps.read => {
                lhs.read_flat(i) * rhs.read_flat(j)
            }
            _ => panic!("{} node does not support read access", self.node_name()),
        }
    }

    /// Unchecked read by row-major flat index.
    pub(crate) fn read_flat(&self, idx: usize) -> T {
        match &self.kind {
            ExprKind::Dense(d) => d.at(idx),
            ExprKind::Unit(u) => u.at(idx),
            ExprKind::Ref(e) => e.read_flat(idx),
            ExprKind::Scale(a, e) if self.caps.flat => *a * e.read_flat(idx),
            ExprKind::Negate(e) if self.caps.flat => -e.read_flat(idx),
            ExprKind::Conj(e) if self.caps.flat => e.read_flat(idx).conj(),
            ExprKind::Sum(l, r) if self.caps.flat => l.read_flat(idx) + r.read_flat(idx),
            ExprKind::Difference(l, r) if self.caps.flat => l.read_flat(idx) - r.read_flat(idx),
            _ => self.read(idx / self.shape.cols, idx % self.shape.cols),
        }
    }
}

impl<'a, T> From<&'a Dense<T>> for Expr<'a, T> {
    fn from(leaf: &'a Dense<T>) -> Self {
        Expr::dense(leaf)
    }
}

impl<T> From<Unit> for Expr<'_, T> {
    fn from(leaf: Unit) -> Self {
        Expr::unit(leaf)
    }
}

impl<'b, 'a: 'b, T> From<&'b Expr<'a, T>> for Expr<'b, T> {
    fn from(expr: &'b Expr<'a, T>) -> Self {
        Expr::reference(expr)
    }
}

/// Expressions compare by value: same shape and equal elements.
impl<T: Scalar> PartialEq for Expr<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.evaluate() == other.evaluate()
    }
}

impl<T: Scalar> PartialEq<Dense<T>> for Expr<'_, T> {
    fn eq(&self, other: &Dense<T>) -> bool {
        self.shape == other.shape() && self.evaluate() == *other
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Expr<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Dense(d) => write!(f, "Dense({})", d.shape()),
            ExprKind::Unit(u) => write!(f, "Unit({}, ({}, {}))", u.shape(), u.row(), u.col()),
            ExprKind::Ref(e) => e.fmt(f),
            ExprKind::Scale(a, e) => f.debug_tuple("Scale").field(a).field(e).finish(),
            ExprKind::Negate(e) => f.debug_tuple("Negate").field(e).finish(),
            ExprKind::Conj(e) => f.debug_tuple("Conj").field(e).finish(),
            ExprKind::Transpose(e) => f.debug_tuple("Transpose").field(e).finish(),
            ExprKind::Sum(l, r) => f.debug_tuple("Sum").field(l).field(r).finish(),
            ExprKind::Difference(l, r) => f.debug_tuple("Difference").field(l).field(r).finish(),
            ExprKind::Outer(l, r) => f.debug_tuple("Outer").field(l).field(r).finish(),
            ExprKind::Cross(l, r) => f.debug_tuple("Cross").field(l).field(r).finish(),
            ExprKind::Product { lhs, rhs, .. } => {
                f.debug_tuple("Product").field(lhs).field(rhs).finish()
            }
            ExprKind::MatVec { lhs, rhs, .. } => {
                f.debug_tuple("MatVec").field(lhs).field(rhs).finish()
            }
        }
    }
}
