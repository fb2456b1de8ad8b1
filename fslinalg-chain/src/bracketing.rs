//! Binary bracketing trees over a chain of operands.

use std::fmt;

/// Parenthesization of a contiguous run of chain operands.
///
/// Leaves hold the operand's position in the flattened chain; a `Product`
/// multiplies the run covered by its left subtree with the run covered by its
/// right subtree. Two trees are equal iff they describe the same
/// parenthesization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bracketing {
    Operand(usize),
    Product(Box<Bracketing>, Box<Bracketing>),
}

impl Bracketing {
    pub fn product(lhs: Bracketing, rhs: Bracketing) -> Self {
        Bracketing::Product(Box::new(lhs), Box::new(rhs))
    }

    /// `((0 1) 2) ...`: the bracketing that plain left-to-right multiplication
    /// produces. `n` must be at least 1.
    pub fn left_associative(n: usize) -> Self {
        debug_assert!(n >= 1);
        (1..n).fold(Bracketing::Operand(0), |acc, i| {
            Bracketing::product(acc, Bracketing::Operand(i))
        })
    }

    /// `0 (1 (2 ...))`. `n` must be at least 1.
    pub fn right_associative(n: usize) -> Self {
        debug_assert!(n >= 1);
        (0..n - 1).rev().fold(Bracketing::Operand(n - 1), |acc, i| {
            Bracketing::product(Bracketing::Operand(i), acc)
        })
    }

    /// Number of operand leaves.
    pub fn operand_count(&self) -> usize {
        match self {
            Bracketing::Operand(_) => 1,
            Bracketing::Product(l, r) => l.operand_count() + r.operand_count(),
        }
    }

    /// Scalar multiplications needed to evaluate this bracketing over `dims`.
    pub fn cost(&self, dims: &[usize]) -> u64 {
        self.span_cost(dims).2
    }

    /// (first, one-past-last, cost) of the covered run.
    fn span_cost(&self, dims: &[usize]) -> (usize, usize, u64) {
        match self {
            Bracketing::Operand(i) => (*i, *i + 1, 0),
            Bracketing::Product(l, r) => {
                let (i, k, cl) = l.span_cost(dims);
                let (_, j, cr) = r.span_cost(dims);
                let step = (dims[i] as u64)
                    .saturating_mul(dims[k] as u64)
                    .saturating_mul(dims[j] as u64);
                (i, j, cl.saturating_add(cr).saturating_add(step))
            }
        }
    }
}

impl fmt::Display for Bracketing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bracketing::Operand(i) => write!(f, "{i}"),
            Bracketing::Product(l, r) => write!(f, "({l} {r})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associative_shapes() {
        assert_eq!(Bracketing::left_associative(1), Bracketing::Operand(0));
        assert_eq!(Bracketing::left_associative(4).to_string(), "(((0 1) 2) 3)");
        assert_eq!(Bracketing::right_associative(4).to_string(), "(0 (1 (2 3)))");
        assert_eq!(Bracketing::left_associative(4).operand_count(), 4);
    }

    #[test]
    fn test_cost_of_fixed_bracketings() {
        let dims = [12, 3, 8, 5, 2];
        // ((A B) C) D = 12*3*8 + 12*8*5 + 12*5*2
        assert_eq!(Bracketing::left_associative(4).cost(&dims), 288 + 480 + 120);
        // A (B (C D)) = 8*5*2 + 3*8*2 + 12*3*2
        assert_eq!(Bracketing::right_associative(4).cost(&dims), 80 + 48 + 72);
        assert_eq!(Bracketing::Operand(2).cost(&dims), 0);
    }

    #[test]
    fn test_structural_equality() {
        let a = Bracketing::product(
            Bracketing::product(Bracketing::Operand(0), Bracketing::Operand(1)),
            Bracketing::Operand(2),
        );
        assert_eq!(a, Bracketing::left_associative(3));
        assert_ne!(a, Bracketing::right_associative(3));
    }
}
