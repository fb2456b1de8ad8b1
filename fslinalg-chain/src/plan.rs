//! Dynamic-programming chain plan.

use crate::bracketing::Bracketing;
use crate::{ChainError, Result};

/// Optimal parenthesization tables for one dimension sequence.
///
/// For a chain of `n` operands the plan stores, for every sub-interval
/// `[i, j)` with `0 <= i < j <= n`, the minimal multiplication count and the
/// split `k` realizing it:
///
/// ```text
/// cost(i, i+1) = 0
/// cost(i, j)   = min_{i<k<j} cost(i, k) + cost(k, j) + d[i] * d[k] * d[j]
/// ```
///
/// Ties keep the lowest `k` reached by the forward scan. The base split of a
/// single operand `[i, i+1)` is recorded as `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPlan {
    dims: Vec<usize>,
    cost: Vec<u64>,
    split: Vec<usize>,
}

impl ChainPlan {
    /// Compute the plan for `dims` (`n + 1` entries for `n` operands).
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.len() < 2 {
            return Err(ChainError::EmptyChain(dims.len()));
        }
        let n = dims.len() - 1;
        let stride = n + 1;
        let mut cost = vec![0u64; stride * stride];
        let mut split = vec![0usize; stride * stride];

        for i in 0..n {
            split[i * stride + i + 1] = i + 1;
        }

        for len in 2..=n {
            for i in 0..=n - len {
                let j = i + len;
                let mut best = u64::MAX;
                let mut best_k = i + 1;
                for k in i + 1..j {
                    let step = (dims[i] as u64)
                        .saturating_mul(dims[k] as u64)
                        .saturating_mul(dims[j] as u64);
                    let c = cost[i * stride + k]
                        .saturating_add(cost[k * stride + j])
                        .saturating_add(step);
                    if c < best {
                        best = c;
                        best_k = k;
                    }
                }
                cost[i * stride + j] = best;
                split[i * stride + j] = best_k;
            }
        }

        Ok(Self {
            dims: dims.to_vec(),
            cost,
            split,
        })
    }

    /// Number of operands in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j <= self.len());
        i * (self.len() + 1) + j
    }

    /// Minimal cost of the sub-chain `[i, j)`.
    pub fn cost(&self, i: usize, j: usize) -> u64 {
        self.cost[self.index(i, j)]
    }

    /// Optimal split of the sub-chain `[i, j)`.
    pub fn split(&self, i: usize, j: usize) -> usize {
        self.split[self.index(i, j)]
    }

    pub fn optimal_cost(&self) -> u64 {
        self.cost(0, self.len())
    }

    pub fn optimal_split(&self) -> usize {
        self.split(0, self.len())
    }

    /// Optimal bracketing of the whole chain.
    pub fn bracketing(&self) -> Bracketing {
        self.bracketing_of(0, self.len())
    }

    /// Optimal bracketing of the sub-chain `[i, j)`.
    pub fn bracketing_of(&self, i: usize, j: usize) -> Bracketing {
        if j == i + 1 {
            return Bracketing::Operand(i);
        }
        let k = self.split(i, j);
        Bracketing::product(self.bracketing_of(i, k), self.bracketing_of(k, j))
    }
}
