//! Matrix-chain bracketing optimizer.
//!
//! Given the dimension sequence `d[0], d[1], ..., d[n]` of a chain of `n`
//! matrix operands (operand `i` is `d[i] x d[i+1]`), [`ChainPlan`] computes by
//! dynamic programming the minimal number of scalar multiplications over all
//! parenthesizations, the optimal split of every sub-interval, and the
//! corresponding [`Bracketing`] tree.
//!
//! Plans depend only on the dimension sequence, so [`cached_plan`] memoizes
//! them per thread (feature `plan-cache`, on by default).
//!
//! # Example
//!
//! ```
//! use fslinalg_chain::ChainPlan;
//!
//! let plan = ChainPlan::new(&[12, 3, 8, 5, 2]).unwrap();
//! assert_eq!(plan.optimal_cost(), 200);
//! assert_eq!(plan.optimal_split(), 1);
//! assert_eq!(plan.bracketing().to_string(), "(0 (1 (2 3)))");
//! ```

/// Bracketing trees.
pub mod bracketing;
/// Per-thread plan memoization.
pub mod cache;
/// Dynamic-programming cost and split tables.
pub mod plan;

pub use bracketing::Bracketing;
pub use cache::{cached_plan, clear_plan_cache, plan_cache_len};
pub use plan::ChainPlan;

/// Errors that can occur while planning a chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// Fewer than two dimensions: there is no operand to bracket.
    #[error("a chain needs at least two dimensions, got {0}")]
    EmptyChain(usize),
}

/// Convenience alias for `Result<T, ChainError>`.
pub type Result<T> = std::result::Result<T, ChainError>;
