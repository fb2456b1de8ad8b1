//! Error type of the expression layer.

use std::fmt;

use fslinalg_chain::ChainError;
use fslinalg_kernel::{Shape, StorageError};

/// Node capability that an operation requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Flat,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Flat => "flat",
        };
        f.write_str(name)
    }
}

/// Errors raised while composing expressions or requesting node capabilities.
///
/// Evaluation itself never fails: every check happens when a node is built or
/// when an entry point validates its destination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    /// Operand shapes do not conform for the operation.
    #[error("{op}: shape mismatch {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// Operand has a shape the operation does not accept.
    #[error("{op}: expected {expected}, got {got}")]
    InvalidShape {
        op: &'static str,
        expected: &'static str,
        got: Shape,
    },

    /// Node lacks a capability the caller asked for.
    #[error("{node} node does not support {capability} access")]
    MissingCapability {
        capability: Capability,
        node: &'static str,
    },

    /// Bracket pinning applied to something that is not a product.
    #[error("cannot keep brackets of a {node} node: not a product")]
    NotAProduct { node: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Convenience alias for `Result<T, LinalgError>`.
pub type Result<T> = std::result::Result<T, LinalgError>;
