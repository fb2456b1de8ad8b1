//! Shared traits for the fslinalg crates.
//!
//! This crate holds the scalar classification used by every expression node
//! and kernel, plus the type-level element operations (`Identity`, `Conj`)
//! that the generalized kernels are monomorphized over.
//!
//! `fslinalg-kernel`, `fslinalg` and external crates depend on this crate so
//! that new scalar types can be plugged in without orphan rule violations.

pub mod element_op;
pub mod scalar;

pub use element_op::{product, triple_product, Conj, ElementOp, Identity};
pub use scalar::Scalar;
