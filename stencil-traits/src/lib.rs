//! Shared traits for the stencil-rs ecosystem.
//!
//! This crate provides the numeric contracts shared by `stencil-tuple`
//! (named-dimension tuples) and `stencil-vec` (folded vector registers).
//!
//! External crates (e.g. a compiler front end with its own symbolic integer
//! type) can depend on `stencil-traits` alone to make their types usable as
//! tuple values without orphan rule violations.

pub mod dim_value;
pub mod real;

pub use dim_value::DimValue;
pub use real::Real;
