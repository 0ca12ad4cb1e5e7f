//! Named-dimension tuples for stencil code generation.
//!
//! A [`Tuple`] is an ordered set of [`DimVal`]s: dimension names drawn from a
//! [`DimNames`] interner, each paired with a value. The same type describes
//! domain sizes, block sizes, point offsets and vector folds.
//!
//! # Core Types
//!
//! - [`DimNames`] / [`DimName`]: explicit, thread-safe name interner and the
//!   identities it hands out
//! - [`DimVal`]: one `(name, value)` pair
//! - [`Tuple`]: ordered collection of unique dims plus a stride-order flag
//!
//! # Operations
//!
//! - Layout: [`Tuple::layout`] maps an nD offset to a 1D address; the
//!   `first_inner` flag picks unit-stride-first or unit-stride-last
//! - Iteration: [`Tuple::visit_all_points`] / [`Tuple::points`] enumerate a box
//!   in address order
//! - Set algebra: union, equality and ordering independent of insertion order
//! - Formatting: `make_*_str` helpers emit deterministic text for generated code
//!
//! # Example
//!
//! ```rust
//! use stencil_tuple::{DimNames, Tuple};
//!
//! let names = DimNames::new();
//! let (x, y) = (names.intern("x"), names.intern("y"));
//!
//! let mut sizes = Tuple::<i64>::new();
//! sizes.add_dim_back(&x, 4);
//! sizes.add_dim_back(&y, 3);
//!
//! let mut pt = Tuple::<i64>::new();
//! pt.add_dim_back(&x, 2);
//! pt.add_dim_back(&y, 1);
//!
//! assert_eq!(sizes.layout(&pt, true), 6);
//! sizes.set_first_inner(false);
//! assert_eq!(sizes.layout(&pt, true), 7);
//! ```

mod dim_val;
mod format;
mod layout;
mod names;
mod tuple;

pub use dim_val::DimVal;
pub use layout::Points;
pub use names::{DimName, DimNames};
pub use tuple::Tuple;

pub use stencil_traits::DimValue;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by the checked (`try_*`) tuple operations.
///
/// The unchecked counterparts treat the same conditions as caller bugs and
/// panic with this error's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TupleError {
    /// Two tuples were required to have the same dimension set.
    #[error("dimension mismatch: [{lhs}] vs [{rhs}]")]
    DimMismatch { lhs: String, rhs: String },

    /// An offset fell outside `[0, extent)`.
    #[error("offset {offset} out of range [0, {extent}) in dim '{dim}'")]
    OffsetOutOfRange {
        dim: String,
        offset: String,
        extent: String,
    },

    /// A value could not be converted to an address component.
    #[error("value {value} in dim '{dim}' is not a valid index")]
    NotIndexable { dim: String, value: String },

    /// An address or stride does not fit in `usize`.
    #[error("address overflows usize at dim '{dim}'")]
    AddressOverflow { dim: String },

    /// A dimension that had to exist was absent.
    #[error("dimension '{0}' not found")]
    MissingDim(String),
}

/// Result type for tuple operations.
pub type Result<T> = std::result::Result<T, TupleError>;
