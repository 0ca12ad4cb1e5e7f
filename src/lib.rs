//! Indexing algebra and vector registers for stencil code generators.
//!
//! This crate re-exports the workspace crates behind one API:
//!
//! # Core Types
//!
//! - [`Tuple`]: ordered named dimensions with linear addressing
//!   ([`Tuple::layout`]), box enumeration ([`Tuple::visit_all_points`]), set
//!   algebra and the text renderings used when emitting code
//! - [`DimNames`] / [`DimName`]: the interner that gives dimension names their
//!   identity
//! - [`RealVec`]: a folded SIMD register of `f32` or `f64` lanes, with
//!   arithmetic, loads/stores and the `align` / `permute` / `permute2`
//!   shuffles
//! - [`FoldShape`] / [`Fold`]: compile-time lane layouts
//! - [`Backend`]: [`Reference`] loops or the [`Native`] SIMD path
//!
//! # Example
//!
//! ```rust
//! use stencil_rs::{DimNames, Fold, FoldShape, RealVec, Tuple};
//!
//! let names = DimNames::new();
//! let (x, y) = (names.intern("x"), names.intern("y"));
//!
//! // Address of (2, 1) in a 4x3 box, x unit stride.
//! let sizes = Tuple::from_dims([(&x, 4i64), (&y, 3)]);
//! let pt = Tuple::from_dims([(&x, 2i64), (&y, 1)]);
//! assert_eq!(sizes.layout(&pt, true), 6);
//!
//! // A 2x2 fold in x and y: lane (i=1, j=1) is lane 3.
//! type F = Fold<1, 2, 2, 1>;
//! let v = RealVec::<f64, F, 4>::from_fn(|l| l as f64);
//! assert_eq!(v.at(0, 1, 1, 0), 3.0);
//! assert_eq!(F::to_tuple(&names).to_string(), "n=1, x=2, y=2, z=1");
//! ```
//!
//! # Logging
//!
//! Library code emits `tracing` events only. Binaries and tests can install a
//! subscriber with [`logging::init_tracing`].

pub mod logging;

pub use stencil_traits::{DimValue, Real};
pub use stencil_tuple::{DimName, DimNames, DimVal, Points, Tuple, TupleError};
pub use stencil_vec::{
    ctrl_idx_mask, ctrl_sel_bit, default_epsilon, within_tolerance, Backend, BinOp,
    DefaultBackend, Fold, FoldShape, Linear, MaybeSimdOps, Native, RealVec, Reference, VecError,
    APPROX_DIV_REL_TOL, DEFAULT_EPSILON, MAX_LANES, REGISTER_ALIGN,
};

pub use logging::{init_tracing, TracingConfig, TracingInitError};
