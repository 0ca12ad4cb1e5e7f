//! Folded SIMD vector registers.
//!
//! A [`RealVec`] holds `VLEN` reals that stand for a small 4D block of grid
//! points, described by a [`FoldShape`]. Arithmetic, loads/stores and the
//! lane shuffles used by stencil kernels (`align`, `permute`, `permute2`) are
//! executed by a [`Backend`]: the portable [`Reference`] loops or the
//! [`Native`] path, which uses SIMD when the `simd` feature is enabled.
//!
//! # Example
//!
//! ```
//! use stencil_vec::{Linear, RealVec};
//!
//! type V4 = RealVec<f32, Linear<4>, 4>;
//!
//! let a = V4::from_array([10.0, 11.0, 12.0, 13.0]);
//! let b = V4::from_array([0.0, 1.0, 2.0, 3.0]);
//! let shifted = V4::align::<1>(&a, &b);
//! assert_eq!(shifted.to_array(), [1.0, 2.0, 3.0, 10.0]);
//! assert_eq!((a + b).get(0), 10.0);
//! ```

pub mod backend;
pub mod fold;
pub mod real_vec;
mod shuffle;
pub mod simd;
pub mod tolerance;

pub use backend::{ctrl_idx_mask, ctrl_sel_bit, Backend, DefaultBackend, Native, Reference};
pub use fold::{Fold, FoldShape, Linear};
pub use real_vec::RealVec;
pub use simd::{BinOp, MaybeSimdOps};
pub use stencil_traits::Real;
pub use tolerance::{default_epsilon, within_tolerance, DEFAULT_EPSILON};

/// Byte alignment of every register.
pub const REGISTER_ALIGN: usize = 64;

/// Largest supported lane count; lane masks are `u64`.
pub const MAX_LANES: usize = 64;

/// Relative error bound of [`RealVec::div_approx`] against exact division,
/// for divisors in the normal range.
pub const APPROX_DIV_REL_TOL: f64 = 1.0 / 2048.0;

/// Error type for register operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VecError {
    #[error("{op} is not supported by the {backend} backend")]
    Unsupported {
        op: &'static str,
        backend: &'static str,
    },

    #[error("slice too short: need {needed} elements, got {got}")]
    ShortSlice { needed: usize, got: usize },
}

/// Convenience alias for `Result<T, VecError>`.
pub type Result<T> = std::result::Result<T, VecError>;
