//! Execution backends for register operations.
//!
//! [`Backend`]'s provided methods are the portable per-lane loops and define
//! the semantics. [`Reference`] uses them unchanged. [`Native`] overrides them
//! with copy-based shuffles and the hardware hooks of [`MaybeSimdOps`], and
//! must agree with [`Reference`] lane for lane on every operation except
//! [`div_approx`](Backend::div_approx).

use std::fmt::Debug;

use tracing::{error, trace};

use crate::simd::{BinOp, MaybeSimdOps};
use crate::{Real, Result, VecError, REGISTER_ALIGN};

/// Select bit of a two-source permute control word for element type `T`.
///
/// Fixed per element type as the lane count of a 64-byte register: `0x10`
/// for `f32` and `0x8` for `f64`. Lanes whose control has this bit set read
/// the second source.
#[inline]
pub const fn ctrl_sel_bit<T: Real>() -> u64 {
    (REGISTER_ALIGN / T::BYTES) as u64
}

/// Mask selecting the lane-index bits of a permute control word: `0xf` for
/// `f32` and `0x7` for `f64`.
#[inline]
pub const fn ctrl_idx_mask<T: Real>() -> u64 {
    ctrl_sel_bit::<T>() - 1
}

/// Lane index named by the raw control word `raw`.
///
/// # Panics
/// Panics if the index bits name a lane at or past `vlen`, which can only
/// happen when `vlen` is narrower than a 64-byte register.
#[inline]
pub(crate) fn ctrl_lane<T: Real>(raw: u64, vlen: usize) -> usize {
    let idx = (raw & ctrl_idx_mask::<T>()) as usize;
    assert!(idx < vlen, "permute control {raw:#x} names lane {idx} of {vlen}");
    idx
}

/// Mask with one bit per lane of a `vlen`-lane register.
#[inline]
pub(crate) const fn all_lanes(vlen: usize) -> u64 {
    if vlen >= 64 {
        u64::MAX
    } else {
        (1u64 << vlen) - 1
    }
}

#[inline(always)]
fn lane_on(mask: u64, lane: usize) -> bool {
    (mask >> lane) & 1 == 1
}

/// A way of executing register operations.
///
/// All operations see whole registers of `VLEN` lanes. Control words are
/// passed as the raw-bit view of a register (`ctrl.len() == VLEN`).
pub trait Backend: Copy + Default + Debug + Send + Sync + 'static {
    /// Short name for logs and errors.
    const NAME: &'static str;

    fn binary<T: MaybeSimdOps, const VLEN: usize>(
        op: BinOp,
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> [T; VLEN] {
        std::array::from_fn(|i| op.apply(a[i], b[i]))
    }

    fn neg<T: MaybeSimdOps, const VLEN: usize>(a: &[T; VLEN]) -> [T; VLEN] {
        std::array::from_fn(|i| -a[i])
    }

    /// Division through an approximate reciprocal.
    ///
    /// Backends may differ from each other here, within
    /// [`APPROX_DIV_REL_TOL`](crate::APPROX_DIV_REL_TOL) of the exact quotient.
    fn div_approx<T: MaybeSimdOps, const VLEN: usize>(
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> [T; VLEN] {
        std::array::from_fn(|i| a[i] * b[i].recip())
    }

    /// Window of `VLEN` lanes starting `count` lanes into the concatenation
    /// `[b, a]`: the upper `VLEN - count` lanes of `b`, then the lower
    /// `count` lanes of `a`.
    fn align<T: MaybeSimdOps, const VLEN: usize>(
        a: &[T; VLEN],
        b: &[T; VLEN],
        count: usize,
    ) -> [T; VLEN] {
        debug_assert!(count <= VLEN);
        std::array::from_fn(|i| {
            if i + count < VLEN {
                b[i + count]
            } else {
                a[i + count - VLEN]
            }
        })
    }

    /// [`align`](Self::align) written only to lanes whose `mask` bit is set.
    fn align_masked<T: MaybeSimdOps, const VLEN: usize>(
        res: &mut [T; VLEN],
        a: &[T; VLEN],
        b: &[T; VLEN],
        count: usize,
        mask: u64,
    ) {
        debug_assert!(count <= VLEN);
        for i in 0..VLEN - count {
            if lane_on(mask, i) {
                res[i] = b[i + count];
            }
        }
        for i in VLEN - count..VLEN {
            if lane_on(mask, i) {
                res[i] = a[i + count - VLEN];
            }
        }
    }

    /// `out[i] = a[ctrl[i] & idx_mask]`.
    fn permute<T: MaybeSimdOps, const VLEN: usize>(ctrl: &[T::Ctrl], a: &[T; VLEN]) -> [T; VLEN] {
        std::array::from_fn(|i| a[ctrl_lane::<T>(ctrl[i].into(), VLEN)])
    }

    /// [`permute`](Self::permute) written only to lanes whose `mask` bit is set.
    fn permute_masked<T: MaybeSimdOps, const VLEN: usize>(
        res: &mut [T; VLEN],
        ctrl: &[T::Ctrl],
        a: &[T; VLEN],
        mask: u64,
    ) {
        for i in 0..VLEN {
            if lane_on(mask, i) {
                res[i] = a[ctrl_lane::<T>(ctrl[i].into(), VLEN)];
            }
        }
    }

    /// Two-source permute: lanes whose control carries
    /// [`ctrl_sel_bit`] read `b`, the rest read `a`.
    fn permute2<T: MaybeSimdOps, const VLEN: usize>(
        ctrl: &[T::Ctrl],
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> Result<[T; VLEN]> {
        let sel = ctrl_sel_bit::<T>();
        Ok(std::array::from_fn(|i| {
            let raw: u64 = ctrl[i].into();
            let src = if raw & sel != 0 { b } else { a };
            src[ctrl_lane::<T>(raw, VLEN)]
        }))
    }

    /// Store that may bypass the cache. Same observable result as a copy.
    fn store_streaming<T: MaybeSimdOps, const VLEN: usize>(src: &[T; VLEN], dst: &mut [T; VLEN]) {
        *dst = *src;
    }
}

/// Portable per-lane loops. Always available; the correctness baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reference;

impl Backend for Reference {
    const NAME: &'static str = "reference";
}

/// Hardware-accelerated backend.
///
/// Operations without a hardware path fall back to the portable loops. With
/// `EMULATE_MISSING = false`, [`permute2`](Backend::permute2), which has no
/// hardware path, reports [`VecError::Unsupported`] instead of emulating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Native<const EMULATE_MISSING: bool = true>;

impl<const EMULATE_MISSING: bool> Backend for Native<EMULATE_MISSING> {
    const NAME: &'static str = if EMULATE_MISSING { "native" } else { "native-strict" };

    fn binary<T: MaybeSimdOps, const VLEN: usize>(
        op: BinOp,
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> [T; VLEN] {
        let mut out = [T::zero(); VLEN];
        if !T::try_simd_binary(op, a, b, &mut out) {
            out = Reference::binary(op, a, b);
        }
        out
    }

    fn div_approx<T: MaybeSimdOps, const VLEN: usize>(
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> [T; VLEN] {
        let mut out = [T::zero(); VLEN];
        if !T::try_rcp_mul(a, b, &mut out) {
            out = Reference::div_approx(a, b);
        }
        out
    }

    fn align<T: MaybeSimdOps, const VLEN: usize>(
        a: &[T; VLEN],
        b: &[T; VLEN],
        count: usize,
    ) -> [T; VLEN] {
        debug_assert!(count <= VLEN);
        let mut out = [T::zero(); VLEN];
        out[..VLEN - count].copy_from_slice(&b[count..]);
        out[VLEN - count..].copy_from_slice(&a[..count]);
        out
    }

    fn align_masked<T: MaybeSimdOps, const VLEN: usize>(
        res: &mut [T; VLEN],
        a: &[T; VLEN],
        b: &[T; VLEN],
        count: usize,
        mask: u64,
    ) {
        let window = Self::align(a, b, count);
        blend(res, &window, mask);
    }

    fn permute<T: MaybeSimdOps, const VLEN: usize>(ctrl: &[T::Ctrl], a: &[T; VLEN]) -> [T; VLEN] {
        // Hardware permutes wrap indices, so out-of-range controls must be
        // rejected before handing off.
        for &c in ctrl {
            ctrl_lane::<T>(c.into(), VLEN);
        }
        let mut out = [T::zero(); VLEN];
        if !T::try_permute(ctrl, a, &mut out) {
            out = Reference::permute(ctrl, a);
        }
        out
    }

    fn permute_masked<T: MaybeSimdOps, const VLEN: usize>(
        res: &mut [T; VLEN],
        ctrl: &[T::Ctrl],
        a: &[T; VLEN],
        mask: u64,
    ) {
        // Controls of inactive lanes are never read.
        let all = all_lanes(VLEN);
        if mask & all == all {
            *res = Self::permute(ctrl, a);
        } else {
            Reference::permute_masked(res, ctrl, a, mask);
        }
    }

    fn permute2<T: MaybeSimdOps, const VLEN: usize>(
        ctrl: &[T::Ctrl],
        a: &[T; VLEN],
        b: &[T; VLEN],
    ) -> Result<[T; VLEN]> {
        if !EMULATE_MISSING {
            error!(backend = Self::NAME, vlen = VLEN, elem = T::NAME, "permute2 has no native path");
            return Err(VecError::Unsupported {
                op: "permute2",
                backend: Self::NAME,
            });
        }
        trace!(backend = Self::NAME, "permute2 emulated per lane");
        Reference::permute2(ctrl, a, b)
    }

    fn store_streaming<T: MaybeSimdOps, const VLEN: usize>(src: &[T; VLEN], dst: &mut [T; VLEN]) {
        if !T::try_stream(src, dst) {
            *dst = *src;
        }
    }
}

#[inline]
fn blend<T: Copy, const VLEN: usize>(res: &mut [T; VLEN], src: &[T; VLEN], mask: u64) {
    for (i, (r, &s)) in res.iter_mut().zip(src).enumerate() {
        if lane_on(mask, i) {
            *r = s;
        }
    }
}

/// Backend used by the operator impls on [`RealVec`](crate::RealVec).
#[cfg(feature = "simd")]
pub type DefaultBackend = Native;

/// Backend used by the operator impls on [`RealVec`](crate::RealVec).
#[cfg(not(feature = "simd"))]
pub type DefaultBackend = Reference;
