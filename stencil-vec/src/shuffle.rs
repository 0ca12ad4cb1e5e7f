//! Cross-lane shuffles used to build neighbor vectors.
//!
//! Each shuffle has a `*_with::<B>` form that takes the backend explicitly;
//! the plain form uses [`DefaultBackend`]. Masked forms write only the lanes
//! whose bit is set in `mask` and leave the others at their prior value.

use tracing::trace;

use crate::backend::{Backend, DefaultBackend};
use crate::fold::FoldShape;
use crate::real_vec::RealVec;
use crate::simd::MaybeSimdOps;
use crate::Result;

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> RealVec<T, F, VLEN> {
    /// Lanes `COUNT..COUNT + VLEN` of the concatenation `[b, a]`.
    ///
    /// `COUNT == 0` yields `b` and `COUNT == VLEN` yields `a`. With `b` the
    /// register below `a` in memory, this is the unaligned load starting
    /// `COUNT` elements into `b`.
    pub fn align<const COUNT: usize>(a: &Self, b: &Self) -> Self {
        Self::align_with::<COUNT, DefaultBackend>(a, b)
    }

    pub fn align_with<const COUNT: usize, B: Backend>(a: &Self, b: &Self) -> Self {
        const { assert!(COUNT <= VLEN, "align count exceeds the lane count") };
        let res = Self::from_array(B::align(a.as_array(), b.as_array(), COUNT));
        trace!(backend = B::NAME, count = COUNT, %a, %b, %res, "align");
        res
    }

    /// [`align`](Self::align) written to `self` under `mask`.
    pub fn align_masked<const COUNT: usize>(&mut self, a: &Self, b: &Self, mask: u64) {
        self.align_masked_with::<COUNT, DefaultBackend>(a, b, mask);
    }

    pub fn align_masked_with<const COUNT: usize, B: Backend>(
        &mut self,
        a: &Self,
        b: &Self,
        mask: u64,
    ) {
        const { assert!(COUNT <= VLEN, "align count exceeds the lane count") };
        let mut lanes = self.to_array();
        B::align_masked(&mut lanes, a.as_array(), b.as_array(), COUNT, mask);
        *self = Self::from_array(lanes);
        trace!(backend = B::NAME, count = COUNT, mask, %a, %b, res = %self, "align_masked");
    }

    /// `res[i] = a[ctrl[i] & idx_mask]`, with `ctrl` read through its raw-bit
    /// view.
    ///
    /// # Panics
    /// Panics if a control word names a lane past `VLEN`.
    pub fn permute(ctrl: &Self, a: &Self) -> Self {
        Self::permute_with::<DefaultBackend>(ctrl, a)
    }

    pub fn permute_with<B: Backend>(ctrl: &Self, a: &Self) -> Self {
        let res = Self::from_array(B::permute(ctrl.ctrls(), a.as_array()));
        trace!(backend = B::NAME, ctrl = %ctrl.fmt_ctrls(), %a, %res, "permute");
        res
    }

    /// [`permute`](Self::permute) written to `self` under `mask`. Control
    /// words of lanes outside `mask` are ignored.
    pub fn permute_masked(&mut self, ctrl: &Self, a: &Self, mask: u64) {
        self.permute_masked_with::<DefaultBackend>(ctrl, a, mask);
    }

    pub fn permute_masked_with<B: Backend>(&mut self, ctrl: &Self, a: &Self, mask: u64) {
        let mut lanes = self.to_array();
        B::permute_masked(&mut lanes, ctrl.ctrls(), a.as_array(), mask);
        *self = Self::from_array(lanes);
        trace!(
            backend = B::NAME,
            ctrl = %ctrl.fmt_ctrls(),
            mask,
            %a,
            res = %self,
            "permute_masked"
        );
    }

    /// Two-source permute: lane `i` reads `b` if `ctrl[i]` has
    /// [`ctrl_sel_bit`](crate::ctrl_sel_bit) set and `a` otherwise, at the
    /// lane given by the index bits.
    ///
    /// Fails with [`VecError::Unsupported`](crate::VecError::Unsupported) on a
    /// backend configured not to emulate it.
    pub fn permute2(ctrl: &Self, a: &Self, b: &Self) -> Result<Self> {
        Self::permute2_with::<DefaultBackend>(ctrl, a, b)
    }

    pub fn permute2_with<B: Backend>(ctrl: &Self, a: &Self, b: &Self) -> Result<Self> {
        let res = Self::from_array(B::permute2(ctrl.ctrls(), a.as_array(), b.as_array())?);
        trace!(
            backend = B::NAME,
            ctrl = %ctrl.fmt_ctrls(),
            %a,
            %b,
            %res,
            "permute2"
        );
        Ok(res)
    }
}
