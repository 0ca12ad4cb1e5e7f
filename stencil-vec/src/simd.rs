//! Per-element hardware hooks used by the [`Native`](crate::Native) backend.
//!
//! Every hook returns `false` when it did nothing, in which case the caller
//! runs the portable loop. A hook that returns `true` must leave `out` holding
//! exactly what the portable loop would have produced, except for
//! [`try_rcp_mul`](MaybeSimdOps::try_rcp_mul), which is only bounded by
//! [`APPROX_DIV_REL_TOL`](crate::APPROX_DIV_REL_TOL).

use stencil_traits::Real;

/// Lane-wise binary arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    #[inline(always)]
    pub fn apply<T: Real>(self, x: T, y: T) -> T {
        match self {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            BinOp::Div => x / y,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
        }
    }
}

/// Element types whose registers may have hardware fast paths.
///
/// Default implementations do nothing. f32/f64 override them when the `simd`
/// feature is enabled.
pub trait MaybeSimdOps: Real {
    fn try_simd_binary(_op: BinOp, _a: &[Self], _b: &[Self], _out: &mut [Self]) -> bool {
        false
    }

    /// `out = a * approx(1 / b)`.
    fn try_rcp_mul(_a: &[Self], _b: &[Self], _out: &mut [Self]) -> bool {
        false
    }

    /// Single-source lane permute. Only the index bits of each control word
    /// count; every reduced index is below `a.len()`.
    fn try_permute(_ctrl: &[Self::Ctrl], _a: &[Self], _out: &mut [Self]) -> bool {
        false
    }

    /// Non-temporal copy of `src` into `dst`.
    fn try_stream(_src: &[Self], _dst: &mut [Self]) -> bool {
        false
    }
}

#[cfg(not(feature = "simd"))]
impl MaybeSimdOps for f32 {}

#[cfg(not(feature = "simd"))]
impl MaybeSimdOps for f64 {}

#[cfg(feature = "simd")]
mod simd_impls {
    use super::{BinOp, MaybeSimdOps};
    use pulp::{Simd, WithSimd};

    macro_rules! simd_binary {
        ($t:ty, $as_simd:ident, $as_mut_simd:ident, $add:ident, $sub:ident, $mul:ident, $div:ident) => {
            fn try_simd_binary(op: BinOp, a: &[$t], b: &[$t], out: &mut [$t]) -> bool {
                struct Binary<'a> {
                    op: BinOp,
                    a: &'a [$t],
                    b: &'a [$t],
                    out: &'a mut [$t],
                }
                impl WithSimd for Binary<'_> {
                    type Output = ();

                    #[inline(always)]
                    fn with_simd<S: Simd>(self, simd: S) -> Self::Output {
                        let (a_head, a_tail) = S::$as_simd(self.a);
                        let (b_head, b_tail) = S::$as_simd(self.b);
                        let (o_head, o_tail) = S::$as_mut_simd(self.out);
                        for ((o, &x), &y) in o_head.iter_mut().zip(a_head).zip(b_head) {
                            *o = match self.op {
                                BinOp::Add => simd.$add(x, y),
                                BinOp::Sub => simd.$sub(x, y),
                                BinOp::Mul => simd.$mul(x, y),
                                BinOp::Div => simd.$div(x, y),
                            };
                        }
                        for ((o, &x), &y) in o_tail.iter_mut().zip(a_tail).zip(b_tail) {
                            *o = self.op.apply(x, y);
                        }
                    }
                }

                if a.len() != out.len() || b.len() != out.len() {
                    return false;
                }
                pulp::Arch::new().dispatch(Binary { op, a, b, out });
                true
            }
        };
    }

    impl MaybeSimdOps for f32 {
        simd_binary!(f32, as_simd_f32s, as_mut_simd_f32s, add_f32s, sub_f32s, mul_f32s, div_f32s);

        fn try_rcp_mul(a: &[f32], b: &[f32], out: &mut [f32]) -> bool {
            #[cfg(target_arch = "x86_64")]
            {
                x86::rcp_mul_f32(a, b, out)
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                let _ = (a, b, out);
                false
            }
        }

        fn try_permute(ctrl: &[u32], a: &[f32], out: &mut [f32]) -> bool {
            #[cfg(target_arch = "x86_64")]
            {
                x86::permute8_f32(ctrl, a, out)
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                let _ = (ctrl, a, out);
                false
            }
        }

        fn try_stream(src: &[f32], dst: &mut [f32]) -> bool {
            #[cfg(target_arch = "x86_64")]
            {
                x86::stream_f32(src, dst)
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                let _ = (src, dst);
                false
            }
        }
    }

    impl MaybeSimdOps for f64 {
        simd_binary!(f64, as_simd_f64s, as_mut_simd_f64s, add_f64s, sub_f64s, mul_f64s, div_f64s);

        fn try_stream(src: &[f64], dst: &mut [f64]) -> bool {
            #[cfg(target_arch = "x86_64")]
            {
                x86::stream_f64(src, dst)
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                let _ = (src, dst);
                false
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    mod x86 {
        use std::arch::x86_64::*;

        pub(super) fn rcp_mul_f32(a: &[f32], b: &[f32], out: &mut [f32]) -> bool {
            if a.len() != out.len() || b.len() != out.len() {
                return false;
            }
            let n = out.len() / 4 * 4;
            for i in (0..n).step_by(4) {
                // SAFETY: SSE is baseline on x86_64 and i + 4 <= len for all three slices.
                unsafe {
                    let va = _mm_loadu_ps(a.as_ptr().add(i));
                    let vb = _mm_loadu_ps(b.as_ptr().add(i));
                    _mm_storeu_ps(out.as_mut_ptr().add(i), _mm_mul_ps(va, _mm_rcp_ps(vb)));
                }
            }
            for i in n..out.len() {
                out[i] = a[i] * b[i].recip();
            }
            true
        }

        pub(super) fn permute8_f32(ctrl: &[u32], a: &[f32], out: &mut [f32]) -> bool {
            if ctrl.len() != 8 || a.len() != 8 || out.len() != 8 {
                return false;
            }
            if !is_x86_feature_detected!("avx2") {
                return false;
            }
            // SAFETY: AVX2 was detected above and all slices hold 8 lanes.
            unsafe { permute8_f32_avx2(ctrl, a, out) };
            true
        }

        #[target_feature(enable = "avx2")]
        unsafe fn permute8_f32_avx2(ctrl: &[u32], a: &[f32], out: &mut [f32]) {
            let idx = _mm256_loadu_si256(ctrl.as_ptr() as *const __m256i);
            let va = _mm256_loadu_ps(a.as_ptr());
            _mm256_storeu_ps(out.as_mut_ptr(), _mm256_permutevar8x32_ps(va, idx));
        }

        pub(super) fn stream_f32(src: &[f32], dst: &mut [f32]) -> bool {
            if src.len() != dst.len() || dst.as_ptr() as usize % 16 != 0 {
                return false;
            }
            let n = dst.len() / 4 * 4;
            // SAFETY: dst is 16-byte aligned, every chunk start is a multiple of
            // 4 lanes from it, and i + 4 <= len.
            unsafe {
                for i in (0..n).step_by(4) {
                    _mm_stream_ps(dst.as_mut_ptr().add(i), _mm_loadu_ps(src.as_ptr().add(i)));
                }
            }
            dst[n..].copy_from_slice(&src[n..]);
            // SAFETY: SSE is baseline on x86_64.
            unsafe { _mm_sfence() };
            true
        }

        pub(super) fn stream_f64(src: &[f64], dst: &mut [f64]) -> bool {
            if src.len() != dst.len() || dst.as_ptr() as usize % 16 != 0 {
                return false;
            }
            let n = dst.len() / 2 * 2;
            // SAFETY: as for stream_f32, with 2-lane chunks.
            unsafe {
                for i in (0..n).step_by(2) {
                    _mm_stream_pd(dst.as_mut_ptr().add(i), _mm_loadu_pd(src.as_ptr().add(i)));
                }
            }
            dst[n..].copy_from_slice(&src[n..]);
            // SAFETY: SSE2 is baseline on x86_64.
            unsafe { _mm_sfence() };
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_apply() {
        assert_eq!(BinOp::Add.apply(2.0f32, 3.0), 5.0);
        assert_eq!(BinOp::Sub.apply(2.0f64, 3.0), -1.0);
        assert_eq!(BinOp::Mul.apply(2.0f32, 3.0), 6.0);
        assert_eq!(BinOp::Div.apply(3.0f64, 2.0), 1.5);
        assert_eq!(BinOp::Div.name(), "div");
    }

    #[cfg(feature = "simd")]
    #[test]
    fn test_simd_binary_matches_scalar() {
        let a: Vec<f32> = (0..37).map(|i| i as f32 * 0.5 - 3.0).collect();
        let b: Vec<f32> = (0..37).map(|i| 1.0 + i as f32 * 0.25).collect();
        for op in [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div] {
            let mut out = vec![0.0f32; 37];
            assert!(f32::try_simd_binary(op, &a, &b, &mut out));
            for i in 0..37 {
                assert_eq!(out[i], op.apply(a[i], b[i]), "{} lane {i}", op.name());
            }
        }
    }

    #[cfg(feature = "simd")]
    #[test]
    fn test_simd_binary_rejects_length_mismatch() {
        let mut out = [0.0f64; 4];
        assert!(!f64::try_simd_binary(BinOp::Add, &[1.0; 3], &[1.0; 4], &mut out));
    }

    #[cfg(not(feature = "simd"))]
    #[test]
    fn test_no_hooks_without_simd() {
        let mut out = [0.0f32; 4];
        assert!(!f32::try_simd_binary(BinOp::Add, &[1.0; 4], &[1.0; 4], &mut out));
        assert!(!f32::try_stream(&[1.0; 4], &mut out));
    }
}
