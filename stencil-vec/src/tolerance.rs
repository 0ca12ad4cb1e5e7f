//! Approximate equality for validating kernels against reference results.

use num_traits::Float;
use std::fmt::Display;
use tracing::debug;

use crate::fold::FoldShape;
use crate::real_vec::RealVec;
use crate::simd::MaybeSimdOps;

/// Default relative tolerance when comparing kernel output to a reference.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// [`DEFAULT_EPSILON`] in `T`.
pub fn default_epsilon<T: Float>() -> T {
    T::from(DEFAULT_EPSILON).unwrap_or_else(T::epsilon)
}

/// True if `|val - reference| < eps`, where `eps` is `epsilon` when
/// `|reference| <= 1` and `|reference * epsilon|` otherwise.
///
/// The bound is strict, so `epsilon = 0` never matches. NaN on either side
/// never matches.
pub fn within_tolerance<T: Float + Display>(val: T, reference: T, epsilon: T) -> bool {
    let diff = (val - reference).abs();
    let eps = if reference.abs() > T::one() {
        (reference * epsilon).abs()
    } else {
        epsilon
    };
    let ok = diff < eps;
    if !ok {
        debug!(%val, %reference, %eps, %diff, "outside tolerance");
    }
    ok
}

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> RealVec<T, F, VLEN> {
    /// Bit mask of lanes within tolerance of `reference`, with a per-lane
    /// `epsilon`.
    pub fn tolerance_mask(&self, reference: &Self, epsilon: &Self) -> u64 {
        let mut mask = 0u64;
        for l in 0..VLEN {
            if within_tolerance(self.get(l), reference.get(l), epsilon.get(l)) {
                mask |= 1 << l;
            }
        }
        mask
    }

    /// True if every lane is within tolerance of `reference`.
    pub fn within_tolerance(&self, reference: &Self, epsilon: &Self) -> bool {
        let mask = self.tolerance_mask(reference, epsilon);
        let ok = mask == Self::ALL_LANES;
        if !ok {
            debug!(lanes = %self, %reference, failed = !mask & Self::ALL_LANES, "register outside tolerance");
        }
        ok
    }

    /// [`within_tolerance`](Self::within_tolerance) with one `epsilon` for all lanes.
    pub fn within_tolerance_scalar(&self, reference: &Self, epsilon: T) -> bool {
        self.within_tolerance(reference, &Self::splat(epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::Linear;

    type V4 = RealVec<f64, Linear<4>, 4>;

    #[test]
    fn test_reference_triples() {
        assert!(within_tolerance(1.00005, 1.0, 1e-3));
        assert!(!within_tolerance(2.0, 1.0, 1e-3));
        assert!(within_tolerance(1000.001, 1000.0, 1e-3));
    }

    #[test]
    fn test_scalar_absolute_range() {
        assert!(within_tolerance(1.0005, 1.0, 1e-3));
        assert!(!within_tolerance(1.002, 1.0, 1e-3));
        assert!(within_tolerance(-0.0009, 0.0, 1e-3));
    }

    #[test]
    fn test_scalar_relative_range() {
        // |ref| > 1 scales the bound by |ref|.
        assert!(within_tolerance(1000.5, 1000.0, 1e-3));
        assert!(!within_tolerance(1002.0, 1000.0, 1e-3));
        assert!(within_tolerance(-1000.5, -1000.0, 1e-3));
        assert!(within_tolerance(1000.001f32, 1000.0f32, 1e-3));
    }

    #[test]
    fn test_scalar_strict_and_nan() {
        assert!(!within_tolerance(1.0, 1.0, 0.0));
        assert!(!within_tolerance(f64::NAN, 1.0, 1e-3));
        assert!(!within_tolerance(1.0, f64::NAN, 1e-3));
    }

    #[test]
    fn test_default_epsilon() {
        assert_eq!(default_epsilon::<f64>(), 1e-3);
        assert_eq!(default_epsilon::<f32>(), 1e-3f32);
    }

    #[test]
    fn test_register_tolerance() {
        let reference = V4::from_array([1.0, 1000.0, -3.0, 0.0]);
        let close = V4::from_array([1.0001, 1000.5, -3.001, 0.0005]);
        let eps = V4::splat(DEFAULT_EPSILON);
        assert!(close.within_tolerance(&reference, &eps));
        assert!(close.within_tolerance_scalar(&reference, DEFAULT_EPSILON));
        assert_eq!(close.tolerance_mask(&reference, &eps), 0b1111);

        let mut off = close;
        off.set(2, -3.1);
        assert!(!off.within_tolerance_scalar(&reference, DEFAULT_EPSILON));
        assert_eq!(off.tolerance_mask(&reference, &eps), 0b1011);

        let per_lane = V4::from_array([1e-3, 1e-3, 0.1, 1e-3]);
        assert!(off.within_tolerance(&reference, &per_lane));
    }
}
