//! Vector fold shapes.
//!
//! A fold packs a small 4D block of grid points `(n, x, y, z)` into the lanes
//! of one register. The shape and the lane order are compile-time
//! configuration, carried as a type.

use std::fmt::Debug;

use stencil_tuple::{DimNames, Tuple};

/// Compile-time description of a vector fold.
///
/// `FIRST_INNER` mirrors [`Tuple::first_inner`]: `true` makes `n` the
/// unit-stride axis (then `x`, `y`, `z`), `false` makes `z` unit stride.
/// Folding along time is not supported, so `VLEN_T` is always 1.
pub trait FoldShape: Copy + Default + Debug + Send + Sync + 'static {
    const VLEN_N: usize;
    const VLEN_X: usize;
    const VLEN_Y: usize;
    const VLEN_Z: usize;
    const FIRST_INNER: bool;

    const VLEN_T: usize = 1;

    /// Total lane count.
    const VLEN: usize = Self::VLEN_N * Self::VLEN_X * Self::VLEN_Y * Self::VLEN_Z;

    /// Per-axis extents in `n, x, y, z` order.
    fn extents() -> [usize; 4] {
        [Self::VLEN_N, Self::VLEN_X, Self::VLEN_Y, Self::VLEN_Z]
    }

    /// Flat lane index of the fold point `(n, i, j, k)`.
    ///
    /// # Panics
    /// Panics if any index is outside its axis extent.
    #[inline]
    fn lane_index(n: usize, i: usize, j: usize, k: usize) -> usize {
        assert!(
            n < Self::VLEN_N && i < Self::VLEN_X && j < Self::VLEN_Y && k < Self::VLEN_Z,
            "fold index ({n}, {i}, {j}, {k}) out of range for fold {}x{}x{}x{}",
            Self::VLEN_N,
            Self::VLEN_X,
            Self::VLEN_Y,
            Self::VLEN_Z
        );
        if Self::FIRST_INNER {
            n + Self::VLEN_N * (i + Self::VLEN_X * (j + Self::VLEN_Y * k))
        } else {
            k + Self::VLEN_Z * (j + Self::VLEN_Y * (i + Self::VLEN_X * n))
        }
    }

    /// The fold as an extent tuple over dims `n, x, y, z`.
    ///
    /// `layout` of a fold point against this tuple equals
    /// [`lane_index`](Self::lane_index).
    fn to_tuple(names: &DimNames) -> Tuple<usize> {
        let axes = names.intern_all(["n", "x", "y", "z"]);
        let mut t = Tuple::from_dims(axes.iter().zip(Self::extents()));
        t.set_first_inner(Self::FIRST_INNER);
        t
    }
}

/// Standard fold of `N x X x Y x Z` lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fold<
    const N: usize,
    const X: usize,
    const Y: usize,
    const Z: usize,
    const FIRST_INNER: bool = true,
>;

impl<const N: usize, const X: usize, const Y: usize, const Z: usize, const FIRST_INNER: bool>
    FoldShape for Fold<N, X, Y, Z, FIRST_INNER>
{
    const VLEN_N: usize = N;
    const VLEN_X: usize = X;
    const VLEN_Y: usize = Y;
    const VLEN_Z: usize = Z;
    const FIRST_INNER: bool = FIRST_INNER;
}

/// `VLEN` points folded along `x` only.
pub type Linear<const VLEN: usize> = Fold<1, VLEN, 1, 1, true>;

#[cfg(test)]
mod tests {
    use super::*;

    type F2x2x2 = Fold<1, 2, 2, 2, true>;
    type F2x2x2Last = Fold<1, 2, 2, 2, false>;

    #[test]
    fn test_vlen() {
        assert_eq!(F2x2x2::VLEN, 8);
        assert_eq!(Linear::<16>::VLEN, 16);
        assert_eq!(Fold::<2, 4, 1, 1>::VLEN, 8);
        assert_eq!(F2x2x2::VLEN_T, 1);
    }

    #[test]
    fn test_lane_index_first_inner() {
        assert_eq!(F2x2x2::lane_index(0, 1, 0, 0), 1);
        assert_eq!(F2x2x2::lane_index(0, 0, 1, 0), 2);
        assert_eq!(F2x2x2::lane_index(0, 0, 0, 1), 4);
        assert_eq!(Fold::<2, 4, 1, 1>::lane_index(1, 3, 0, 0), 7);
    }

    #[test]
    fn test_lane_index_last_inner() {
        assert_eq!(F2x2x2Last::lane_index(0, 0, 0, 1), 1);
        assert_eq!(F2x2x2Last::lane_index(0, 0, 1, 0), 2);
        assert_eq!(F2x2x2Last::lane_index(0, 1, 0, 0), 4);
        assert_eq!(Fold::<2, 4, 1, 1, false>::lane_index(1, 0, 0, 0), 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_lane_index_out_of_range() {
        F2x2x2::lane_index(0, 2, 0, 0);
    }

    fn check_tuple_agrees<F: FoldShape>() {
        let names = DimNames::new();
        let t = F::to_tuple(&names);
        assert_eq!(t.product(), F::VLEN);
        assert_eq!(t.first_inner(), F::FIRST_INNER);
        let mut count = 0;
        t.visit_all_points(|pt| {
            let lane = F::lane_index(pt.get_val(0), pt.get_val(1), pt.get_val(2), pt.get_val(3));
            assert_eq!(lane, t.layout(pt, true));
            assert_eq!(lane, count);
            count += 1;
        });
        assert_eq!(count, F::VLEN);
    }

    #[test]
    fn test_tuple_agrees_with_lane_index() {
        check_tuple_agrees::<F2x2x2>();
        check_tuple_agrees::<F2x2x2Last>();
        check_tuple_agrees::<Fold<2, 4, 1, 2, true>>();
        check_tuple_agrees::<Fold<2, 4, 1, 2, false>>();
        check_tuple_agrees::<Linear<8>>();
    }

    #[test]
    fn test_to_tuple_text() {
        let names = DimNames::new();
        let t = Fold::<1, 4, 2, 1>::to_tuple(&names);
        assert_eq!(t.make_dim_val_str(", ", "=", "", ""), "n=1, x=4, y=2, z=1");
    }
}
