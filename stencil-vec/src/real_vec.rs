//! The folded vector register.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

use crate::backend::{Backend, DefaultBackend};
use crate::fold::FoldShape;
use crate::simd::{BinOp, MaybeSimdOps};
use crate::{Result, VecError, MAX_LANES};

/// `VLEN` reals packed for one SIMD register, folded as `F`.
///
/// The lanes can also be viewed as raw bits of the same width
/// ([`ctrls`](Self::ctrls)), which is how permute control words are built.
/// The two views share storage: writing one changes the other.
///
/// `F::VLEN` must equal `VLEN`; this is checked when the type is first
/// constructed.
#[repr(C, align(64))]
pub struct RealVec<T, F, const VLEN: usize> {
    lanes: [T; VLEN],
    fold: PhantomData<F>,
}

impl<T: Copy, F, const VLEN: usize> Clone for RealVec<T, F, VLEN> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, F, const VLEN: usize> Copy for RealVec<T, F, VLEN> {}

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> RealVec<T, F, VLEN> {
    const SHAPE_OK: () = {
        assert!(F::VLEN == VLEN, "fold shape does not match the lane count");
        assert!(VLEN >= 1 && VLEN <= MAX_LANES, "lane count must be in 1..=64");
    };

    /// Number of lanes.
    pub const LANES: usize = VLEN;

    /// Lane mask with every lane selected.
    pub const ALL_LANES: u64 = crate::backend::all_lanes(VLEN);

    #[inline]
    pub fn from_array(lanes: [T; VLEN]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self {
            lanes,
            fold: PhantomData,
        }
    }

    #[inline]
    pub fn splat(v: T) -> Self {
        Self::from_array([v; VLEN])
    }

    #[inline]
    pub fn zero() -> Self {
        Self::splat(T::zero())
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self::from_array(std::array::from_fn(f))
    }

    /// Register loaded from the first `VLEN` elements of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self> {
        let mut v = Self::zero();
        v.load_unaligned(src)?;
        Ok(v)
    }

    /// Register whose raw-bit view is `ctrls`.
    pub fn from_ctrls(ctrls: &[T::Ctrl; VLEN]) -> Self {
        let mut v = Self::zero();
        v.ctrls_mut().copy_from_slice(ctrls);
        v
    }

    /// Permute control register from plain lane selectors.
    ///
    /// For [`permute2`](Self::permute2), add
    /// [`ctrl_sel_bit::<T>()`](crate::ctrl_sel_bit) to select the second source.
    pub fn from_indices(indices: [u64; VLEN]) -> Self {
        let mut v = Self::zero();
        for (c, i) in v.ctrls_mut().iter_mut().zip(indices) {
            *c = T::ctrl_from_u64(i);
        }
        v
    }

    #[inline]
    pub fn to_array(&self) -> [T; VLEN] {
        self.lanes
    }

    #[inline]
    pub fn as_array(&self) -> &[T; VLEN] {
        &self.lanes
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.lanes
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.lanes
    }

    /// Lane `l` as a real.
    ///
    /// # Panics
    /// Panics if `l >= VLEN`.
    #[inline]
    pub fn get(&self, l: usize) -> T {
        self.lanes[l]
    }

    #[inline]
    pub fn set(&mut self, l: usize, v: T) {
        self.lanes[l] = v;
    }

    /// Broadcast `v` into every lane.
    pub fn fill(&mut self, v: T) {
        self.lanes = [v; VLEN];
    }

    /// Lane holding fold point `(n, i, j, k)`.
    #[inline]
    pub fn at(&self, n: usize, i: usize, j: usize, k: usize) -> T {
        self.lanes[F::lane_index(n, i, j, k)]
    }

    #[inline]
    pub fn at_mut(&mut self, n: usize, i: usize, j: usize, k: usize) -> &mut T {
        &mut self.lanes[F::lane_index(n, i, j, k)]
    }

    /// Raw-bit view of all lanes.
    #[inline]
    pub fn ctrls(&self) -> &[T::Ctrl] {
        bytemuck::cast_slice(&self.lanes)
    }

    #[inline]
    pub fn ctrls_mut(&mut self) -> &mut [T::Ctrl] {
        bytemuck::cast_slice_mut(&mut self.lanes)
    }

    /// Lane `l` as raw bits.
    #[inline]
    pub fn ctrl(&self, l: usize) -> T::Ctrl {
        self.lanes[l].to_ctrl()
    }

    #[inline]
    pub fn set_ctrl(&mut self, l: usize, c: T::Ctrl) {
        self.lanes[l] = T::from_ctrl(c);
    }

    // Arithmetic through an explicit backend. The operator impls use
    // `DefaultBackend`.

    #[inline]
    pub fn binary_with<B: Backend>(&self, op: BinOp, rhs: &Self) -> Self {
        Self::from_array(B::binary(op, &self.lanes, &rhs.lanes))
    }

    #[inline]
    pub fn add_with<B: Backend>(&self, rhs: &Self) -> Self {
        self.binary_with::<B>(BinOp::Add, rhs)
    }

    #[inline]
    pub fn sub_with<B: Backend>(&self, rhs: &Self) -> Self {
        self.binary_with::<B>(BinOp::Sub, rhs)
    }

    #[inline]
    pub fn mul_with<B: Backend>(&self, rhs: &Self) -> Self {
        self.binary_with::<B>(BinOp::Mul, rhs)
    }

    /// Exact lane-wise division.
    #[inline]
    pub fn div_with<B: Backend>(&self, rhs: &Self) -> Self {
        self.binary_with::<B>(BinOp::Div, rhs)
    }

    #[inline]
    pub fn neg_with<B: Backend>(&self) -> Self {
        Self::from_array(B::neg(&self.lanes))
    }

    /// Lane-wise `self / rhs` through an approximate reciprocal, within
    /// [`APPROX_DIV_REL_TOL`](crate::APPROX_DIV_REL_TOL) of exact division.
    #[inline]
    pub fn div_approx(&self, rhs: &Self) -> Self {
        self.div_approx_with::<DefaultBackend>(rhs)
    }

    #[inline]
    pub fn div_approx_with<B: Backend>(&self, rhs: &Self) -> Self {
        Self::from_array(B::div_approx(&self.lanes, &rhs.lanes))
    }

    // Loads and stores.

    #[inline]
    pub fn load_from(&mut self, from: &Self) {
        self.lanes = from.lanes;
    }

    #[inline]
    pub fn store_to(&self, to: &mut Self) {
        to.lanes = self.lanes;
    }

    /// Load the first `VLEN` elements of `from`, which need not be aligned.
    pub fn load_unaligned(&mut self, from: &[T]) -> Result<()> {
        let src = from.get(..VLEN).ok_or(VecError::ShortSlice {
            needed: VLEN,
            got: from.len(),
        })?;
        self.lanes.copy_from_slice(src);
        Ok(())
    }

    /// Store into the first `VLEN` elements of `to`, which need not be aligned.
    pub fn store_unaligned(&self, to: &mut [T]) -> Result<()> {
        let got = to.len();
        let dst = to.get_mut(..VLEN).ok_or(VecError::ShortSlice {
            needed: VLEN,
            got,
        })?;
        dst.copy_from_slice(&self.lanes);
        Ok(())
    }

    /// Store that may bypass the cache. Same result as [`store_to`](Self::store_to).
    #[inline]
    pub fn store_streaming(&self, to: &mut Self) {
        self.store_streaming_with::<DefaultBackend>(to);
    }

    #[inline]
    pub fn store_streaming_with<B: Backend>(&self, to: &mut Self) {
        B::store_streaming(&self.lanes, &mut to.lanes);
    }

    /// Raw-bit view formatted like [`Display`](fmt::Display), e.g. `[0]=3, [1]=16`.
    pub fn fmt_ctrls(&self) -> String {
        let mut out = String::new();
        for (i, c) in self.ctrls().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("[{i}]={c}"));
        }
        out
    }
}

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> Default for RealVec<T, F, VLEN> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> From<[T; VLEN]> for RealVec<T, F, VLEN> {
    fn from(lanes: [T; VLEN]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> From<T> for RealVec<T, F, VLEN> {
    fn from(v: T) -> Self {
        Self::splat(v)
    }
}

impl<T, F, const VLEN: usize> Index<usize> for RealVec<T, F, VLEN> {
    type Output = T;

    #[inline]
    fn index(&self, l: usize) -> &T {
        &self.lanes[l]
    }
}

impl<T, F, const VLEN: usize> IndexMut<usize> for RealVec<T, F, VLEN> {
    #[inline]
    fn index_mut(&mut self, l: usize) -> &mut T {
        &mut self.lanes[l]
    }
}

macro_rules! impl_binary_op {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $kind:expr) => {
        impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> $Op for RealVec<T, F, VLEN> {
            type Output = Self;

            #[inline]
            fn $op(self, rhs: Self) -> Self {
                self.binary_with::<DefaultBackend>($kind, &rhs)
            }
        }

        impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> $OpAssign for RealVec<T, F, VLEN> {
            #[inline]
            fn $op_assign(&mut self, rhs: Self) {
                *self = self.binary_with::<DefaultBackend>($kind, &rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, BinOp::Add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, BinOp::Sub);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, BinOp::Mul);
impl_binary_op!(Div, div, DivAssign, div_assign, BinOp::Div);

// Scalar on either side broadcasts to every lane.
macro_rules! impl_scalar_ops {
    (@op $t:ty, $Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident, $kind:expr) => {
        impl<F: FoldShape, const VLEN: usize> $Op<$t> for RealVec<$t, F, VLEN> {
            type Output = Self;

            #[inline]
            fn $op(self, rhs: $t) -> Self {
                self.binary_with::<DefaultBackend>($kind, &Self::splat(rhs))
            }
        }

        impl<F: FoldShape, const VLEN: usize> $Op<RealVec<$t, F, VLEN>> for $t {
            type Output = RealVec<$t, F, VLEN>;

            #[inline]
            fn $op(self, rhs: RealVec<$t, F, VLEN>) -> RealVec<$t, F, VLEN> {
                RealVec::<$t, F, VLEN>::splat(self).binary_with::<DefaultBackend>($kind, &rhs)
            }
        }

        impl<F: FoldShape, const VLEN: usize> $OpAssign<$t> for RealVec<$t, F, VLEN> {
            #[inline]
            fn $op_assign(&mut self, rhs: $t) {
                *self = self.binary_with::<DefaultBackend>($kind, &Self::splat(rhs));
            }
        }
    };
    ($($t:ty),*) => {$(
        impl_scalar_ops!(@op $t, Add, add, AddAssign, add_assign, BinOp::Add);
        impl_scalar_ops!(@op $t, Sub, sub, SubAssign, sub_assign, BinOp::Sub);
        impl_scalar_ops!(@op $t, Mul, mul, MulAssign, mul_assign, BinOp::Mul);
        impl_scalar_ops!(@op $t, Div, div, DivAssign, div_assign, BinOp::Div);
    )*};
}

impl_scalar_ops!(f32, f64);

impl<T: MaybeSimdOps, F: FoldShape, const VLEN: usize> Neg for RealVec<T, F, VLEN> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.neg_with::<DefaultBackend>()
    }
}

/// True only if every lane compares equal.
impl<T: MaybeSimdOps, F, const VLEN: usize> PartialEq for RealVec<T, F, VLEN> {
    fn eq(&self, other: &Self) -> bool {
        self.lanes == other.lanes
    }
}

/// Lexicographic from lane 0. Lanes that do not compare (NaN) are skipped;
/// if no later lane decides, the result is `None`.
impl<T: MaybeSimdOps, F, const VLEN: usize> PartialOrd for RealVec<T, F, VLEN> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut undecided = false;
        for (a, b) in self.lanes.iter().zip(&other.lanes) {
            match a.partial_cmp(b) {
                Some(Ordering::Equal) => {}
                Some(ord) => return Some(ord),
                None => undecided = true,
            }
        }
        if undecided {
            None
        } else {
            Some(Ordering::Equal)
        }
    }
}

/// `[0]=1, [1]=2.5`
impl<T: MaybeSimdOps, F, const VLEN: usize> fmt::Display for RealVec<T, F, VLEN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "[{i}]={v}")?;
        }
        Ok(())
    }
}

impl<T: MaybeSimdOps, F, const VLEN: usize> fmt::Debug for RealVec<T, F, VLEN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RealVec<{}; {}>", T::NAME, VLEN)?;
        f.debug_list().entries(self.lanes.iter()).finish()
    }
}
