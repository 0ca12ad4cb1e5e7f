//! nD <-> 1D addressing and box enumeration.
//!
//! The unit-stride dimension is position 0 when `first_inner` is set (the
//! column-major convention) and the last position otherwise (row-major).
//! Enumeration visits points in increasing address order under the same rule.

use smallvec::SmallVec;
use stencil_traits::DimValue;

use crate::names::DimName;
use crate::tuple::Tuple;
use crate::{Result, TupleError};

type Order = SmallVec<[usize; 6]>;

fn to_index<T: DimValue>(name: &DimName, v: T) -> Result<usize> {
    v.to_usize().ok_or_else(|| TupleError::NotIndexable {
        dim: name.to_string(),
        value: v.to_string(),
    })
}

/// `prev_size * extent`, failing if `extent` is not an index or the product
/// does not fit in `usize`.
fn grow<T: DimValue>(prev_size: usize, name: &DimName, extent: T) -> Result<usize> {
    prev_size
        .checked_mul(to_index(name, extent)?)
        .ok_or_else(|| TupleError::AddressOverflow {
            dim: name.to_string(),
        })
}

impl<T: DimValue> Tuple<T> {
    /// Dimension positions from unit stride outward.
    fn inner_to_outer(&self) -> Order {
        let n = self.len();
        if self.first_inner {
            (0..n).collect()
        } else {
            (0..n).rev().collect()
        }
    }

    /// Convert the nD point `offsets` to a 1D address, using `self`'s values as
    /// the extents of the space.
    ///
    /// With `strict_rhs`, `offsets` must have exactly `self`'s dimensions.
    /// Otherwise dims missing from `offsets` count as offset 0 and extra dims
    /// are ignored. Every used offset must lie in `[0, extent)`.
    pub fn try_layout(&self, offsets: &Tuple<T>, strict_rhs: bool) -> Result<usize> {
        if strict_rhs && !self.are_dims_same(offsets) {
            return Err(self.mismatch(offsets));
        }
        let zero = T::zero();
        let order = self.inner_to_outer();
        let mut idx = 0usize;
        let mut prev_size = 1usize;
        for (n, &pos) in order.iter().enumerate() {
            let d = &self.dims[pos];
            let extent = d.val();
            let offset = offsets.lookup_name(d.name()).copied().unwrap_or(zero);
            if offset < zero || !(offset < extent) {
                return Err(TupleError::OffsetOutOfRange {
                    dim: d.name().to_string(),
                    offset: offset.to_string(),
                    extent: extent.to_string(),
                });
            }
            idx = to_index(d.name(), offset)?
                .checked_mul(prev_size)
                .and_then(|step| idx.checked_add(step))
                .ok_or_else(|| TupleError::AddressOverflow {
                    dim: d.name().to_string(),
                })?;
            // The outermost extent never scales an address.
            if n + 1 < order.len() {
                prev_size = grow(prev_size, d.name(), extent)?;
            }
        }
        Ok(idx)
    }

    /// Unchecked-contract form of [`try_layout`](Self::try_layout).
    ///
    /// # Panics
    /// Panics on a strict dimension mismatch, an out-of-range offset or an
    /// address that does not fit in `usize`.
    pub fn layout(&self, offsets: &Tuple<T>, strict_rhs: bool) -> usize {
        match self.try_layout(offsets, strict_rhs) {
            Ok(idx) => idx,
            Err(e) => panic!("layout: {e}"),
        }
    }

    /// Per-position strides implied by `self`'s extents and `first_inner`.
    pub fn strides(&self) -> Result<Vec<usize>> {
        let order = self.inner_to_outer();
        let mut strides = vec![0usize; self.len()];
        let mut prev_size = 1usize;
        for (n, &pos) in order.iter().enumerate() {
            let d = &self.dims[pos];
            strides[pos] = prev_size;
            if n + 1 < order.len() {
                prev_size = grow(prev_size, d.name(), d.val())?;
            }
        }
        Ok(strides)
    }

    /// Call `visitor` at every point of the box whose extents are `self`'s
    /// values.
    ///
    /// The point passed in has `self`'s dimension names. The unit-stride
    /// dimension varies fastest, so the n-th call sees the point whose
    /// [`layout`](Self::layout) address is n. A 0-D tuple is visited once with
    /// an empty point; a box with any non-positive extent is not visited.
    pub fn visit_all_points(&self, mut visitor: impl FnMut(&Tuple<T>)) {
        let order = self.inner_to_outer();
        let mut pt = self.clone();
        if !start_point(self, &mut pt) {
            return;
        }
        loop {
            visitor(&pt);
            if !advance(self, &mut pt, &order) {
                return;
            }
        }
    }

    /// Iterator over the same points, in the same order, as
    /// [`visit_all_points`](Self::visit_all_points).
    pub fn points(&self) -> Points<'_, T> {
        let mut pt = self.clone();
        let cur = if start_point(self, &mut pt) {
            Some(pt)
        } else {
            None
        };
        Points {
            extents: self,
            order: self.inner_to_outer(),
            cur,
        }
    }
}

/// Reset `pt` to the origin. False if the box is empty.
fn start_point<T: DimValue>(extents: &Tuple<T>, pt: &mut Tuple<T>) -> bool {
    let zero = T::zero();
    if extents.dims.iter().any(|d| !(zero < d.val())) {
        return false;
    }
    pt.set_vals_same(zero);
    true
}

/// Odometer step with `order[0]` as the fastest digit. False once wrapped.
fn advance<T: DimValue>(extents: &Tuple<T>, pt: &mut Tuple<T>, order: &[usize]) -> bool {
    for &pos in order {
        let d = &mut pt.dims[pos];
        let next = d.val() + T::one();
        if next < extents.dims[pos].val() {
            d.set_val(next);
            return true;
        }
        d.set_val(T::zero());
    }
    false
}

/// Iterator returned by [`Tuple::points`].
pub struct Points<'a, T> {
    extents: &'a Tuple<T>,
    order: Order,
    cur: Option<Tuple<T>>,
}

impl<T: DimValue> Iterator for Points<'_, T> {
    type Item = Tuple<T>;

    fn next(&mut self) -> Option<Tuple<T>> {
        let cur = self.cur.take()?;
        let mut next = cur.clone();
        if advance(self.extents, &mut next, &self.order) {
            self.cur = Some(next);
        }
        Some(cur)
    }
}
