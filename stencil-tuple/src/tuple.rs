//! The dimensional tuple: an ordered set of named values.

use std::cmp::Ordering;
use std::collections::HashMap;

use smallvec::SmallVec;
use stencil_traits::DimValue;

use crate::dim_val::DimVal;
use crate::names::DimName;
use crate::{Result, TupleError};

/// Stencils rarely go beyond `t, n, x, y, z`; keep those inline.
pub(crate) type DimVec<T> = SmallVec<[DimVal<T>; 6]>;

/// Ordered collection of uniquely named values.
///
/// Depending on use, a tuple is the size of an nD space, a point in it, a
/// vector from the origin, or per-dimension values at a point.
///
/// `first_inner` picks the unit-stride dimension for [`layout`](Self::layout)
/// and [`visit_all_points`](Self::visit_all_points): with dims `x, y, z`,
/// `true` makes `x` unit stride and `false` makes `z` unit stride. It does not
/// take part in equality or set algebra, which also ignore insertion order.
#[derive(Clone)]
pub struct Tuple<T> {
    pub(crate) dims: DimVec<T>,
    index: HashMap<DimName, usize>,
    pub(crate) first_inner: bool,
}

impl<T: DimValue> Default for Tuple<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DimValue> Tuple<T> {
    /// Create an empty tuple with `first_inner = true`.
    pub fn new() -> Self {
        Self {
            dims: SmallVec::new(),
            index: HashMap::new(),
            first_inner: true,
        }
    }

    /// Build a tuple from an ordered sequence of `(name, value)` pairs.
    ///
    /// A repeated name updates the earlier entry, as with
    /// [`add_dim_back`](Self::add_dim_back).
    pub fn from_dims<'a>(dims: impl IntoIterator<Item = (&'a DimName, T)>) -> Self {
        let mut t = Self::new();
        for (name, val) in dims {
            t.add_dim_back(name, val);
        }
        t
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, d) in self.dims.iter().enumerate() {
            self.index.insert(d.name().clone(), i);
        }
    }

    // ------------------------------------------------------------------
    // Stride-order flag and size
    // ------------------------------------------------------------------

    #[inline]
    pub fn first_inner(&self) -> bool {
        self.first_inner
    }

    #[inline]
    pub fn set_first_inner(&mut self, first_inner: bool) {
        self.first_inner = first_inner;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// Same as [`len`](Self::len).
    #[inline]
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Dimensions in insertion order.
    #[inline]
    pub fn dims(&self) -> &[DimVal<T>] {
        &self.dims
    }

    /// Remove all dimensions. Keeps `first_inner`.
    pub fn clear(&mut self) {
        self.dims.clear();
        self.index.clear();
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Append a dimension, or overwrite its value in place if it already exists.
    pub fn add_dim_back(&mut self, name: &DimName, val: T) {
        if let Some(p) = self.lookup_name_mut(name) {
            *p = val;
            return;
        }
        self.index.insert(name.clone(), self.dims.len());
        self.dims.push(DimVal::new(name, val));
    }

    /// Prepend a dimension, or overwrite its value in place if it already exists.
    pub fn add_dim_front(&mut self, name: &DimName, val: T) {
        if let Some(p) = self.lookup_name_mut(name) {
            *p = val;
            return;
        }
        self.dims.insert(0, DimVal::new(name, val));
        self.rebuild_index();
    }

    pub fn add_dim_back_val(&mut self, dv: &DimVal<T>) {
        self.add_dim_back(dv.name(), dv.val());
    }

    pub fn add_dim_front_val(&mut self, dv: &DimVal<T>) {
        self.add_dim_front(dv.name(), dv.val());
    }

    // ------------------------------------------------------------------
    // Lookup (absence is `None`)
    // ------------------------------------------------------------------

    /// Dimension at position `i`, if any.
    #[inline]
    pub fn dim(&self, i: usize) -> Option<&DimVal<T>> {
        self.dims.get(i)
    }

    /// Position of `name`, if present.
    #[inline]
    pub fn position(&self, name: &DimName) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &DimName) -> bool {
        self.index.contains_key(name)
    }

    /// Value at position `i`, if any.
    #[inline]
    pub fn lookup(&self, i: usize) -> Option<&T> {
        self.dims.get(i).map(|d| d.val_ref())
    }

    #[inline]
    pub fn lookup_mut(&mut self, i: usize) -> Option<&mut T> {
        self.dims.get_mut(i).map(|d| d.val_mut())
    }

    /// Value of dimension `name`, if present.
    #[inline]
    pub fn lookup_name(&self, name: &DimName) -> Option<&T> {
        let i = self.position(name)?;
        self.lookup(i)
    }

    #[inline]
    pub fn lookup_name_mut(&mut self, name: &DimName) -> Option<&mut T> {
        let i = self.position(name)?;
        self.lookup_mut(i)
    }

    /// Value of the dimension whose name text is `name`, if present.
    ///
    /// For callers holding raw strings; compares text rather than identity.
    pub fn lookup_str(&self, name: &str) -> Option<&T> {
        self.dims
            .iter()
            .find(|d| d.name().as_str() == name)
            .map(|d| d.val_ref())
    }

    // ------------------------------------------------------------------
    // Must-exist accessors
    // ------------------------------------------------------------------

    /// Dimension at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get_dim(&self, i: usize) -> &DimVal<T> {
        match self.dims.get(i) {
            Some(d) => d,
            None => panic!(
                "dimension index {i} out of range for tuple ({})",
                self.make_dim_str(", ", "", "")
            ),
        }
    }

    /// Dimension named `name`.
    ///
    /// # Panics
    /// Panics if `name` is not in the tuple.
    pub fn get_dim_by_name(&self, name: &DimName) -> &DimVal<T> {
        match self.position(name) {
            Some(i) => &self.dims[i],
            None => panic!("{}", TupleError::MissingDim(name.to_string())),
        }
    }

    /// Name of the dimension at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get_dim_name(&self, i: usize) -> &DimName {
        self.get_dim(i).name()
    }

    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get_val(&self, i: usize) -> T {
        self.get_dim(i).val()
    }

    /// # Panics
    /// Panics if `name` is not in the tuple.
    pub fn get_val_by_name(&self, name: &DimName) -> T {
        self.get_dim_by_name(name).val()
    }

    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn set_val(&mut self, i: usize, val: T) {
        let len = self.len();
        match self.lookup_mut(i) {
            Some(p) => *p = val,
            None => panic!("dimension index {i} out of range for tuple of {len} dims"),
        }
    }

    /// # Panics
    /// Panics if `name` is not in the tuple.
    pub fn set_val_by_name(&mut self, name: &DimName, val: T) {
        match self.lookup_name_mut(name) {
            Some(p) => *p = val,
            None => panic!("{}", TupleError::MissingDim(name.to_string())),
        }
    }

    /// Value in the same dimension as `dir`.
    ///
    /// # Panics
    /// Panics if `dir`'s dimension is not in the tuple.
    pub fn get_val_in_dir(&self, dir: &DimVal<T>) -> T {
        self.get_val_by_name(dir.name())
    }

    /// A standalone pair holding this tuple's value for `name`.
    ///
    /// # Panics
    /// Panics if `name` is not in the tuple.
    pub fn get_dir_in_dim(&self, name: &DimName) -> DimVal<T> {
        self.get_dim_by_name(name).clone()
    }

    // ------------------------------------------------------------------
    // Bulk set
    // ------------------------------------------------------------------

    /// Set values positionally. Extra values are ignored; if fewer are given,
    /// only that many leading dims change.
    pub fn set_vals(&mut self, vals: &[T]) {
        for (d, &v) in self.dims.iter_mut().zip(vals.iter()) {
            d.set_val(v);
        }
    }

    /// Set every value to `val`.
    pub fn set_vals_same(&mut self, val: T) {
        for d in self.dims.iter_mut() {
            d.set_val(val);
        }
    }

    /// Copy values from `src` by name. Dims of `src` missing from `self` are
    /// appended iff `add_missing`.
    pub fn set_vals_from(&mut self, src: &Tuple<T>, add_missing: bool) {
        for d in src.dims() {
            if let Some(p) = self.lookup_name_mut(d.name()) {
                *p = d.val();
            } else if add_missing {
                self.add_dim_back(d.name(), d.val());
            }
        }
    }

    // ------------------------------------------------------------------
    // Set algebra
    // ------------------------------------------------------------------

    /// Copy of `self` plus every dim of `rhs` not already present.
    ///
    /// Shared dims keep `self`'s value.
    pub fn make_union_with(&self, rhs: &Tuple<T>) -> Tuple<T> {
        let mut u = self.clone();
        for d in rhs.dims() {
            if !u.contains(d.name()) {
                u.add_dim_back(d.name(), d.val());
            }
        }
        u
    }

    /// True if both tuples have the same dimension names, in any order.
    pub fn are_dims_same(&self, rhs: &Tuple<T>) -> bool {
        self.len() == rhs.len() && self.dims.iter().all(|d| rhs.contains(d.name()))
    }

    /// New tuple without `name`; a plain copy if `name` is absent.
    pub fn remove_dim(&self, name: &DimName) -> Tuple<T> {
        let mut t = Tuple::new();
        t.first_inner = self.first_inner;
        for d in self.dims.iter().filter(|d| d.name() != name) {
            t.add_dim_back(d.name(), d.val());
        }
        t
    }

    /// New tuple without `dir`'s dimension; `dir`'s value is ignored.
    pub fn remove_dim_in_dir(&self, dir: &DimVal<T>) -> Tuple<T> {
        self.remove_dim(dir.name())
    }

    pub(crate) fn mismatch(&self, rhs: &Tuple<T>) -> TupleError {
        TupleError::DimMismatch {
            lhs: self.make_dim_str(", ", "", ""),
            rhs: rhs.make_dim_str(", ", "", ""),
        }
    }

    // ------------------------------------------------------------------
    // Directional predicates
    // ------------------------------------------------------------------

    /// True if every value except the one in `dir`'s dimension equals `t2`'s.
    ///
    /// # Panics
    /// Panics if the tuples have different dimension sets.
    pub fn is_inline_in_dir(&self, t2: &Tuple<T>, dir: &DimVal<T>) -> bool {
        if !self.are_dims_same(t2) {
            panic!("{}", self.mismatch(t2));
        }
        self.dims
            .iter()
            .filter(|d| d.name() != dir.name())
            .all(|d| d.val() == t2.get_val_by_name(d.name()))
    }

    /// True if `self` is inline with `t2` along `dir` and strictly ahead of it
    /// in `dir`'s direction (greater when `dir` is positive, less when
    /// negative).
    ///
    /// # Panics
    /// Panics if the tuples have different dimension sets or `dir`'s
    /// dimension is absent.
    pub fn is_ahead_of_in_dir(&self, t2: &Tuple<T>, dir: &DimVal<T>) -> bool {
        if !self.are_dims_same(t2) {
            panic!("{}", self.mismatch(t2));
        }
        let dv = dir.val();
        let tv = self.get_val_by_name(dir.name());
        let v2 = t2.get_val_by_name(dir.name());
        let zero = T::zero();
        self.is_inline_in_dir(t2, dir) && ((dv > zero && tv > v2) || (dv < zero && tv < v2))
    }

    // ------------------------------------------------------------------
    // Reductions
    // ------------------------------------------------------------------

    /// Fold values in order, seeded with the first one. Empty tuples give zero.
    pub fn reduce(&self, mut reducer: impl FnMut(T, T) -> T) -> T {
        let mut it = self.dims.iter().map(|d| d.val());
        match it.next() {
            Some(first) => it.fold(first, &mut reducer),
            None => T::zero(),
        }
    }

    pub fn sum(&self) -> T {
        self.reduce(|a, b| a + b)
    }

    /// Product of all values; one for an empty tuple.
    pub fn product(&self) -> T {
        if self.is_empty() {
            T::one()
        } else {
            self.reduce(|a, b| a * b)
        }
    }

    pub fn max(&self) -> T {
        self.reduce(|a, b| a.max_of(b))
    }

    pub fn min(&self) -> T {
        self.reduce(|a, b| a.min_of(b))
    }

    // ------------------------------------------------------------------
    // Pairwise and scalar combinators
    // ------------------------------------------------------------------

    /// Apply `combiner` to each pair of same-named values, producing a new tuple.
    ///
    /// With `strict_rhs`, `rhs` must have exactly `self`'s dimensions;
    /// otherwise dims missing from `rhs` pass through unchanged and extra
    /// dims of `rhs` are ignored.
    pub fn try_combine_elements(
        &self,
        rhs: &Tuple<T>,
        strict_rhs: bool,
        mut combiner: impl FnMut(T, T) -> T,
    ) -> Result<Tuple<T>> {
        if strict_rhs && !self.are_dims_same(rhs) {
            return Err(self.mismatch(rhs));
        }
        let mut out = self.clone();
        for d in out.dims.iter_mut() {
            if let Some(&r) = rhs.lookup_name(d.name()) {
                d.set_val(combiner(d.val(), r));
            }
        }
        Ok(out)
    }

    /// # Panics
    /// Panics on a strict dimension mismatch.
    pub fn combine_elements(
        &self,
        rhs: &Tuple<T>,
        strict_rhs: bool,
        combiner: impl FnMut(T, T) -> T,
    ) -> Tuple<T> {
        match self.try_combine_elements(rhs, strict_rhs, combiner) {
            Ok(t) => t,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn add_elements(&self, rhs: &Tuple<T>, strict_rhs: bool) -> Tuple<T> {
        self.combine_elements(rhs, strict_rhs, |a, b| a + b)
    }

    pub fn mult_elements(&self, rhs: &Tuple<T>, strict_rhs: bool) -> Tuple<T> {
        self.combine_elements(rhs, strict_rhs, |a, b| a * b)
    }

    pub fn max_elements(&self, rhs: &Tuple<T>, strict_rhs: bool) -> Tuple<T> {
        self.combine_elements(rhs, strict_rhs, |a, b| a.max_of(b))
    }

    pub fn min_elements(&self, rhs: &Tuple<T>, strict_rhs: bool) -> Tuple<T> {
        self.combine_elements(rhs, strict_rhs, |a, b| a.min_of(b))
    }

    /// Apply `func(value, rhs)` to every value, producing a new tuple.
    pub fn map_elements(&self, rhs: T, mut func: impl FnMut(T, T) -> T) -> Tuple<T> {
        let mut out = self.clone();
        for d in out.dims.iter_mut() {
            d.set_val(func(d.val(), rhs));
        }
        out
    }

    pub fn add_scalar(&self, rhs: T) -> Tuple<T> {
        self.map_elements(rhs, |a, b| a + b)
    }

    pub fn mult_scalar(&self, rhs: T) -> Tuple<T> {
        self.map_elements(rhs, |a, b| a * b)
    }

    pub fn max_scalar(&self, rhs: T) -> Tuple<T> {
        self.map_elements(rhs, |a, b| a.max_of(b))
    }

    pub fn min_scalar(&self, rhs: T) -> Tuple<T> {
        self.map_elements(rhs, |a, b| a.min_of(b))
    }
}

/// Same dims and same value per dim, in any order.
impl<T: DimValue> PartialEq for Tuple<T> {
    fn eq(&self, rhs: &Self) -> bool {
        self.are_dims_same(rhs)
            && self
                .dims
                .iter()
                .all(|d| rhs.lookup_name(d.name()) == Some(&d.val()))
    }
}

/// Shorter tuples first. Equal-length tuples over the same dims compare value
/// by value in `self`'s order; otherwise their dimension-name lists decide.
impl<T: DimValue> PartialOrd for Tuple<T> {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match self.len().cmp(&rhs.len()) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        if self.are_dims_same(rhs) {
            for d in self.dims.iter() {
                let r = rhs.get_val_by_name(d.name());
                match d.val().partial_cmp(&r)? {
                    Ordering::Equal => continue,
                    ord => return Some(ord),
                }
            }
            Some(Ordering::Equal)
        } else {
            Some(
                self.make_dim_str(", ", "", "")
                    .cmp(&rhs.make_dim_str(", ", "", "")),
            )
        }
    }
}

impl<T: DimValue> std::fmt::Debug for Tuple<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tuple")
            .field("dims", &self.dims)
            .field("first_inner", &self.first_inner)
            .finish()
    }
}
