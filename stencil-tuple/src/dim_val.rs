//! One named dimension value.

use std::cmp::Ordering;
use std::fmt;

use stencil_traits::DimValue;

use crate::names::DimName;

/// A `(name, value)` pair.
///
/// Used both as a tuple element and on its own as a direction vector, where
/// the name picks an axis and the sign of the value a traversal direction.
#[derive(Clone, PartialEq)]
pub struct DimVal<T> {
    name: DimName,
    val: T,
}

impl<T: DimValue> DimVal<T> {
    /// Create a pair with the given value.
    pub fn new(name: &DimName, val: T) -> Self {
        Self {
            name: name.clone(),
            val,
        }
    }

    /// Create a pair with value zero.
    pub fn named(name: &DimName) -> Self {
        Self::new(name, T::zero())
    }

    #[inline]
    pub fn name(&self) -> &DimName {
        &self.name
    }

    #[inline]
    pub fn set_name(&mut self, name: &DimName) {
        self.name = name.clone();
    }

    #[inline]
    pub fn val(&self) -> T {
        self.val
    }

    #[inline]
    pub fn val_mut(&mut self) -> &mut T {
        &mut self.val
    }

    #[inline]
    pub fn set_val(&mut self, val: T) {
        self.val = val;
    }
}

impl<T> DimVal<T> {
    #[inline]
    pub(crate) fn val_ref(&self) -> &T {
        &self.val
    }
}

/// Ordered by value, ties broken by name identity.
impl<T: DimValue> PartialOrd for DimVal<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.val.partial_cmp(&other.val)? {
            Ordering::Equal => Some(self.name.cmp(&other.name)),
            ord => Some(ord),
        }
    }
}

impl<T: DimValue> fmt::Display for DimVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.val)
    }
}

impl<T: DimValue> fmt::Debug for DimVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.val)
    }
}
