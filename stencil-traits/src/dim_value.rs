//! Value bounds for named-dimension tuples.

use std::fmt::{Debug, Display};

/// Shared trait bounds for every value type a `Tuple` can hold.
///
/// The compiler front end instantiates tuples both with runtime index types
/// (`i64`, `usize`) and with its own symbolic integer types, so the bound is a
/// blanket impl over the arithmetic contract rather than a closed list.
/// `ToPrimitive` is only consulted by `layout`, where values become addresses.
pub trait DimValue:
    Copy
    + PartialEq
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + num_traits::Zero
    + num_traits::One
    + num_traits::ToPrimitive
    + Display
    + Debug
{
    /// Larger of two values (`self` on ties or when unordered).
    #[inline]
    fn max_of(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Smaller of two values (`self` on ties or when unordered).
    #[inline]
    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl<T> DimValue for T where
    T: Copy
        + PartialEq
        + PartialOrd
        + std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::ops::Mul<Output = T>
        + std::ops::Div<Output = T>
        + num_traits::Zero
        + num_traits::One
        + num_traits::ToPrimitive
        + Display
        + Debug
{
}
