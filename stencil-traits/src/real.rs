//! Floating element contract for folded vector registers.

use std::fmt::{Debug, Display};

/// Element type of a vector register: `f32` or `f64`.
///
/// Each real type is paired with an unsigned control integer of the same
/// width. Permute controls are carried in a register's lanes and read back
/// through that integer view, so the pairing must be bit-exact (`Pod` on both
/// sides).
pub trait Real:
    num_traits::Float
    + bytemuck::Pod
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + std::ops::AddAssign
    + std::ops::SubAssign
    + std::ops::MulAssign
    + std::ops::DivAssign
    + 'static
{
    /// Same-width unsigned integer used for lane control words.
    type Ctrl: num_traits::PrimInt + bytemuck::Pod + Into<u64> + Default + Debug + Display + Send + Sync;

    /// Element width in bytes (4 or 8).
    const BYTES: usize;

    /// Short type name used in diagnostics.
    const NAME: &'static str;

    /// Bit pattern of `self` as a control word.
    fn to_ctrl(self) -> Self::Ctrl;

    /// Real whose bit pattern is `ctrl`.
    fn from_ctrl(ctrl: Self::Ctrl) -> Self;

    /// Control word holding the integer `v` (truncated to the control width).
    fn ctrl_from_u64(v: u64) -> Self::Ctrl;
}

impl Real for f32 {
    type Ctrl = u32;
    const BYTES: usize = 4;
    const NAME: &'static str = "f32";

    #[inline(always)]
    fn to_ctrl(self) -> u32 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_ctrl(ctrl: u32) -> Self {
        f32::from_bits(ctrl)
    }

    #[inline(always)]
    fn ctrl_from_u64(v: u64) -> u32 {
        v as u32
    }
}

impl Real for f64 {
    type Ctrl = u64;
    const BYTES: usize = 8;
    const NAME: &'static str = "f64";

    #[inline(always)]
    fn to_ctrl(self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_ctrl(ctrl: u64) -> Self {
        f64::from_bits(ctrl)
    }

    #[inline(always)]
    fn ctrl_from_u64(v: u64) -> u64 {
        v
    }
}
