//! 128-bit XMM register view used by the x86 and x86-64 snapshots.

use core::fmt;

/// One 128-bit SSE register as two 64-bit lanes
///
/// Each lane is stored once, as its raw `u64` bit pattern, and can be viewed as
/// a double-precision float through [`low_f64`](Self::low_f64) /
/// [`high_f64`](Self::high_f64). The float view is an IEEE-754 bit
/// reinterpretation (`f64::from_bits`), so reading back a written float or
/// integer always observes the same 64 bits, NaN payloads included.
///
/// ## Layout
///
/// ```text
/// offset 0: low  (bits 0..64)
/// offset 8: high (bits 64..128)
/// ```
///
/// The struct is packed to 4 bytes like the snapshots that contain it, so its
/// size is 16 and its alignment 4.
///
/// ## Example
///
/// ```rust
/// use regsnap_core::snapshot::XmmRegister;
///
/// let mut xmm = XmmRegister::default();
/// xmm.set_low_f64(1.5);
/// assert_eq!({ xmm.low }, 1.5f64.to_bits());
/// ```
#[repr(C, packed(4))]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XmmRegister
{
    /// Low 64-bit lane
    pub low: u64,
    /// High 64-bit lane
    pub high: u64,
}

const _: () = assert!(core::mem::size_of::<XmmRegister>() == 16);
const _: () = assert!(core::mem::align_of::<XmmRegister>() == 4);

impl XmmRegister
{
    /// Build a register from its two integer lanes.
    #[must_use]
    pub const fn new(low: u64, high: u64) -> Self
    {
        Self { low, high }
    }

    /// Build a register from two doubles.
    #[must_use]
    pub fn from_f64(low: f64, high: f64) -> Self
    {
        Self::new(low.to_bits(), high.to_bits())
    }

    /// Build a register from its full 128-bit value (low lane = low 64 bits).
    #[must_use]
    pub const fn from_u128(value: u128) -> Self
    {
        Self::new(value as u64, (value >> 64) as u64)
    }

    /// The full 128-bit value.
    #[must_use]
    pub const fn as_u128(self) -> u128
    {
        ((self.high as u128) << 64) | self.low as u128
    }

    /// Low lane viewed as a double.
    #[must_use]
    pub fn low_f64(self) -> f64
    {
        f64::from_bits(self.low)
    }

    /// High lane viewed as a double.
    #[must_use]
    pub fn high_f64(self) -> f64
    {
        f64::from_bits(self.high)
    }

    /// Store a double into the low lane.
    pub fn set_low_f64(&mut self, value: f64)
    {
        self.low = value.to_bits();
    }

    /// Store a double into the high lane.
    pub fn set_high_f64(&mut self, value: f64)
    {
        self.high = value.to_bits();
    }
}

impl fmt::Debug for XmmRegister
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("XmmRegister")
            .field("low", &format_args!("{:#018x}", { self.low }))
            .field("high", &format_args!("{:#018x}", { self.high }))
            .finish()
    }
}

impl fmt::Display for XmmRegister
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:#034x}", self.as_u128())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_u128_lane_split()
    {
        let xmm = XmmRegister::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        assert_eq!({ xmm.low }, 0x8899_aabb_ccdd_eeff);
        assert_eq!({ xmm.high }, 0x0011_2233_4455_6677);
        assert_eq!(xmm.as_u128(), 0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
    }

    #[test]
    fn test_display_is_full_width_hex()
    {
        let xmm = XmmRegister::new(1, 0);
        assert_eq!(xmm.to_string(), "0x00000000000000000000000000000001");
    }
}
