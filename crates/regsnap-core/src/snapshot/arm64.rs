//! # ARM64 Snapshot
//!
//! ## Register Layout
//!
//! ```text
//! Offset 0:       NZCV (condition flags)
//! Offset 8:       XZR slot (alignment only, keeps X0 16-byte aligned)
//! Offset 16-240:  X0-X28 (29 registers)
//! Offset 248:     FP (X29)
//! Offset 256:     LR (X30)
//! Offset 264:     SP (X31)
//! Total: 34 u64s = 272 bytes
//! ```
//!
//! X16 and X17 double as the intra-procedure-call scratch registers IP0/IP1.

use crate::types::Architecture;

/// 64-bit ARM register snapshot
#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Arm64Snapshot
{
    /// Condition flags (N, Z, C, V in bits 31..28)
    pub nzcv: u64,
    /// Alignment slot, never a live register value
    pub xzr: u64,
    pub x0: u64,
    pub x1: u64,
    pub x2: u64,
    pub x3: u64,
    pub x4: u64,
    pub x5: u64,
    pub x6: u64,
    pub x7: u64,
    pub x8: u64,
    pub x9: u64,
    pub x10: u64,
    pub x11: u64,
    pub x12: u64,
    pub x13: u64,
    pub x14: u64,
    pub x15: u64,
    /// IP0
    pub x16: u64,
    /// IP1
    pub x17: u64,
    pub x18: u64,
    pub x19: u64,
    pub x20: u64,
    pub x21: u64,
    pub x22: u64,
    pub x23: u64,
    pub x24: u64,
    pub x25: u64,
    pub x26: u64,
    pub x27: u64,
    pub x28: u64,
    /// Frame pointer (X29)
    pub fp: u64,
    /// Link register (X30)
    pub lr: u64,
    /// Stack pointer (X31 in this layout)
    pub sp: u64,
}

const _: () = assert!(core::mem::size_of::<Arm64Snapshot>() == Architecture::Arm64.snapshot_size());
const _: () = assert!(core::mem::align_of::<Arm64Snapshot>() == 4);

snapshot_layout! {
    Arm64Snapshot, Architecture::Arm64, sp = sp, flags = nzcv;
    nzcv: u64 => Flags,
    xzr: u64 => Padding,
    x0: u64 => General,
    x1: u64 => General,
    x2: u64 => General,
    x3: u64 => General,
    x4: u64 => General,
    x5: u64 => General,
    x6: u64 => General,
    x7: u64 => General,
    x8: u64 => General,
    x9: u64 => General,
    x10: u64 => General,
    x11: u64 => General,
    x12: u64 => General,
    x13: u64 => General,
    x14: u64 => General,
    x15: u64 => General,
    x16: u64 => General ["ip0"],
    x17: u64 => General ["ip1"],
    x18: u64 => General,
    x19: u64 => General,
    x20: u64 => General,
    x21: u64 => General,
    x22: u64 => General,
    x23: u64 => General,
    x24: u64 => General,
    x25: u64 => General,
    x26: u64 => General,
    x27: u64 => General,
    x28: u64 => General,
    fp: u64 => General ["x29"],
    lr: u64 => General ["x30"],
    sp: u64 => General ["x31"],
}

impl Arm64Snapshot
{
    /// IP0, the same storage as [`x16`](Self::x16).
    #[must_use]
    pub const fn ip0(&self) -> u64
    {
        self.x16
    }

    /// Write IP0 / X16.
    pub fn set_ip0(&mut self, value: u64)
    {
        self.x16 = value;
    }

    /// IP1, the same storage as [`x17`](Self::x17).
    #[must_use]
    pub const fn ip1(&self) -> u64
    {
        self.x17
    }

    /// Write IP1 / X17.
    pub fn set_ip1(&mut self, value: u64)
    {
        self.x17 = value;
    }

    /// X29, the same storage as [`fp`](Self::fp).
    #[must_use]
    pub const fn x29(&self) -> u64
    {
        self.fp
    }

    /// Write X29 / FP.
    pub fn set_x29(&mut self, value: u64)
    {
        self.fp = value;
    }

    /// X30, the same storage as [`lr`](Self::lr).
    #[must_use]
    pub const fn x30(&self) -> u64
    {
        self.lr
    }

    /// Write X30 / LR.
    pub fn set_x30(&mut self, value: u64)
    {
        self.lr = value;
    }

    /// X31, the same storage as [`sp`](Self::sp).
    #[must_use]
    pub const fn x31(&self) -> u64
    {
        self.sp
    }

    /// Write X31 / SP.
    pub fn set_x31(&mut self, value: u64)
    {
        self.sp = value;
    }

    /// General register `x0`..`x31` by number, aliases included.
    #[must_use]
    pub const fn gpr(&self, index: usize) -> Option<u64>
    {
        Some(match index {
            0 => self.x0,
            1 => self.x1,
            2 => self.x2,
            3 => self.x3,
            4 => self.x4,
            5 => self.x5,
            6 => self.x6,
            7 => self.x7,
            8 => self.x8,
            9 => self.x9,
            10 => self.x10,
            11 => self.x11,
            12 => self.x12,
            13 => self.x13,
            14 => self.x14,
            15 => self.x15,
            16 => self.x16,
            17 => self.x17,
            18 => self.x18,
            19 => self.x19,
            20 => self.x20,
            21 => self.x21,
            22 => self.x22,
            23 => self.x23,
            24 => self.x24,
            25 => self.x25,
            26 => self.x26,
            27 => self.x27,
            28 => self.x28,
            29 => self.fp,
            30 => self.lr,
            31 => self.sp,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::snapshot::SnapshotLayout;

    #[test]
    fn test_aliases_share_storage()
    {
        let mut snapshot = Arm64Snapshot::default();
        snapshot.set_ip0(0x10);
        snapshot.set_ip1(0x11);
        snapshot.set_x29(0xffff_8000_0000_1000);
        snapshot.lr = 0xffff_0000_0040_0000;
        snapshot.set_x31(0xffff_8000_0000_0ff0);

        assert_eq!({ snapshot.x16 }, 0x10);
        assert_eq!({ snapshot.x17 }, 0x11);
        assert_eq!({ snapshot.fp }, 0xffff_8000_0000_1000);
        assert_eq!(snapshot.x30(), 0xffff_0000_0040_0000);
        assert_eq!({ snapshot.sp }, 0xffff_8000_0000_0ff0);
        assert_eq!(snapshot.gpr(29), Some(0xffff_8000_0000_1000));
        assert_eq!(snapshot.gpr(32), None);
    }

    #[test]
    fn test_padding_slot_sits_between_flags_and_x0()
    {
        let xzr = Arm64Snapshot::field("xzr").unwrap();
        assert_eq!(xzr.offset, 8);
        assert_eq!(xzr.kind, crate::snapshot::FieldKind::Padding);
        assert_eq!(Arm64Snapshot::field("x0").unwrap().offset, 16);
    }
}
