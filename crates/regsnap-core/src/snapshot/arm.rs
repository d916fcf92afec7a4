//! # 32-bit ARM Snapshot
//!
//! Register file pushed by a 32-bit ARM trap stub:
//!
//! ```text
//! Offset 0:       CPSR
//! Offset 4-52:    R0-R12 (13 registers)
//! Offset 56:      LR (R14)
//! Offset 60:      SP (R13)
//! Total: 16 words = 64 bytes
//! ```
//!
//! The stub stores the interrupted SP first, then `push {r0-r12, lr}`, then the
//! CPSR, which is why LR sits *below* SP here even though R13 < R14.

use crate::types::Architecture;

/// 32-bit ARM register snapshot
#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ArmSnapshot
{
    /// Current Program Status Register
    pub cpsr: u32,
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r4: u32,
    pub r5: u32,
    pub r6: u32,
    pub r7: u32,
    pub r8: u32,
    pub r9: u32,
    pub r10: u32,
    pub r11: u32,
    pub r12: u32,
    /// Link register (R14)
    pub lr: u32,
    /// Stack pointer (R13) at the time of the trap
    pub sp: u32,
}

const _: () = assert!(core::mem::size_of::<ArmSnapshot>() == Architecture::Arm.snapshot_size());
const _: () = assert!(core::mem::align_of::<ArmSnapshot>() == 4);

snapshot_layout! {
    ArmSnapshot, Architecture::Arm, sp = sp, flags = cpsr;
    cpsr: u32 => Flags,
    r0: u32 => General,
    r1: u32 => General,
    r2: u32 => General,
    r3: u32 => General,
    r4: u32 => General,
    r5: u32 => General,
    r6: u32 => General,
    r7: u32 => General,
    r8: u32 => General,
    r9: u32 => General,
    r10: u32 => General,
    r11: u32 => General,
    r12: u32 => General,
    lr: u32 => General ["r14"],
    sp: u32 => General ["r13"],
}

impl ArmSnapshot
{
    /// R13, the same storage as [`sp`](Self::sp).
    #[must_use]
    pub const fn r13(&self) -> u32
    {
        self.sp
    }

    /// Write R13 / SP.
    pub fn set_r13(&mut self, value: u32)
    {
        self.sp = value;
    }

    /// R14, the same storage as [`lr`](Self::lr).
    #[must_use]
    pub const fn r14(&self) -> u32
    {
        self.lr
    }

    /// Write R14 / LR.
    pub fn set_r14(&mut self, value: u32)
    {
        self.lr = value;
    }

    /// General register `r0`..`r12` by number.
    ///
    /// 13 and 14 resolve to SP and LR; anything above is `None` (the PC is not
    /// part of the snapshot).
    #[must_use]
    pub const fn gpr(&self, index: usize) -> Option<u32>
    {
        Some(match index {
            0 => self.r0,
            1 => self.r1,
            2 => self.r2,
            3 => self.r3,
            4 => self.r4,
            5 => self.r5,
            6 => self.r6,
            7 => self.r7,
            8 => self.r8,
            9 => self.r9,
            10 => self.r10,
            11 => self.r11,
            12 => self.r12,
            13 => self.sp,
            14 => self.lr,
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
        let mut snapshot = ArmSnapshot::default();
        snapshot.set_r13(0x2000_0000);
        snapshot.lr = 0x0800_1234;
        assert_eq!(snapshot.sp, 0x2000_0000);
        assert_eq!(snapshot.r14(), 0x0800_1234);
        assert_eq!(snapshot.gpr(13), Some(0x2000_0000));
        assert_eq!(snapshot.gpr(14), Some(0x0800_1234));
        assert_eq!(snapshot.gpr(15), None);
    }

    #[test]
    fn test_link_register_precedes_stack_pointer()
    {
        let lr = ArmSnapshot::field("r14").unwrap();
        let sp = ArmSnapshot::field("r13").unwrap();
        assert_eq!(lr.offset, 56);
        assert_eq!(sp.offset, 60);
    }
}
