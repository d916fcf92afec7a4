//! # x86 Snapshot
//!
//! ```text
//! Offset 0-112:   XMM7 .. XMM0 (8 × 16 bytes, highest index first)
//! Offset 128:     EFLAGS
//! Offset 132-160: EDI, ESI, EBP, ESP, EBX, EDX, ECX, EAX
//! Total: 164 bytes
//! ```
//!
//! The general registers are in `pushad` order as seen from the lowest address,
//! so `esp` is the value `pushad` saved, not a separate slot.

use super::XmmRegister;
use crate::types::Architecture;

/// x86 register snapshot
#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct X86Snapshot
{
    pub xmm7: XmmRegister,
    pub xmm6: XmmRegister,
    pub xmm5: XmmRegister,
    pub xmm4: XmmRegister,
    pub xmm3: XmmRegister,
    pub xmm2: XmmRegister,
    pub xmm1: XmmRegister,
    pub xmm0: XmmRegister,
    pub eflags: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
}

const _: () = assert!(core::mem::size_of::<X86Snapshot>() == Architecture::X86.snapshot_size());
const _: () = assert!(core::mem::align_of::<X86Snapshot>() == 4);

snapshot_layout! {
    X86Snapshot, Architecture::X86, sp = esp, flags = eflags;
    xmm7: XmmRegister => Vector,
    xmm6: XmmRegister => Vector,
    xmm5: XmmRegister => Vector,
    xmm4: XmmRegister => Vector,
    xmm3: XmmRegister => Vector,
    xmm2: XmmRegister => Vector,
    xmm1: XmmRegister => Vector,
    xmm0: XmmRegister => Vector,
    eflags: u32 => Flags,
    edi: u32 => General,
    esi: u32 => General,
    ebp: u32 => General,
    esp: u32 => General,
    ebx: u32 => General,
    edx: u32 => General,
    ecx: u32 => General,
    eax: u32 => General,
}

impl X86Snapshot
{
    /// XMM register by architectural index (0..=7).
    #[must_use]
    pub const fn xmm(&self, index: usize) -> Option<XmmRegister>
    {
        Some(match index {
            0 => self.xmm0,
            1 => self.xmm1,
            2 => self.xmm2,
            3 => self.xmm3,
            4 => self.xmm4,
            5 => self.xmm5,
            6 => self.xmm6,
            7 => self.xmm7,
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
    fn test_xmm_by_index()
    {
        let snapshot = X86Snapshot {
            xmm3: XmmRegister::new(3, 0xa3),
            ..Default::default()
        };
        assert_eq!(snapshot.xmm(3), Some(XmmRegister::new(3, 0xa3)));
        assert_eq!(snapshot.xmm(8), None);
    }

    #[test]
    fn test_flags_and_stack_pointer_widen()
    {
        let snapshot = X86Snapshot {
            eflags: 0x246,
            esp: 0xbfff_f000,
            ..Default::default()
        };
        assert_eq!(snapshot.flags(), 0x246);
        assert_eq!(snapshot.stack_pointer(), 0xbfff_f000);
    }
}
