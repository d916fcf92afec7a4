//! # x86-64 Snapshot
//!
//! ## Register Layout
//!
//! ```text
//! Offset 0-112:   XMM7 .. XMM0 (8 × 16 bytes, highest index first)
//! Offset 128:     RFLAGS
//! Offset 136-248: R15, R14, R13, R12, R11, R10, R9, R8,
//!                 RDI, RSI, RBP, RBX, RDX, RCX, RAX
//! Offset 256:     RSP
//! Total: 264 bytes
//! ```
//!
//! This is the order a handler produces by pushing RSP, then the general
//! registers from RAX down to R15, then RFLAGS, then spilling XMM0..XMM7 below
//! them, so the lowest address holds XMM7.

use super::XmmRegister;
use crate::types::Architecture;

/// x86-64 register snapshot
#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct X86_64Snapshot
{
    pub xmm7: XmmRegister,
    pub xmm6: XmmRegister,
    pub xmm5: XmmRegister,
    pub xmm4: XmmRegister,
    pub xmm3: XmmRegister,
    pub xmm2: XmmRegister,
    pub xmm1: XmmRegister,
    pub xmm0: XmmRegister,
    pub rflags: u64,
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rbp: u64,
    pub rbx: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rax: u64,
    pub rsp: u64,
}

const _: () = assert!(core::mem::size_of::<X86_64Snapshot>() == Architecture::X86_64.snapshot_size());
const _: () = assert!(core::mem::align_of::<X86_64Snapshot>() == 4);

snapshot_layout! {
    X86_64Snapshot, Architecture::X86_64, sp = rsp, flags = rflags;
    xmm7: XmmRegister => Vector,
    xmm6: XmmRegister => Vector,
    xmm5: XmmRegister => Vector,
    xmm4: XmmRegister => Vector,
    xmm3: XmmRegister => Vector,
    xmm2: XmmRegister => Vector,
    xmm1: XmmRegister => Vector,
    xmm0: XmmRegister => Vector,
    rflags: u64 => Flags,
    r15: u64 => General,
    r14: u64 => General,
    r13: u64 => General,
    r12: u64 => General,
    r11: u64 => General,
    r10: u64 => General,
    r9: u64 => General,
    r8: u64 => General,
    rdi: u64 => General,
    rsi: u64 => General,
    rbp: u64 => General,
    rbx: u64 => General,
    rdx: u64 => General,
    rcx: u64 => General,
    rax: u64 => General,
    rsp: u64 => General,
}

impl X86_64Snapshot
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
    fn test_xmm_by_index_follows_architectural_numbering()
    {
        let snapshot = X86_64Snapshot {
            xmm0: XmmRegister::new(0, 0xa0),
            xmm7: XmmRegister::new(7, 0xa7),
            ..Default::default()
        };
        assert_eq!(snapshot.xmm(0), Some(XmmRegister::new(0, 0xa0)));
        assert_eq!(snapshot.xmm(7), Some(XmmRegister::new(7, 0xa7)));
        assert_eq!(snapshot.xmm(8), None);
    }

    #[test]
    fn test_stack_pointer_is_last()
    {
        let rsp = X86_64Snapshot::FIELDS.last().unwrap();
        assert_eq!(rsp.name, "rsp");
        assert_eq!(rsp.offset, 256);
    }
}
