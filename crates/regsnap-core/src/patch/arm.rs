//! # A32 Patch Sequences
//!
//! Instruction sequences for redirecting ARM-state code, all condition AL and
//! little-endian:
//!
//! | Helper | Near form | Far form |
//! |--------|-----------|----------|
//! | [`jump_patch`] | `b to` | `ldr pc, [pc, #-4]` + literal |
//! | [`call_patch`] | `bl to` | `add lr, pc, #4`, `ldr pc, [pc, #-4]` + literal |
//!
//! The near form is used when the target is word-aligned and within the ±32 MiB
//! reach of a branch. Far forms load `pc` from memory, which also switches to
//! Thumb on ARMv5 and later when the target address has bit 0 set.
//!
//! [`push_all_regs`] and [`pop_all_regs`] save and restore the interrupted
//! state as an [`ArmSnapshot`](crate::snapshot::ArmSnapshot) frame on the stack.

use crate::message::arm::encode_branch;

/// `mov r0, r0`
pub const NOP: u32 = 0xE1A0_0000;

/// `ldr pc, [pc, #-4]`: jump to the word that follows.
pub const LDR_PC_LITERAL: u32 = 0xE51F_F004;

/// `add lr, pc, #4`: return address just past a two-word far call.
pub const ADD_LR_PC_4: u32 = 0xE28F_E004;

const BRANCH_LINK_AL: u32 = 0xEB00_0000;
const OFFSET_MASK: u32 = 0x00FF_FFFF;

/// Reach of `b`/`bl` in bytes, measured from the pipelined PC.
pub const BRANCH_RANGE: i64 = 1 << 25;

/// Bytes [`push_all_regs`] pushes: CPSR, R0-R12, LR and the original SP.
pub const SAVED_FRAME_LEN: usize = 64;

const PUSH_ALL: [u32; 5] = [
    0xE50D_D004, // str sp, [sp, #-4]
    0xE24D_D004, // sub sp, sp, #4
    0xE92D_5FFF, // push {r0-r12, lr}
    0xE10F_0000, // mrs r0, cpsr
    0xE52D_0004, // push {r0}
];

const POP_ALL: [u32; 4] = [
    0xE49D_0004, // pop {r0}
    0xE129_F000, // msr cpsr_fc, r0
    0xE8BD_5FFF, // pop {r0-r12, lr}
    0xE28D_D004, // add sp, sp, #4
];

fn words(words: &[u32]) -> Vec<u8>
{
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// `true` if a `b` or `bl` at `from` can reach `to` directly.
#[must_use]
pub const fn branch_in_range(from: u32, to: u32) -> bool
{
    let delta = to as i64 - from as i64 - 8;
    from % 4 == 0 && to % 4 == 0 && delta >= -BRANCH_RANGE && delta < BRANCH_RANGE
}

/// Encode `bl` located at `from` that calls `to`.
///
/// Same offset rules as [`encode_branch`].
#[must_use]
pub const fn encode_branch_link(from: u32, to: u32) -> u32
{
    BRANCH_LINK_AL | (encode_branch(from, to) & OFFSET_MASK)
}

/// Unconditional jump from `from` to `to`: 4 bytes near, 8 bytes far.
#[must_use]
pub fn jump_patch(from: u32, to: u32) -> Vec<u8>
{
    if branch_in_range(from, to) {
        words(&[encode_branch(from, to)])
    } else {
        words(&[LDR_PC_LITERAL, to])
    }
}

/// Call from `from` to `to` that returns to the first byte after the patch:
/// 4 bytes near, 12 bytes far.
#[must_use]
pub fn call_patch(from: u32, to: u32) -> Vec<u8>
{
    if branch_in_range(from, to) {
        words(&[encode_branch_link(from, to)])
    } else {
        words(&[ADD_LR_PC_4, LDR_PC_LITERAL, to])
    }
}

/// `count` no-op instructions.
#[must_use]
pub fn nop_patch(count: usize) -> Vec<u8>
{
    NOP.to_le_bytes().repeat(count)
}

/// Save every register and the CPSR on the stack.
///
/// Afterwards `sp` points at a [`SAVED_FRAME_LEN`]-byte frame laid out as an
/// [`ArmSnapshot`](crate::snapshot::ArmSnapshot), so `mov r0, sp` hands it to a
/// handler. R0 is clobbered after it has been saved.
#[must_use]
pub fn push_all_regs() -> Vec<u8>
{
    words(&PUSH_ALL)
}

/// Undo [`push_all_regs`], restoring the CPSR and every register.
#[must_use]
pub fn pop_all_regs() -> Vec<u8>
{
    words(&POP_ALL)
}
