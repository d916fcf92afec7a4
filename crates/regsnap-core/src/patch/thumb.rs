//! # Thumb Patch Sequences
//!
//! 16-bit Thumb counterparts of the [`arm`](super::arm) helpers, usable on
//! ARMv4T (no Thumb-2 instructions).
//!
//! A Thumb `b` reaches only ±2 KiB and `bl` ±4 MiB. Beyond that the far forms
//! spill `r0`/`r1`, load the target from a literal word and `pop` it into `pc`.
//! The literal must be word-aligned, so the far forms grow by one `mov r8, r8`
//! when `from` would leave it on a half-word.
//!
//! Addresses written into literals carry the Thumb bit. `pop {pc}` ignores it
//! on ARMv4T and uses it to stay in Thumb state on later cores.

/// `mov r8, r8`
pub const NOP: u16 = 0x46C0;

/// Reach of a 16-bit `b` in bytes, measured from the pipelined PC.
pub const BRANCH_RANGE: i64 = 1 << 11;

/// Reach of `bl` in bytes, measured from the pipelined PC.
pub const BRANCH_LINK_RANGE: i64 = 1 << 22;

/// Bytes [`push_all_regs`] reserves: the same frame as the A32 form, with only
/// R0-R7 filled in.
pub const SAVED_FRAME_LEN: usize = 64;

const BRANCH: u16 = 0xE000;
const BRANCH_LINK_HIGH: u16 = 0xF000;
const BRANCH_LINK_LOW: u16 = 0xF800;
const IMM11_MASK: i64 = 0x7FF;

const PUSH_R0_R1: u16 = 0xB403;
const POP_R0_PC: u16 = 0xBD01;
const LDR_R0_LITERAL: u16 = 0x4801; // ldr r0, [pc, #4]
const STR_R0_SP_4: u16 = 0x9001; // str r0, [sp, #4]
const MOV_R0_PC: u16 = 0x4678;
const ADDS_R0: u16 = 0x3000;
const MOV_LR_R0: u16 = 0x4686;

const PUSH_ALL: [u16; 3] = [
    0xB087, // sub sp, #0x1c (r8-r12, lr, sp slots)
    0xB4FF, // push {r0-r7}
    0xB081, // sub sp, #4 (cpsr slot)
];

const POP_ALL: [u16; 3] = [
    0xB001, // add sp, #4
    0xBCFF, // pop {r0-r7}
    0xB007, // add sp, #0x1c
];

fn halfwords(halfwords: &[u16]) -> Vec<u8>
{
    halfwords.iter().flat_map(|half| half.to_le_bytes()).collect()
}

const fn delta(from: u32, to: u32) -> i64
{
    (to & !1) as i64 - from as i64 - 4
}

/// `true` if a 16-bit `b` at `from` can reach `to` directly.
#[must_use]
pub const fn branch_in_range(from: u32, to: u32) -> bool
{
    let delta = delta(from, to);
    from % 2 == 0 && delta >= -BRANCH_RANGE && delta < BRANCH_RANGE
}

/// `true` if a `bl` pair at `from` can reach `to` directly.
#[must_use]
pub const fn branch_link_in_range(from: u32, to: u32) -> bool
{
    let delta = delta(from, to);
    from % 2 == 0 && delta >= -BRANCH_LINK_RANGE && delta < BRANCH_LINK_RANGE
}

/// Encode a 16-bit unconditional `b` at `from` that lands on `to`.
///
/// The offset is relative to `from + 4` in half-words; only 11 bits are kept.
#[must_use]
pub const fn encode_branch(from: u32, to: u32) -> u16
{
    BRANCH | ((delta(from, to) >> 1) & IMM11_MASK) as u16
}

/// Encode the two half-words of a `bl` at `from` that calls `to`.
#[must_use]
pub const fn encode_branch_link(from: u32, to: u32) -> [u16; 2]
{
    let delta = delta(from, to);
    [
        BRANCH_LINK_HIGH | ((delta >> 12) & IMM11_MASK) as u16,
        BRANCH_LINK_LOW | ((delta >> 1) & IMM11_MASK) as u16,
    ]
}

/// Half-word of padding needed so a literal placed at `at` is word-aligned.
const fn literal_padding(at: u32) -> usize
{
    if at % 4 == 0 {
        0
    } else {
        2
    }
}

fn with_literal(mut code: Vec<u8>, from: u32, to: u32) -> Vec<u8>
{
    let at = from.wrapping_add(code.len() as u32);
    if literal_padding(at) != 0 {
        code.extend_from_slice(&NOP.to_le_bytes());
    }
    code.extend_from_slice(&(to | 1).to_le_bytes());
    code
}

/// Unconditional jump from `from` to `to`: 2 bytes near, 12 or 14 bytes far.
#[must_use]
pub fn jump_patch(from: u32, to: u32) -> Vec<u8>
{
    if branch_in_range(from, to) {
        return halfwords(&[encode_branch(from, to)]);
    }
    let code = halfwords(&[PUSH_R0_R1, LDR_R0_LITERAL, STR_R0_SP_4, POP_R0_PC]);
    with_literal(code, from, to)
}

/// Call from `from` to `to` that returns, in Thumb state, to the first byte
/// after the patch: 4 bytes near, 18 or 20 bytes far.
#[must_use]
pub fn call_patch(from: u32, to: u32) -> Vec<u8>
{
    if branch_link_in_range(from, to) {
        return halfwords(&encode_branch_link(from, to));
    }

    // `mov r0, pc` reads from + 6; the patch ends 14 bytes in, plus padding and the literal.
    let padding = literal_padding(from.wrapping_add(14));
    let return_offset = (14 + padding + 4 - 6 + 1) as u16;
    let code = halfwords(&[
        PUSH_R0_R1,
        MOV_R0_PC,
        ADDS_R0 | return_offset,
        MOV_LR_R0,
        LDR_R0_LITERAL,
        STR_R0_SP_4,
        POP_R0_PC,
    ]);
    with_literal(code, from, to)
}

/// `count` no-op instructions.
#[must_use]
pub fn nop_patch(count: usize) -> Vec<u8>
{
    NOP.to_le_bytes().repeat(count)
}

/// Save R0-R7 into an [`ArmSnapshot`](crate::snapshot::ArmSnapshot)-shaped
/// frame on the stack. The CPSR and high-register slots are left unwritten.
#[must_use]
pub fn push_all_regs() -> Vec<u8>
{
    halfwords(&PUSH_ALL)
}

/// Undo [`push_all_regs`].
#[must_use]
pub fn pop_all_regs() -> Vec<u8>
{
    halfwords(&POP_ALL)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn half_at(bytes: &[u8], index: usize) -> u16
    {
        u16::from_le_bytes([bytes[index * 2], bytes[index * 2 + 1]])
    }

    fn halves(bytes: &[u8]) -> Vec<u16>
    {
        (0..bytes.len() / 2).map(|index| half_at(bytes, index)).collect()
    }

    #[test]
    fn test_nop_is_mov_r8_r8()
    {
        assert_eq!(nop_patch(2), [0xC0, 0x46, 0xC0, 0x46]);
    }

    #[test]
    fn test_branch_known_values()
    {
        // b . is -4 bytes from the pipelined PC
        assert_eq!(encode_branch(0x100, 0x100), 0xE7FE);
        assert_eq!(encode_branch(0, 4), 0xE000);
        assert_eq!(jump_patch(0x200, 0x208), [0x02, 0xE0]);
    }

    #[test]
    fn test_near_range_is_two_kib()
    {
        assert!(branch_in_range(0, 4 + 2046));
        assert!(!branch_in_range(0, 4 + 2048));
        assert!(branch_in_range(2044, 0));
        assert!(!branch_in_range(2046, 0));
        // the Thumb bit on the target does not matter
        assert!(branch_in_range(0, 0x101));
    }

    #[test]
    fn test_branch_link_known_values()
    {
        assert_eq!(encode_branch_link(0, 0x1000), [0xF000, 0xFFFE]);
        assert_eq!(encode_branch_link(0x1000, 0), [0xF7FE, 0xFFFE]);
        assert!(branch_link_in_range(0, 0x003F_F000));
        assert!(!branch_link_in_range(0, 0x0080_0000));
    }

    #[test]
    fn test_far_jump_aligned_start()
    {
        let patch = jump_patch(0, 0x0800_1234);
        assert_eq!(patch.len(), 12);
        assert_eq!(halves(&patch[..8]), [0xB403, 0x4801, 0x9001, 0xBD01]);
        assert_eq!(&patch[8..], &0x0800_1235u32.to_le_bytes());
    }

    #[test]
    fn test_far_jump_pads_literal_to_word()
    {
        let patch = jump_patch(2, 0x0800_1234);
        assert_eq!(patch.len(), 14);
        assert_eq!(half_at(&patch, 4), NOP);
        // literal at address 12, a word boundary
        assert_eq!(&patch[10..], &0x0800_1235u32.to_le_bytes());
    }

    #[test]
    fn test_far_call_returns_past_literal()
    {
        let aligned = call_patch(0, 0x0800_0000);
        assert_eq!(aligned.len(), 20);
        assert_eq!(
            halves(&aligned[..16]),
            [0xB403, 0x4678, 0x300F, 0x4686, 0x4801, 0x9001, 0xBD01, NOP]
        );
        assert_eq!(&aligned[16..], &0x0800_0001u32.to_le_bytes());

        let unaligned = call_patch(2, 0x0800_0000);
        assert_eq!(unaligned.len(), 18);
        // from + 6 + 13 = from + 18 + Thumb bit
        assert_eq!(half_at(&unaligned, 2), 0x300D);
        assert_eq!(&unaligned[14..], &0x0800_0001u32.to_le_bytes());
    }

    #[test]
    fn test_register_save_and_restore()
    {
        assert_eq!(halves(&push_all_regs()), [0xB087, 0xB4FF, 0xB081]);
        assert_eq!(halves(&pop_all_regs()), [0xB001, 0xBCFF, 0xB007]);
        // 0x1c + 8 registers + cpsr slot
        assert_eq!(0x1c + 8 * 4 + 4, SAVED_FRAME_LEN);
    }
}
