//! ARM (A32) byte-level form of an injected debug message.
//!
//! ```text
//! +0   e1a0c00c   mov r12, r12        ; marker the emulator watches for
//! +4   eaXXXXXX   b   +8+payload      ; normal execution skips the payload
//! +8   payload                        ; see the parent module
//! ```
//!
//! This is the sequence `debug_message!` makes the assembler emit, produced
//! directly so stubs can be written into existing images and recognised when
//! scanning them. The word encoders work without `std`; building and
//! recognising whole stubs needs it.

#[cfg(feature = "std")]
use super::{decode_payload, encode_payload, DebugMessage};
#[cfg(feature = "std")]
use crate::error::{SnapshotError, SnapshotResult};

/// `mov r12, r12`, condition AL.
pub const MARKER: u32 = 0xE1A0_C00C;

/// `b` with condition AL and a zero offset.
const BRANCH_AL: u32 = 0xEA00_0000;
const BRANCH_MASK: u32 = 0xFF00_0000;
const OFFSET_MASK: u32 = 0x00FF_FFFF;

/// Bytes in front of the payload: the marker and the branch.
pub const PREFIX_LEN: usize = 8;

/// Encode an unconditional A32 branch located at `from` that lands on `to`.
///
/// The offset is relative to `from + 8` (the pipelined PC) in words; only the
/// low 24 bits are kept, so targets more than ±32 MiB away wrap.
#[must_use]
pub const fn encode_branch(from: u32, to: u32) -> u32
{
    let delta = to.wrapping_sub(from).wrapping_sub(8) as i32 >> 2;
    BRANCH_AL | (delta as u32 & OFFSET_MASK)
}

/// Target of an unconditional A32 branch at `from`, or `None` if `word` is
/// not one.
#[must_use]
pub const fn decode_branch(word: u32, from: u32) -> Option<u32>
{
    if word & BRANCH_MASK != BRANCH_AL {
        return None;
    }
    // Sign-extend imm24 and scale to bytes in one go.
    let offset = ((word << 8) as i32) >> 6;
    Some(from.wrapping_add(8).wrapping_add(offset as u32))
}

/// Encode the full stub for `text` (marker, branch, payload).
///
/// The text is used verbatim; prepend [`FRAME_PREFIX`](super::FRAME_PREFIX) to
/// get what the macro emits.
///
/// ## Errors
///
/// Same as [`encode_payload`].
#[cfg(feature = "std")]
pub fn encode_stub(text: &str) -> SnapshotResult<Vec<u8>>
{
    let payload = encode_payload(text)?;
    let end = PREFIX_LEN + payload.len();

    let target = u32::try_from(end)
        .map_err(|_| SnapshotError::InvalidMessage(format!("{} bytes of text is too long", text.len())))?;

    let mut stub = Vec::with_capacity(end);
    stub.extend_from_slice(&MARKER.to_le_bytes());
    stub.extend_from_slice(&encode_branch(4, target).to_le_bytes());
    stub.extend_from_slice(&payload);
    Ok(stub)
}

/// A stub recognised at the start of a buffer.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStub
{
    /// The embedded message
    pub message: DebugMessage,
    /// Total stub length in bytes, marker to branch target
    pub len: usize,
}

/// Recognise a stub at the start of `bytes`.
///
/// Requires the marker, a forward branch, a valid payload, and that the branch
/// lands exactly on the first byte after the payload padding. Anything else
/// (including a marker that is just a real `mov r12, r12`) is `None`.
#[cfg(feature = "std")]
#[must_use]
pub fn decode_stub(bytes: &[u8]) -> Option<DecodedStub>
{
    let marker = u32::from_le_bytes(bytes.get(0..4)?.try_into().ok()?);
    if marker != MARKER {
        return None;
    }

    let branch = u32::from_le_bytes(bytes.get(4..8)?.try_into().ok()?);
    let target = decode_branch(branch, 4)? as usize;

    let (message, consumed) = decode_payload(&bytes[PREFIX_LEN..]).ok()?;
    let len = PREFIX_LEN + consumed;
    (target == len).then_some(DecodedStub { message, len })
}
