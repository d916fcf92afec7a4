//! # Debug Message Wire Format
//!
//! Encoding of the debug-console messages that [`debug_message!`](crate::debug_message)
//! embeds in the instruction stream, as recognised by the no$gba emulator
//! family.
//!
//! ## Payload
//!
//! ```text
//! +0  u16  0x6464  (tag, little-endian "dd")
//! +2  u16  0x0000
//! +4  ...  message text
//!      u8  0       (terminator)
//!      ..  0-3 zero bytes of padding, total length a multiple of 4
//! ```
//!
//! The payload is always preceded by a `mov r12, r12` marker and a branch over
//! it; see [`arm`] for the byte-level form of that sequence.
//!
//! ## Frame token
//!
//! The injector prefixes every message with [`FRAME_PREFIX`]. The emulator
//! replaces `%frame%` with the current frame/address when it prints the
//! message; this crate never interprets or substitutes it.
//!
//! The constants and the `const fn` text checks are available without `std`;
//! [`DebugMessage`] and the payload codec need the `std` feature.

pub mod arm;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(feature = "std")]
use crate::error::{SnapshotError, SnapshotResult};

/// Tag that opens every payload.
pub const MESSAGE_TAG: u16 = 0x6464;

/// Placeholder the emulator substitutes with the current frame.
pub const FRAME_TOKEN: &str = "%frame%";

/// Prefix the injector puts in front of every message.
pub const FRAME_PREFIX: &str = "%frame%: ";

/// Size of the tag plus the zero half-word that follows it.
pub const HEADER_LEN: usize = 4;

/// Length of the encoded payload for `text_len` bytes of text.
#[must_use]
pub const fn payload_len(text_len: usize) -> usize
{
    (HEADER_LEN + text_len + 1 + 3) & !3
}

/// A decoded debug message
///
/// `text` is exactly what sits between the header and the terminator,
/// frame token included.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebugMessage
{
    /// Message text as stored in the stream
    pub text: String,
}

#[cfg(feature = "std")]
impl DebugMessage
{
    /// Wrap message text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self
    {
        Self { text: text.into() }
    }

    /// `true` if the text contains the frame placeholder anywhere.
    #[must_use]
    pub fn has_frame_token(&self) -> bool
    {
        self.text.contains(FRAME_TOKEN)
    }

    /// Text with the injector's frame prefix removed, if present.
    #[must_use]
    pub fn body(&self) -> &str
    {
        self.text.strip_prefix(FRAME_PREFIX).unwrap_or(&self.text)
    }

    /// Encode this message as a payload.
    ///
    /// ## Errors
    ///
    /// See [`encode_payload`].
    pub fn encode(&self) -> SnapshotResult<Vec<u8>>
    {
        encode_payload(&self.text)
    }
}

#[cfg(feature = "std")]
impl fmt::Display for DebugMessage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.text)
    }
}

/// Encode `text` verbatim as a payload (header, text, terminator, padding).
///
/// ## Errors
///
/// [`SnapshotError::InvalidMessage`] if the text contains a NUL byte, which would
/// end the message early.
///
/// ## Example
///
/// ```rust
/// use regsnap_core::message::encode_payload;
///
/// let payload = encode_payload("hi").unwrap();
/// assert_eq!(payload, [0x64, 0x64, 0x00, 0x00, b'h', b'i', 0, 0]);
/// ```
#[cfg(feature = "std")]
pub fn encode_payload(text: &str) -> SnapshotResult<Vec<u8>>
{
    if text.as_bytes().contains(&0) {
        return Err(SnapshotError::InvalidMessage("text contains a NUL byte".to_string()));
    }

    let total = payload_len(text.len());
    let mut payload = Vec::with_capacity(total);
    payload.extend_from_slice(&MESSAGE_TAG.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(text.as_bytes());
    payload.resize(total, 0);
    Ok(payload)
}

/// Decode a payload at the start of `bytes`.
///
/// Returns the message and the number of bytes the payload occupies, padding
/// included. Text that is not valid UTF-8 is decoded lossily.
///
/// ## Errors
///
/// [`SnapshotError::InvalidMessage`] if the header is wrong, the text is not
/// terminated, or the padding runs past the end of `bytes`.
#[cfg(feature = "std")]
pub fn decode_payload(bytes: &[u8]) -> SnapshotResult<(DebugMessage, usize)>
{
    let header = bytes
        .get(..HEADER_LEN)
        .ok_or_else(|| SnapshotError::InvalidMessage(format!("{} bytes is too short for a header", bytes.len())))?;

    let tag = u16::from_le_bytes([header[0], header[1]]);
    if tag != MESSAGE_TAG {
        return Err(SnapshotError::InvalidMessage(format!("bad tag {tag:#06x}")));
    }
    let reserved = u16::from_le_bytes([header[2], header[3]]);
    if reserved != 0 {
        return Err(SnapshotError::InvalidMessage(format!("non-zero reserved half-word {reserved:#06x}")));
    }

    let body = &bytes[HEADER_LEN..];
    let text_len = body
        .iter()
        .position(|&byte| byte == 0)
        .ok_or_else(|| SnapshotError::InvalidMessage("unterminated text".to_string()))?;

    let consumed = payload_len(text_len);
    if consumed > bytes.len() {
        return Err(SnapshotError::InvalidMessage(format!(
            "padding needs {consumed} bytes, only {} available",
            bytes.len()
        )));
    }

    let text = String::from_utf8_lossy(&body[..text_len]).into_owned();
    Ok((DebugMessage { text }, consumed))
}

/// First byte of `text` that an inline assembler string directive cannot carry verbatim.
///
/// Quotes and backslashes would need assembler escapes, braces are operand
/// placeholders in `asm!` templates, and NUL or line breaks would split the
/// directive.
#[must_use]
pub const fn unsupported_byte(text: &str) -> Option<u8>
{
    let bytes = text.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'"' | b'\\' | b'{' | b'}' | 0 | b'\n' | b'\r' => return Some(bytes[index]),
            _ => index += 1,
        }
    }
    None
}

/// Compile-time check used by [`debug_message!`](crate::debug_message).
///
/// Evaluated in a `const` item, so a bad literal fails the build in every
/// configuration, including the one where the macro emits nothing.
///
/// ## Panics
///
/// If [`unsupported_byte`] finds anything.
pub const fn check_injectable(text: &str)
{
    if unsupported_byte(text).is_some() {
        panic!("debug message text cannot contain quotes, backslashes, braces, NUL, or line breaks");
    }
}
