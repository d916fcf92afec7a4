//! # Stub Patching
//!
//! Helpers for placing debug-message stubs into an existing binary image:
//! locating zero-filled gaps big enough to hold one, and writing the encoded
//! stub bytes at a chosen offset.
//!
//! [`arm`] and [`thumb`] build the instruction sequences used to divert
//! control flow into such a gap (jumps, calls, no-op fills, register
//! save/restore). They are fixed encodings, so no assembler is involved.

pub mod arm;
pub mod thumb;

use tracing::debug;

use crate::error::{SnapshotError, SnapshotResult};
use crate::message::arm::encode_stub;

/// A run of zero bytes in an image, already trimmed to the requested alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySpace
{
    /// Aligned start offset
    pub offset: usize,
    /// Usable size, a multiple of the alignment
    pub size: usize,
}

/// Find zero-filled gaps of at least `min_size` bytes.
///
/// Each gap's start is rounded up and its size rounded down to `align`; gaps
/// that vanish after rounding are dropped. Results are sorted largest first,
/// ties in file order.
///
/// ## Errors
///
/// [`SnapshotError::InvalidArgument`] if `align` is not a power of two.
///
/// ## Example
///
/// ```rust
/// use regsnap_core::patch::find_empty_space;
///
/// let mut image = vec![0xffu8; 64];
/// image[8..40].fill(0);
/// let spaces = find_empty_space(&image, 16, 16).unwrap();
/// assert_eq!(spaces.len(), 1);
/// assert_eq!((spaces[0].offset, spaces[0].size), (16, 16));
/// ```
pub fn find_empty_space(bytes: &[u8], min_size: usize, align: usize) -> SnapshotResult<Vec<EmptySpace>>
{
    if !align.is_power_of_two() {
        return Err(SnapshotError::InvalidArgument(format!("alignment {align} is not a power of two")));
    }
    let min_size = min_size.max(1);
    let mask = !(align - 1);

    let mut spaces = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] != 0 {
            index += 1;
            continue;
        }

        let start = index;
        while index < bytes.len() && bytes[index] == 0 {
            index += 1;
        }
        let end = index;

        if end - start < min_size {
            continue;
        }
        let offset = (start + align - 1) & mask;
        if offset >= end {
            continue;
        }
        let size = (end - offset) & mask;
        if size > 0 {
            spaces.push(EmptySpace { offset, size });
        }
    }

    spaces.sort_by(|a, b| b.size.cmp(&a.size));
    debug!(gaps = spaces.len(), min_size, align, "searched image for empty space");
    Ok(spaces)
}

/// Copy `bytes` into `image` at `offset`.
///
/// Returns the number of bytes written.
///
/// ## Errors
///
/// [`SnapshotError::InvalidArgument`] if `offset` is not a multiple of `align`
/// or the bytes do not fit before the end of the image.
pub fn write_patch(image: &mut [u8], offset: usize, bytes: &[u8], align: usize) -> SnapshotResult<usize>
{
    if align == 0 || offset % align != 0 {
        return Err(SnapshotError::InvalidArgument(format!(
            "patch offset {offset:#x} is not {align}-byte aligned"
        )));
    }

    let end = offset
        .checked_add(bytes.len())
        .filter(|&end| end <= image.len())
        .ok_or_else(|| {
            SnapshotError::InvalidArgument(format!(
                "{}-byte patch at {offset:#x} runs past the end of a {}-byte image",
                bytes.len(),
                image.len()
            ))
        })?;

    image[offset..end].copy_from_slice(bytes);
    debug!(offset, len = bytes.len(), "wrote patch");
    Ok(bytes.len())
}

/// Write the stub for `text` into `image` at `offset`.
///
/// The text is used verbatim. Returns the number of bytes written.
///
/// ## Errors
///
/// - [`SnapshotError::InvalidArgument`] if `offset` is not 4-byte aligned or the
///   stub does not fit before the end of the image
/// - [`SnapshotError::InvalidMessage`] if the text cannot be encoded
pub fn write_stub(image: &mut [u8], offset: usize, text: &str) -> SnapshotResult<usize>
{
    if offset % 4 != 0 {
        return Err(SnapshotError::InvalidArgument(format!(
            "stub offset {offset:#x} is not 4-byte aligned"
        )));
    }

    let stub = encode_stub(text)?;
    write_patch(image, offset, &stub, 4)
}
