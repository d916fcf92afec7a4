//! # Error Types
//!
//! Error handling for snapshot decoding and debug-message tooling.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! The layouts themselves have no runtime failure modes: a snapshot is a plain
//! bit pattern and every bit pattern is accepted. Errors only come from the
//! byte-level helpers built around them (dump decoding, stub encoding, object
//! scanning and patching).

use thiserror::Error;

use crate::types::Architecture;

/// Main error type for regsnap operations
///
/// ## Error Categories
///
/// 1. **Dump errors**: Truncated
/// 2. **Message errors**: InvalidMessage
/// 3. **Argument errors**: InvalidArgument (alignment, offsets, architecture names)
/// 4. **Object file errors**: Object
/// 5. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SnapshotError
{
    /// A raw dump is shorter than the snapshot layout it should contain
    ///
    /// Trailing bytes are ignored when decoding, missing ones are not.
    #[error("Truncated {arch} snapshot: expected {expected} bytes, got {actual}")]
    Truncated
    {
        /// Layout that was being decoded
        arch: Architecture,
        /// Size of that layout in bytes
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Text cannot be carried by a debug-message stub, or bytes are not a valid payload
    #[error("Invalid debug message: {0}")]
    InvalidMessage(String),

    /// Invalid argument passed to a helper
    ///
    /// Examples:
    /// - Alignment that is not a power of two
    /// - Stub offset that is not 4-byte aligned or runs past the image
    /// - Unknown architecture name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The object file could not be parsed or a section could not be read
    #[error("Object file error: {0}")]
    Object(#[from] object::Error),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SnapshotError>`
///
/// ```rust
/// use regsnap_core::error::SnapshotResult;
/// fn foo() -> SnapshotResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;
