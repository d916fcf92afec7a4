//! # regsnap-core
//!
//! Trap-time register snapshot layouts and in-stream debug messages.
//!
//! This crate provides:
//! - [`RegisterSnapshot`]: the exact in-memory layout a low-level trap or
//!   exception handler writes when it saves the CPU's registers, for ARM,
//!   ARM64, x86 and x86-64
//! - [`XmmRegister`]: a 128-bit SSE register viewed as two 64-bit lanes
//! - [`debug_message!`]: emits a no$gba-style debug-console message directly
//!   into the instruction stream (ARM, behind the `debug-messages` feature)
//!
//! plus the byte-level tooling around them: decoding raw snapshot dumps
//! ([`AnySnapshot`]), encoding and recognising message stubs ([`message`]),
//! finding them in compiled images ([`scan`]), and patching them into
//! existing ones ([`patch`]).
//!
//! ## Platform Support
//!
//! All four layouts are always compiled, so any host can decode dumps taken on
//! any target. [`RegisterSnapshot`] names the layout of the architecture being
//! compiled for; building for an architecture outside the four is a compile
//! error.
//!
//! ## `no_std`
//!
//! The default `std` feature enables the byte-level tooling ([`AnySnapshot`],
//! the payload codec, [`scan`], [`patch`]) and the `object`/`tracing`
//! dependencies behind it. With `default-features = false` the crate is
//! `#![no_std]` and keeps what a trap handler or firmware image links against:
//! the layouts with their field tables, [`XmmRegister`], the message constants
//! and text checks, and [`debug_message!`].
//!
//! ## Unsafe code
//!
//! None in this crate. The layouts are plain `#[repr(C)]` data and alias
//! registers are accessor methods. The only `unsafe` is the `asm!` block that
//! [`debug_message!`] expands to in the calling crate.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
pub mod error;
pub mod inject;
pub mod message;
#[cfg(feature = "std")]
pub mod patch;
#[cfg(feature = "std")]
pub mod scan;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
#[cfg(feature = "std")]
pub use error::{SnapshotError, SnapshotResult};
#[cfg(feature = "std")]
pub use message::DebugMessage;
#[cfg(feature = "std")]
pub use snapshot::AnySnapshot;
pub use snapshot::{RegisterField, RegisterSnapshot, RegisterValue, SnapshotLayout, XmmRegister};
pub use types::Architecture;
