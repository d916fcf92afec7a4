//! # Types
//!
//! Small shared types used by the snapshot layouts and the tooling around them.

pub mod arch;

pub use arch::Architecture;
