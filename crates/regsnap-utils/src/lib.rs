//! # regsnap Utilities
//!
//! Shared helpers for the regsnap tools: `tracing` based logging setup and
//! hex formatting / number parsing for the command line.

pub mod hex;
pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with_config, init_logging_with_level, LogConfig, LogFormat, LogLevel, LoggingError,
    LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
