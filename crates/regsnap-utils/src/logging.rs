//! # Logging Utilities
//!
//! Logging setup for the regsnap tools using `tracing`.
//!
//! All output goes to stderr: the CLI prints its results on stdout, and a
//! decoded register dump or hex stub must stay pipeable. Optionally a copy of
//! every event is written to a log file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regsnap_utils::init_logging;
//!
//! // Keep the guard alive for as long as the program logs
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log filter (e.g. `RUST_LOG=debug`, `RUST_LOG=regsnap_core=trace`)
//! - `REGSNAP_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `REGSNAP_LOG_FILE`: Optional log file. A directory gets a dated
//!   `YYYY-MM-DD-regsnap.log` inside it; a file path rolls over daily.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "REGSNAP_LOG_FORMAT";

/// Environment variable naming the optional log file.
pub const FILE_ENV: &str = "REGSNAP_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat
{
    /// Human-readable lines (default)
    #[default]
    Pretty,
    /// One JSON object per event, for log collectors
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" | "dev" => Ok(LogFormat::Pretty),
            "json" | "prod" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl LogLevel
{
    /// Level for a count of `-v` flags: 0 keeps the default, 1 is debug, 2+ trace.
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Option<Self>
    {
        match count {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Directive string understood by `EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Resolved logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig
{
    /// Output format for stderr and the file
    pub format: LogFormat,
    /// Fixed level; `None` defers to `RUST_LOG`, then `info`
    pub level: Option<LogLevel>,
    /// Log file or directory
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read `REGSNAP_LOG_FORMAT` and `REGSNAP_LOG_FILE`.
    ///
    /// ## Errors
    ///
    /// [`LoggingError::InvalidFormat`] if `REGSNAP_LOG_FORMAT` is set to
    /// something unknown.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        let format = match env::var(FORMAT_ENV) {
            Ok(value) if !value.is_empty() => value.parse().map_err(LoggingError::InvalidFormat)?,
            _ => LogFormat::default(),
        };
        let file = env::var_os(FILE_ENV).filter(|value| !value.is_empty()).map(PathBuf::from);

        Ok(Self {
            format,
            level: None,
            file,
        })
    }

    /// Same configuration with a fixed level.
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }
}

/// Keeps the background file writer alive; drop it last to flush the file.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// Reads:
/// - `RUST_LOG`: Log filter (e.g., `debug`, `regsnap_core=trace`)
/// - `REGSNAP_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `REGSNAP_LOG_FILE`: Optional log file or directory
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `REGSNAP_LOG_FORMAT` is invalid
/// - The log directory cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with_config(&LogConfig::from_env()?)
}

/// Initialize logging with an explicit level and format
///
/// `REGSNAP_LOG_FILE` is still honoured.
///
/// ## Example
///
/// ```rust,no_run
/// use regsnap_utils::{init_logging_with_level, LogFormat, LogLevel};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log directory
/// cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let config = LogConfig {
        format,
        level: Some(level),
        file: env::var_os(FILE_ENV).filter(|value| !value.is_empty()).map(PathBuf::from),
    };
    init_logging_with_config(&config)
}

/// Initialize logging from a resolved [`LogConfig`]
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log directory
/// cannot be created.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers = vec![console_layer(config.format, build_filter(config.level))];

    let guard = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            layers.push(file_layer(config.format, build_filter(config.level), writer));
            Some(guard)
        }
        None => None,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

/// Explicit level wins; otherwise `RUST_LOG`, falling back to `info`.
fn build_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LogLevel::Info.as_str())),
    }
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, filter: EnvFilter, writer: NonBlocking) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Name of the dated log file created inside a log directory.
#[must_use]
pub fn dated_log_name() -> String
{
    format!("{}-regsnap.log", Utc::now().format("%Y-%m-%d"))
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError>
{
    let appender = if path.is_dir() || path.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        fs::create_dir_all(path)?;
        // Date is already in the name
        tracing_appender::rolling::never(path, dated_log_name())
    } else {
        let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let name = path.file_name().map_or_else(dated_log_name, |name| name.to_string_lossy().into_owned());
        tracing_appender::rolling::daily(dir, name)
    };
    Ok(tracing_appender::non_blocking(appender))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
