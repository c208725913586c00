//! Structured logging for cmdcache
//!
//! Stdout belongs to command output, so every log line goes to stderr.
//! Logs use structured fields for easy parsing and analysis.
//!
//! # Log Format Conventions
//!
//! - `operation`: The operation being performed ("evaluate", "rebuild", "replay")
//! - `status`: The result status ("fresh", "stale", "success", "error")
//! - `cache`: Path of the cache file
//! - `size_bytes`: Size in bytes
//!
//! # Examples
//!
//! ```rust
//! use cmdcache::logging::{operations, status};
//! use tracing::info;
//!
//! info!(
//!     operation = operations::REPLAY,
//!     status = status::SUCCESS,
//!     size_bytes = 42,
//!     "replayed cache"
//! );
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter, Layer,
};

/// Level used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Timestamp layout for text logs, local time with microseconds
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

const ANSI_RESET: &str = "\x1b[0m";

/// Text formatter: `<timestamp> <LEVEL>(cmdcache): <fields>`
///
/// The module path is replaced by a fixed "cmdcache" tag.
struct CmdcacheFormatter {
    ansi: bool,
}

impl CmdcacheFormatter {
    fn write_level(&self, writer: &mut Writer<'_>, level: &Level) -> std_fmt::Result {
        if self.ansi {
            write!(writer, "{}{:5}(cmdcache){}: ", level_color(level), level, ANSI_RESET)
        } else {
            write!(writer, "{:5}(cmdcache): ", level)
        }
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for CmdcacheFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        write!(writer, "{} ", chrono::Local::now().format(TIMESTAMP_FORMAT))?;
        self.write_level(&mut writer, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, coloured
    Pretty,
    /// Same layout without ANSI colours (CI)
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Read from `CMDCACHE_LOG_FORMAT`, falling back on whether `CI` is set
    pub fn from_env() -> Self {
        Self::parse(
            std::env::var("CMDCACHE_LOG_FORMAT").ok().as_deref(),
            std::env::var_os("CI").is_some(),
        )
    }

    fn parse(value: Option<&str>, ci: bool) -> Self {
        match value.unwrap_or_default().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ if ci => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: Log level filter (default "warn")
/// - `CMDCACHE_LOG_FORMAT`: "pretty", "compact" or "json"
/// - `CI`: If set, defaults to compact format
///
/// ```bash
/// RUST_LOG=info cmdcache commands.txt output.cache
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Pretty => registry.with(text_layer(true)).init(),
        LogFormat::Compact => registry.with(text_layer(false)).init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .init(),
    }
}

fn text_layer<S>(ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .event_format(CmdcacheFormatter { ansi })
        .with_writer(io::stderr)
}

/// Operation names for consistent logging
pub mod operations {
    pub const EVALUATE: &str = "evaluate";
    pub const REBUILD: &str = "rebuild";
    pub const REPLAY: &str = "replay";
}

/// Status values for consistent logging
pub mod status {
    pub const FRESH: &str = "fresh";
    pub const STALE: &str = "stale";
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
}
