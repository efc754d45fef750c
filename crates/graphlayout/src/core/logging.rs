//! Logging setup for layout runs
//!
//! Every adapter run opens a `layout_call` span carrying the algorithm name;
//! engines emit `debug!`/`trace!` events inside it. With the default sink,
//! diagnostics of failed runs are logged at warn level under the target
//! `graphlayout::diagnostics`.
//!
//! ```rust
//! use graphlayout::core::logging::init_logging;
//!
//! // Errors if a global subscriber is already installed
//! let _ = init_logging(Some("debug"), Some("pretty"));
//! ```
//!
//! Formats: `compact` (one line per event), `pretty` (multi-line, with
//! source locations) and `json` (one object per event, span closes included).
//!
//! Environment:
//! - `GRAPHLAYOUT_LOG_LEVEL`: level or filter directive when no level is passed
//! - `RUST_LOG`: per-module directives, when neither of the above is set
//! - `GRAPHLAYOUT_LOG_FORMAT`: format when none is passed
//!
//! Events are written to stderr so that stdout stays free for output.
//!
//! ```bash
//! RUST_LOG="warn,graphlayout::layouts::layered=trace" graphlayout layout -a sugiyama -i g.json
//! ```

use std::fmt;
use std::str::FromStr;

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub const NAMES: [&'static str; 3] = ["compact", "pretty", "json"];

    pub fn name(self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "Unknown log format '{other}', expected one of {}",
                Self::NAMES.join("|")
            )),
        }
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Merge explicit arguments with the environment
    ///
    /// An explicit argument wins over the environment. The level falls back
    /// to `GRAPHLAYOUT_LOG_LEVEL`, then `RUST_LOG`, then `info`; the format to
    /// `GRAPHLAYOUT_LOG_FORMAT`, then compact.
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        let directives = level
            .map(str::to_string)
            .or_else(|| std::env::var("GRAPHLAYOUT_LOG_LEVEL").ok())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string());
        let format = match format
            .map(str::to_string)
            .or_else(|| std::env::var("GRAPHLAYOUT_LOG_FORMAT").ok())
        {
            Some(name) => name.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self { directives, format })
    }
}

/// Install the global subscriber
///
/// Fails for an unknown format or when a global subscriber already exists.
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = LogSettings::resolve(level, format)?;
    install(&settings)
}

#[cfg(target_arch = "wasm32")]
fn install(_settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    // The browser console does its own level filtering
    tracing_wasm::set_as_global_default_with_config(tracing_wasm::WASMLayerConfig::default());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn install(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

    let filter = EnvFilter::try_new(&settings.directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match settings.format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).try_init()?;
    Ok(())
}

/// Install the global subscriber from the environment only
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
