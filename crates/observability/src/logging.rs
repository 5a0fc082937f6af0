//! Logging initialization
//!
//! Sets up a tracing subscriber in one of three output formats. `RUST_LOG`
//! always wins over the configured default filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    #[default]
    Pretty,
    /// One JSON object per event, for log shipping
    Json,
    /// Single-line events
    Compact,
}

impl LogFormat {
    pub const NAMES: [&'static str; 3] = ["pretty", "json", "compact"];

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown log format: {}", s))
    }
}

/// Build the env filter, falling back to `default_filter` when `RUST_LOG`
/// is unset or invalid
fn build_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber
///
/// # Arguments
///
/// * `service_name` - Name recorded in the first log line
/// * `format` - Output format
/// * `default_filter` - Directive used when `RUST_LOG` is not set,
///   e.g. `info,gamma_engine=debug`
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(service_name: &str, format: LogFormat, default_filter: &str) -> anyhow::Result<()> {
    let env_filter = build_filter(default_filter);

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact())
            .try_init()?,
    }

    tracing::info!(
        service = service_name,
        format = ?format,
        "Logging initialized"
    );

    Ok(())
}
