use gamma_engine::EngineSettings;
use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root of the YAML configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GexConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: EngineSettings,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Where snapshots come from and how often
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Underlying the chain belongs to, used for labels and logs
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(rename = "poll_interval_seconds")]
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

/// Raw snapshot archive
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_archive_path")]
    pub path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_archive_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}
