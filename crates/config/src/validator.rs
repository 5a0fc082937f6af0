use crate::*;
use gamma_engine::SignConvention;
use observability::LogFormat;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Source symbol is required")]
    MissingSymbol,

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} must be a positive finite number, got: {value}")]
    InvalidPositiveFloat { field: String, value: f64 },

    #[error("Archive: {message}")]
    InvalidArchive { message: String },

    #[error("Invalid log format: {0}. Must be one of: {names}", names = LogFormat::NAMES.join(", "))]
    InvalidLogFormat(String),

    #[error("Metrics: {message}")]
    InvalidMetrics { message: String },

    #[error("Environment variable placeholder in '{field}' was not resolved: {value}")]
    UnresolvedEnvVar { field: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &GexConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_env_placeholders(config, &mut report);
    validate_source(&config.source, &mut report);
    validate_analysis(&config.analysis, &mut report);
    validate_archive(&config.archive, &mut report);
    validate_logging(&config.logging, &mut report);
    validate_metrics(&config.metrics, &mut report);

    report
}

fn validate_env_placeholders(config: &GexConfig, report: &mut ValidationReport) {
    let fields = [
        ("source.symbol", &config.source.symbol),
        ("archive.path", &config.archive.path),
        ("logging.format", &config.logging.format),
        ("logging.filter", &config.logging.filter),
    ];

    for (field, value) in fields {
        if has_unresolved_env_vars(value) {
            report.add_error(ValidationError::UnresolvedEnvVar {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }
}

fn validate_source(source: &SourceConfig, report: &mut ValidationReport) {
    if source.symbol.trim().is_empty() {
        report.add_error(ValidationError::MissingSymbol);
    }

    if source.poll_interval_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "source.poll_interval_seconds".to_string(),
        });
    }
}

fn validate_analysis(analysis: &gamma_engine::EngineSettings, report: &mut ValidationReport) {
    if !analysis.contract_size.is_finite() || analysis.contract_size <= 0.0 {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "analysis.contract_size".to_string(),
            value: analysis.contract_size,
        });
    }

    if analysis.top_k == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "analysis.top_k".to_string(),
        });
    }

    if analysis.window_capacity == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "analysis.window_capacity".to_string(),
        });
    }

    if analysis.top_k > analysis.window_capacity && analysis.window_capacity > 0 {
        report.add_warning(
            "analysis.top_k",
            "top_k exceeds window_capacity; a single poll can flush a rolling window",
        );
    }

    if analysis.sign_convention != SignConvention::CallPositive {
        report.add_warning(
            "analysis.sign_convention",
            &format!(
                "'{}' is not the default convention; exposures are not comparable with call_positive output",
                analysis.sign_convention.as_str()
            ),
        );
    }
}

fn validate_archive(archive: &ArchiveConfig, report: &mut ValidationReport) {
    if archive.enabled && archive.path.trim().is_empty() {
        report.add_error(ValidationError::InvalidArchive {
            message: "path is required when the archive is enabled".to_string(),
        });
    }

    if !archive.enabled {
        report.add_warning("archive.enabled", "Raw snapshots will not be persisted");
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if LogFormat::parse(&logging.format).is_none() {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }

    if logging.filter.trim().is_empty() {
        report.add_default("logging.filter", "info");
    }
}

fn validate_metrics(metrics: &MetricsConfig, report: &mut ValidationReport) {
    if metrics.enabled && metrics.port == 0 {
        report.add_error(ValidationError::InvalidMetrics {
            message: "port must be non-zero when metrics are enabled".to_string(),
        });
    }
}
