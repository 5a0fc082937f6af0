//! Observability for the gamma exposure tracker
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics for the per-poll pipeline
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("gex", LogFormat::Pretty, "info")?;
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, EngineMetrics, PollTimer};
