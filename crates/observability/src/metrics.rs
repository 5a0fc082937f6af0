//! Prometheus metrics
//!
//! This module installs the Prometheus exporter and provides the metric set
//! recorded once per poll cycle.

use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Start the Prometheus exporter on `0.0.0.0:port`
///
/// Metrics are served at `/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Per-poll metrics for one tracked symbol
///
/// # Metrics
///
/// * `gex_polls_total` - Polls processed successfully
/// * `gex_poll_failures_total` - Polls rejected as structurally invalid
/// * `gex_contracts_skipped_total` - Malformed contracts dropped
/// * `gex_degenerate_spot_total` - Polls with zero or missing spot
/// * `gex_total_exposure_billions` - Latest total exposure
/// * `gex_strikes` - Strikes in the latest exposure map
/// * `gex_poll_duration_seconds` - Time spent in the engine per poll
#[derive(Clone)]
pub struct EngineMetrics {
    polls_total: Counter,
    poll_failures: Counter,
    contracts_skipped: Counter,
    degenerate_spot: Counter,
    total_exposure: Gauge,
    strikes: Gauge,
    poll_duration: Histogram,
    symbol: String,
}

impl EngineMetrics {
    pub fn new(symbol: &str) -> Self {
        let symbol = symbol.to_string();

        Self {
            polls_total: counter!("gex_polls_total", "symbol" => symbol.clone()),
            poll_failures: counter!("gex_poll_failures_total", "symbol" => symbol.clone()),
            contracts_skipped: counter!("gex_contracts_skipped_total", "symbol" => symbol.clone()),
            degenerate_spot: counter!("gex_degenerate_spot_total", "symbol" => symbol.clone()),
            total_exposure: gauge!("gex_total_exposure_billions", "symbol" => symbol.clone()),
            strikes: gauge!("gex_strikes", "symbol" => symbol.clone()),
            poll_duration: histogram!("gex_poll_duration_seconds", "symbol" => symbol.clone()),
            symbol,
        }
    }

    /// Record a successful poll
    pub fn record_poll(
        &self,
        duration: Duration,
        strikes: usize,
        total_exposure: f64,
        skipped: usize,
        degenerate_spot: bool,
    ) {
        self.polls_total.increment(1);
        self.poll_duration.record(duration.as_secs_f64());
        self.strikes.set(strikes as f64);
        self.total_exposure.set(total_exposure);
        self.contracts_skipped.increment(skipped as u64);
        if degenerate_spot {
            self.degenerate_spot.increment(1);
        }
    }

    /// Record a poll the engine rejected
    pub fn record_failure(&self, duration: Duration) {
        self.poll_failures.increment(1);
        self.poll_duration.record(duration.as_secs_f64());
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Measures one poll from creation to [`PollTimer::elapsed`]
pub struct PollTimer {
    start: Instant,
}

impl PollTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
