//! Drives the engine one snapshot at a time
//!
//! Archiving and analysis are independent: a failed archive write is
//! logged and the poll still runs, and a rejected snapshot is still
//! archived as fetched.

use anyhow::Result;
use cli::OutputFormat;
use gamma_engine::{GammaEngine, PollReport};
use observability::{EngineMetrics, PollTimer};
use std::sync::Arc;
use storage::{SnapshotArchive, SnapshotRecord};
use tracing::{error, warn};

use crate::report;

pub struct Tracker {
    engine: GammaEngine,
    archive: Option<Arc<dyn SnapshotArchive>>,
    metrics: EngineMetrics,
    format: OutputFormat,
    failures: usize,
}

impl Tracker {
    pub fn new(engine: GammaEngine, metrics: EngineMetrics, format: OutputFormat) -> Self {
        Self {
            engine,
            archive: None,
            metrics,
            format,
            failures: 0,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn SnapshotArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Archive (if configured) and analyze one snapshot
    ///
    /// Returns `None` when the engine rejected the snapshot; the previous
    /// poll's state is kept in that case.
    pub async fn handle(&mut self, record: SnapshotRecord) -> Option<PollReport> {
        if let Some(archive) = &self.archive {
            if let Err(e) = archive.store(record.clone()).await {
                warn!(archive = archive.name(), %e, "Failed to archive snapshot");
            }
        }

        let timer = PollTimer::start();
        match self.engine.process(&record.data, record.fetched_at) {
            Ok(poll) => {
                self.metrics.record_poll(
                    timer.elapsed(),
                    poll.exposure.len(),
                    poll.total_exposure,
                    poll.skipped.len(),
                    poll.has_degenerate_spot(),
                );
                Some(poll)
            }
            Err(e) => {
                self.metrics.record_failure(timer.elapsed());
                self.failures += 1;
                error!(
                    symbol = self.metrics.symbol(),
                    fetched_at = %record.fetched_at,
                    %e,
                    "Snapshot rejected"
                );
                None
            }
        }
    }

    /// [`Tracker::handle`] followed by printing the report
    pub async fn handle_and_print(&mut self, record: SnapshotRecord) -> Result<()> {
        if let Some(poll) = self.handle(record).await {
            println!("{}", report::render(&poll, self.format)?);
        }
        Ok(())
    }

    pub fn engine(&self) -> &GammaEngine {
        &self.engine
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use storage::InMemoryArchive;

    fn snapshot(volume: u64) -> serde_json::Value {
        json!({
            "underlyingPrice": 4500.0,
            "callExpDateMap": {"2024-03-15:0": {"4500.0": [{"gamma": 0.002, "totalVolume": volume}]}},
            "putExpDateMap": {}
        })
    }

    fn tracker(archive: Arc<InMemoryArchive>) -> Tracker {
        Tracker::new(
            GammaEngine::default(),
            EngineMetrics::new("$SPX.X"),
            OutputFormat::Json,
        )
        .with_archive(archive)
    }

    #[tokio::test]
    async fn test_two_polls_produce_a_mover() {
        let archive = Arc::new(InMemoryArchive::new());
        let mut tracker = tracker(archive.clone());
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();

        let first = tracker.handle(SnapshotRecord::new(snapshot(1000), t0)).await.unwrap();
        assert!(first.top_changes.is_empty());

        let second = tracker
            .handle(SnapshotRecord::new(snapshot(1200), t0 + Duration::seconds(5)))
            .await
            .unwrap();
        assert_eq!(second.top_changes.len(), 1);
        assert!((second.top_changes[0].delta - 0.0081).abs() < 1e-9);
        assert_eq!(archive.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejected_snapshot_is_still_archived() {
        let archive = Arc::new(InMemoryArchive::new());
        let mut tracker = tracker(archive.clone());
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();

        assert!(tracker
            .handle(SnapshotRecord::new(json!(["not", "a", "chain"]), t0))
            .await
            .is_none());
        assert_eq!(tracker.failures(), 1);
        assert_eq!(archive.len().await.unwrap(), 1);
        assert!(tracker.engine().previous_exposure().is_empty());
    }
}
