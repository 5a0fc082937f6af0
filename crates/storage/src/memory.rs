//! In-memory snapshot archive

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

use crate::archive::{SnapshotArchive, SnapshotRecord};
use crate::Result;

/// Keeps records in memory. Fast but non-persistent.
///
/// With a capacity set, the oldest records are dropped first.
pub struct InMemoryArchive {
    records: RwLock<VecDeque<SnapshotRecord>>,
    max_records: Option<usize>,
}

impl InMemoryArchive {
    /// Create an unbounded archive
    pub fn new() -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            max_records: None,
        }
    }

    /// Create an archive that keeps at most `max_records`
    pub fn with_max_records(max_records: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(max_records)),
            max_records: Some(max_records.max(1)),
        }
    }

    /// Copy of all records, oldest first
    pub async fn records(&self) -> Vec<SnapshotRecord> {
        self.records.read().await.iter().cloned().collect()
    }
}

impl Default for InMemoryArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotArchive for InMemoryArchive {
    async fn store(&self, record: SnapshotRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push_back(record);

        if let Some(max) = self.max_records {
            while records.len() > max {
                records.pop_front();
            }
        }

        debug!(records = records.len(), "Snapshot archived in memory");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_store_and_read_back() {
        let archive = InMemoryArchive::new();
        assert!(archive.is_empty().await.unwrap());

        let raw = json!({ "underlyingPrice": 4500.0, "callExpDateMap": {} });
        archive
            .store(SnapshotRecord::new(raw.clone(), Utc::now()))
            .await
            .unwrap();

        let records = archive.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, raw);
    }

    #[tokio::test]
    async fn test_bounded_archive_drops_oldest() {
        let archive = InMemoryArchive::with_max_records(2);
        for i in 0..4 {
            archive
                .store(SnapshotRecord::new(json!({ "seq": i }), Utc::now()))
                .await
                .unwrap();
        }

        assert_eq!(archive.len().await.unwrap(), 2);
        let seqs: Vec<i64> = archive
            .records()
            .await
            .iter()
            .map(|r| r.data["seq"].as_i64().unwrap())
            .collect();
        assert_eq!(seqs, vec![2, 3]);
    }
}
