//! Archive trait for raw snapshots

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// A raw snapshot and the moment it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub fetched_at: DateTime<Utc>,
    pub data: Value,
}

impl SnapshotRecord {
    pub fn new(data: Value, fetched_at: DateTime<Utc>) -> Self {
        Self { fetched_at, data }
    }
}

/// Destination for raw snapshots
///
/// Implementations can be in-memory, a local file, or a database. Writes
/// are independent of analysis: a failed store never invalidates a poll.
#[async_trait]
pub trait SnapshotArchive: Send + Sync {
    /// Persist one record
    async fn store(&self, record: SnapshotRecord) -> Result<()>;

    /// Number of records currently held
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Short name for logs
    fn name(&self) -> &'static str;
}
