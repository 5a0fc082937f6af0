//! JSON Lines snapshot archive
//!
//! One [`SnapshotRecord`] per line, appended in fetch order. The same file
//! can be fed back to the engine with [`JsonLinesArchive::load`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::archive::{SnapshotArchive, SnapshotRecord};
use crate::error::StorageError;
use crate::Result;

pub struct JsonLinesArchive {
    path: PathBuf,
    /// Serializes appends and caches the record count
    written: Mutex<usize>,
}

impl JsonLinesArchive {
    /// Open (or create) the archive file, creating parent directories
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(StorageError::Config("archive path is empty".to_string()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let existing = match fs::read_to_string(&path).await {
            Ok(content) => content.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        info!(path = ?path, existing, "Opened snapshot archive");
        Ok(Self {
            path,
            written: Mutex::new(existing),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record of an archive file, oldest first
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Vec<SnapshotRecord>> {
        let content = fs::read_to_string(path.as_ref()).await?;
        parse_lines(&content)
    }
}

/// Decode JSON Lines content, skipping blank lines
pub fn parse_lines(content: &str) -> Result<Vec<SnapshotRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl SnapshotArchive for JsonLinesArchive {
    async fn store(&self, record: SnapshotRecord) -> Result<()> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut written = self.written.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        *written += 1;

        debug!(path = ?self.path, records = *written, "Snapshot archived");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(*self.written.lock().await)
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}
