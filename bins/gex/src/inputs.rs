//! Snapshot sources for `run` and `watch`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use storage::{JsonLinesArchive, SnapshotRecord};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One raw snapshot per file
    Snapshot,
    /// An archive written by the tracker, one record per line
    Archive,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => InputKind::Archive,
            _ => InputKind::Snapshot,
        }
    }
}

/// Load every record an input path holds, in replay order
pub async fn load_input(path: &Path) -> Result<Vec<SnapshotRecord>> {
    match InputKind::of(path) {
        InputKind::Archive => JsonLinesArchive::load(path)
            .await
            .with_context(|| format!("Failed to load archive: {:?}", path)),
        InputKind::Snapshot => Ok(vec![load_snapshot_file(path).await?]),
    }
}

/// Read a single snapshot file, stamped with its modification time
pub async fn load_snapshot_file(path: &Path) -> Result<SnapshotRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot: {:?}", path))?;
    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Snapshot is not valid JSON: {:?}", path))?;

    let fetched_at = tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    debug!(?path, %fetched_at, "Loaded snapshot file");
    Ok(SnapshotRecord::new(data, fetched_at))
}

/// Tracks which `*.json` files of a directory were already processed
pub struct DirectoryScanner {
    dir: PathBuf,
    seen: HashSet<PathBuf>,
}

impl DirectoryScanner {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            seen: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot files not yet marked done, sorted by file name
    ///
    /// A file stays pending until [`DirectoryScanner::mark_done`], so one
    /// caught mid-write is offered again on the next scan.
    pub async fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read directory: {:?}", self.dir))?;

        let mut fresh = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && !self.seen.contains(&path) {
                fresh.push(path);
            }
        }

        fresh.sort();
        Ok(fresh)
    }

    pub fn mark_done(&mut self, path: &Path) {
        self.seen.insert(path.to_path_buf());
    }
}
