//! Raw snapshot archive
//!
//! Stores broker option-chain snapshots exactly as fetched, together with
//! their fetch timestamp. Analysis never reads from here during a poll;
//! archived files can be replayed through the engine later.
//!
//! - [`archive`] - the [`SnapshotArchive`] trait and record type
//! - [`memory`] - bounded in-memory archive
//! - [`jsonl`] - append-only JSON Lines file archive

pub mod archive;
pub mod error;
pub mod jsonl;
pub mod memory;

pub use archive::{SnapshotArchive, SnapshotRecord};
pub use error::StorageError;
pub use jsonl::JsonLinesArchive;
pub use memory::InMemoryArchive;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
