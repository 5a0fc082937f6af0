//! Storage error types

use thiserror::Error;

/// Errors that can occur during archive operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored line is not a valid record
    #[error("Corrupt record at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
