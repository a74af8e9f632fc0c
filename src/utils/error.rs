//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while talking to the key source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Key source unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed for key {key}: {message}")]
    Query { key: String, message: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to read keyspace dump: {0}")]
    DumpIo(#[from] std::io::Error),

    #[error("Invalid keyspace dump: {0}")]
    DumpFormat(#[from] serde_json::Error),
}

impl SourceError {
    /// Whether retrying the same query could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Redis(e) => e.is_timeout() || e.is_io_error() || e.is_connection_dropped(),
            SourceError::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// Errors that can occur while loading or saving a tree snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Incompatible snapshot: {0}")]
    Incompatible(String),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Invalid report requests, rejected before any tree work starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Report name is required")]
    MissingName,

    #[error("Invalid report name: {0}")]
    InvalidName(String),

    #[error("Malformed prefix filter: {0}")]
    MalformedPrefix(String),

    #[error("Depth must be at least 1")]
    InvalidDepth,
}
