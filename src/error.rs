//! Storage error types.

use std::path::PathBuf;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The engine was used before `init`.
    #[error("storage not initialized, call KvStorage::init first")]
    NotInitialized,

    /// `init` was called on an engine that is already bound.
    #[error("storage already initialized")]
    AlreadyInitialized,

    /// The store could not be opened, even after deleting it.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    /// Clearing failed and the store file could not be deleted either.
    #[error("clearing and deleting store {} failed", path.display())]
    StorageCorrupt { path: PathBuf },

    /// A merge input was not a JSON object.
    #[error("malformed json: {0}")]
    MalformedJson(String),

    /// The engine refused a write (size cap, oversized value).
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// The key is empty.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Any other engine error on an open handle.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The background worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    WorkerFailed(String),
}

impl StorageError {
    /// Whether a retry on the next call can succeed without outside help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::WorkerFailed(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
