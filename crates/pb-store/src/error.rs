// error.rs — Error types for aggregate persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting the aggregate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the aggregate.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another writer persisted a newer aggregate since ours was loaded.
    /// Saving would silently clobber their changes; reload and retry.
    #[error("stale aggregate: ours is version {ours}, store holds version {theirs}")]
    VersionConflict { ours: u64, theirs: u64 },

    /// No platform data directory is available for the default store path.
    #[error("no platform data directory available")]
    NoDataDir,
}
