//! Error types for the diff crate.

use wfd_types::SnapshotError;

/// Errors that can occur while preparing or running a comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// One of the two workflow snapshots could not be loaded.
    #[error("workflow snapshot unavailable: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The host cancelled the comparison while workflows were loading.
    #[error("comparison cancelled")]
    Cancelled,

    /// The diff configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
