//! Error types for snapshot loading and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading or validating a workflow snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two nodes of the same workflow level share an index.
    #[error("duplicate node index {index} in workflow {workflow:?}")]
    DuplicateIndex { workflow: String, index: u32 },

    /// A connection references a node index that does not exist.
    #[error("connection {source_index} -> {dest} in workflow {workflow:?} references a missing node")]
    DanglingConnection {
        workflow: String,
        source_index: u32,
        dest: u32,
    },

    /// A native node carries a nested workflow.
    #[error("native node {index} in workflow {workflow:?} cannot contain a workflow")]
    UnexpectedWorkflow { workflow: String, index: u32 },
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
