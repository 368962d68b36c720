//! Foundation types for workflow structural diffs.
//!
//! This crate provides the snapshot model read from disk, the identity and
//! digest types used to key memoization tables, and the change kinds shared
//! by the diff engine and its front ends.
//!
//! # Key Types
//!
//! - [`WorkflowSnapshot`] -- Serializable workflow: nodes, connections, nested workflows
//! - [`NodeId`] -- Stable node identity (path of per-parent indices)
//! - [`NodeKind`] -- Native node, metanode, or component
//! - [`ContentHash`] -- BLAKE3 digest of settings or node content
//! - [`ChangeKind`] -- Classification of one diff node

pub mod change;
pub mod digest;
pub mod error;
pub mod node;
pub mod snapshot;

pub use change::ChangeKind;
pub use digest::ContentHash;
pub use error::{SnapshotError, SnapshotResult};
pub use node::{NodeId, NodeKind};
pub use snapshot::{Connection, SnapshotNode, WorkflowSnapshot};
