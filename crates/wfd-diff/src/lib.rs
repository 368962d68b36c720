//! Structural diff engine for workflows.
//!
//! Compares two workflow snapshots and produces a hierarchical diff tree in
//! which every node is classified as a change, addition, deletion or a
//! pseudo-conflict (aligned but content-equal).
//!
//! Each nesting level is cut into linear node sequences, sequences are paired
//! across the two sides by a heuristic branch matcher, and each pair is
//! aligned with a Needleman-Wunsch edit distance. Matched metanodes and
//! components are compared recursively.
//!
//! # Key Types
//!
//! - [`WorkflowDiffer`] -- Facade: load, compare, report
//! - [`DiffNode`] / [`NodeRef`] -- The resulting diff tree
//! - [`CompareSession`] -- Memoized costs for one comparison
//! - [`NodeComparator`] / [`SettingsComparator`] -- Pluggable node similarity
//! - [`DiffConfig`] -- Alignment tunables, loadable from TOML

pub mod align;
pub mod branch;
pub mod config;
pub mod cost;
pub mod differ;
pub mod error;
pub mod forest;
pub mod sequence;
pub mod session;
pub mod tree;

pub use align::{align, fill_grid, AlignParams, AlignStep, Alignment, CostGrid, PairScorer};
pub use branch::{align_branches, match_branches, Pairing};
pub use config::DiffConfig;
pub use cost::{settings_similarity, substitution_cost, NodeComparator, SettingsComparator};
pub use differ::{CancelFlag, NullMonitor, ProgressMonitor, WorkflowDiffer};
pub use error::{DiffError, DiffResult};
pub use forest::{NodeLevel, NodeRecord, Sequence, WorkflowTree};
pub use sequence::extract_sequences;
pub use session::{CompareSession, SessionStats};
pub use tree::{assemble, DiffNode, NodeRef};
