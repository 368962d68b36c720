//! Entry point for comparing two workflows.
//!
//! [`WorkflowDiffer`] ties the pieces together: it loads both snapshots,
//! converts them into record forests, runs one [`CompareSession`] and hands
//! back the root [`DiffNode`]. Loading is the only cancellable step; once
//! the alignment starts it runs to completion.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};
use wfd_types::WorkflowSnapshot;

use crate::config::DiffConfig;
use crate::cost::{NodeComparator, SettingsComparator};
use crate::error::{DiffError, DiffResult};
use crate::forest::WorkflowTree;
use crate::session::CompareSession;
use crate::tree::{assemble, DiffNode};

/// Host-side progress reporting and cancellation.
pub trait ProgressMonitor {
    /// Polled between loading steps.
    fn is_cancelled(&self) -> bool;

    /// Called when a new step begins.
    fn begin(&self, _step: &str) {}
}

/// Monitor that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancellation flag that can be raised from another thread.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Structural differ parameterized by the node comparator.
#[derive(Clone, Debug, Default)]
pub struct WorkflowDiffer<C = SettingsComparator> {
    comparator: C,
    config: DiffConfig,
}

impl WorkflowDiffer<SettingsComparator> {
    /// Differ using the default settings-based comparator.
    pub fn new(config: DiffConfig) -> Self {
        Self::with_comparator(SettingsComparator, config)
    }
}

impl<C: NodeComparator> WorkflowDiffer<C> {
    pub fn with_comparator(comparator: C, config: DiffConfig) -> Self {
        Self { comparator, config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two already-built record forests.
    pub fn compare_trees(
        &self,
        left: &WorkflowTree,
        right: &WorkflowTree,
    ) -> DiffResult<DiffNode> {
        self.config.validate()?;
        info!(
            left = %left.name,
            right = %right.name,
            left_nodes = left.root.total_nodes(),
            right_nodes = right.root.total_nodes(),
            "starting workflow comparison"
        );
        let mut session = CompareSession::new(&self.comparator, self.config.clone());
        let root = assemble(&mut session, left, right);
        let stats = session.stats();
        debug!(
            node_cost_hits = stats.node_cost_hits,
            node_cost_misses = stats.node_cost_misses,
            alignment_hits = stats.alignment_hits,
            alignment_misses = stats.alignment_misses,
            "comparison session finished"
        );
        info!(
            kind = %root.kind,
            diff_nodes = root.len(),
            "workflow comparison complete"
        );
        Ok(root)
    }

    /// Validate and compare two in-memory snapshots.
    pub fn compare(
        &self,
        left: &WorkflowSnapshot,
        right: &WorkflowSnapshot,
    ) -> DiffResult<DiffNode> {
        left.validate()?;
        right.validate()?;
        self.compare_trees(&WorkflowTree::build(left), &WorkflowTree::build(right))
    }

    /// Load two snapshot files and compare them.
    pub fn try_compare_files(
        &self,
        left: &Path,
        right: &Path,
        monitor: &dyn ProgressMonitor,
    ) -> DiffResult<DiffNode> {
        self.config.validate()?;

        let left = load_step(left, "loading left workflow", monitor)?;
        let right = load_step(right, "loading right workflow", monitor)?;
        if monitor.is_cancelled() {
            return Err(DiffError::Cancelled);
        }

        monitor.begin("comparing workflows");
        self.compare_trees(&WorkflowTree::build(&left), &WorkflowTree::build(&right))
    }

    /// Like [`try_compare_files`](Self::try_compare_files), but a failure is
    /// logged and reported as "comparison unavailable".
    pub fn compare_files(
        &self,
        left: &Path,
        right: &Path,
        monitor: &dyn ProgressMonitor,
    ) -> Option<DiffNode> {
        match self.try_compare_files(left, right, monitor) {
            Ok(root) => Some(root),
            Err(DiffError::Cancelled) => {
                info!("workflow comparison cancelled");
                None
            }
            Err(e) => {
                warn!(
                    left = %left.display(),
                    right = %right.display(),
                    error = %e,
                    "workflow comparison unavailable"
                );
                None
            }
        }
    }
}

fn load_step(
    path: &Path,
    step: &str,
    monitor: &dyn ProgressMonitor,
) -> DiffResult<WorkflowSnapshot> {
    if monitor.is_cancelled() {
        return Err(DiffError::Cancelled);
    }
    monitor.begin(step);
    let snapshot = WorkflowSnapshot::load(path)?;
    debug!(path = %path.display(), nodes = snapshot.total_nodes(), "loaded workflow snapshot");
    Ok(snapshot)
}
