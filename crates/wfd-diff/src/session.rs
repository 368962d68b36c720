//! Per-comparison state.
//!
//! A [`CompareSession`] owns every memoization table used while comparing
//! one pair of workflows. It is created for a single comparison and dropped
//! afterwards, so no cached cost ever leaks into another comparison and
//! independent comparisons can run on separate threads.

use std::collections::HashMap;

use tracing::debug;
use wfd_types::{ContentHash, NodeId};

use crate::align::{align, fill_grid, AlignParams, Alignment, PairScorer};
use crate::config::DiffConfig;
use crate::cost::{substitution_cost, NodeComparator};
use crate::forest::{NodeRecord, Sequence};

/// Cache hit/miss counters, reported when a session finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub node_cost_hits: usize,
    pub node_cost_misses: usize,
    pub alignment_hits: usize,
    pub alignment_misses: usize,
}

/// Memoized cost model for one top-level comparison.
pub struct CompareSession<'c, C: NodeComparator + ?Sized> {
    comparator: &'c C,
    config: DiffConfig,
    /// Substitution costs keyed by (left node, right node).
    node_costs: HashMap<(NodeId, NodeId), f64>,
    /// Alignment costs keyed by (left sequence, right sequence).
    alignment_costs: HashMap<(ContentHash, ContentHash), f64>,
    stats: SessionStats,
}

impl<'c, C: NodeComparator + ?Sized> CompareSession<'c, C> {
    pub fn new(comparator: &'c C, config: DiffConfig) -> Self {
        Self {
            comparator,
            config,
            node_costs: HashMap::new(),
            alignment_costs: HashMap::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn indel(&self) -> f64 {
        self.config.indel_cost
    }

    fn params(&self) -> AlignParams {
        AlignParams {
            indel: self.config.indel_cost,
            epsilon: self.config.epsilon,
        }
    }

    /// Substitution cost of two nodes, memoized by their ids.
    pub fn node_cost(&mut self, left: &NodeRecord, right: &NodeRecord) -> f64 {
        let key = (left.id.clone(), right.id.clone());
        if let Some(cost) = self.node_costs.get(&key) {
            self.stats.node_cost_hits += 1;
            return *cost;
        }
        self.stats.node_cost_misses += 1;
        let quality = self.comparator.match_quality(left, right);
        let cost = substitution_cost(
            quality,
            self.config.indel_cost,
            self.config.substitution_threshold,
        );
        self.node_costs.insert(key, cost);
        cost
    }

    /// Cost of aligning a sequence against nothing.
    pub fn empty_cost(&self, sequence: &Sequence) -> f64 {
        sequence.len() as f64 * self.config.indel_cost
    }

    /// Total cost of aligning two sequences, without retracing the grid.
    pub fn alignment_cost(&mut self, left: &Sequence, right: &Sequence) -> f64 {
        let key = (left.key(), right.key());
        if let Some(cost) = self.alignment_costs.get(&key) {
            self.stats.alignment_hits += 1;
            return *cost;
        }
        self.stats.alignment_misses += 1;
        let params = self.params();
        let cost = fill_grid(left.nodes(), right.nodes(), params, &mut *self).total();
        self.alignment_costs.insert(key, cost);
        cost
    }

    /// Full alignment of two optional sequences; `None` stands for the
    /// empty sequence.
    pub fn align<'a>(
        &mut self,
        left: Option<&'a Sequence>,
        right: Option<&'a Sequence>,
    ) -> Alignment<'a> {
        let params = self.params();
        let l = left.map_or(&[][..], Sequence::nodes);
        let r = right.map_or(&[][..], Sequence::nodes);
        let alignment = align(l, r, params, &mut *self);
        debug!(
            left = l.len(),
            right = r.len(),
            cost = alignment.cost,
            "aligned sequences"
        );
        alignment
    }
}

impl<C: NodeComparator + ?Sized> PairScorer for CompareSession<'_, C> {
    fn cost(&mut self, left: &NodeRecord, right: &NodeRecord) -> f64 {
        self.node_cost(left, right)
    }

    fn equal(&mut self, left: &NodeRecord, right: &NodeRecord) -> bool {
        self.comparator.content_equal(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::SettingsComparator;
    use crate::forest::WorkflowTree;
    use wfd_types::{ChangeKind, SnapshotNode, WorkflowSnapshot};

    fn sequence(names: &[&str]) -> Sequence {
        let mut wf = WorkflowSnapshot::new("s");
        for (i, name) in names.iter().enumerate() {
            wf = wf.with_node(SnapshotNode::native(i as u32, *name, *name));
            if i > 0 {
                wf = wf.connect(i as u32 - 1, i as u32);
            }
        }
        WorkflowTree::build(&wf).root.sequences()[0].clone()
    }

    #[test]
    fn node_costs_are_memoized() {
        let s = sequence(&["a", "b"]);
        let mut session = CompareSession::new(&SettingsComparator, DiffConfig::default());
        let (a, b) = (&s.nodes()[0], &s.nodes()[1]);
        assert_eq!(session.node_cost(a, b), 3.0);
        assert_eq!(session.node_cost(a, b), 3.0);
        assert_eq!(session.node_cost(a, a), 0.0);
        let stats = session.stats();
        assert_eq!(stats.node_cost_misses, 2);
        assert_eq!(stats.node_cost_hits, 1);
    }

    #[test]
    fn alignment_costs_are_memoized() {
        let (l, r) = (sequence(&["a", "b", "c"]), sequence(&["a", "c"]));
        let mut session = CompareSession::new(&SettingsComparator, DiffConfig::default());
        assert_eq!(session.alignment_cost(&l, &r), 1.0);
        assert_eq!(session.alignment_cost(&l, &r), 1.0);
        assert_eq!(session.stats().alignment_misses, 1);
        assert_eq!(session.stats().alignment_hits, 1);
    }

    #[test]
    fn align_with_empty_side() {
        let l = sequence(&["a", "b"]);
        let mut session = CompareSession::new(&SettingsComparator, DiffConfig::default());
        let a = session.align(Some(&l), None);
        assert_eq!(a.count(ChangeKind::Deletion), 2);
        assert_eq!(a.cost, session.empty_cost(&l));
        assert!(session.align(None, None).steps.is_empty());
    }

    #[test]
    fn indel_cost_comes_from_config() {
        let l = sequence(&["a", "b"]);
        let config = DiffConfig {
            indel_cost: 2.5,
            ..Default::default()
        };
        let mut session = CompareSession::new(&SettingsComparator, config);
        assert_eq!(session.empty_cost(&l), 5.0);
        assert_eq!(session.align(None, Some(&l)).cost, 5.0);
    }

    #[test]
    fn works_through_trait_objects() {
        let comparator: &dyn NodeComparator = &SettingsComparator;
        let s = sequence(&["a"]);
        let mut session = CompareSession::new(comparator, DiffConfig::default());
        assert_eq!(session.alignment_cost(&s, &s), 0.0);
    }
}
