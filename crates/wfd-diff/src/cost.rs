//! Node similarity and the substitution cost derived from it.
//!
//! A [`NodeComparator`] scores how well two workflow nodes correspond. The
//! aligner turns that score into a substitution cost with
//! [`substitution_cost`]: dissimilar nodes get a cost above one deletion plus
//! one insertion, so the aligner never pairs them.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::forest::NodeRecord;

/// Domain-specific similarity between two workflow nodes.
pub trait NodeComparator {
    /// Match quality in `[0, 1]`; 1 means the nodes correspond perfectly.
    fn match_quality(&self, left: &NodeRecord, right: &NodeRecord) -> f64;

    /// Whether the two nodes carry identical content.
    fn content_equal(&self, left: &NodeRecord, right: &NodeRecord) -> bool;
}

/// Cost of aligning two nodes with the given match quality.
///
/// Below `threshold` the cost is `2·indel + 1`, strictly more than deleting
/// one node and inserting the other. Otherwise it falls linearly from
/// `2·indel` towards 0 as the quality approaches 1.
pub fn substitution_cost(quality: f64, indel: f64, threshold: f64) -> f64 {
    let quality = quality.clamp(0.0, 1.0);
    if quality < threshold {
        2.0 * indel + 1.0
    } else {
        2.0 * indel - quality * 2.0 * indel
    }
}

/// Default comparator: type first, then settings, then name.
///
/// - Different kind or node type: 0.
/// - Same settings digest and same name: 1.
/// - Otherwise `0.5 + 0.4·s + 0.1·n`, where `s` is the share of equal
///   settings leaves and `n` is 1 for equal names.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsComparator;

impl NodeComparator for SettingsComparator {
    fn match_quality(&self, left: &NodeRecord, right: &NodeRecord) -> f64 {
        if left.kind != right.kind || left.node_type != right.node_type {
            return 0.0;
        }
        let same_name = left.name == right.name;
        if same_name && left.settings_digest == right.settings_digest {
            return 1.0;
        }
        let settings = settings_similarity(&left.settings, &right.settings);
        let name = if same_name { 1.0 } else { 0.0 };
        0.5 + 0.4 * settings + 0.1 * name
    }

    fn content_equal(&self, left: &NodeRecord, right: &NodeRecord) -> bool {
        left.kind == right.kind
            && left.node_type == right.node_type
            && left.name == right.name
            && left.content_digest == right.content_digest
    }
}

/// Share of equal leaves among all leaf paths of two settings trees.
pub fn settings_similarity(left: &Value, right: &Value) -> f64 {
    let mut l = BTreeMap::new();
    let mut r = BTreeMap::new();
    flatten(left, String::new(), &mut l);
    flatten(right, String::new(), &mut r);

    let paths: BTreeSet<&String> = l.keys().chain(r.keys()).collect();
    if paths.is_empty() {
        return 1.0;
    }
    let equal = paths
        .iter()
        .filter(|p| matches!((l.get(**p), r.get(**p)), (Some(a), Some(b)) if a == b))
        .count();
    equal as f64 / paths.len() as f64
}

fn flatten<'a>(value: &'a Value, path: String, out: &mut BTreeMap<String, &'a Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(child, format!("{path}/{key}"), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten(child, format!("{path}[{i}]"), out);
            }
        }
        Value::Null if path.is_empty() => {}
        leaf => {
            out.insert(path, leaf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::WorkflowTree;
    use serde_json::json;
    use wfd_types::{NodeKind, SnapshotNode, WorkflowSnapshot};

    fn record(name: &str, node_type: &str, settings: Value) -> NodeRecord {
        let wf = WorkflowSnapshot::new("w")
            .with_node(SnapshotNode::native(0, name, node_type).with_settings(settings));
        WorkflowTree::build(&wf).root.nodes().next().unwrap().clone()
    }

    #[test]
    fn substitution_cost_is_linear_above_threshold() {
        assert_eq!(substitution_cost(1.0, 1.0, 0.5), 0.0);
        assert_eq!(substitution_cost(0.5, 1.0, 0.5), 1.0);
        assert_eq!(substitution_cost(0.75, 1.0, 0.5), 0.5);
        assert_eq!(substitution_cost(0.75, 2.0, 0.5), 1.0);
    }

    #[test]
    fn substitution_cost_penalizes_dissimilar_nodes() {
        assert_eq!(substitution_cost(0.49, 1.0, 0.5), 3.0);
        assert_eq!(substitution_cost(0.0, 1.0, 0.5), 3.0);
        assert_eq!(substitution_cost(0.0, 2.0, 0.5), 5.0);
    }

    #[test]
    fn identical_nodes_match_perfectly() {
        let a = record("Reader", "io.csv", json!({"path": "a"}));
        let b = record("Reader", "io.csv", json!({"path": "a"}));
        assert_eq!(SettingsComparator.match_quality(&a, &b), 1.0);
        assert!(SettingsComparator.content_equal(&a, &b));
    }

    #[test]
    fn different_type_never_matches() {
        let a = record("Reader", "io.csv", Value::Null);
        let b = record("Reader", "io.json", Value::Null);
        assert_eq!(SettingsComparator.match_quality(&a, &b), 0.0);
        assert!(!SettingsComparator.content_equal(&a, &b));
    }

    #[test]
    fn renamed_node_with_same_settings() {
        let a = record("Reader", "io.csv", json!({"path": "a"}));
        let b = record("Input", "io.csv", json!({"path": "a"}));
        let q = SettingsComparator.match_quality(&a, &b);
        assert!((q - 0.9).abs() < 1e-9, "quality was {q}");
        assert!(!SettingsComparator.content_equal(&a, &b));
    }

    #[test]
    fn partially_changed_settings() {
        let a = record("Reader", "io.csv", json!({"path": "a", "sep": ",", "header": true, "skip": 0}));
        let b = record("Reader", "io.csv", json!({"path": "b", "sep": ",", "header": true, "skip": 0}));
        let q = SettingsComparator.match_quality(&a, &b);
        assert!((q - (0.5 + 0.4 * 0.75 + 0.1)).abs() < 1e-9, "quality was {q}");
    }

    #[test]
    fn kind_mismatch_never_matches() {
        let a = record("X", "metanode", Value::Null);
        let mut b = a.clone();
        b.kind = NodeKind::MetaNode;
        assert_eq!(SettingsComparator.match_quality(&a, &b), 0.0);
    }

    #[test]
    fn settings_similarity_counts_leaves() {
        assert_eq!(settings_similarity(&Value::Null, &Value::Null), 1.0);
        assert_eq!(settings_similarity(&json!({"a": 1}), &json!({"a": 1})), 1.0);
        assert_eq!(settings_similarity(&json!({"a": 1}), &json!({"b": 1})), 0.0);
        assert_eq!(
            settings_similarity(&json!({"a": [1, 2], "b": {"c": 3}}), &json!({"a": [1, 5], "b": {"c": 3}})),
            2.0 / 3.0
        );
    }
}
