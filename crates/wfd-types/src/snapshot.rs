//! Serializable workflow snapshots.
//!
//! A [`WorkflowSnapshot`] is the frozen, on-disk view of one workflow: its
//! nodes, the connections between them, and the nested workflows of its
//! metanodes and components. Snapshots are validated when loaded so the diff
//! engine can assume unique indices and resolvable connections.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SnapshotError, SnapshotResult};
use crate::node::NodeKind;

/// One workflow level: nodes plus connections among them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// Display name of the workflow (or container).
    #[serde(default)]
    pub name: String,
    /// Direct children of this workflow.
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    /// Data connections between direct children.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// A single node of a workflow snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Index of the node within its parent workflow.
    pub index: u32,
    /// Display name.
    pub name: String,
    /// Type discriminator (factory name for native nodes).
    pub node_type: String,
    #[serde(default)]
    pub kind: NodeKind,
    /// Opaque node settings.
    #[serde(default)]
    pub settings: serde_json::Value,
    /// Nested workflow of a metanode or component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Box<WorkflowSnapshot>>,
}

/// A directed connection from one node's output to another node's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: u32,
    pub dest: u32,
    #[serde(default)]
    pub source_port: u32,
    #[serde(default)]
    pub dest_port: u32,
}

impl Connection {
    /// Connection between the default ports of two nodes.
    pub fn new(source: u32, dest: u32) -> Self {
        Self {
            source,
            dest,
            source_port: 0,
            dest_port: 0,
        }
    }
}

impl SnapshotNode {
    /// A native node with null settings.
    pub fn native(index: u32, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            node_type: node_type.into(),
            kind: NodeKind::Native,
            settings: serde_json::Value::Null,
            workflow: None,
        }
    }

    /// A metanode or component wrapping `workflow`.
    pub fn container(
        index: u32,
        name: impl Into<String>,
        kind: NodeKind,
        workflow: WorkflowSnapshot,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            node_type: kind.to_string(),
            kind,
            settings: serde_json::Value::Null,
            workflow: Some(Box::new(workflow)),
        }
    }

    /// Replace the settings payload.
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }
}

impl WorkflowSnapshot {
    /// An empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a node.
    pub fn with_node(mut self, node: SnapshotNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Connect the default ports of two nodes.
    pub fn connect(mut self, source: u32, dest: u32) -> Self {
        self.connections.push(Connection::new(source, dest));
        self
    }

    /// Look up a direct child by index.
    pub fn node(&self, index: u32) -> Option<&SnapshotNode> {
        self.nodes.iter().find(|n| n.index == index)
    }

    /// Total number of nodes, including nested ones.
    pub fn total_nodes(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| 1 + n.workflow.as_ref().map_or(0, |w| w.total_nodes()))
            .sum()
    }

    /// Parse and validate a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> SnapshotResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Read, parse and validate a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check structural consistency of this level and every nested level.
    pub fn validate(&self) -> SnapshotResult<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.index) {
                return Err(SnapshotError::DuplicateIndex {
                    workflow: self.name.clone(),
                    index: node.index,
                });
            }
            if let Some(nested) = &node.workflow {
                if !node.kind.is_container() {
                    return Err(SnapshotError::UnexpectedWorkflow {
                        workflow: self.name.clone(),
                        index: node.index,
                    });
                }
                nested.validate()?;
            }
        }

        for conn in &self.connections {
            if !seen.contains(&conn.source) || !seen.contains(&conn.dest) {
                return Err(SnapshotError::DanglingConnection {
                    workflow: self.name.clone(),
                    source_index: conn.source,
                    dest: conn.dest,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"{
        "name": "etl",
        "nodes": [
            {"index": 0, "name": "CSV Reader", "node_type": "io.csv.reader", "settings": {"path": "a.csv"}},
            {"index": 1, "name": "Clean", "node_type": "metanode", "kind": "meta_node",
             "workflow": {"nodes": [{"index": 0, "name": "Filter", "node_type": "row.filter"}]}}
        ],
        "connections": [{"source": 0, "dest": 1}]
    }"#;

    #[test]
    fn parse_sample_with_defaults() {
        let wf = WorkflowSnapshot::from_json_str(SAMPLE).unwrap();
        assert_eq!(wf.name, "etl");
        assert_eq!(wf.nodes.len(), 2);
        assert_eq!(wf.node(0).unwrap().kind, NodeKind::Native);
        assert_eq!(wf.node(0).unwrap().settings, json!({"path": "a.csv"}));
        assert_eq!(wf.connections[0].source_port, 0);

        let meta = wf.node(1).unwrap();
        assert_eq!(meta.kind, NodeKind::MetaNode);
        let nested = meta.workflow.as_ref().unwrap();
        assert_eq!(nested.node(0).unwrap().settings, serde_json::Value::Null);
        assert!(nested.connections.is_empty());
        assert_eq!(wf.total_nodes(), 3);
    }

    #[test]
    fn duplicate_index_rejected() {
        let wf = WorkflowSnapshot::new("dup")
            .with_node(SnapshotNode::native(0, "a", "t"))
            .with_node(SnapshotNode::native(0, "b", "t"));
        assert!(matches!(
            wf.validate(),
            Err(SnapshotError::DuplicateIndex { index: 0, .. })
        ));
    }

    #[test]
    fn dangling_connection_rejected() {
        let wf = WorkflowSnapshot::new("dangling")
            .with_node(SnapshotNode::native(0, "a", "t"))
            .connect(0, 5);
        assert!(matches!(
            wf.validate(),
            Err(SnapshotError::DanglingConnection { source_index: 0, dest: 5, .. })
        ));
    }

    #[test]
    fn nested_errors_surface() {
        let inner = WorkflowSnapshot::new("inner")
            .with_node(SnapshotNode::native(2, "x", "t"))
            .with_node(SnapshotNode::native(2, "y", "t"));
        let wf = WorkflowSnapshot::new("outer")
            .with_node(SnapshotNode::container(0, "m", NodeKind::Component, inner));
        match wf.validate() {
            Err(SnapshotError::DuplicateIndex { workflow, index }) => {
                assert_eq!(workflow, "inner");
                assert_eq!(index, 2);
            }
            other => panic!("expected DuplicateIndex, got {:?}", other),
        }
    }

    #[test]
    fn workflow_on_native_node_rejected() {
        let mut node = SnapshotNode::native(0, "a", "t");
        node.workflow = Some(Box::new(WorkflowSnapshot::new("x")));
        let wf = WorkflowSnapshot::new("bad").with_node(node);
        assert!(matches!(
            wf.validate(),
            Err(SnapshotError::UnexpectedWorkflow { index: 0, .. })
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = WorkflowSnapshot::from_json_str("{\"nodes\": 3}").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wf.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let wf = WorkflowSnapshot::load(&path).unwrap();
        assert_eq!(wf.total_nodes(), 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkflowSnapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn serde_roundtrip_skips_absent_workflow() {
        let wf = WorkflowSnapshot::new("rt")
            .with_node(SnapshotNode::native(0, "a", "t").with_settings(json!({"k": 1})));
        let json = serde_json::to_string(&wf).unwrap();
        assert!(!json.contains("workflow"));
        let back = WorkflowSnapshot::from_json_str(&json).unwrap();
        assert_eq!(back, wf);
    }
}
