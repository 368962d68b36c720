//! Conversion of workflow snapshots into comparable node records.
//!
//! [`WorkflowTree::build`] walks a [`WorkflowSnapshot`] and produces one
//! [`NodeLevel`] per workflow or container. Each level is already split into
//! linear [`Sequence`]s, the unit the aligner works on. Records are immutable
//! and carry precomputed digests so the comparator never re-serializes
//! settings.

use wfd_types::{ContentHash, NodeId, NodeKind, SnapshotNode, WorkflowSnapshot};

use crate::sequence::extract_sequences;

/// A workflow converted into nested, sequence-partitioned levels.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowTree {
    pub name: String,
    pub root: NodeLevel,
}

impl WorkflowTree {
    /// Build the record forest for a validated snapshot.
    pub fn build(snapshot: &WorkflowSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            root: build_level(snapshot, None),
        }
    }

    /// Digest over the content of every top-level node.
    pub fn content_digest(&self) -> ContentHash {
        self.root.content_digest()
    }
}

/// One comparable workflow node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    pub node_type: String,
    pub kind: NodeKind,
    pub settings: serde_json::Value,
    /// Digest of the canonical settings JSON.
    pub settings_digest: ContentHash,
    /// Digest of kind, type, name, settings and nested content.
    pub content_digest: ContentHash,
    /// Nested level for metanodes and components.
    pub children: Option<NodeLevel>,
}

impl NodeRecord {
    pub fn index(&self) -> u32 {
        self.id.index()
    }

    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }
}

/// One linear branch of a level.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    key: ContentHash,
    nodes: Vec<NodeRecord>,
}

impl Sequence {
    /// Wrap `nodes`; the key is derived from their ids.
    pub fn new(nodes: Vec<NodeRecord>) -> Self {
        let ids: Vec<String> = nodes.iter().map(|n| n.id.to_string()).collect();
        let key = ContentHash::combine("sequence", ids.iter().map(|s| s.as_bytes()));
        Self { key, nodes }
    }

    /// Hashed identity used to memoize alignment costs.
    pub fn key(&self) -> ContentHash {
        self.key
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The sequences of one workflow or container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeLevel {
    sequences: Vec<Sequence>,
}

impl NodeLevel {
    pub fn new(sequences: Vec<Sequence>) -> Self {
        Self { sequences }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.sequences.iter().map(Sequence::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.iter().all(Sequence::is_empty)
    }

    /// Number of nodes at this level and below.
    pub fn total_nodes(&self) -> usize {
        self.nodes()
            .map(|n| 1 + n.children.as_ref().map_or(0, NodeLevel::total_nodes))
            .sum()
    }

    /// Direct children in sequence order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.sequences.iter().flat_map(|s| s.nodes.iter())
    }

    pub fn content_digest(&self) -> ContentHash {
        let parts: Vec<[u8; 32]> = self.nodes().map(|n| *n.content_digest.as_bytes()).collect();
        ContentHash::combine("level", parts.iter().map(|p| p.as_slice()))
    }
}

fn build_level(workflow: &WorkflowSnapshot, parent: Option<&NodeId>) -> NodeLevel {
    let sequences = extract_sequences(workflow)
        .into_iter()
        .map(|branch| {
            let records = branch
                .into_iter()
                .filter_map(|index| workflow.node(index))
                .map(|node| {
                    let id = match parent {
                        Some(p) => p.child(node.index),
                        None => NodeId::root(node.index),
                    };
                    build_record(node, id)
                })
                .collect();
            Sequence::new(records)
        })
        .collect();
    NodeLevel::new(sequences)
}

fn build_record(node: &SnapshotNode, id: NodeId) -> NodeRecord {
    let children = if node.kind.is_container() {
        Some(match &node.workflow {
            Some(nested) => build_level(nested, Some(&id)),
            None => NodeLevel::default(),
        })
    } else {
        None
    };

    let settings_digest = ContentHash::of_json(&node.settings);
    let kind = node.kind.to_string();
    let nested = children.as_ref().map(NodeLevel::content_digest);
    let mut parts: Vec<&[u8]> = vec![
        kind.as_bytes(),
        node.node_type.as_bytes(),
        node.name.as_bytes(),
        settings_digest.as_bytes().as_slice(),
    ];
    if let Some(nested) = &nested {
        parts.push(nested.as_bytes().as_slice());
    }
    let content_digest = ContentHash::combine("node", parts);

    NodeRecord {
        id,
        name: node.name.clone(),
        node_type: node.node_type.clone(),
        kind: node.kind,
        settings: node.settings.clone(),
        settings_digest,
        content_digest,
        children,
    }
}
