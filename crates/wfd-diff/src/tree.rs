//! Hierarchical diff tree.
//!
//! The assembler walks both workflows top-down: each level is branch-matched
//! and aligned, every alignment step becomes one [`DiffNode`], and matched
//! containers recurse into their own levels. The root always exists, even
//! when nothing below it differs.

use serde::{Deserialize, Serialize};
use wfd_types::{ChangeKind, ContentHash, NodeId, NodeKind};

use crate::align::AlignStep;
use crate::branch::align_branches;
use crate::cost::NodeComparator;
use crate::forest::{NodeLevel, NodeRecord, WorkflowTree};
use crate::session::CompareSession;

/// Summary of the workflow node a diff node refers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub name: String,
    pub node_type: String,
    pub kind: NodeKind,
    pub content_digest: ContentHash,
}

impl NodeRef {
    /// Reference to a whole workflow, treated as the outermost container.
    pub fn workflow(tree: &WorkflowTree) -> Self {
        Self {
            id: NodeId::workflow(),
            name: tree.name.clone(),
            node_type: "workflow".into(),
            kind: NodeKind::MetaNode,
            content_digest: tree.content_digest(),
        }
    }
}

impl From<&NodeRecord> for NodeRef {
    fn from(record: &NodeRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            node_type: record.node_type.clone(),
            kind: record.kind,
            content_digest: record.content_digest,
        }
    }
}

/// One node of the diff tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffNode {
    pub kind: ChangeKind,
    pub left: Option<NodeRef>,
    pub right: Option<NodeRef>,
    /// Common ancestor, only known for three-way comparisons.
    pub ancestor: Option<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    /// Display name, preferring the right side.
    pub fn name(&self) -> &str {
        self.right
            .as_ref()
            .or(self.left.as_ref())
            .map_or("", |r| r.name.as_str())
    }

    /// Returns `true` if this node or anything below it really differs.
    pub fn has_differences(&self) -> bool {
        self.kind.is_difference() || self.children.iter().any(DiffNode::has_differences)
    }

    /// Number of nodes of the given kind in this subtree, root included.
    pub fn count(&self, kind: ChangeKind) -> usize {
        let own = usize::from(self.kind == kind);
        own + self.children.iter().map(|c| c.count(kind)).sum::<usize>()
    }

    /// Number of nodes in this subtree, root included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(DiffNode::len).sum::<usize>()
    }

    /// Always `false`: a diff tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth-first, pre-order walk with nesting depth.
    pub fn walk(&self) -> Vec<(usize, &DiffNode)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Drop pseudo-conflict leaves, bottom-up.
    pub fn prune_pseudo_conflicts(&mut self) {
        for child in &mut self.children {
            child.prune_pseudo_conflicts();
        }
        self.children
            .retain(|c| c.kind != ChangeKind::PseudoConflict || !c.children.is_empty());
    }
}

/// Build the diff tree of two workflows.
pub fn assemble<C: NodeComparator + ?Sized>(
    session: &mut CompareSession<'_, C>,
    left: &WorkflowTree,
    right: &WorkflowTree,
) -> DiffNode {
    let children = diff_level(session, &left.root, &right.root);
    let kind = if children.iter().any(DiffNode::has_differences) {
        ChangeKind::Change
    } else {
        ChangeKind::NoChange
    };

    let mut root = DiffNode {
        kind,
        left: Some(NodeRef::workflow(left)),
        right: Some(NodeRef::workflow(right)),
        ancestor: None,
        children,
    };
    if !session.config().include_pseudo_conflicts {
        root.prune_pseudo_conflicts();
    }
    root
}

fn diff_level<C: NodeComparator + ?Sized>(
    session: &mut CompareSession<'_, C>,
    left: &NodeLevel,
    right: &NodeLevel,
) -> Vec<DiffNode> {
    let mut nodes = Vec::with_capacity(left.len().max(right.len()));
    for (_, alignment) in align_branches(session, left.sequences(), right.sequences()) {
        for step in alignment.steps {
            nodes.push(diff_step(session, step));
        }
    }
    nodes
}

fn diff_step<C: NodeComparator + ?Sized>(
    session: &mut CompareSession<'_, C>,
    step: AlignStep<'_>,
) -> DiffNode {
    let nested = (
        step.left.and_then(|l| l.children.as_ref()),
        step.right.and_then(|r| r.children.as_ref()),
    );
    let children = match nested {
        (Some(l), Some(r)) => diff_level(session, l, r),
        _ => Vec::new(),
    };

    DiffNode {
        kind: step.kind,
        left: step.left.map(NodeRef::from),
        right: step.right.map(NodeRef::from),
        ancestor: None,
        children,
    }
}
