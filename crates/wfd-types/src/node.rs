//! Node identity and node kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a node inside one workflow.
///
/// A node is identified by the chain of per-parent indices leading to it:
/// a top-level node with index 3 is `3`, node 1 inside that metanode is
/// `3:1`. Ids are unique within a workflow, which makes them suitable keys
/// for per-comparison memoization.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Vec<u32>);

impl NodeId {
    /// Id of the workflow itself (empty path).
    pub fn workflow() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` for the workflow id.
    pub fn is_workflow(&self) -> bool {
        self.0.is_empty()
    }

    /// Id of a top-level node.
    pub fn root(index: u32) -> Self {
        Self(vec![index])
    }

    /// Id of a node nested inside `self`.
    pub fn child(&self, index: u32) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Index within the parent workflow.
    pub fn index(&self) -> u32 {
        self.0.last().copied().unwrap_or_default()
    }

    /// Nesting depth (1 for top-level nodes).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The full index path.
    pub fn path(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                f.write_str(":")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        Ok(())
    }
}

/// What kind of entity a workflow node is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A plain node without nested content.
    #[default]
    Native,
    /// A metanode: an inline sub-workflow.
    MetaNode,
    /// A component: an encapsulated sub-workflow with its own settings.
    Component,
}

impl NodeKind {
    /// Returns `true` for kinds that may contain a nested workflow.
    pub fn is_container(self) -> bool {
        !matches!(self, Self::Native)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "node"),
            Self::MetaNode => write!(f, "metanode"),
            Self::Component => write!(f, "component"),
        }
    }
}
