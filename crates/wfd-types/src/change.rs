//! Classification of diff nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single diff node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Nothing below this node differs.
    NoChange,
    /// Two aligned nodes whose content differs.
    Change,
    /// Two aligned nodes with equal content. Kept visible so the pairing
    /// can still be inspected at the settings level.
    PseudoConflict,
    /// Present only on the right side.
    Addition,
    /// Present only on the left side.
    Deletion,
}

impl ChangeKind {
    /// Returns `true` if this kind reports an actual difference.
    pub fn is_difference(self) -> bool {
        matches!(self, Self::Change | Self::Addition | Self::Deletion)
    }

    /// The kind seen from the other side of the comparison.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Addition => Self::Deletion,
            Self::Deletion => Self::Addition,
            other => other,
        }
    }

    /// One-character marker used by text renderers.
    pub fn symbol(self) -> char {
        match self {
            Self::NoChange => ' ',
            Self::Change => '~',
            Self::PseudoConflict => '=',
            Self::Addition => '+',
            Self::Deletion => '-',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChange => write!(f, "no change"),
            Self::Change => write!(f, "change"),
            Self::PseudoConflict => write!(f, "no real difference"),
            Self::Addition => write!(f, "addition"),
            Self::Deletion => write!(f, "deletion"),
        }
    }
}
