//! Partitioning of a workflow level into linear branches.
//!
//! A branch is a maximal chain `a -> b -> c` in which every link is the only
//! outgoing connection of its source and the only incoming connection of its
//! target. Nodes where the graph splits or merges start a new branch, as do
//! nodes without inputs.
//!
//! # Invariants
//!
//! - Every node of the level appears in exactly one branch.
//! - Within a branch, nodes follow connection order.
//! - Output is deterministic: ties are broken by node index.

use std::collections::{BTreeMap, BTreeSet};

use wfd_types::WorkflowSnapshot;

/// Split the direct children of `workflow` into linear branches.
///
/// Returns node indices grouped per branch. Branches are ordered by the
/// position of their first node in a topological order of the level.
pub fn extract_sequences(workflow: &WorkflowSnapshot) -> Vec<Vec<u32>> {
    let mut preds: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut succs: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for node in &workflow.nodes {
        preds.entry(node.index).or_default();
        succs.entry(node.index).or_default();
    }
    for conn in &workflow.connections {
        // Edge sets collapse parallel port-to-port connections.
        if conn.source == conn.dest
            || !preds.contains_key(&conn.source)
            || !preds.contains_key(&conn.dest)
        {
            continue;
        }
        preds.entry(conn.dest).or_default().insert(conn.source);
        succs.entry(conn.source).or_default().insert(conn.dest);
    }

    let mut branches: Vec<Vec<u32>> = Vec::new();
    let mut branch_of: BTreeMap<u32, usize> = BTreeMap::new();

    for index in topological_order(&preds, &succs) {
        let continues = match preds.get(&index) {
            Some(p) if p.len() == 1 => p
                .iter()
                .next()
                .filter(|pred| succs.get(*pred).is_some_and(|s| s.len() == 1))
                .and_then(|pred| branch_of.get(pred).copied()),
            _ => None,
        };

        let slot = match continues {
            Some(slot) => slot,
            None => {
                branches.push(Vec::new());
                branches.len() - 1
            }
        };
        branches[slot].push(index);
        branch_of.insert(index, slot);
    }

    branches
}

/// Kahn's algorithm, always releasing the smallest ready index first.
///
/// Nodes caught in a cycle are appended in index order so that the result
/// still covers the whole level.
fn topological_order(
    preds: &BTreeMap<u32, BTreeSet<u32>>,
    succs: &BTreeMap<u32, BTreeSet<u32>>,
) -> Vec<u32> {
    let mut pending: BTreeMap<u32, usize> = preds.iter().map(|(k, v)| (*k, v.len())).collect();
    let mut ready: BTreeSet<u32> = pending
        .iter()
        .filter(|(_, n)| **n == 0)
        .map(|(k, _)| *k)
        .collect();
    let mut order = Vec::with_capacity(pending.len());

    while let Some(index) = ready.pop_first() {
        pending.remove(&index);
        order.push(index);
        for next in succs.get(&index).into_iter().flatten() {
            if let Some(count) = pending.get_mut(next) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*next);
                }
            }
        }
    }

    order.extend(pending.keys().copied());
    order
}
