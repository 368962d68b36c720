//! Pairing of left branches with right branches.
//!
//! Before sequences can be aligned, the matcher decides which left sequence
//! corresponds to which right sequence. The search is heuristic:
//!
//! 1. The longest left and longest right sequence are paired
//!    unconditionally (first found on ties).
//! 2. Remaining left sequences are taken in order. For each, every remaining
//!    right sequence is tried, and the one minimizing its alignment cost plus
//!    the estimated cost of aligning everything else wins. Leaving the left
//!    sequence unmatched is the baseline a candidate must strictly beat.
//! 3. Right sequences left over at the end are unmatched.
//!
//! The estimate is a branch-and-bound search: a candidate whose pairwise cost
//! plus the unavoidable indel cost of the rest cannot beat the best total
//! found so far is skipped. Processing
//! order influences what gets pruned, so the result is not guaranteed to be
//! a globally optimal assignment.

use tracing::debug;

use crate::align::Alignment;
use crate::cost::NodeComparator;
use crate::forest::Sequence;
use crate::session::CompareSession;

/// One left sequence paired with one right sequence. An absent side means
/// the present one is aligned against the empty sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Result of the best assignment for one left sequence.
#[derive(Clone, Copy, Debug)]
struct Choice {
    /// Position in the candidate slice, `None` for "unmatched".
    right: Option<usize>,
    total: f64,
}

/// Pair every sequence of `left` and `right` exactly once.
pub fn match_branches<C: NodeComparator + ?Sized>(
    session: &mut CompareSession<'_, C>,
    left: &[Sequence],
    right: &[Sequence],
) -> Vec<Pairing> {
    let mut pairings = Vec::with_capacity(left.len().max(right.len()));
    let mut lefts: Vec<usize> = (0..left.len()).collect();
    let mut rights: Vec<usize> = (0..right.len()).collect();

    if let (Some(l), Some(r)) = (longest(left), longest(right)) {
        debug!(left = l, right = r, len = left[l].len(), "seeded branch matching");
        pairings.push(Pairing {
            left: Some(l),
            right: Some(r),
        });
        lefts.retain(|&i| i != l);
        rights.retain(|&j| j != r);
    }

    let mut search = BranchSearch {
        session,
        left,
        right,
    };
    while !lefts.is_empty() {
        let first = lefts.remove(0);
        let choice = search.cheapest(first, &lefts, &rights, f64::INFINITY);
        let matched = choice.and_then(|c| c.right).map(|pos| rights.remove(pos));
        debug!(left = first, right = ?matched, "matched branch");
        pairings.push(Pairing {
            left: Some(first),
            right: matched,
        });
    }

    pairings.extend(rights.into_iter().map(|r| Pairing {
        left: None,
        right: Some(r),
    }));
    pairings
}

/// Match branches and align every resulting pair.
pub fn align_branches<'a, C: NodeComparator + ?Sized>(
    session: &mut CompareSession<'_, C>,
    left: &'a [Sequence],
    right: &'a [Sequence],
) -> Vec<(Pairing, Alignment<'a>)> {
    match_branches(session, left, right)
        .into_iter()
        .map(|p| {
            let alignment = session.align(p.left.map(|i| &left[i]), p.right.map(|j| &right[j]));
            (p, alignment)
        })
        .collect()
}

/// Index of the longest sequence, the first one on ties.
fn longest(sequences: &[Sequence]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, s) in sequences.iter().enumerate() {
        if best.map_or(true, |b| s.len() > sequences[b].len()) {
            best = Some(i);
        }
    }
    best
}

struct BranchSearch<'s, 'c, 'a, C: NodeComparator + ?Sized> {
    session: &'s mut CompareSession<'c, C>,
    left: &'a [Sequence],
    right: &'a [Sequence],
}

impl<C: NodeComparator + ?Sized> BranchSearch<'_, '_, '_, C> {
    /// Best way to place `first`, given that `rest` and `rights` still have
    /// to be aligned afterwards. Returns `None` when nothing fits in `bound`.
    fn cheapest(
        &mut self,
        first: usize,
        rest: &[usize],
        rights: &[usize],
        bound: f64,
    ) -> Option<Choice> {
        let mut best: Option<Choice> = None;
        let mut best_yet = bound;

        let alone = self.session.empty_cost(&self.left[first]);
        if alone + self.lower_bound(rest, rights) <= bound + self.session.config().epsilon {
            if let Some(others) = self.estimate(rest, rights, best_yet - alone) {
                best_yet = alone + others;
                best = Some(Choice {
                    right: None,
                    total: best_yet,
                });
            }
        }

        for (pos, &r) in rights.iter().enumerate() {
            let pair = self
                .session
                .alignment_cost(&self.left[first], &self.right[r]);
            let remaining: Vec<usize> = rights
                .iter()
                .enumerate()
                .filter(|(p, _)| *p != pos)
                .map(|(_, &j)| j)
                .collect();
            // Once a choice exists, a candidate must beat it strictly.
            let floor = pair + self.lower_bound(rest, &remaining);
            let hopeless = match best {
                Some(_) => floor >= best_yet,
                None => floor > best_yet + self.session.config().epsilon,
            };
            if hopeless {
                continue;
            }
            if let Some(others) = self.estimate(rest, &remaining, best_yet - pair) {
                let total = pair + others;
                if best.is_none() || total < best_yet {
                    best_yet = total;
                    best = Some(Choice {
                        right: Some(pos),
                        total,
                    });
                }
            }
        }

        best
    }

    /// Cost every assignment of `lefts` and `rights` must pay: unmatched
    /// node counts can only be absorbed by insertions or deletions.
    fn lower_bound(&self, lefts: &[usize], rights: &[usize]) -> f64 {
        let l: usize = lefts.iter().map(|&i| self.left[i].len()).sum();
        let r: usize = rights.iter().map(|&j| self.right[j].len()).sum();
        l.abs_diff(r) as f64 * self.session.indel()
    }

    /// Cheapest total cost of aligning `lefts` with `rights`, if it does not
    /// exceed `bound`.
    fn estimate(&mut self, lefts: &[usize], rights: &[usize], bound: f64) -> Option<f64> {
        match lefts.split_first() {
            Some((&first, rest)) => self.cheapest(first, rest, rights, bound).map(|c| c.total),
            None => {
                let total: f64 = rights
                    .iter()
                    .map(|&r| self.session.empty_cost(&self.right[r]))
                    .sum();
                (total <= bound).then_some(total)
            }
        }
    }
}
