//! Global alignment of two node sequences (Needleman–Wunsch).
//!
//! [`fill_grid`] computes the edit-distance table; [`align`] additionally
//! retraces it into an ordered list of [`AlignStep`]s.
//!
//! # Invariants
//!
//! - `grid[i][0] = i·indel` and `grid[0][j] = j·indel`.
//! - Backtrace prefers diagonal, then deletion, then insertion, accepting a
//!   transition when it reproduces the cell within `epsilon`. The order is
//!   fixed so equal-cost alignments are always reported the same way.
//! - Every diagonal step is reported, even for identical nodes.

use wfd_types::ChangeKind;

use crate::forest::NodeRecord;

/// Supplies pairwise substitution costs and content equality to the aligner.
pub trait PairScorer {
    /// Substitution cost of aligning `left` with `right`.
    fn cost(&mut self, left: &NodeRecord, right: &NodeRecord) -> f64;

    /// Whether an aligned pair carries identical content.
    fn equal(&mut self, left: &NodeRecord, right: &NodeRecord) -> bool;
}

/// Cost parameters of one alignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignParams {
    pub indel: f64,
    pub epsilon: f64,
}

/// Row-major `(|left|+1) × (|right|+1)` table of prefix edit distances.
#[derive(Clone, Debug)]
pub struct CostGrid {
    cols: usize,
    cells: Vec<f64>,
}

impl CostGrid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    /// Minimum cost of aligning the first `i` left nodes with the first `j`
    /// right nodes.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.cols + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.cols + j] = value;
    }

    /// Cost of the full alignment.
    pub fn total(&self) -> f64 {
        self.cells.last().copied().unwrap_or_default()
    }
}

/// One step of an alignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignStep<'a> {
    pub kind: ChangeKind,
    pub left: Option<&'a NodeRecord>,
    pub right: Option<&'a NodeRecord>,
}

/// Ordered alignment of two sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment<'a> {
    pub steps: Vec<AlignStep<'a>>,
    pub cost: f64,
}

impl Alignment<'_> {
    /// Number of steps of the given kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }
}

/// Fill the edit-distance table without retracing it.
pub fn fill_grid(
    left: &[NodeRecord],
    right: &[NodeRecord],
    params: AlignParams,
    scorer: &mut impl PairScorer,
) -> CostGrid {
    let mut grid = CostGrid::new(left.len() + 1, right.len() + 1);
    for i in 1..=left.len() {
        grid.set(i, 0, i as f64 * params.indel);
    }
    for j in 1..=right.len() {
        grid.set(0, j, j as f64 * params.indel);
    }

    for i in 1..=left.len() {
        for j in 1..=right.len() {
            let diagonal = grid.get(i - 1, j - 1) + scorer.cost(&left[i - 1], &right[j - 1]);
            let up = grid.get(i - 1, j) + params.indel;
            let side = grid.get(i, j - 1) + params.indel;
            grid.set(i, j, diagonal.min(up).min(side));
        }
    }

    grid
}

/// Align two sequences and retrace the optimal path.
///
/// # Panics
///
/// Panics if some cell cannot be reproduced from any neighbour within
/// `epsilon`, which means the scorer returned inconsistent costs.
pub fn align<'a>(
    left: &'a [NodeRecord],
    right: &'a [NodeRecord],
    params: AlignParams,
    scorer: &mut impl PairScorer,
) -> Alignment<'a> {
    let grid = fill_grid(left, right, params, scorer);
    let near = |a: f64, b: f64| (a - b).abs() < params.epsilon;

    let (mut i, mut j) = (left.len(), right.len());
    let mut steps = Vec::with_capacity(i.max(j));

    while i > 0 || j > 0 {
        let here = grid.get(i, j);

        if i > 0 && j > 0 {
            let (l, r) = (&left[i - 1], &right[j - 1]);
            if near(grid.get(i - 1, j - 1) + scorer.cost(l, r), here) {
                let kind = if scorer.equal(l, r) {
                    ChangeKind::PseudoConflict
                } else {
                    ChangeKind::Change
                };
                steps.push(AlignStep {
                    kind,
                    left: Some(l),
                    right: Some(r),
                });
                i -= 1;
                j -= 1;
                continue;
            }
        }

        if i > 0 && near(grid.get(i - 1, j) + params.indel, here) {
            steps.push(AlignStep {
                kind: ChangeKind::Deletion,
                left: Some(&left[i - 1]),
                right: None,
            });
            i -= 1;
            continue;
        }

        if j > 0 && near(grid.get(i, j - 1) + params.indel, here) {
            steps.push(AlignStep {
                kind: ChangeKind::Addition,
                left: None,
                right: Some(&right[j - 1]),
            });
            j -= 1;
            continue;
        }

        panic!("alignment grid inconsistent at ({i}, {j}): no transition reproduces {here}");
    }

    steps.reverse();
    Alignment {
        steps,
        cost: grid.total(),
    }
}
