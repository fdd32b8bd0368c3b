//! The cell-exclusion graph (spec layer 2, §4.2).
//!
//! A symmetric "must differ" relation over cells, generalizing the teacher's per-digit
//! `DigitPositions`-derived house peers (rows/columns/boxes only) into a direct
//! cell-by-cell relation that also covers jigsaw regions, cages, lines, and any other
//! handler-declared uniqueness set.

use crate::{CellId, CellSet, Shape};

/// A symmetric, reflexive-free "these two cells must differ" relation.
///
/// Built once during the builder's compile step and during each handler's
/// `initialize`; frozen (read-only) for the remainder of the puzzle's lifetime, per
/// spec §4.2 and §9.
#[derive(Debug, Clone)]
pub struct ExclusionGraph {
    neighbors: Vec<CellSet>,
}

impl ExclusionGraph {
    /// Creates an empty graph over `num_cells` cells.
    #[must_use]
    pub fn new(num_cells: usize) -> Self {
        Self { neighbors: vec![CellSet::new(); num_cells] }
    }

    /// Registers that `a` and `b` must hold different digits.
    ///
    /// A no-op if `a == b`, matching the "reflexive-free" invariant — a cell is never
    /// recorded as its own neighbor.
    pub fn add_mutual(&mut self, a: CellId, b: CellId) {
        if a == b {
            return;
        }
        self.neighbors[a.index_usize()].insert(b);
        self.neighbors[b.index_usize()].insert(a);
    }

    /// Registers every pairwise exclusion among `cells` (used by e.g. cages and
    /// uniqueness regions to declare their members mutually exclusive in one call).
    pub fn add_mutual_all(&mut self, cells: &[CellId]) {
        for (i, &a) in cells.iter().enumerate() {
            for &b in &cells[i + 1..] {
                self.add_mutual(a, b);
            }
        }
    }

    /// Returns whether `a` and `b` must differ.
    #[must_use]
    pub fn contains(&self, a: CellId, b: CellId) -> bool {
        a != b && self.neighbors[a.index_usize()].contains(b)
    }

    /// Returns the set of every cell that must differ from `a`.
    #[must_use]
    pub fn neighbors(&self, a: CellId) -> CellSet {
        self.neighbors[a.index_usize()]
    }

    /// Returns whether every pair of cells in `set` must differ from each other.
    #[must_use]
    pub fn all_mutually_exclusive(&self, set: CellSet) -> bool {
        let cells: Vec<CellId> = set.iter().collect();
        cells.iter().enumerate().all(|(i, &a)| {
            cells[i + 1..].iter().all(|&b| self.contains(a, b))
        })
    }
}

/// Every unordered pair of cells a knight's move apart (spec §4.1 layout constraint
/// "knight").
#[must_use]
pub fn knight_adjacent_pairs(shape: Shape) -> Vec<(CellId, CellId)> {
    adjacent_pairs(shape, &[(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)])
}

/// Every unordered pair of cells a king's move apart (spec §4.1 layout constraint
/// "king").
#[must_use]
pub fn king_adjacent_pairs(shape: Shape) -> Vec<(CellId, CellId)> {
    adjacent_pairs(shape, &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)])
}

/// Every unordered pair of orthogonally (edge-)adjacent cells, used both for
/// `AntiConsecutive`-style layout sugar and as the candidate set a host applies
/// `StrictKropki`/`StrictXV` to.
#[must_use]
pub fn orthogonally_adjacent_pairs(shape: Shape) -> Vec<(CellId, CellId)> {
    adjacent_pairs(shape, &[(-1, 0), (1, 0), (0, -1), (0, 1)])
}

fn adjacent_pairs(shape: Shape, offsets: &[(i8, i8)]) -> Vec<(CellId, CellId)> {
    let mut pairs = Vec::new();
    for row in 0..shape.rows() {
        for col in 0..shape.cols() {
            let a = shape.cell_id(row, col);
            for &(dr, dc) in offsets {
                let (nr, nc) = (i16::from(row) + i16::from(dr), i16::from(col) + i16::from(dc));
                if nr < 0 || nc < 0 || nr >= i16::from(shape.rows()) || nc >= i16::from(shape.cols()) {
                    continue;
                }
                let b = shape.cell_id(nr as u8, nc as u8);
                if a < b {
                    pairs.push((a, b));
                }
            }
        }
    }
    pairs
}
