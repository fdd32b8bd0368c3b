//! Pairwise/binary-predicate constraints (spec §4.3.3).
//!
//! `Consecutive`, `NonConsecutive`, `Ratio`, `NonRatio`, `XV`/`Difference`-style sum
//! dots, `Inequality`, and `NotEqual` are all "a relation `R(x, y)` must hold between
//! the values of two specific cells." [`BinaryHandler`] enforces any [`PairKind`] by
//! the same support-based filter: a digit survives at one cell only if some digit
//! compatible with it under `R` survives at the other.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// The relation a [`BinaryHandler`] enforces between its two cells' values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// `|a - b| == delta` (`negate`: `|a - b| != delta`). `Consecutive` is
    /// `Difference { delta: 1, negate: false }`; `NonConsecutive` negates it.
    Difference { delta: i32, negate: bool },
    /// `a == factor * b || b == factor * a` (`negate` inverts). A black Kropki dot is
    /// `Ratio { factor: 2, negate: false }`.
    Ratio { factor: i32, negate: bool },
    /// `a + b == target`, either order. An `XV` "X" dot is `Sum { target: 10 }`; a "V"
    /// dot is `Sum { target: 5 }`.
    Sum { target: i32 },
    /// The cell listed first in [`BinaryHandler::cells`] must be strictly greater
    /// (`greater = true`) or strictly less (`greater = false`) than the second.
    Inequality { greater: bool },
    /// The two cells must not hold the same value (orthogonal/knight/king anti-clones).
    NotEqual,
    /// The two cells must hold the same value. Not user-facing by itself; the builder
    /// emits it when rewriting same-rank `FullRank` clues into equality pairs (spec
    /// §4.4 step 5).
    Equal,
    /// "All dots given" Kropki variant: this pair carries no dot, so it must satisfy
    /// neither the white-dot (`Difference { delta: 1 }`) nor the black-dot
    /// (`Ratio { factor: 2 }`) relation. A host applying the strict/"negative
    /// constraint" Kropki variant declares this over every adjacent pair it did *not*
    /// mark with a dot (e.g. via [`variant_sudoku_core::orthogonally_adjacent_pairs`]).
    StrictKropki,
    /// "All dots given" XV variant: this pair carries no X/V mark, so its values must
    /// not sum to 5 or 10. Declared the same way as [`PairKind::StrictKropki`], over
    /// every adjacent pair without an explicit X/V mark.
    StrictXV,
}

impl PairKind {
    fn compatible(self, x: u8, y: u8) -> bool {
        match self {
            PairKind::Difference { delta, negate } => {
                let matches = i32::from(x).abs_diff(i32::from(y)) as i32 == delta;
                matches != negate
            }
            PairKind::Ratio { factor, negate } => {
                let matches = i32::from(x) == factor * i32::from(y) || i32::from(y) == factor * i32::from(x);
                matches != negate
            }
            PairKind::Sum { target } => i32::from(x) + i32::from(y) == target,
            PairKind::Inequality { greater } => {
                if greater {
                    x > y
                } else {
                    x < y
                }
            }
            PairKind::NotEqual => x != y,
            PairKind::Equal => x == y,
            PairKind::StrictKropki => {
                i32::from(x).abs_diff(i32::from(y)) != 1
                    && i32::from(x) != 2 * i32::from(y)
                    && i32::from(y) != 2 * i32::from(x)
            }
            PairKind::StrictXV => i32::from(x) + i32::from(y) != 5 && i32::from(x) + i32::from(y) != 10,
        }
    }
}

/// A constraint over exactly two cells (spec §4.3.3).
#[derive(Debug, Clone)]
pub struct BinaryHandler {
    kind: PairKind,
    a: CellId,
    b: CellId,
    cells: [CellId; 2],
    priority: i32,
}

impl BinaryHandler {
    /// Creates a handler enforcing `kind` between `a` and `b`. For [`PairKind::Inequality`],
    /// `a` is the "greater/lesser" side named by the relation.
    #[must_use]
    pub fn new(kind: PairKind, a: CellId, b: CellId) -> Self {
        Self { kind, a, b, cells: [a, b], priority: 200 }
    }
}

impl Handler for BinaryHandler {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn initialize(
        &mut self,
        _grid: &mut CandidateGrid,
        exclusions: &mut ExclusionGraph,
        _shape: Shape,
        _scratch: &mut ScratchAllocator,
    ) -> bool {
        if self.a == self.b {
            return false;
        }
        if matches!(self.kind, PairKind::NotEqual) {
            exclusions.add_mutual(self.a, self.b);
        }
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        let mask_a = grid.candidates_at(self.a);
        let mask_b = grid.candidates_at(self.b);

        let keep_a = mask_a
            .into_iter()
            .filter(|&x| mask_b.into_iter().any(|y| self.kind.compatible(x, y)))
            .fold(ValueMask::EMPTY, ValueMask::with);
        let keep_b = mask_b
            .into_iter()
            .filter(|&y| mask_a.into_iter().any(|x| self.kind.compatible(x, y)))
            .fold(ValueMask::EMPTY, ValueMask::with);

        if grid.intersect_candidates(self.a, keep_a) {
            acc.add_for_cell(self.a);
            if grid.is_empty_at(self.a) {
                return false;
            }
        }
        if grid.intersect_candidates(self.b, keep_b) {
            acc.add_for_cell(self.b);
            if grid.is_empty_at(self.b) {
                return false;
            }
        }
        true
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }

    fn is_layout(&self) -> bool {
        matches!(self.kind, PairKind::NotEqual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use variant_sudoku_core::Shape;

    fn two_cells(values: u8) -> (CandidateGrid, CellId, CellId) {
        let shape = Shape::new(1, 2, values);
        let grid = CandidateGrid::new(shape);
        let cells: Vec<_> = shape.row_cells(0).collect();
        (grid, cells[0], cells[1])
    }

    mod consecutive {
        use super::*;

        #[test]
        fn fixing_one_side_restricts_the_other() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 5);
            let handler = BinaryHandler::new(PairKind::Difference { delta: 1, negate: false }, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(grid.candidates_at(b).contains(4));
            assert!(grid.candidates_at(b).contains(6));
            assert_eq!(grid.candidates_at(b).count(), 2);
        }
    }

    mod non_consecutive {
        use super::*;

        #[test]
        fn excludes_neighbors_only() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 5);
            let handler = BinaryHandler::new(PairKind::Difference { delta: 1, negate: true }, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(!grid.candidates_at(b).contains(4));
            assert!(!grid.candidates_at(b).contains(6));
            assert!(grid.candidates_at(b).contains(1));
        }
    }

    mod ratio {
        use super::*;

        #[test]
        fn black_kropki_dot_restricts_to_doubles() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 3);
            let handler = BinaryHandler::new(PairKind::Ratio { factor: 2, negate: false }, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(grid.candidates_at(b).contains(6));
            assert_eq!(grid.candidates_at(b).count(), 1);
        }
    }

    mod xv_sum {
        use super::*;

        #[test]
        fn sum_dot_restricts_both_sides() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 8);
            let handler = BinaryHandler::new(PairKind::Sum { target: 10 }, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert_eq!(grid.candidates_at(b).fixed_digit(), Some(2));
        }
    }

    mod inequality {
        use super::*;

        #[test]
        fn greater_excludes_the_max_value_on_the_lesser_side() {
            let (mut grid, a, b) = two_cells(4);
            let handler = BinaryHandler::new(PairKind::Inequality { greater: true }, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(!grid.candidates_at(a).contains(1)); // a must beat some b >= 1, fine, but a=1 has no b<1
            assert!(!grid.candidates_at(b).contains(4));
        }
    }

    mod not_equal {
        use super::*;

        #[test]
        fn registers_mutual_exclusion() {
            let (mut grid, a, b) = two_cells(9);
            let mut handler = BinaryHandler::new(PairKind::NotEqual, a, b);
            let mut exclusions = ExclusionGraph::new(2);
            let mut scratch = ScratchAllocator::new();
            assert!(handler.initialize(&mut grid, &mut exclusions, Shape::new(1, 2, 9), &mut scratch));
            assert!(exclusions.contains(a, b));
        }

        #[test]
        fn same_cell_twice_is_infeasible() {
            let (mut grid, a, _b) = two_cells(9);
            let mut handler = BinaryHandler::new(PairKind::NotEqual, a, a);
            let mut exclusions = ExclusionGraph::new(2);
            let mut scratch = ScratchAllocator::new();
            assert!(!handler.initialize(&mut grid, &mut exclusions, Shape::new(1, 2, 9), &mut scratch));
        }

        #[test]
        fn counts_as_a_layout_constraint() {
            let (_, a, b) = two_cells(9);
            let handler = BinaryHandler::new(PairKind::NotEqual, a, b);
            assert!(handler.is_layout());
        }
    }

    mod equal {
        use super::*;

        #[test]
        fn fixing_one_side_fixes_the_other() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 7);
            let handler = BinaryHandler::new(PairKind::Equal, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert_eq!(grid.candidates_at(b).fixed_digit(), Some(7));
        }
    }

    mod strict_kropki {
        use super::*;

        #[test]
        fn excludes_both_dot_relations() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 2);
            let handler = BinaryHandler::new(PairKind::StrictKropki, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            // b=1 (diff 1), b=3 (diff 1), b=4 (ratio 2) would all mark a dot; excluded.
            assert!(!grid.candidates_at(b).contains(1));
            assert!(!grid.candidates_at(b).contains(3));
            assert!(!grid.candidates_at(b).contains(4));
            assert!(grid.candidates_at(b).contains(5));
        }
    }

    mod strict_xv {
        use super::*;

        #[test]
        fn excludes_both_sum_targets() {
            let (mut grid, a, b) = two_cells(9);
            grid.place(a, 2);
            let handler = BinaryHandler::new(PairKind::StrictXV, a, b);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(!grid.candidates_at(b).contains(3)); // 2+3=5
            assert!(!grid.candidates_at(b).contains(8)); // 2+8=10
            assert!(grid.candidates_at(b).contains(4));
        }
    }
}
