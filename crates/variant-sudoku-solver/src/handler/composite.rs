//! Composite constraints (spec §4.3.7).
//!
//! A top-level `And` has no runtime handler: the builder flattens it into its parent's
//! child list at build time (spec §4.4 step 5). [`AndHandler`] exists only for the case
//! an `And` appears *inside* an `Or`'s child list, where it must survive as one handler
//! (see its doc comment).
//!
//! `Or` enforces each child against a trial copy of the grid, then unions the surviving
//! children's masks back onto the real grid — a cell may hold any value any *feasible*
//! child would allow. If every child is infeasible, the `Or` itself is infeasible. This
//! requires cloning the grid per child (spec §9: "Implement by cloning the current grid
//! to a sibling buffer per child"), so `Or` handlers are kept off the hot inner loop by
//! giving them a low priority (heavy, runs last).

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// `Or(children)`: at least one child's constraints must hold.
#[derive(Debug, Clone)]
pub struct OrHandler {
    children: Vec<BoxedHandler>,
    cells: Vec<CellId>,
    priority: i32,
}

impl OrHandler {
    /// Creates an `Or` over `children`, watching the union of their cell lists.
    #[must_use]
    pub fn new(children: Vec<BoxedHandler>) -> Self {
        let mut cells: Vec<CellId> = children.iter().flat_map(|c| c.cells().to_vec()).collect();
        cells.sort_by_key(CellId::index);
        cells.dedup();
        Self { children, cells, priority: 1 }
    }
}

impl Handler for OrHandler {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn initialize(
        &mut self,
        grid: &mut CandidateGrid,
        exclusions: &mut ExclusionGraph,
        shape: Shape,
        scratch: &mut ScratchAllocator,
    ) -> bool {
        if self.children.is_empty() {
            return false; // an empty Or is always infeasible (spec §8)
        }
        // A child that proves infeasible against the shared initial grid does not
        // doom the Or (another child may still hold), so its result is ignored here;
        // only its structural registration (exclusions, scratch) is kept. Each child
        // still gets its own grid clone so one child's pruning can't leak into another's.
        for child in &mut self.children {
            child.initialize(&mut grid.clone(), exclusions, shape, scratch);
        }
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        let mut surviving: Vec<CandidateGrid> = Vec::new();
        for child in &self.children {
            let mut trial = grid.clone();
            let mut trial_acc = Accumulator::new();
            if child.enforce(&mut trial, scratch, &mut trial_acc) {
                surviving.push(trial);
            }
        }
        if surviving.is_empty() {
            return false;
        }
        for &c in &self.cells {
            let union = surviving
                .iter()
                .map(|trial| trial.candidates_at(c))
                .fold(ValueMask::EMPTY, |acc_mask, m| acc_mask | m);
            if grid.intersect_candidates(c, union) {
                acc.add_for_cell(c);
                if grid.is_empty_at(c) {
                    return false;
                }
            }
        }
        true
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

/// An `And` group that must survive as a single handler: used only to represent an
/// `Or`'s child when that child is itself a composite of several leaf constraints. A
/// top-level `And` instead flattens directly into its parent's handler list (spec §4.4
/// step 5) — "every handler in the list must hold" is already what the list means, so
/// grouping only needs to survive as one handler inside an `Or` branch, where
/// [`OrHandler`] needs exactly one handler per alternative.
#[derive(Debug, Clone)]
pub struct AndHandler {
    children: Vec<BoxedHandler>,
    cells: Vec<CellId>,
    priority: i32,
}

impl AndHandler {
    /// Creates an `And` over `children`, watching the union of their cell lists and
    /// dequeuing at the lowest (most urgent) priority among them.
    #[must_use]
    pub fn new(children: Vec<BoxedHandler>) -> Self {
        let mut cells: Vec<CellId> = children.iter().flat_map(|c| c.cells().to_vec()).collect();
        cells.sort_by_key(CellId::index);
        cells.dedup();
        let priority = children.iter().map(|c| c.priority()).min().unwrap_or(0);
        Self { children, cells, priority }
    }
}

impl Handler for AndHandler {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn initialize(
        &mut self,
        grid: &mut CandidateGrid,
        exclusions: &mut ExclusionGraph,
        shape: Shape,
        scratch: &mut ScratchAllocator,
    ) -> bool {
        let mut feasible = true;
        for child in &mut self.children {
            if !child.initialize(grid, exclusions, shape, scratch) {
                feasible = false;
            }
        }
        feasible
    }

    fn enforce(&self, grid: &mut CandidateGrid, scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        let mut feasible = true;
        for child in &self.children {
            if !child.enforce(grid, scratch, acc) {
                feasible = false;
            }
        }
        feasible
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::binary::{BinaryHandler, PairKind};
    use variant_sudoku_core::Shape;

    #[test]
    fn empty_or_is_infeasible() {
        let mut handler = OrHandler::new(Vec::new());
        let shape = Shape::new(1, 2, 9);
        let mut grid = CandidateGrid::new(shape);
        let mut exclusions = ExclusionGraph::new(2);
        let mut scratch = ScratchAllocator::new();
        assert!(!handler.initialize(&mut grid, &mut exclusions, shape, &mut scratch));
    }

    #[test]
    fn single_feasible_child_behaves_like_that_child() {
        let shape = Shape::new(1, 2, 9);
        let cells: Vec<_> = shape.row_cells(0).collect();
        let child: BoxedHandler =
            Box::new(BinaryHandler::new(PairKind::Sum { target: 10 }, cells[0], cells[1]));
        let handler = OrHandler::new(vec![child]);
        let mut grid = CandidateGrid::new(shape);
        grid.place(cells[0], 8);
        let mut acc = Accumulator::new();
        let scratch = ScratchAllocator::new();
        assert!(handler.enforce(&mut grid, &scratch, &mut acc));
        assert_eq!(grid.candidates_at(cells[1]).fixed_digit(), Some(2));
    }

    #[test]
    fn union_across_two_feasible_children() {
        let shape = Shape::new(1, 2, 9);
        let cells: Vec<_> = shape.row_cells(0).collect();
        let child_a: BoxedHandler =
            Box::new(BinaryHandler::new(PairKind::Sum { target: 10 }, cells[0], cells[1]));
        let child_b: BoxedHandler =
            Box::new(BinaryHandler::new(PairKind::Sum { target: 5 }, cells[0], cells[1]));
        let handler = OrHandler::new(vec![child_a, child_b]);
        let mut grid = CandidateGrid::new(shape);
        let mut acc = Accumulator::new();
        let scratch = ScratchAllocator::new();
        assert!(handler.enforce(&mut grid, &scratch, &mut acc));
        // both children remain feasible pre-assignment, so candidates are the union.
        assert!(grid.candidates_at(cells[0]).count() > 1);
    }

    #[test]
    fn and_handler_requires_every_child() {
        // cells[0] = 5 forces cells[1] = 5 via the Sum-to-10 child, but the NotEqual
        // child forbids cells[1] == cells[0]; together they must be infeasible.
        let shape = Shape::new(1, 2, 9);
        let cells: Vec<_> = shape.row_cells(0).collect();
        let child_a: BoxedHandler =
            Box::new(BinaryHandler::new(PairKind::Sum { target: 10 }, cells[0], cells[1]));
        let child_b: BoxedHandler = Box::new(BinaryHandler::new(PairKind::NotEqual, cells[0], cells[1]));
        let handler = AndHandler::new(vec![child_a, child_b]);
        let mut grid = CandidateGrid::new(shape);
        grid.place(cells[0], 5);
        let mut acc = Accumulator::new();
        let scratch = ScratchAllocator::new();
        assert!(!handler.enforce(&mut grid, &scratch, &mut acc));
        assert!(grid.is_empty_at(cells[1]));
    }
}
