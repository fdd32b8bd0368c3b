//! Candidate selector: branching-cell and value-order choice (spec §4.6).

use rand::Rng;
use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape};

/// Picks the branching cell: fewest non-fixed candidates, ties broken by highest
/// degree in the exclusion graph, then lowest index. Returns `None` if every cell is
/// already fixed.
#[must_use]
pub fn select_branching_cell(grid: &CandidateGrid, exclusions: &ExclusionGraph, shape: Shape) -> Option<CellId> {
    shape
        .cells()
        .filter(|&c| !grid.is_fixed_at(c))
        .min_by_key(|&c| (grid.candidates_at(c).count(), std::cmp::Reverse(exclusions.neighbors(c).len())))
}

/// Value order for ordinary enumeration modes: ascending digit order.
#[must_use]
pub fn ascending_value_order(grid: &CandidateGrid, cell: CellId) -> Vec<u8> {
    grid.candidates_at(cell).iter().collect()
}

/// Value order for `estimate_solutions`: a uniformly random permutation of the
/// candidates, so repeated sampling explores different branches (spec §4.6).
pub fn random_value_order<R: Rng + ?Sized>(grid: &CandidateGrid, cell: CellId, rng: &mut R) -> Vec<u8> {
    let mut values: Vec<u8> = grid.candidates_at(cell).iter().collect();
    // Fisher-Yates shuffle.
    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i);
        values.swap(i, j);
    }
    values
}
