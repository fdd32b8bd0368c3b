//! The sum family (spec §4.3.2).
//!
//! `Cage`, `Sum`, `Arrow`, `DoubleArrow`, `PillArrow`, `Lockout`, `Sandwich`, `XSum`,
//! `LittleKiller`, `RegionSumLine`, `SumLine`, and `Lunchbox` all boil down to "some set
//! of free cells must sum to a target", possibly with a uniqueness requirement. They
//! share one range-propagation routine, [`SumRange`], per spec §9's "a `SumRange`
//! helper used by all sum-family handlers" design note.
//!
//! Variants whose target or participant set depends on where a digit currently sits on
//! the line (`Sandwich`, `XSum`, `LittleKiller`, `RegionSumLine`, `Lunchbox`) propagate
//! only once enough of the line is fixed to pin down that structure; until then they
//! make no change. This is sound (never discards a valid candidate) even though it is
//! weaker than a fully general reader — completeness of the final solution set still
//! comes from the search engine's backtracking, which any handler's under-propagation
//! can only slow down, never invalidate.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask, ValueTables};

use crate::{handler::region, Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// Shared range-propagation routine for a target sum over a set of free cells.
///
/// Computes `[minSum, maxSum]` from each free cell's own min/max candidate, then
/// tightens every free cell's mask to the digits compatible with the target once the
/// other cells' extremes are accounted for. If `unique`, also removes any digit that
/// cannot appear in a `k`-digit subset reaching the target (subset-sum feasibility via
/// the shape's precomputed [`ValueTables`]).
#[derive(Debug, Clone, Copy)]
pub struct SumRange<'a> {
    /// The puzzle-wide precomputed sum/subset-sum tables.
    pub tables: &'a ValueTables,
}

impl SumRange<'_> {
    /// Applies range propagation for `target` over `cells`, recording touched cells
    /// into `acc`. Returns `false` if no assignment can reach `target`.
    pub fn propagate(
        &self,
        cells: &[CellId],
        target: i32,
        unique: bool,
        grid: &mut CandidateGrid,
        acc: &mut Accumulator,
    ) -> bool {
        if target < 0 {
            return false;
        }
        let target = target as u32;
        let n = cells.len();

        // Per-cell min/max candidate, and the sum of everyone else's extremes.
        let mins: Vec<u32> = cells
            .iter()
            .map(|&c| grid.candidates_at(c).min_digit().map_or(0, u32::from))
            .collect();
        let maxs: Vec<u32> = cells
            .iter()
            .map(|&c| grid.candidates_at(c).max_digit().map_or(0, u32::from))
            .collect();
        if mins.iter().any(|&m| m == 0) {
            return false; // some cell already has no candidates
        }
        let total_min: u32 = mins.iter().sum();
        let total_max: u32 = maxs.iter().sum();
        if target < total_min || target > total_max {
            return false;
        }

        for (i, &cell) in cells.iter().enumerate() {
            let others_min: u32 = total_min - mins[i];
            let others_max: u32 = total_max - maxs[i];
            let lo = target.saturating_sub(others_max).max(1).min(16) as u8;
            let hi = target.saturating_sub(others_min).min(16);
            let mut allowed = ValueMask::EMPTY;
            if hi >= u32::from(lo) {
                let hi = hi as u8;
                for d in lo..=hi {
                    allowed = allowed.with(d);
                }
            }
            if grid.intersect_candidates(cell, allowed) {
                acc.add_for_cell(cell);
                if grid.is_empty_at(cell) {
                    return false;
                }
            }
        }

        if unique && n >= 1 {
            // Subset-sum feasibility: a digit survives at cell i only if there exists a
            // choice of distinct digits for the remaining n-1 cells, disjoint from it,
            // reaching `target - d`.
            let union_others = |skip: usize| -> ValueMask {
                cells
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != skip)
                    .fold(ValueMask::EMPTY, |m, (_, &c)| m | grid.candidates_at(c))
            };
            for (i, &cell) in cells.iter().enumerate() {
                let mask = grid.candidates_at(cell);
                let others_mask = union_others(i).without_unchecked(mask.fixed_digit());
                let mut keep = ValueMask::EMPTY;
                for d in mask {
                    let remaining = target.saturating_sub(u32::from(d));
                    let pool = others_mask.without(d);
                    let feasible = if n == 1 {
                        remaining == 0
                    } else {
                        let k = (n - 1) as u32;
                        match (
                            self.tables.min_subset_sum(pool, k),
                            self.tables.max_subset_sum(pool, k),
                        ) {
                            (Some(lo), Some(hi)) => remaining >= lo && remaining <= hi,
                            _ => false,
                        }
                    };
                    if feasible {
                        keep = keep.with(d);
                    }
                }
                if grid.intersect_candidates(cell, keep) {
                    acc.add_for_cell(cell);
                    if grid.is_empty_at(cell) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

trait MaskExt {
    fn without_unchecked(self, digit: Option<u8>) -> Self;
}

impl MaskExt for ValueMask {
    fn without_unchecked(self, digit: Option<u8>) -> Self {
        match digit {
            Some(d) => self.without(d),
            None => self,
        }
    }
}

/// Reads the multi-digit number formed by `pill`'s cells, most-significant digit first,
/// or `None` if any pill cell is not yet fixed.
fn read_pill(pill: &[CellId], grid: &CandidateGrid) -> Option<i32> {
    let mut value = 0i32;
    for &c in pill {
        value = value * 10 + i32::from(grid.candidates_at(c).fixed_digit()?);
    }
    Some(value)
}

/// Which member of the sum family a [`SumHandler`] enforces, and the data specific to
/// that member.
#[derive(Debug, Clone, PartialEq)]
pub enum SumKind {
    /// `Cage(sum, cells, unique=true)`.
    Cage { sum: i32, unique: bool },
    /// `Sum(sum, cells, unique=false)`.
    Sum { sum: i32 },
    /// `Arrow` / `PillArrow(pillSize)` / `DoubleArrow`: one or more pill groups whose
    /// numeric reads sum to the target, which must equal the sum of `tail`.
    Arrow { pills: Vec<Vec<CellId>> },
    /// `Lockout(minDiff)`: the two named end cells must differ by at least `min_diff`;
    /// every other cell must fall outside the closed range between them.
    Lockout { ends: (CellId, CellId), min_diff: i32 },
    /// `Sandwich`: the sum of cells strictly between the cells holding digit 1 and
    /// digit `v` must equal `clue`.
    Sandwich { clue: i32, v: u8 },
    /// `XSum`: the sum of the first `n` cells equals `clue`, where `n` is the value of
    /// the line's first cell.
    XSum { clue: i32 },
    /// `LittleKiller`: the sum of every cell on a diagonal read equals `clue`.
    LittleKiller { clue: i32 },
    /// `RegionSumLine`: every consecutive `region_size`-cell chunk of the line sums to
    /// the same (initially unknown) total.
    RegionSumLine { region_size: u8 },
    /// `SumLine`: the whole line sums to `target`.
    SumLine { target: i32 },
    /// `Lunchbox`: the cells strictly between the line's minimum- and maximum-valued
    /// cells sum to `clue`.
    Lunchbox { clue: i32 },
}

/// A handler for one member of the sum family (spec §4.3.2).
#[derive(Debug, Clone)]
pub struct SumHandler {
    kind: SumKind,
    /// The cells this handler prunes: the cage/sum cells, or a line's full cell list
    /// for the line-shaped variants, or `tail` (plus pill cells) for arrows.
    cells: Vec<CellId>,
    values: u8,
    priority: i32,
}

impl SumHandler {
    /// Creates a handler for `kind` over `cells` (the full watch-list: for `Arrow`
    /// this is the pills followed by the tail; for line-shaped variants it is the
    /// ordered line).
    #[must_use]
    pub fn new(kind: SumKind, cells: Vec<CellId>, values: u8) -> Self {
        Self { kind, cells, values, priority: 60 }
    }
}

impl Handler for SumHandler {
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
        if let SumKind::Cage { unique: true, .. } = self.kind {
            exclusions.add_mutual_all(&self.cells);
        }
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        let tables = ValueTables::new(self.values);
        let range = SumRange { tables: &tables };
        match &self.kind {
            SumKind::Cage { sum, unique } => range.propagate(&self.cells, *sum, *unique, grid, acc),
            SumKind::Sum { sum } => range.propagate(&self.cells, *sum, false, grid, acc),
            SumKind::SumLine { target } => range.propagate(&self.cells, *target, false, grid, acc),
            SumKind::Arrow { pills } => {
                let tail: Vec<CellId> = self
                    .cells
                    .iter()
                    .copied()
                    .filter(|c| !pills.iter().flatten().any(|p| p == c))
                    .collect();
                let mut target = 0i32;
                for pill in pills {
                    match read_pill(pill, grid) {
                        Some(v) => target += v,
                        None => return true, // pill not yet resolved: nothing to propagate
                    }
                }
                range.propagate(&tail, target, false, grid, acc)
            }
            SumKind::Lockout { ends, min_diff } => enforce_lockout(&self.cells, *ends, *min_diff, grid, acc),
            SumKind::Sandwich { clue, v } => enforce_sandwich(&self.cells, *clue, *v, &range, grid, acc),
            SumKind::XSum { clue } => enforce_xsum(&self.cells, *clue, &range, grid, acc),
            SumKind::LittleKiller { clue } => range.propagate(&self.cells, *clue, false, grid, acc),
            SumKind::RegionSumLine { region_size } => {
                enforce_region_sum_line(&self.cells, *region_size, &range, grid, acc)
            }
            SumKind::Lunchbox { clue } => enforce_lunchbox(&self.cells, *clue, &range, grid, acc),
        }
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

fn enforce_lockout(
    cells: &[CellId],
    ends: (CellId, CellId),
    min_diff: i32,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let (a, b) = ends;
    let (Some(da), Some(db)) = (grid.candidates_at(a).fixed_digit(), grid.candidates_at(b).fixed_digit())
    else {
        return true; // ends not yet both fixed: nothing to propagate yet
    };
    if (i32::from(da) - i32::from(db)).abs() < min_diff {
        return false;
    }
    let lo = da.min(db);
    let hi = da.max(db);
    for &c in cells {
        if c == a || c == b {
            continue;
        }
        let mut keep = ValueMask::EMPTY;
        for d in grid.candidates_at(c) {
            if d < lo || d > hi {
                keep = keep.with(d);
            }
        }
        if grid.intersect_candidates(c, keep) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
    }
    true
}

fn enforce_sandwich(
    line: &[CellId],
    clue: i32,
    v: u8,
    range: &SumRange<'_>,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let bread_a = line.iter().position(|&c| grid.candidates_at(c).fixed_digit() == Some(1));
    let bread_b = line.iter().position(|&c| grid.candidates_at(c).fixed_digit() == Some(v));
    let (Some(i), Some(j)) = (bread_a, bread_b) else {
        return true;
    };
    let (lo, hi) = (i.min(j), i.max(j));
    let between: Vec<CellId> = line[lo + 1..hi].to_vec();
    if between.is_empty() {
        return clue == 0;
    }
    range.propagate(&between, clue, true, grid, acc)
}

fn enforce_xsum(
    line: &[CellId],
    clue: i32,
    range: &SumRange<'_>,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let Some(first) = line.first().copied() else { return true };
    if let Some(n) = grid.candidates_at(first).fixed_digit() {
        let n = usize::from(n).min(line.len());
        return range.propagate(&line[..n], clue, false, grid, acc);
    }
    // First cell not yet fixed: eliminate any candidate n for which no valid read of
    // the first n cells can reach `clue`.
    let mut keep = ValueMask::EMPTY;
    for n in grid.candidates_at(first) {
        let count = usize::from(n).min(line.len());
        let prefix = &line[..count];
        let min_sum: i32 = prefix
            .iter()
            .map(|&c| grid.candidates_at(c).min_digit().map_or(0, i32::from))
            .sum();
        let max_sum: i32 = prefix
            .iter()
            .map(|&c| grid.candidates_at(c).max_digit().map_or(0, i32::from))
            .sum();
        if clue >= min_sum && clue <= max_sum {
            keep = keep.with(n);
        }
    }
    if grid.intersect_candidates(first, keep) {
        acc.add_for_cell(first);
        if grid.is_empty_at(first) {
            return false;
        }
    }
    true
}

fn enforce_region_sum_line(
    line: &[CellId],
    region_size: u8,
    range: &SumRange<'_>,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let region_size = usize::from(region_size).max(1);
    let chunks: Vec<&[CellId]> = line.chunks(region_size).collect();
    let known_target = chunks.iter().find_map(|chunk| {
        let sum: Option<i32> = chunk
            .iter()
            .map(|&c| grid.candidates_at(c).fixed_digit().map(i32::from))
            .sum();
        sum
    });
    let Some(target) = known_target else { return true };
    for chunk in &chunks {
        if !range.propagate(chunk, target, false, grid, acc) {
            return false;
        }
    }
    true
}

fn enforce_lunchbox(
    line: &[CellId],
    clue: i32,
    range: &SumRange<'_>,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let fixed: Vec<(usize, u8)> = line
        .iter()
        .enumerate()
        .filter_map(|(idx, &c)| grid.candidates_at(c).fixed_digit().map(|d| (idx, d)))
        .collect();
    if fixed.len() < 2 {
        return true;
    }
    let min_pos = fixed.iter().min_by_key(|&&(_, d)| d).map(|&(idx, _)| idx).unwrap();
    let max_pos = fixed.iter().max_by_key(|&&(_, d)| d).map(|&(idx, _)| idx).unwrap();
    if min_pos == max_pos {
        return true;
    }
    let (lo, hi) = (min_pos.min(max_pos), min_pos.max(max_pos));
    let between: Vec<CellId> = line[lo + 1..hi].to_vec();
    if between.is_empty() {
        return clue == 0;
    }
    range.propagate(&between, clue, false, grid, acc)
}

/// Builds an `AllDifferent`-style `Cage` upgrade: when a cage's size equals `values`,
/// the sum-range propagator alone cannot enforce uniqueness as tightly as a region
/// handler can, so the builder upgrades such cages to a plain [`region::RegionHandler`]
/// (spec §4.4 step 6: "if a cage's size equals V, upgrade to `AllDifferent`").
#[must_use]
pub fn upgrade_full_cage_to_region(
    cells: Vec<CellId>,
    values: u8,
) -> Option<region::RegionHandler> {
    (cells.len() == usize::from(values))
        .then(|| region::RegionHandler::new(region::RegionKind::AllDifferent, cells, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use variant_sudoku_core::Shape;

    fn tables_for(v: u8) -> ValueTables {
        ValueTables::new(v)
    }

    mod sum_range {
        use super::*;

        #[test]
        fn tightens_two_cell_cage() {
            let shape = Shape::new(1, 2, 9);
            let mut grid = CandidateGrid::new(shape);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let tables = tables_for(9);
            let range = SumRange { tables: &tables };
            let mut acc = Accumulator::new();
            assert!(range.propagate(&cells, 17, true, &mut grid, &mut acc));
            // sum=17 over 2 distinct digits from 1..=9: only {8,9} works.
            assert_eq!(grid.candidates_at(cells[0]).count(), 2);
            assert!(grid.candidates_at(cells[0]).contains(8));
            assert!(grid.candidates_at(cells[0]).contains(9));
        }

        #[test]
        fn infeasible_target_out_of_range() {
            let shape = Shape::new(1, 2, 9);
            let mut grid = CandidateGrid::new(shape);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let tables = tables_for(9);
            let range = SumRange { tables: &tables };
            let mut acc = Accumulator::new();
            assert!(!range.propagate(&cells, 100, true, &mut grid, &mut acc));
        }

        #[test]
        fn single_cell_sum_fixes_the_cell() {
            let shape = Shape::new(1, 1, 9);
            let mut grid = CandidateGrid::new(shape);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let tables = tables_for(9);
            let range = SumRange { tables: &tables };
            let mut acc = Accumulator::new();
            assert!(range.propagate(&cells, 7, true, &mut grid, &mut acc));
            assert_eq!(grid.candidates_at(cells[0]).fixed_digit(), Some(7));
        }
    }

    mod cage_handler {
        use super::*;

        #[test]
        fn enforce_matches_sum_range() {
            let shape = Shape::new(1, 2, 9);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let mut handler = SumHandler::new(SumKind::Cage { sum: 17, unique: true }, cells.clone(), 9);
            let mut grid = CandidateGrid::new(shape);
            let mut exclusions = ExclusionGraph::new(shape.num_cells());
            let mut scratch = ScratchAllocator::new();
            assert!(handler.initialize(&mut grid, &mut exclusions, shape, &mut scratch));
            assert!(exclusions.contains(cells[0], cells[1]));
            let mut acc = Accumulator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            assert!(grid.candidates_at(cells[0]).contains(8));
        }
    }

    mod arrow_handler {
        use super::*;

        #[test]
        fn tail_sums_to_pill_value() {
            let shape = Shape::new(1, 3, 9);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let pill = vec![cells[0]];
            let tail = vec![cells[1], cells[2]];
            let mut grid = CandidateGrid::new(shape);
            grid.place(cells[0], 5);
            let all_cells: Vec<_> = pill.iter().chain(tail.iter()).copied().collect();
            let handler = SumHandler::new(SumKind::Arrow { pills: vec![pill] }, all_cells, 9);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            let total: u32 = tail.iter().map(|&c| u32::from(grid.candidates_at(c).min_digit().unwrap())).sum();
            assert!(total <= 5);
        }
    }

    mod lockout_handler {
        use super::*;

        #[test]
        fn excludes_range_between_ends() {
            let shape = Shape::new(1, 3, 9);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let mut grid = CandidateGrid::new(shape);
            grid.place(cells[0], 2);
            grid.place(cells[2], 8);
            let handler = SumHandler::new(
                SumKind::Lockout { ends: (cells[0], cells[2]), min_diff: 4 },
                cells.clone(),
                9,
            );
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
            for d in 2..=8 {
                assert!(!grid.candidates_at(cells[1]).contains(d));
            }
        }

        #[test]
        fn violates_min_diff_is_infeasible() {
            let shape = Shape::new(1, 3, 9);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let mut grid = CandidateGrid::new(shape);
            grid.place(cells[0], 4);
            grid.place(cells[2], 5);
            let handler = SumHandler::new(
                SumKind::Lockout { ends: (cells[0], cells[2]), min_diff: 4 },
                cells.clone(),
                9,
            );
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(!handler.enforce(&mut grid, &scratch, &mut acc));
        }
    }

    mod sandwich_handler {
        use super::*;

        #[test]
        fn sums_cells_between_bread_digits() {
            let shape = Shape::new(1, 5, 9);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let mut grid = CandidateGrid::new(shape);
            grid.place(cells[0], 1);
            grid.place(cells[4], 9);
            let handler = SumHandler::new(SumKind::Sandwich { clue: 10, v: 9 }, cells.clone(), 9);
            let mut acc = Accumulator::new();
            let scratch = ScratchAllocator::new();
            assert!(handler.enforce(&mut grid, &scratch, &mut acc));
        }
    }

    mod cage_upgrade {
        use super::*;

        #[test]
        fn full_size_cage_upgrades_to_region() {
            let shape = Shape::classic(3);
            let cells: Vec<_> = shape.row_cells(0).collect();
            let region = upgrade_full_cage_to_region(cells, 9);
            assert!(region.is_some());
        }

        #[test]
        fn partial_cage_does_not_upgrade() {
            let shape = Shape::classic(3);
            let cells: Vec<_> = shape.row_cells(0).take(3).collect();
            assert!(upgrade_full_cage_to_region(cells, 9).is_none());
        }
    }
}
