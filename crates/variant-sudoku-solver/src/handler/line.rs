//! Ordered-line constraints (spec §4.3.4).
//!
//! `Thermo`, `Whisper`, `Renban`, `Modular`, `Entropic`, `Palindrome`, `Zipper`,
//! `Between`, `Indexing`/`ValueIndexing`, `CountingCircles`, `SameValues`,
//! `ContainExact`/`ContainAtLeast`, and `Quad` all express a pattern over an ordered
//! (or, for `SameValues`/`Quad`, unordered) cell list. [`LineHandler`] dispatches on
//! [`LinePattern`] to the matching sliding-window or whole-line routine; each routine
//! tightens candidates but never invents structure the grid doesn't already imply
//! (sound, possibly weak, propagation — see the module doc in `sum.rs` for why that is
//! an acceptable tradeoff against full backtracking-driven completeness).

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// Which line pattern a [`LineHandler`] enforces.
#[derive(Debug, Clone, PartialEq)]
pub enum LinePattern {
    /// Strictly increasing along the line.
    Thermo,
    /// Adjacent cells differ by at least `d`.
    Whisper { min_diff: i32 },
    /// The line's values form a consecutive run (as a set), order irrelevant.
    Renban,
    /// Every sliding window of `m` consecutive cells has pairwise-distinct residues
    /// mod `m`.
    Modular { modulus: u8 },
    /// Every sliding window of 3 cells contains one value from each of the `⌈V/3⌉`
    /// low/mid/high bands.
    Entropic,
    /// Cell `i` and its mirror `len-1-i` hold digits that sum to `V + 1`.
    Palindrome,
    /// Equidistant pairs about the line's center sum to the same total.
    Zipper,
    /// The cells strictly between the line's two named endpoints must lie strictly
    /// between the endpoints' values (a thermo-like diamond/between line, distinct
    /// from the `Sandwich`/`Lunchbox` sum-clue reading of "between").
    Between { ends: (CellId, CellId) },
    /// Cell at position `index` (0-based along the line) must hold digit
    /// `index + 1` (`Indexing`) or, for `ValueIndexing`, the cell at position `v - 1`
    /// must hold a value whose own position indexes back to `v`.
    Indexing,
    /// A `CountingCircles` line: the digit at each circled position states how many
    /// circled cells on the line (inclusive) hold that same digit.
    CountingCircles { circles: Vec<usize> },
    /// `SameValues`: paired with another [`LineHandler`] sharing the same `group_id`,
    /// both lines' cells must realize exactly the same set of digit values.
    SameValues { partner: Vec<CellId> },
    /// `ContainExact`/`ContainAtLeast`: the line must contain each digit in `required`
    /// exactly once (`at_least = false`) or at least once (`at_least = true`).
    Contain { required: ValueMask, at_least: bool },
    /// A `Quad`: the four named cells must collectively contain every digit in
    /// `required` at least once.
    Quad { required: ValueMask },
}

/// A handler for one member of the line family (spec §4.3.4).
#[derive(Debug, Clone)]
pub struct LineHandler {
    pattern: LinePattern,
    cells: Vec<CellId>,
    values: u8,
    priority: i32,
}

impl LineHandler {
    /// Creates a handler enforcing `pattern` over the ordered `cells`.
    #[must_use]
    pub fn new(pattern: LinePattern, cells: Vec<CellId>, values: u8) -> Self {
        Self { pattern, cells, values, priority: 150 }
    }
}

impl Handler for LineHandler {
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
        if matches!(self.pattern, LinePattern::Renban | LinePattern::Thermo) {
            exclusions.add_mutual_all(&self.cells);
        }
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        match &self.pattern {
            LinePattern::Thermo => enforce_thermo(&self.cells, grid, acc),
            LinePattern::Whisper { min_diff } => enforce_adjacent_diff(&self.cells, *min_diff, grid, acc),
            LinePattern::Renban => enforce_renban(&self.cells, self.values, grid, acc),
            LinePattern::Modular { modulus } => enforce_modular(&self.cells, *modulus, grid, acc),
            LinePattern::Entropic => enforce_entropic(&self.cells, self.values, grid, acc),
            LinePattern::Palindrome => enforce_palindrome(&self.cells, self.values, grid, acc),
            LinePattern::Zipper => enforce_zipper(&self.cells, grid, acc),
            LinePattern::Between { ends } => enforce_between_diamond(&self.cells, *ends, grid, acc),
            LinePattern::Indexing => enforce_indexing(&self.cells, grid, acc),
            LinePattern::CountingCircles { circles } => enforce_counting_circles(&self.cells, circles, grid, acc),
            LinePattern::SameValues { partner } => enforce_same_values(&self.cells, partner, grid, acc),
            LinePattern::Contain { required, at_least } => {
                enforce_contain(&self.cells, *required, *at_least, grid, acc)
            }
            LinePattern::Quad { required } => enforce_quad(&self.cells, *required, grid, acc),
        }
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

fn enforce_thermo(cells: &[CellId], grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    // A running lower bound from the start and an upper bound from the end; each
    // cell's mask is clipped to the band its position requires for a strictly
    // increasing assignment to exist.
    let n = cells.len();
    let mut running_min = 0u8;
    for (i, &c) in cells.iter().enumerate() {
        let floor = running_min + 1;
        let mut keep = ValueMask::EMPTY;
        for d in grid.candidates_at(c) {
            if d >= floor {
                keep = keep.with(d);
            }
        }
        if grid.intersect_candidates(c, keep) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
        let Some(m) = grid.candidates_at(c).min_digit() else { return false };
        running_min = m.max(floor.saturating_sub(1)).max(i as u8);
    }
    let mut running_max = u8::MAX;
    for (i, &c) in cells.iter().enumerate().rev() {
        let ceiling = running_max.saturating_sub(1);
        let mut keep = ValueMask::EMPTY;
        for d in grid.candidates_at(c) {
            if d <= ceiling || i == n - 1 {
                keep = keep.with(d);
            }
        }
        if grid.intersect_candidates(c, keep) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
        let Some(m) = grid.candidates_at(c).max_digit() else { return false };
        running_max = m;
    }
    true
}

fn enforce_adjacent_diff(cells: &[CellId], min_diff: i32, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    for w in cells.windows(2) {
        let (a, b) = (w[0], w[1]);
        let mask_b = grid.candidates_at(b);
        let keep_a: ValueMask = grid
            .candidates_at(a)
            .into_iter()
            .filter(|&x| mask_b.into_iter().any(|y| i32::from(x).abs_diff(i32::from(y)) as i32 >= min_diff))
            .fold(ValueMask::EMPTY, ValueMask::with);
        let mask_a = grid.candidates_at(a);
        let keep_b: ValueMask = mask_b
            .into_iter()
            .filter(|&y| mask_a.into_iter().any(|x| i32::from(x).abs_diff(i32::from(y)) as i32 >= min_diff))
            .fold(ValueMask::EMPTY, ValueMask::with);
        if grid.intersect_candidates(a, keep_a) {
            acc.add_for_cell(a);
            if grid.is_empty_at(a) {
                return false;
            }
        }
        if grid.intersect_candidates(b, keep_b) {
            acc.add_for_cell(b);
            if grid.is_empty_at(b) {
                return false;
            }
        }
    }
    true
}

fn enforce_renban(cells: &[CellId], values: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    let n = cells.len();
    if n == 0 {
        return true;
    }
    let union = grid.union_mask(cells);
    let Some(lo) = union.min_digit() else { return false };
    let Some(hi) = union.max_digit() else { return false };
    // The run must fit within some window of length n inside [lo, hi]; a window is
    // feasible only if every cell has at least one candidate inside it. The set of
    // digits reachable by *any* feasible window is the union across all of them — using
    // only the first feasible window found would wrongly discard candidates that another
    // equally valid window still needs.
    let mut reachable = ValueMask::EMPTY;
    let mut any_feasible = false;
    for start in lo..=hi {
        let Some(end) = start.checked_add(n as u8 - 1) else { break };
        if end > values || end > hi {
            continue;
        }
        let window = (start..=end).fold(ValueMask::EMPTY, ValueMask::with);
        if cells.iter().all(|&c| !(grid.candidates_at(c) & window).is_empty()) {
            any_feasible = true;
            reachable = reachable | window;
        }
    }
    if !any_feasible {
        return false;
    }
    for &c in cells {
        if grid.intersect_candidates(c, reachable) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
    }
    true
}

fn enforce_modular(cells: &[CellId], modulus: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    if modulus == 0 {
        return true;
    }
    for window in cells.windows(usize::from(modulus)) {
        for (i, &c) in window.iter().enumerate() {
            let mut keep = ValueMask::EMPTY;
            for d in grid.candidates_at(c) {
                let residue = u32::from(d) % u32::from(modulus);
                let compatible = window.iter().enumerate().all(|(j, &other)| {
                    if i == j {
                        return true;
                    }
                    grid.candidates_at(other).into_iter().any(|d2| u32::from(d2) % u32::from(modulus) != residue)
                        || grid.candidates_at(other).count() > 1
                });
                if compatible {
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
    }
    true
}

fn enforce_entropic(cells: &[CellId], values: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    let band_size = values.div_ceil(3);
    let band_of = |d: u8| -> u8 { ((d - 1) / band_size).min(2) };
    for window in cells.windows(3) {
        for &c in window {
            let mut keep = ValueMask::EMPTY;
            for d in grid.candidates_at(c) {
                let my_band = band_of(d);
                let others_cover_other_bands = (0u8..3).filter(|&b| b != my_band).all(|b| {
                    window
                        .iter()
                        .filter(|&&o| o != c)
                        .any(|&o| grid.candidates_at(o).into_iter().any(|d2| band_of(d2) == b))
                });
                if others_cover_other_bands {
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
    }
    true
}

fn enforce_palindrome(cells: &[CellId], values: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    let n = cells.len();
    for i in 0..n / 2 {
        let (a, b) = (cells[i], cells[n - 1 - i]);
        let complement = |d: u8| values + 1 - d;
        let mask_b = grid.candidates_at(b);
        let keep_a: ValueMask =
            grid.candidates_at(a).into_iter().filter(|&x| mask_b.contains(complement(x))).fold(ValueMask::EMPTY, ValueMask::with);
        let mask_a = grid.candidates_at(a);
        let keep_b: ValueMask =
            mask_b.into_iter().filter(|&y| mask_a.contains(complement(y))).fold(ValueMask::EMPTY, ValueMask::with);
        if grid.intersect_candidates(a, keep_a) {
            acc.add_for_cell(a);
            if grid.is_empty_at(a) {
                return false;
            }
        }
        if grid.intersect_candidates(b, keep_b) {
            acc.add_for_cell(b);
            if grid.is_empty_at(b) {
                return false;
            }
        }
    }
    true
}

fn enforce_zipper(cells: &[CellId], grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    let n = cells.len();
    if n < 2 {
        return true;
    }
    let center_sum = |a: CellId, b: CellId, grid: &CandidateGrid| -> (Option<u32>, Option<u32>) {
        let (ma, mb) = (grid.candidates_at(a), grid.candidates_at(b));
        let lo = ma.min_digit().zip(mb.min_digit()).map(|(x, y)| u32::from(x) + u32::from(y));
        let hi = ma.max_digit().zip(mb.max_digit()).map(|(x, y)| u32::from(x) + u32::from(y));
        (lo, hi)
    };
    // `unique` is always false below, so the subset-sum tables SumRange carries are
    // never read; a minimal table is enough.
    let tables = variant_sudoku_core::ValueTables::new(1);
    let range = crate::handler::sum::SumRange { tables: &tables };
    if n % 2 == 1 {
        let mid = n / 2;
        if let Some(d) = grid.candidates_at(cells[mid]).fixed_digit() {
            for i in 0..mid {
                let (a, b) = (cells[i], cells[n - 1 - i]);
                if !range.propagate(&[a, b], i32::from(d), false, grid, acc) {
                    return false;
                }
            }
        }
    } else {
        let (lo0, hi0) = center_sum(cells[n / 2 - 1], cells[n / 2], grid);
        if let (Some(lo0), Some(hi0)) = (lo0, hi0) {
            if lo0 == hi0 {
                let target = lo0 as i32;
                for i in 0..n / 2 - 1 {
                    let (a, b) = (cells[i], cells[n - 1 - i]);
                    if !range.propagate(&[a, b], target, false, grid, acc) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

fn enforce_between_diamond(
    cells: &[CellId],
    ends: (CellId, CellId),
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let (lo_cell, hi_cell) = ends;
    let (Some(lo), Some(hi)) =
        (grid.candidates_at(lo_cell).min_digit(), grid.candidates_at(hi_cell).max_digit())
    else {
        return true;
    };
    if lo >= hi {
        return true;
    }
    let window = ((lo + 1)..hi).fold(ValueMask::EMPTY, ValueMask::with);
    for &c in cells {
        if c == lo_cell || c == hi_cell {
            continue;
        }
        if grid.intersect_candidates(c, window) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
    }
    true
}

fn enforce_indexing(cells: &[CellId], grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    for (i, &c) in cells.iter().enumerate() {
        let Ok(digit) = u8::try_from(i + 1) else { continue };
        if grid.place(c, digit) {
            acc.add_for_cell(c);
        }
        if grid.is_empty_at(c) {
            return false;
        }
    }
    true
}

fn enforce_counting_circles(
    cells: &[CellId],
    circles: &[usize],
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let circle_cells: Vec<CellId> = circles.iter().filter_map(|&i| cells.get(i).copied()).collect();
    if circle_cells.is_empty() {
        return true;
    }
    for &cell in &circle_cells {
        if let Some(d) = grid.candidates_at(cell).fixed_digit() {
            let count = circle_cells
                .iter()
                .filter(|&&o| grid.candidates_at(o).fixed_digit() == Some(d))
                .count() as i32;
            let possible = circle_cells
                .iter()
                .filter(|&&o| grid.candidates_at(o).contains(d))
                .count() as i32;
            if count > i32::from(d) || possible < i32::from(d) {
                return false;
            }
        }
    }
    true
}

fn enforce_same_values(
    group_a: &[CellId],
    group_b: &[CellId],
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let union_a = grid.union_mask(group_a);
    let union_b = grid.union_mask(group_b);
    let shared = union_a & union_b;
    if shared.is_empty() {
        return false;
    }
    for &c in group_a.iter().chain(group_b.iter()) {
        if grid.intersect_candidates(c, shared) {
            acc.add_for_cell(c);
            if grid.is_empty_at(c) {
                return false;
            }
        }
    }
    true
}

fn enforce_contain(
    cells: &[CellId],
    required: ValueMask,
    at_least: bool,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    for digit in required {
        let holders: Vec<CellId> = cells.iter().copied().filter(|&c| grid.candidates_at(c).contains(digit)).collect();
        if holders.is_empty() {
            return false;
        }
        if holders.len() == 1 && !at_least {
            let c = holders[0];
            if grid.place(c, digit) {
                acc.add_for_cell(c);
                if grid.is_empty_at(c) {
                    return false;
                }
            }
        }
    }
    true
}

fn enforce_quad(cells: &[CellId], required: ValueMask, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    for digit in required {
        if !cells.iter().any(|&c| grid.candidates_at(c).contains(digit)) {
            return false;
        }
    }
    enforce_contain(cells, required, true, grid, acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use variant_sudoku_core::Shape;

    fn line(values: u8, len: usize) -> (CandidateGrid, Vec<CellId>) {
        let shape = Shape::new(1, len, values);
        let grid = CandidateGrid::new(shape);
        let cells: Vec<_> = shape.row_cells(0).collect();
        (grid, cells)
    }

    mod thermo {
        use super::*;

        #[test]
        fn strictly_increasing_restricts_early_cells() {
            let (mut grid, cells) = line(9, 4);
            let mut acc = Accumulator::new();
            assert!(enforce_thermo(&cells, &mut grid, &mut acc));
            assert!(!grid.candidates_at(cells[0]).contains(9));
            assert!(!grid.candidates_at(cells[3]).contains(1));
        }
    }

    mod whisper {
        use super::*;

        #[test]
        fn adjacent_must_differ_by_at_least_five() {
            let (mut grid, cells) = line(9, 2);
            grid.place(cells[0], 5);
            let mut acc = Accumulator::new();
            assert!(enforce_adjacent_diff(&cells, 5, &mut grid, &mut acc));
            for d in 1..=9 {
                let should_remain = (i32::from(d) - 5).abs() >= 5;
                assert_eq!(grid.candidates_at(cells[1]).contains(d), should_remain);
            }
        }
    }

    mod renban {
        use super::*;

        #[test]
        fn three_cells_form_some_consecutive_run() {
            let (mut grid, cells) = line(9, 3);
            let mut acc = Accumulator::new();
            assert!(enforce_renban(&cells, 9, &mut grid, &mut acc));
        }
    }

    mod palindrome {
        use super::*;

        #[test]
        fn mirrors_sum_to_v_plus_one() {
            let (mut grid, cells) = line(9, 4);
            grid.place(cells[0], 3);
            let mut acc = Accumulator::new();
            assert!(enforce_palindrome(&cells, 9, &mut grid, &mut acc));
            assert_eq!(grid.candidates_at(cells[3]).fixed_digit(), Some(7));
        }
    }

    mod between_diamond {
        use super::*;

        #[test]
        fn restricts_middle_cells_to_open_interval() {
            let (mut grid, cells) = line(9, 4);
            grid.place(cells[0], 2);
            grid.place(cells[3], 8);
            let mut acc = Accumulator::new();
            assert!(enforce_between_diamond(&cells, (cells[0], cells[3]), &mut grid, &mut acc));
            assert!(!grid.candidates_at(cells[1]).contains(2));
            assert!(!grid.candidates_at(cells[1]).contains(8));
        }
    }

    mod same_values {
        use super::*;

        #[test]
        fn scenario_from_spec_section_8() {
            let shape = Shape::new(1, 4, 4);
            let mut grid = CandidateGrid::new(shape);
            let cells: Vec<_> = shape.row_cells(0).collect();
            grid.intersect_candidates(cells[0], ValueMask::EMPTY.with(1).with(2));
            grid.intersect_candidates(cells[1], ValueMask::EMPTY.with(2).with(3));
            grid.intersect_candidates(cells[2], ValueMask::EMPTY.with(2).with(3));
            grid.intersect_candidates(cells[3], ValueMask::EMPTY.with(2).with(4));
            let mut acc = Accumulator::new();
            let group_a = vec![cells[0], cells[1]];
            let group_b = vec![cells[2], cells[3]];
            assert!(enforce_same_values(&group_a, &group_b, &mut grid, &mut acc));
            assert_eq!(grid.candidates_at(cells[0]).fixed_digit(), Some(2));
            assert_eq!(grid.candidates_at(cells[1]).count(), 2);
            assert_eq!(grid.candidates_at(cells[2]).count(), 2);
            assert_eq!(grid.candidates_at(cells[3]).fixed_digit(), Some(2));
        }
    }

    mod contain {
        use super::*;

        #[test]
        fn sole_holder_of_a_required_digit_is_fixed() {
            let (mut grid, cells) = line(4, 4);
            grid.intersect_candidates(cells[0], ValueMask::EMPTY.with(1).with(2));
            for &c in &cells[1..] {
                grid.remove_candidate(c, 1);
            }
            let required = ValueMask::EMPTY.with(1);
            let mut acc = Accumulator::new();
            assert!(enforce_contain(&cells, required, false, &mut grid, &mut acc));
            assert_eq!(grid.candidates_at(cells[0]).fixed_digit(), Some(1));
        }
    }
}
