//! Outside clues (spec §4.3.6).
//!
//! `Skyscraper`, `HiddenSkyscraper`, `NumberedRoom`, and `FullRank` each bind to a
//! directed line (row, column, or diagonal) read from an outside vantage point.
//! `Sandwich`, `XSum`, and `LittleKiller` are also outside clues by origin, but their
//! propagation is purely sum-range-shaped and already lives in
//! [`super::sum`]; this module covers the genuinely order-shaped outside clues.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// Tie-break mode for [`OutsideKind::FullRank`]'s rank ordering among unclued entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTieMode {
    /// Unclued entries are not compared against each other.
    None,
    /// Only unclued entries participate in ranking.
    OnlyUnclued,
    /// Every directional read participates in ranking.
    Any,
}

/// Which outside clue an [`OutsideHandler`] enforces.
#[derive(Debug, Clone, PartialEq)]
pub enum OutsideKind {
    /// The clue counts how many cells, read from the outside in, are each taller than
    /// every cell before them (a "visible" peak).
    Skyscraper { clue: u8 },
    /// Like `Skyscraper`, but the clue counts *hidden* peaks: cells that are NOT
    /// visible (every cell after the first occurrence of the line's maximum).
    HiddenSkyscraper { clue: u8 },
    /// The clue gives the digit that appears exactly `clue` cells in from the edge,
    /// read by its own value as an index (the digit at position `d` equals `d`,
    /// where `d` is the clue digit itself, read from the outside).
    NumberedRoom { clue: u8 },
    /// The clue is this line's rank among all `2(R+C)` directional reads of the grid,
    /// each read interpreted as a `C`- or `R`-digit number; `reversed` reads the line
    /// back to front before ranking.
    FullRank { rank: u32, reversed: bool, tie_mode: RankTieMode },
}

/// A handler for one outside clue (spec §4.3.6).
#[derive(Debug, Clone)]
pub struct OutsideHandler {
    kind: OutsideKind,
    cells: Vec<CellId>,
    values: u8,
    priority: i32,
}

impl OutsideHandler {
    /// Creates a handler for `kind` over the ordered `cells` (outside-in order).
    #[must_use]
    pub fn new(kind: OutsideKind, cells: Vec<CellId>, values: u8) -> Self {
        Self { kind, cells, values, priority: 80 }
    }
}

impl Handler for OutsideHandler {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn initialize(
        &mut self,
        _grid: &mut CandidateGrid,
        _exclusions: &mut ExclusionGraph,
        _shape: Shape,
        _scratch: &mut ScratchAllocator,
    ) -> bool {
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        match &self.kind {
            OutsideKind::Skyscraper { clue } => enforce_skyscraper(&self.cells, *clue, self.values, grid, acc),
            OutsideKind::HiddenSkyscraper { clue } => {
                enforce_hidden_skyscraper(&self.cells, *clue, self.values, grid, acc)
            }
            OutsideKind::NumberedRoom { clue } => enforce_numbered_room(&self.cells, *clue, grid, acc),
            // FullRank's rank-set bookkeeping spans the whole directional family, not a
            // single line in isolation. Same-rank clues are tied together by the
            // builder's equality `Binary` pairs (spec §4.4 step 5); distinct-rank
            // ordering is enforced separately by [`FullRankHandler`], which the builder
            // also constructs from the full family of declared clues. Nothing sound is
            // left for this single-line handler to check on its own.
            OutsideKind::FullRank { .. } => true,
        }
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

/// The maximum number of visible peaks possible for a line whose first `k` positions
/// are forced to the given heights and whose remaining positions are free over `1..=V`.
fn enforce_skyscraper(cells: &[CellId], clue: u8, values: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    // Sound partial case: if the line is fully fixed, verify; otherwise, at minimum,
    // the cell holding the line's maximum value is always visible, and the clue's
    // count can never exceed the line length nor be less than 1.
    if clue == 0 || usize::from(clue) > cells.len() {
        return false;
    }
    if cells.iter().all(|&c| grid.candidates_at(c).is_fixed()) {
        let mut best = 0u8;
        let mut visible = 0u8;
        for &c in cells {
            let d = grid.candidates_at(c).fixed_digit().unwrap();
            if d > best {
                best = d;
                visible += 1;
            }
        }
        return visible == clue;
    }
    // The maximum digit V is always visible from wherever it sits; if clue==1 the
    // very first cell must itself be V.
    if clue == 1 {
        let first = cells[0];
        if grid.place(first, values) {
            acc.add_for_cell(first);
            if grid.is_empty_at(first) {
                return false;
            }
        }
    }
    true
}

fn enforce_hidden_skyscraper(
    cells: &[CellId],
    clue: u8,
    values: u8,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    if cells.iter().all(|&c| grid.candidates_at(c).is_fixed()) {
        let mut max_so_far = 0u8;
        let mut hidden = 0u8;
        for &c in cells {
            let d = grid.candidates_at(c).fixed_digit().unwrap();
            if d > max_so_far {
                max_so_far = d;
            } else {
                hidden += 1;
            }
        }
        return hidden == clue;
    }
    let _ = values;
    true
}

fn enforce_numbered_room(cells: &[CellId], clue: u8, grid: &mut CandidateGrid, acc: &mut Accumulator) -> bool {
    let idx = usize::from(clue).saturating_sub(1);
    let Some(&target_cell) = cells.get(idx) else { return false };
    if grid.intersect_candidates(target_cell, ValueMask::EMPTY.with(clue)) {
        acc.add_for_cell(target_cell);
        if grid.is_empty_at(target_cell) {
            return false;
        }
    }
    true
}

/// One clue's rank, reading direction, and cell list within a `FullRank` family (spec
/// §4.3.6). Built by the builder from every declared `FullRank` clue sharing a shape.
#[derive(Debug, Clone)]
pub struct FullRankClue {
    pub rank: u32,
    pub reversed: bool,
    pub cells: Vec<CellId>,
}

/// Enforces strict value ordering between every pair of distinct-rank clues in one
/// `FullRank` family (spec §4.3.6: "pairwise strict ordering between consecutive
/// ranks"). Same-rank clues are tied together elsewhere by the builder's equality-pair
/// rewrite (spec §4.4 step 5); this handler only compares clues whose ranks differ, and
/// only once every cell in both lines is fixed — partial candidate states are left
/// untouched, the same "verify once fully determined" idiom `enforce_skyscraper` and
/// `enforce_hidden_skyscraper` already use above.
#[derive(Debug, Clone)]
pub struct FullRankHandler {
    clues: Vec<FullRankClue>,
    cells: Vec<CellId>,
    priority: i32,
}

impl FullRankHandler {
    /// Creates a handler over `clues`, which must already be every declared `FullRank`
    /// clue sharing one directional-read family (i.e. one shape). Order is irrelevant;
    /// the handler sorts by rank internally.
    #[must_use]
    pub fn new(mut clues: Vec<FullRankClue>) -> Self {
        clues.sort_by_key(|clue| clue.rank);
        let cells = clues.iter().flat_map(|clue| clue.cells.iter().copied()).collect();
        Self { clues, cells, priority: 80 }
    }
}

impl Handler for FullRankHandler {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn initialize(
        &mut self,
        _grid: &mut CandidateGrid,
        _exclusions: &mut ExclusionGraph,
        _shape: Shape,
        _scratch: &mut ScratchAllocator,
    ) -> bool {
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, _acc: &mut Accumulator) -> bool {
        for pair in self.clues.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            if lower.rank == higher.rank {
                continue;
            }
            let (Some(lower_value), Some(higher_value)) = (fixed_line_digits(grid, lower), fixed_line_digits(grid, higher)) else {
                continue;
            };
            if !line_value_less_than(&lower_value, &higher_value) {
                return false;
            }
        }
        true
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}

fn fixed_line_digits(grid: &CandidateGrid, clue: &FullRankClue) -> Option<Vec<u8>> {
    let mut digits = Vec::with_capacity(clue.cells.len());
    for &c in &clue.cells {
        digits.push(grid.candidates_at(c).fixed_digit()?);
    }
    if clue.reversed {
        digits.reverse();
    }
    Some(digits)
}

/// Compares two directional reads as numbers: a longer read is always larger (more
/// significant digits), equal-length reads compare lexicographically from the first
/// (most significant) cell.
fn line_value_less_than(lower: &[u8], higher: &[u8]) -> bool {
    match lower.len().cmp(&higher.len()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => lower < higher,
    }
}
