//! Uniqueness regions (spec §4.3.1).
//!
//! Rows, columns, boxes, jigsaw pieces, windoku regions, diagonals, disjoint sets, and
//! explicit `AllDifferent` groups all reduce to the same thing: "these cells form an
//! all-different set of size `k` over `V` values." [`RegionHandler`] is the single
//! propagator for all of them; callers distinguish the *kind* only for diagnostics
//! (`RegionKind`), since the enforcement logic — naked singles, hidden singles, and
//! naked pairs/triples — does not depend on it.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// The origin of a [`RegionHandler`], kept only for debugging/diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// A grid row.
    Row,
    /// A grid column.
    Column,
    /// A default (non-jigsaw) box.
    Box,
    /// A jigsaw piece (irregular region).
    Jigsaw,
    /// A windoku extra region.
    Windoku,
    /// A main or anti diagonal.
    Diagonal,
    /// One set of a disjoint-groups constraint.
    DisjointSet,
    /// An explicit user-declared `AllDifferent`.
    AllDifferent,
}

/// An all-different constraint over a fixed list of cells.
#[derive(Debug, Clone)]
pub struct RegionHandler {
    kind: RegionKind,
    cells: Vec<CellId>,
    values: u8,
    priority: i32,
}

impl RegionHandler {
    /// Creates a new region handler.
    ///
    /// `values` is the puzzle's shape-wide value count (`Shape::values`); it is
    /// captured at construction so `enforce` can run without a `Shape` parameter.
    #[must_use]
    pub fn new(kind: RegionKind, cells: Vec<CellId>, values: u8) -> Self {
        Self { kind, cells, values, priority: 300 }
    }

    /// The kind of region this handler enforces.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }
}

impl Handler for RegionHandler {
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
        if self.cells.len() > usize::from(self.values) {
            return false;
        }
        exclusions.add_mutual_all(&self.cells);
        true
    }

    fn enforce(&self, grid: &mut CandidateGrid, _scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool {
        if !eliminate_naked_singles(&self.cells, grid, acc) {
            return false;
        }
        if !apply_hidden_singles(&self.cells, self.values, grid, acc) {
            return false;
        }
        if !eliminate_naked_subsets(&self.cells, grid, acc) {
            return false;
        }
        true
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }

    fn is_layout(&self) -> bool {
        matches!(
            self.kind,
            RegionKind::Row
                | RegionKind::Column
                | RegionKind::Box
                | RegionKind::Jigsaw
                | RegionKind::Windoku
                | RegionKind::Diagonal
                | RegionKind::DisjointSet
        )
    }
}

/// Removes each fixed cell's digit from every other cell in `cells`.
pub(crate) fn eliminate_naked_singles(
    cells: &[CellId],
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let fixed_digits: Vec<(CellId, u8)> = cells
        .iter()
        .filter_map(|&c| grid.candidates_at(c).fixed_digit().map(|d| (c, d)))
        .collect();
    for (src, digit) in fixed_digits {
        for &other in cells {
            if other == src {
                continue;
            }
            if grid.remove_candidate(other, digit) {
                acc.add_for_cell(other);
                if grid.is_empty_at(other) {
                    return false;
                }
            }
        }
    }
    true
}

/// For each digit with exactly one remaining holder among `cells`, fixes that cell.
/// Reports infeasible if `cells` forms an exact size-`values` region and some digit has
/// no holder at all.
pub(crate) fn apply_hidden_singles(
    cells: &[CellId],
    values: u8,
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    let exact_cover = cells.len() == usize::from(values);
    for digit in 1..=values {
        let mut holder = None;
        let mut count = 0u32;
        for &c in cells {
            if grid.candidates_at(c).contains(digit) {
                count += 1;
                holder = Some(c);
            }
        }
        if count == 0 && exact_cover {
            return false;
        }
        if count == 1 {
            let c = holder.unwrap();
            if !grid.is_fixed_at(c) {
                grid.place(c, digit);
                acc.add_for_cell(c);
            }
        }
    }
    true
}

/// Finds naked pairs and triples among `cells` and eliminates their digits elsewhere.
pub(crate) fn eliminate_naked_subsets(
    cells: &[CellId],
    grid: &mut CandidateGrid,
    acc: &mut Accumulator,
) -> bool {
    for size in 2..=3usize {
        if cells.len() <= size {
            continue;
        }
        for combo in combinations(cells, size) {
            let union = combo.iter().fold(ValueMask::EMPTY, |m, &c| m | grid.candidates_at(c));
            if union.count() as usize != size {
                continue;
            }
            for &other in cells {
                if combo.contains(&other) {
                    continue;
                }
                for digit in union {
                    if grid.remove_candidate(other, digit) {
                        acc.add_for_cell(other);
                        if grid.is_empty_at(other) {
                            return false;
                        }
                    }
                }
            }
        }
    }
    true
}

/// Materializes every `k`-combination of `items` (small `k`, small `items`: used only
/// for naked pair/triple search, where `items.len()` is a single region's cell count).
pub(crate) fn combinations(items: &[CellId], k: usize) -> Vec<Vec<CellId>> {
    fn go(items: &[CellId], k: usize, start: usize, current: &mut Vec<CellId>, out: &mut Vec<Vec<CellId>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            go(items, k, i + 1, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    go(items, k, 0, &mut Vec::new(), &mut out);
    out
}
