//! Global counting constraints (spec §4.3.8).
//!
//! `FullGridRequiredValues` is the only member: given a family of disjoint lines that
//! collectively cover every cell, each value must appear in exactly `line_length` of
//! those lines. For each value, the handler counts lines that already *satisfy* it (a
//! fixed occurrence present), lines that *could* satisfy it (a candidate present
//! somewhere), and lines that *cannot*; it fails if the required count is already
//! unreachable, and forces a hidden single when the live lines for a value shrink to
//! exactly the number still required.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// A handler enforcing `FullGridRequiredValues` over a partition of lines.
#[derive(Debug, Clone)]
pub struct FullGridRequiredValuesHandler {
    lines: Vec<Vec<CellId>>,
    line_length: u8,
    values: u8,
    cells: Vec<CellId>,
    priority: i32,
}

impl FullGridRequiredValuesHandler {
    /// Creates a handler over `lines` (a partition of all cells), requiring every
    /// digit `1..=values` to appear in exactly `line_length` of them.
    #[must_use]
    pub fn new(lines: Vec<Vec<CellId>>, line_length: u8, values: u8) -> Self {
        let cells = lines.iter().flatten().copied().collect();
        Self { lines, line_length, values, cells, priority: 5 }
    }
}

impl Handler for FullGridRequiredValuesHandler {
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
        for digit in 1..=self.values {
            let mut satisfied = 0u32;
            let mut possible = 0u32;
            let mut possible_unsatisfied_line: Option<usize> = None;
            for (idx, line) in self.lines.iter().enumerate() {
                let has_fixed = line.iter().any(|&c| grid.candidates_at(c).fixed_digit() == Some(digit));
                let has_candidate = line.iter().any(|&c| grid.candidates_at(c).contains(digit));
                if has_fixed {
                    satisfied += 1;
                    possible += 1;
                } else if has_candidate {
                    possible += 1;
                    if possible_unsatisfied_line.is_none() {
                        possible_unsatisfied_line = Some(idx);
                    }
                }
            }
            let required = u32::from(self.line_length);
            if required > possible || satisfied > required {
                return false;
            }
            // Force hidden singles: if the live (possible-but-not-yet-satisfied) lines
            // exactly fill the remaining need, every such line must place `digit`
            // somewhere, and if such a line has only one candidate cell left it's
            // determined now.
            let still_needed = required - satisfied;
            let live_lines: Vec<&Vec<CellId>> = self
                .lines
                .iter()
                .filter(|line| {
                    !line.iter().any(|&c| grid.candidates_at(c).fixed_digit() == Some(digit))
                        && line.iter().any(|&c| grid.candidates_at(c).contains(digit))
                })
                .collect();
            if u32::try_from(live_lines.len()).unwrap_or(u32::MAX) == still_needed {
                for line in live_lines {
                    let holders: Vec<CellId> =
                        line.iter().copied().filter(|&c| grid.candidates_at(c).contains(digit)).collect();
                    if holders.len() == 1 {
                        let c = holders[0];
                        if grid.place(c, digit) {
                            acc.add_for_cell(c);
                            if grid.is_empty_at(c) {
                                return false;
                            }
                        }
                    }
                }
            }
        }
        true
    }

    fn clone_box(&self) -> BoxedHandler {
        Box::new(self.clone())
    }
}
