//! The propagation accumulator (spec §3, §4.1).

use variant_sudoku_core::{CellId, CellSet};

/// The per-propagation-step work record: every cell whose mask was pruned since the
/// engine last cleared this accumulator.
///
/// A [`Handler::enforce`](crate::Handler::enforce) call records every cell it tightens
/// here; the engine re-enqueues whichever other handlers watch those cells.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    touched: CellSet,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `cell`'s candidate mask was tightened.
    pub fn add_for_cell(&mut self, cell: CellId) {
        self.touched.insert(cell);
    }

    /// Records that every cell in `cells` was tightened.
    pub fn add_for_cells(&mut self, cells: impl IntoIterator<Item = CellId>) {
        for c in cells {
            self.add_for_cell(c);
        }
    }

    /// Returns the set of touched cells.
    #[must_use]
    pub fn touched(&self) -> CellSet {
        self.touched
    }

    /// Returns whether any cell was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Clears the accumulator for reuse on the next handler call.
    pub fn clear(&mut self) {
        self.touched = CellSet::new();
    }
}
