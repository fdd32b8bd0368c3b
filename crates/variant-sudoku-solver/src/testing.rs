//! Test utilities shared across handler and engine unit tests.
//!
//! Mirrors the teacher's `TechniqueTester`: a small fluent harness over a grid string,
//! generalized from a fixed 9x9 layout to this crate's runtime [`Shape`].
//!
//! # Grid string format
//!
//! Whitespace-separated tokens, one per cell in row-major order: `.` (or `_`) for an
//! unfixed cell, or a decimal number `1..=values` for a fixed cell. Unlike the
//! teacher's `DigitGrid::from_str`, no constraint propagation runs — this only places
//! digits, so tests can set up exactly the candidate pattern they want to exercise.

use variant_sudoku_core::{CandidateGrid, CellId, Shape, ValueMask};

/// Builds a [`CandidateGrid`] from a token string (see module docs), with no
/// propagation beyond the direct placements the string specifies.
///
/// # Panics
/// Panics if the token count does not match `shape.num_cells()`, or if a numeric
/// token is out of `1..=shape.values()`.
#[must_use]
pub fn grid_from_tokens(shape: Shape, tokens: &str) -> CandidateGrid {
    let mut grid = CandidateGrid::new(shape);
    let cells: Vec<CellId> = shape.cells().collect();
    let words: Vec<&str> = tokens.split_whitespace().collect();
    assert_eq!(words.len(), cells.len(), "token count must match shape.num_cells()");
    for (cell, word) in cells.into_iter().zip(words) {
        if word == "." || word == "_" {
            continue;
        }
        let digit: u8 = word.parse().unwrap_or_else(|_| panic!("invalid grid token: {word:?}"));
        assert!((1..=shape.values()).contains(&digit), "digit {digit} out of range for {shape:?}");
        grid.place(cell, digit);
    }
    grid
}

/// A small fluent harness for asserting on a grid's candidate masks before/after some
/// handler ran.
#[derive(Debug)]
pub struct GridTester {
    initial: CandidateGrid,
    current: CandidateGrid,
}

impl GridTester {
    /// Wraps an already-built grid, snapshotting it as the "initial" baseline.
    #[must_use]
    pub fn new(grid: CandidateGrid) -> Self {
        Self { initial: grid.clone(), current: grid }
    }

    /// Returns a mutable reference to the grid under test, for handlers to mutate.
    pub fn grid_mut(&mut self) -> &mut CandidateGrid {
        &mut self.current
    }

    /// Asserts that `cell` is now fixed to exactly `digit`.
    #[track_caller]
    #[must_use]
    pub fn assert_fixed(self, cell: CellId, digit: u8) -> Self {
        assert_eq!(
            self.current.candidates_at(cell).fixed_digit(),
            Some(digit),
            "expected {cell:?} fixed to {digit}, found {:?}",
            self.current.candidates_at(cell)
        );
        self
    }

    /// Asserts that `cell`'s candidates now equal exactly `mask`.
    #[track_caller]
    #[must_use]
    pub fn assert_candidates(self, cell: CellId, mask: ValueMask) -> Self {
        assert_eq!(
            self.current.candidates_at(cell),
            mask,
            "expected {cell:?} candidates {mask:?}, found {:?}",
            self.current.candidates_at(cell)
        );
        self
    }

    /// Asserts that `cell`'s candidates are unchanged from the initial snapshot.
    #[track_caller]
    #[must_use]
    pub fn assert_unchanged(self, cell: CellId) -> Self {
        assert_eq!(
            self.initial.candidates_at(cell),
            self.current.candidates_at(cell),
            "expected no change at {cell:?}"
        );
        self
    }
}
