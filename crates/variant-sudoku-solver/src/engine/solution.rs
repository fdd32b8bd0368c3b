//! The solver's output types (spec §6 "External Interfaces").

use variant_sudoku_core::Shape;

use crate::engine::counters::Counters;

/// A complete assignment of one digit per cell (spec §6 "Solution (output)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// One digit per cell, in row-major order, each in `1..=shape.values()`.
    pub digits: Vec<u8>,
    /// The shape this solution was found for.
    pub shape: Shape,
}

impl Solution {
    /// Renders the canonical short form: one character per cell, starting at ASCII
    /// `'1'` (for `V <= 9`) or `'A'` (for `V > 9`), offset by `digit - 1`.
    #[must_use]
    pub fn to_short_string(&self) -> String {
        let base: u8 = if self.shape.values() <= 9 { b'1' } else { b'A' };
        self.digits.iter().map(|&d| char::from(base + (d - 1))).collect()
    }
}

/// The state delivered to a progress callback and at solution emission (spec §6
/// "Progress state").
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// The run's counters as of this callback.
    pub counters: Counters,
    /// Host-defined free-form diagnostic payload; the engine never populates this.
    pub extra: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_uses_digits_for_small_v() {
        let solution = Solution { digits: vec![1, 2, 9], shape: Shape::new(1, 3, 9) };
        assert_eq!(solution.to_short_string(), "129");
    }

    #[test]
    fn short_string_uses_letters_for_large_v() {
        let solution = Solution { digits: vec![1, 10, 16], shape: Shape::new(1, 3, 16) };
        assert_eq!(solution.to_short_string(), "AJP");
    }
}
