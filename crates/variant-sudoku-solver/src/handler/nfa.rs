//! State-machine constraints (spec §4.3.5).
//!
//! `Regex` (converted to an NFA at build time) and user-supplied `NFA` both become an
//! [`NfaHandler`]: forward reachable-state sets are computed position by position from
//! the start states, consuming each position's current candidate mask as the set of
//! transition labels available there; a backward pass from the accept states intersects
//! against the same transitions. A digit survives at position `i` iff some transition
//! labeled with it is supported by both the forward and backward reachable-state sets.

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape, ValueMask};

use crate::{Accumulator, BoxedHandler, Handler, ScratchAllocator};

/// One edge of the NFA: from `from`, consuming `label`, to `to`.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: u32,
    pub label: u8,
    pub to: u32,
}

/// A small nondeterministic finite automaton consumed one digit per line position.
#[derive(Debug, Clone)]
pub struct Nfa {
    num_states: u32,
    start: Vec<u32>,
    accept: Vec<u32>,
    transitions: Vec<Transition>,
}

impl Nfa {
    /// Builds an NFA from an explicit transition table.
    #[must_use]
    pub fn new(num_states: u32, start: Vec<u32>, accept: Vec<u32>, transitions: Vec<Transition>) -> Self {
        Self { num_states, start, accept, transitions }
    }

    fn outgoing(&self, state: u32) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.from == state)
    }
}

/// A handler for an NFA/regex constraint over an ordered line (spec §4.3.5).
#[derive(Debug, Clone)]
pub struct NfaHandler {
    nfa: Nfa,
    cells: Vec<CellId>,
    priority: i32,
}

impl NfaHandler {
    /// Creates a handler running `nfa` over the ordered `cells`.
    #[must_use]
    pub fn new(nfa: Nfa, cells: Vec<CellId>) -> Self {
        Self { nfa, cells, priority: 10 }
    }
}

impl Handler for NfaHandler {
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
        let n = self.cells.len();
        let states = self.nfa.num_states as usize;

        // forward[i] = set of NFA states reachable after consuming positions 0..=i-1;
        // forward[0] is the start set.
        let mut forward: Vec<Vec<bool>> = vec![vec![false; states]; n + 1];
        for &s in &self.nfa.start {
            forward[0][s as usize] = true;
        }
        for i in 0..n {
            let mask = grid.candidates_at(self.cells[i]);
            for state in 0..states {
                if !forward[i][state] {
                    continue;
                }
                for t in self.nfa.outgoing(state as u32) {
                    if mask.contains(t.label) {
                        forward[i + 1][t.to as usize] = true;
                    }
                }
            }
        }

        // backward[i] = set of states from which the accept set is reachable consuming
        // positions i..n.
        let mut backward: Vec<Vec<bool>> = vec![vec![false; states]; n + 1];
        for &s in &self.nfa.accept {
            backward[n][s as usize] = true;
        }
        for i in (0..n).rev() {
            let mask = grid.candidates_at(self.cells[i]);
            for t in &self.nfa.transitions {
                if backward[i + 1][t.to as usize] && mask.contains(t.label) {
                    backward[i][t.from as usize] = true;
                }
            }
        }

        if !backward[0].iter().enumerate().any(|(s, &reachable)| reachable && forward[0][s]) {
            return false;
        }

        for i in 0..n {
            let mut keep = ValueMask::EMPTY;
            for t in &self.nfa.transitions {
                if forward[i][t.from as usize] && backward[i + 1][t.to as usize] {
                    keep = keep.with(t.label);
                }
            }
            let cell = self.cells[i];
            if grid.intersect_candidates(cell, keep) {
                acc.add_for_cell(cell);
                if grid.is_empty_at(cell) {
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
