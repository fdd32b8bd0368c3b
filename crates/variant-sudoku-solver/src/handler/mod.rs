//! The constraint handler protocol (spec layer 3, §4.3) and the handler library.
//!
//! [`Handler`] is modeled directly on a classic solver's `Technique` trait: a small
//! object-safe interface (`cells`, `priority`, `initialize`, `enforce`), boxed as
//! `dyn Handler` and manually `Clone`-able via [`Handler::clone_box`], so the engine can
//! hold a heterogeneous `Vec<BoxedHandler>` and clone it freely for trial propagation
//! (the `Or` handler, [`composite::OrHandler`]). Per spec §9's explicit guidance to
//! "avoid deep inheritance; share common logic via free helpers", the ~40 named
//! constraint kinds of §4.3.1-§4.3.8 are grouped into a handful of parameterized
//! families, each sharing one enforcement routine:
//!
//! - [`region`]: uniqueness regions (§4.3.1).
//! - [`sum`]: the sum family (§4.3.2), sharing [`sum::SumRange`].
//! - [`binary`]: pairwise/binary-predicate constraints (§4.3.3).
//! - [`line`]: ordered-line constraints (§4.3.4).
//! - [`nfa`]: state-machine constraints (§4.3.5).
//! - [`outside`]: outside-clue constraints (§4.3.6).
//! - [`composite`]: `Or`/`And` (§4.3.7).
//! - [`global`]: global counting (§4.3.8).

pub mod binary;
pub mod composite;
pub mod global;
pub mod line;
pub mod nfa;
pub mod outside;
pub mod region;
pub mod sum;

use std::fmt::Debug;

use variant_sudoku_core::{CandidateGrid, CellId, ExclusionGraph, Shape};

use crate::{Accumulator, ScratchAllocator};

/// A constraint's propagation engine.
///
/// `initialize` runs once, in declaration order, over the all-candidates grid; it may
/// prune the grid, register mutual exclusions, and allocate scratch space. `enforce`
/// runs repeatedly during search, each time some cell in [`Handler::cells`] was
/// recently touched; it must be a monotone shrink (never adds candidate bits) and must
/// be idempotent on an unchanged grid (calling it twice with nothing else having
/// changed produces no further change the second time).
pub trait Handler: Debug {
    /// The ordered, duplicate-free list of cells this handler watches and may prune.
    fn cells(&self) -> &[CellId];

    /// Dequeue priority: lower values run first. Typical bands (spec §4.3): pairwise
    /// and unit constraints in the hundreds, sum constraints in the tens, heavy
    /// NFA/composite constraints in the ones.
    fn priority(&self) -> i32;

    /// Runs once over the initial all-candidates grid. May prune `grid`, register
    /// exclusions into `exclusions`, and allocate into `scratch`. Returns `false` if
    /// the constraint can be proven infeasible outright.
    fn initialize(
        &mut self,
        grid: &mut CandidateGrid,
        exclusions: &mut ExclusionGraph,
        shape: Shape,
        scratch: &mut ScratchAllocator,
    ) -> bool;

    /// Prunes `grid`, recording every cell it tightens into `acc`. Returns `false` if
    /// the constraint is now provably infeasible.
    fn enforce(&self, grid: &mut CandidateGrid, scratch: &ScratchAllocator, acc: &mut Accumulator) -> bool;

    /// Clones this handler into a fresh box. Required because `Handler` objects are
    /// stored as `Box<dyn Handler>` and the engine needs to clone the handler list for
    /// trial propagation (composite `Or`).
    fn clone_box(&self) -> BoxedHandler;

    /// Returns whether this handler enforces a *layout* constraint (uniqueness-only:
    /// rows/columns/boxes/jigsaw/diagonals/knight/king move exclusions), used by
    /// [`validate_layout`](crate::engine::Engine::validate_layout) (spec §4.1) to
    /// filter the active handler set down to layout-only constraints.
    fn is_layout(&self) -> bool {
        false
    }
}

/// A boxed, type-erased [`Handler`].
pub type BoxedHandler = Box<dyn Handler>;

impl Clone for BoxedHandler {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
