//! Core data model for the variant Sudoku constraint solver.
//!
//! This crate provides the shared data layer used by both the builder and the solver
//! engine crates: the puzzle [`Shape`], per-cell [`ValueMask`]s, the cell-major
//! [`CandidateGrid`], fixed-width [`CellSet`]s, the [`ExclusionGraph`], and the per-`V`
//! [`ValueTables`] lookup tables.
//!
//! # Architecture overview
//!
//! A classic 9x9 solver can bake the board size into its types (`Index9`, `BitSet81`,
//! `Array9<T, S>`). This engine's grid dimensions, value count, and box layout are
//! chosen per puzzle at build time (spec §3's `Shape`), so every type here is ordinary
//! runtime data rather than a compile-time constant:
//!
//! - [`Shape`] replaces a hardcoded `9, 9, 9` with a `Copy` struct carrying `rows`,
//!   `cols`, `values`, and optional box dimensions.
//! - [`ValueMask`] generalizes a 9-bit digit mask to a 16-bit mask, since `V` can be up
//!   to 16.
//! - [`CellSet`] generalizes a single `u128`-backed 81-bit set to a four-`u64`-backed
//!   256-bit set, the largest grid ([`MAX_CELLS`]) this engine supports.
//! - [`CandidateGrid`] is cell-major (`Vec<ValueMask>`), matching the spec's literal
//!   "dense sequence of numCells value-masks" requirement, rather than the digit-major
//!   layout a fixed 9x9 board's `CandidateGrid` uses.
//!
//! # Core types
//!
//! - [`Shape`] / [`CellId`]: puzzle dimensions and cell identity.
//! - [`ValueMask`]: a candidate bitmask over `1..=V`.
//! - [`CandidateGrid`]: the mutable per-puzzle grid of value masks.
//! - [`CellSet`]: a set of cells, used for exclusion-graph neighbor sets and
//!   propagation accumulators.
//! - [`ExclusionGraph`]: the "must differ" relation between cells.
//! - [`ValueTables`]: precomputed per-`V` sum and subset-sum tables.

mod cellset;
mod exclusion;
mod grid;
mod mask;
mod shape;
mod tables;

pub use self::{
    cellset::{CellSet, CellSetIter},
    exclusion::{knight_adjacent_pairs, king_adjacent_pairs, orthogonally_adjacent_pairs, ExclusionGraph},
    grid::CandidateGrid,
    mask::{ValueMask, ValueMaskIter},
    shape::{BoxDims, CellId, Shape, MAX_CELLS, MAX_VALUES},
    tables::{subsets_of_size, ValueTables},
};
