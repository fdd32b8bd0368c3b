//! Compiles a user-facing constraint tree into a flat, priority-ordered handler list
//! (spec §4.4 "Optimizer / builder").
//!
//! This crate owns steps 1-7 of the builder pass: tree-walking, sugar expansion,
//! deduplication, `Pair` merging, composite rewriting, and hidden-handler derivation.
//! Step 8 (building the cell-exclusion graph by running each handler's `initialize`) is
//! not duplicated here — pass [`Compiled::handlers`] and [`Compiled::shape`] straight to
//! `variant_sudoku_solver::Engine::build`, which already does exactly that.

mod build;
mod error;
mod tree;

pub use build::{build, Compiled};
pub use error::BuildError;
pub use tree::ConstraintNode;
