//! Structural build errors (spec §7 "Structural error").
//!
//! Only the four *structural* error kinds spec §7 names live here. Infeasibility,
//! resource limits, and host-cancellation are not errors per spec's own classification
//! — they surface as `bool`/`Option` results from [`variant_sudoku_solver`], never as
//! a `BuildError`.

use variant_sudoku_core::CellId;

/// A structural defect in an input [`crate::ConstraintNode`] tree, detected during
/// [`crate::build`] and fatal for that puzzle (spec §7).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum BuildError {
    /// A node kind the builder does not recognize. In practice this crate's
    /// `ConstraintNode` is itself exhaustively matched, so this variant exists for
    /// forward-compatibility with tree producers built against a newer vocabulary
    /// than this builder understands.
    #[display("unknown constraint kind: {kind}")]
    UnknownConstraintKind {
        #[error(not(source))]
        kind: String,
    },
    /// `kind` appeared as a direct child of an `And`/`Or` node but is not allowed
    /// inside a composite (currently: nested `Shape` and `NoBoxes`, which only make
    /// sense as top-level tree siblings).
    #[display("{kind} is not allowed inside a composite constraint")]
    ConstraintNotAllowedInComposite {
        #[error(not(source))]
        kind: &'static str,
    },
    /// A `FullRank` outside clue's `rank` was outside `1..=num_lines`, where
    /// `num_lines = 2 * (rows + cols)` is the count of directional line-reads a
    /// `FullRank` ranks among.
    #[display("FullRank rank {rank} out of range for {num_lines} directional reads")]
    FullRankRankOutOfRange { rank: u32, num_lines: u32 },
    /// Two uniqueness regions in the tree cover the exact same cell set (by
    /// `cells`, independent of declared `kind`) — a redundant, likely-mistaken
    /// duplicate declaration.
    #[display("duplicate uniqueness constraint over {cells:?}")]
    DuplicateUniquenessConstraint {
        #[error(not(source))]
        cells: Vec<CellId>,
    },
    /// A composite `Or`/`And` nested more than `EngineOptions::max_or_nesting_depth`
    /// levels deep (spec §9: "bound recursion depth of nested `Or` to prevent
    /// exponential blowup").
    #[display("composite nesting depth {depth} exceeds the configured limit of {limit}")]
    OrNestingTooDeep { depth: u32, limit: u32 },
}
