//! The user-facing constraint tree (spec §6 "Constraint tree (input)").
//!
//! A [`ConstraintNode`] tree is the only input [`crate::build`] accepts: an
//! already-parsed discriminated tree whose node kinds are exactly the `SudokuConstraint.*`
//! kinds enumerated in spec §4.3, plus `And`/`Or` composition and a top-level `Shape`
//! declaration. Producing this tree from any textual puzzle format is, per spec §1, the
//! job of a separate parser this crate does not implement.
//!
//! Most node kinds embed the handler-library's own parameter types
//! (`variant_sudoku_solver::handler::{region,sum,binary,line,outside}::*`) directly,
//! rather than duplicating a parallel description of each constraint family — the tree
//! is a recipe for handlers, so it reuses their vocabulary.

use variant_sudoku_core::CellId;
use variant_sudoku_solver::handler::{
    binary::PairKind, line::LinePattern, nfa::Nfa, outside::OutsideKind, region::RegionKind,
    sum::SumKind,
};

/// A node of the constraint tree.
#[derive(Debug, Clone)]
pub enum ConstraintNode {
    /// Declares the puzzle's shape. Valid only among the tree's top-level siblings;
    /// absence implies classic 9x9 (spec §6). A second `Shape` node is a structural
    /// error.
    Shape {
        rows: u8,
        cols: u8,
        values: u8,
        box_dims: Option<(u8, u8)>,
    },
    /// An explicit uniqueness region (spec §4.3.1). `kind` is carried through for
    /// diagnostics; enforcement does not depend on it.
    Region { kind: RegionKind, cells: Vec<CellId> },
    /// The main (`anti = false`) or anti (`anti = true`) diagonal, expanded to its
    /// cell list from the tree's declared shape at build step 1 (spec §4.4 step 1
    /// sugar: "`Diagonal(-1)` into its cell list").
    Diagonal { anti: bool },
    /// A jigsaw layout: `pieces[i]` lists the cells of piece `i`. Expanded at build
    /// time into one [`RegionKind::Jigsaw`] region per piece (spec §4.4 step 1 sugar:
    /// "`Jigsaw(layout)` into region membership").
    Jigsaw { pieces: Vec<Vec<CellId>> },
    /// Disables the default box regions a square shape would otherwise imply.
    NoBoxes,
    /// Globally forbids knight-move-adjacent cells from holding the same digit (spec
    /// §4.1 "knight" layout constraint). Valid only among the tree's top-level
    /// siblings; expanded at build time into a `Pair { key: PairKind::NotEqual, .. }`
    /// node over every knight-adjacent cell pair the declared shape admits (spec §4.4
    /// step 1 sugar).
    AntiKnight,
    /// Globally forbids king-move-adjacent cells from holding the same digit (spec
    /// §4.1 "king" layout constraint). Expanded the same way as `AntiKnight`, over
    /// king-adjacent pairs.
    AntiKing,
    /// Globally forbids orthogonally-adjacent cells from holding consecutive digits
    /// (the "AntiConsecutive" rule). Expanded into a
    /// `Pair { key: PairKind::Difference { delta: 1, negate: true }, .. }` node over
    /// every orthogonally-adjacent cell pair.
    AntiConsecutive,
    /// A sum-family constraint (spec §4.3.2).
    Sum { kind: SumKind, cells: Vec<CellId> },
    /// A binary/pairwise constraint over exactly two cells (spec §4.3.3).
    Binary { kind: PairKind, a: CellId, b: CellId },
    /// Several `Pair(key)`/`PairX(key)` nodes sharing one logical key; merged at build
    /// time (spec §4.4 step 4) into a single handler per key whose pair list is the
    /// union of every node sharing that key. `key`'s `PairKind` fields carry the
    /// matching key; two nodes share a key iff their `PairKind` values are equal.
    Pair { key: PairKind, pairs: Vec<(CellId, CellId)> },
    /// An ordered-line constraint (spec §4.3.4).
    Line { pattern: LinePattern, cells: Vec<CellId> },
    /// A user-supplied (or already regex-compiled) NFA over an ordered line (spec
    /// §4.3.5). `ConstraintNode` carries only the compiled automaton: regex-to-NFA
    /// compilation (see `DESIGN.md`) happens before a tree is constructed, not inside
    /// the builder.
    Nfa { nfa: Nfa, cells: Vec<CellId> },
    /// An outside clue (spec §4.3.6).
    Outside { kind: OutsideKind, cells: Vec<CellId> },
    /// `FullGridRequiredValues`, explicit form (spec §4.3.8). Usually unnecessary: the
    /// builder derives this handler automatically from line-family siblings that
    /// partition the grid (spec §4.4 step 6); an explicit node is for cases the
    /// derivation heuristic does not cover.
    FullGridRequiredValues { lines: Vec<Vec<CellId>>, line_length: u8 },
    /// Flattened into its parent's child list at build time (spec §4.4 step 5); no
    /// handler is ever constructed for `And` itself.
    And(Vec<ConstraintNode>),
    /// At least one child's constraints must hold (spec §4.3.7, §4.4 step 5: a
    /// single surviving feasible child replaces the `Or` outright).
    Or(Vec<ConstraintNode>),
}

impl ConstraintNode {
    /// A short, human-readable label for this node's kind, used in [`crate::BuildError`]
    /// messages. Never includes the node's cell list or parameters.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstraintNode::Shape { .. } => "Shape",
            ConstraintNode::Region { .. } => "Region",
            ConstraintNode::Diagonal { .. } => "Diagonal",
            ConstraintNode::Jigsaw { .. } => "Jigsaw",
            ConstraintNode::NoBoxes => "NoBoxes",
            ConstraintNode::AntiKnight => "AntiKnight",
            ConstraintNode::AntiKing => "AntiKing",
            ConstraintNode::AntiConsecutive => "AntiConsecutive",
            ConstraintNode::Sum { .. } => "Sum",
            ConstraintNode::Binary { .. } => "Binary",
            ConstraintNode::Pair { .. } => "Pair",
            ConstraintNode::Line { .. } => "Line",
            ConstraintNode::Nfa { .. } => "Nfa",
            ConstraintNode::Outside { .. } => "Outside",
            ConstraintNode::FullGridRequiredValues { .. } => "FullGridRequiredValues",
            ConstraintNode::And(_) => "And",
            ConstraintNode::Or(_) => "Or",
        }
    }
}
