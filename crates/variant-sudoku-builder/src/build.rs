//! The optimizer/builder pass (spec §4.4 steps 1-7).
//!
//! Step 8 ("build the cell-exclusion graph by calling each handler's `initialize`") is
//! not duplicated here: [`Compiled`] hands its flat handler list straight to
//! `variant_sudoku_solver::Engine::build`, which already performs exactly that work.

use variant_sudoku_core::{knight_adjacent_pairs, king_adjacent_pairs, orthogonally_adjacent_pairs, BoxDims, CellId, Shape};
use variant_sudoku_solver::{
    handler::{
        binary::{BinaryHandler, PairKind},
        composite::{AndHandler, OrHandler},
        global::FullGridRequiredValuesHandler,
        line::LineHandler,
        nfa::NfaHandler,
        outside::{FullRankClue, FullRankHandler, OutsideHandler, OutsideKind},
        region::{RegionHandler, RegionKind},
        sum::{self, SumHandler, SumKind},
    },
    BoxedHandler, EngineOptions,
};

use crate::{error::BuildError, tree::ConstraintNode};

/// The builder's output: a resolved shape plus a flat, priority-carrying handler list
/// (spec §4.4's `(shape, handler list)`; the exclusion graph and initial grid are
/// produced downstream by `Engine::build`, not here).
#[derive(Debug)]
pub struct Compiled {
    pub shape: Shape,
    pub handlers: Vec<BoxedHandler>,
}

/// Compiles a [`ConstraintNode`] tree into a [`Compiled`] handler list.
///
/// `root` is normally an `And` of every top-level constraint the puzzle declares (a
/// bare `Shape` node, region declarations, sum/line/etc. clues, and any composite
/// `Or`/`And` groups); a single non-`And` node is also accepted and treated as a
/// one-element list. `options.max_or_nesting_depth` bounds how deeply nested
/// `Or`/`And` composites may recurse (spec §9: "bound recursion depth of nested `Or`
/// to prevent exponential blowup"); exceeding it is a [`BuildError::OrNestingTooDeep`].
pub fn build(root: ConstraintNode, options: EngineOptions) -> Result<Compiled, BuildError> {
    let mut top = Vec::new();
    flatten_top(root, &mut top);

    let shape = resolve_shape(&top);
    let no_boxes = top.iter().any(|n| matches!(n, ConstraintNode::NoBoxes));
    top.retain(|n| !matches!(n, ConstraintNode::Shape { .. } | ConstraintNode::NoBoxes));

    let top = expand_sugar(top, shape)?;

    let mut handlers: Vec<BoxedHandler> = Vec::new();
    for (kind, cells) in default_regions(shape, no_boxes) {
        handlers.push(Box::new(RegionHandler::new(kind, cells, shape.values())));
    }

    let explicit_regions = collect_explicit_regions(&top)?;
    for (kind, cells) in explicit_regions {
        handlers.push(Box::new(RegionHandler::new(kind, cells, shape.values())));
    }

    let sums = dedup_by_cells(top.iter().filter_map(|n| match n {
        ConstraintNode::Sum { kind, cells } => Some((kind.clone(), cells.clone())),
        _ => None,
    }));
    for (kind, cells) in sums {
        if let SumKind::Cage { unique: true, .. } = &kind {
            if let Some(region) = sum::upgrade_full_cage_to_region(cells.clone(), shape.values()) {
                handlers.push(Box::new(region));
            }
        }
        handlers.push(Box::new(SumHandler::new(kind, cells, shape.values())));
    }

    let binaries = dedup_by_cells(top.iter().filter_map(|n| match n {
        ConstraintNode::Binary { kind, a, b } => Some((*kind, vec![*a, *b])),
        _ => None,
    }));
    for (kind, cells) in binaries {
        handlers.push(Box::new(BinaryHandler::new(kind, cells[0], cells[1])));
    }

    for (kind, pairs) in merge_pairs(&top) {
        for (a, b) in pairs {
            handlers.push(Box::new(BinaryHandler::new(kind, a, b)));
        }
    }

    let lines = dedup_by_cells(top.iter().filter_map(|n| match n {
        ConstraintNode::Line { pattern, cells } => Some((pattern.clone(), cells.clone())),
        _ => None,
    }));
    if let Some((line_length, partition)) = full_grid_partition(&lines, shape) {
        handlers.push(Box::new(FullGridRequiredValuesHandler::new(partition, line_length, shape.values())));
    }
    for (pattern, cells) in lines {
        handlers.push(Box::new(LineHandler::new(pattern, cells, shape.values())));
    }

    let outsides = dedup_by_cells(top.iter().filter_map(|n| match n {
        ConstraintNode::Outside { kind, cells } => Some((kind.clone(), cells.clone())),
        _ => None,
    }));
    validate_full_rank_ranks(&outsides, shape)?;
    for (a, b) in full_rank_equal_pairs(&outsides) {
        handlers.push(Box::new(BinaryHandler::new(PairKind::Equal, a, b)));
    }
    if let Some(ordering) = full_rank_ordering_handler(&outsides) {
        handlers.push(ordering);
    }
    for (kind, cells) in outsides {
        handlers.push(Box::new(OutsideHandler::new(kind, cells, shape.values())));
    }

    for n in &top {
        if let ConstraintNode::Nfa { nfa, cells } = n {
            handlers.push(Box::new(NfaHandler::new(nfa.clone(), cells.clone())));
        }
        if let ConstraintNode::FullGridRequiredValues { lines, line_length } = n {
            handlers.push(Box::new(FullGridRequiredValuesHandler::new(lines.clone(), *line_length, shape.values())));
        }
    }

    let max_depth = options.max_or_nesting_depth;
    for n in &top {
        match n {
            ConstraintNode::Or(children) => handlers.push(lower_or(children.clone(), shape, 1, max_depth)?),
            ConstraintNode::And(children) => {
                handlers.push(Box::new(AndHandler::new(lower_children(children.clone(), shape, 1, max_depth)?)))
            }
            _ => {}
        }
    }

    Ok(Compiled { shape, handlers })
}

/// Flattens a top-level `And` into `out`; any other node becomes a single-element list.
fn flatten_top(node: ConstraintNode, out: &mut Vec<ConstraintNode>) {
    match node {
        ConstraintNode::And(children) => {
            for child in children {
                flatten_top(child, out);
            }
        }
        other => out.push(other),
    }
}

/// Resolves the puzzle shape from a `Shape` node among `top`, defaulting to classic 9x9
/// if absent (spec §6: "Shape is declared by a `Shape` node at top level; absence
/// implies 9x9").
fn resolve_shape(top: &[ConstraintNode]) -> Shape {
    top.iter()
        .find_map(|n| match n {
            ConstraintNode::Shape { rows, cols, values, box_dims } => {
                let dims = box_dims.map(|(height, width)| BoxDims { height, width });
                Some(Shape::with_box_dims(*rows, *cols, *values, dims))
            }
            _ => None,
        })
        .unwrap_or_else(|| Shape::classic(3))
}

/// Expands `Diagonal`/`Jigsaw`/`AntiKnight`/`AntiKing`/`AntiConsecutive` sugar into
/// plain `Region`/`Pair` nodes (spec §4.4 step 1).
fn expand_sugar(top: Vec<ConstraintNode>, shape: Shape) -> Result<Vec<ConstraintNode>, BuildError> {
    let mut out = Vec::with_capacity(top.len());
    for node in top {
        match node {
            ConstraintNode::Diagonal { anti } => {
                out.push(ConstraintNode::Region { kind: RegionKind::Diagonal, cells: diagonal_cells(shape, anti) });
            }
            ConstraintNode::Jigsaw { pieces } => {
                for piece in pieces {
                    out.push(ConstraintNode::Region { kind: RegionKind::Jigsaw, cells: piece });
                }
            }
            ConstraintNode::AntiKnight => {
                out.push(ConstraintNode::Pair { key: PairKind::NotEqual, pairs: knight_adjacent_pairs(shape) });
            }
            ConstraintNode::AntiKing => {
                out.push(ConstraintNode::Pair { key: PairKind::NotEqual, pairs: king_adjacent_pairs(shape) });
            }
            ConstraintNode::AntiConsecutive => {
                out.push(ConstraintNode::Pair {
                    key: PairKind::Difference { delta: 1, negate: true },
                    pairs: orthogonally_adjacent_pairs(shape),
                });
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Rejects a `FullRank` clue whose `rank` falls outside `1..=num_lines`, where
/// `num_lines = 2 * (rows + cols)` counts every directional line-read (top/bottom per
/// column, left/right per row) a `FullRank` family ranks among (spec §4.3.6).
fn validate_full_rank_ranks(outsides: &[(OutsideKind, Vec<CellId>)], shape: Shape) -> Result<(), BuildError> {
    let num_lines = 2 * (u32::from(shape.rows()) + u32::from(shape.cols()));
    for (kind, _) in outsides {
        if let OutsideKind::FullRank { rank, .. } = kind {
            if *rank == 0 || *rank > num_lines {
                return Err(BuildError::FullRankRankOutOfRange { rank: *rank, num_lines });
            }
        }
    }
    Ok(())
}

/// Builds a [`FullRankHandler`] enforcing strict ordering between distinct-rank
/// `FullRank` clues (spec §4.3.6), or `None` if no `FullRank` clue is present.
fn full_rank_ordering_handler(outsides: &[(OutsideKind, Vec<CellId>)]) -> Option<BoxedHandler> {
    let clues: Vec<FullRankClue> = outsides
        .iter()
        .filter_map(|(kind, cells)| match kind {
            OutsideKind::FullRank { rank, reversed, .. } => {
                Some(FullRankClue { rank: *rank, reversed: *reversed, cells: cells.clone() })
            }
            _ => None,
        })
        .collect();
    if clues.is_empty() {
        None
    } else {
        Some(Box::new(FullRankHandler::new(clues)))
    }
}

/// The main (`anti = false`) or anti (`anti = true`) diagonal's cells, truncated to
/// `min(rows, cols)` entries for a non-square shape.
fn diagonal_cells(shape: Shape, anti: bool) -> Vec<CellId> {
    let len = shape.rows().min(shape.cols());
    (0..len)
        .map(|i| if anti { shape.cell_id(i, shape.cols() - 1 - i) } else { shape.cell_id(i, i) })
        .collect()
}

/// Row and column regions (always present) plus default box regions, unless `NoBoxes`
/// was declared or the shape carries no box dimensions.
fn default_regions(shape: Shape, no_boxes: bool) -> Vec<(RegionKind, Vec<CellId>)> {
    let mut regions = Vec::new();
    for row in 0..shape.rows() {
        regions.push((RegionKind::Row, shape.row_cells(row).collect()));
    }
    for col in 0..shape.cols() {
        regions.push((RegionKind::Column, shape.col_cells(col).collect()));
    }
    if !no_boxes && shape.box_dims().is_some() {
        for b in 0..shape.num_boxes() {
            regions.push((RegionKind::Box, shape.box_cells(b)));
        }
    }
    regions
}

/// Collects user-declared `Region` nodes (including expanded `Diagonal`/`Jigsaw`),
/// rejecting two whose cell *sets* (order-independent) coincide (spec §7
/// `DuplicateUniquenessConstraint`). Auto-generated default regions are checked
/// separately and never collide with this check: row/column/box redundancy with an
/// explicit region is harmless, not an error.
fn collect_explicit_regions(top: &[ConstraintNode]) -> Result<Vec<(RegionKind, Vec<CellId>)>, BuildError> {
    let mut seen: Vec<Vec<CellId>> = Vec::new();
    let mut regions = Vec::new();
    for n in top {
        if let ConstraintNode::Region { kind, cells } = n {
            let mut sorted = cells.clone();
            sorted.sort_by_key(CellId::index);
            if seen.iter().any(|s| s == &sorted) {
                return Err(BuildError::DuplicateUniquenessConstraint { cells: cells.clone() });
            }
            seen.push(sorted);
            regions.push((*kind, cells.clone()));
        }
    }
    Ok(regions)
}

/// Collapses handlers with identical `(kind, cells)` signatures (spec §4.4 step 3).
fn dedup_by_cells<K: PartialEq>(items: impl Iterator<Item = (K, Vec<CellId>)>) -> Vec<(K, Vec<CellId>)> {
    let mut out: Vec<(K, Vec<CellId>)> = Vec::new();
    for (kind, cells) in items {
        if !out.iter().any(|(k, c)| *k == kind && *c == cells) {
            out.push((kind, cells));
        }
    }
    out
}

/// Merges top-level `Pair` nodes sharing the same key, deduplicating identical pairs
/// across them (spec §4.4 step 4). Only top-level siblings participate; a `Pair` nested
/// inside a composite is rejected earlier by [`lower_leaf`].
fn merge_pairs(top: &[ConstraintNode]) -> Vec<(PairKind, Vec<(CellId, CellId)>)> {
    let mut groups: Vec<(PairKind, Vec<(CellId, CellId)>)> = Vec::new();
    for n in top {
        if let ConstraintNode::Pair { key, pairs } = n {
            let group = match groups.iter_mut().find(|(k, _)| k == key) {
                Some(g) => g,
                None => {
                    groups.push((*key, Vec::new()));
                    groups.last_mut().unwrap()
                }
            };
            for &pair in pairs {
                if !group.1.contains(&pair) {
                    group.1.push(pair);
                }
            }
        }
    }
    groups
}

/// Rewrites same-rank `FullRank` clues into equality pairs between their clue-start
/// cells (spec §4.4 step 5). Pairs are generated consecutively within each rank group,
/// which is transitively equivalent to pairing every member against every other.
fn full_rank_equal_pairs(outsides: &[(OutsideKind, Vec<CellId>)]) -> Vec<(CellId, CellId)> {
    let mut by_rank: Vec<(u32, Vec<CellId>)> = Vec::new();
    for (kind, cells) in outsides {
        let OutsideKind::FullRank { rank, .. } = kind else { continue };
        let Some(&start) = cells.first() else { continue };
        match by_rank.iter_mut().find(|(r, _)| r == rank) {
            Some((_, starts)) => starts.push(start),
            None => by_rank.push((*rank, vec![start])),
        }
    }
    by_rank
        .into_iter()
        .flat_map(|(_, starts)| starts.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>())
        .collect()
}

/// If `lines` are pairwise disjoint, share one length, and together partition every
/// shape cell exactly once, returns `(line_length, lines)` so the caller can also
/// derive a `FullGridRequiredValues` handler (spec §4.4 step 6).
fn full_grid_partition<K>(lines: &[(K, Vec<CellId>)], shape: Shape) -> Option<(u8, Vec<Vec<CellId>>)> {
    if lines.is_empty() {
        return None;
    }
    let line_length = lines[0].1.len();
    if line_length == 0 || !lines.iter().all(|(_, c)| c.len() == line_length) {
        return None;
    }
    let mut covered = vec![false; shape.num_cells()];
    for (_, cells) in lines {
        for &c in cells {
            let idx = c.index_usize();
            if covered[idx] {
                return None; // overlap
            }
            covered[idx] = true;
        }
    }
    if !covered.into_iter().all(|c| c) {
        return None; // doesn't cover every cell
    }
    u8::try_from(line_length).ok().map(|len| (len, lines.iter().map(|(_, c)| c.clone()).collect()))
}

/// Lowers an `Or`'s children list to a single handler (spec §4.4 step 5: zero children
/// stays an infeasible `OrHandler`, exactly one child unwraps to that child directly).
/// `depth` counts this `Or`/`And`'s own nesting level (the top-level call starts at 1);
/// exceeding `max_depth` is a [`BuildError::OrNestingTooDeep`] (spec §9).
fn lower_or(children: Vec<ConstraintNode>, shape: Shape, depth: u32, max_depth: u32) -> Result<BoxedHandler, BuildError> {
    if depth > max_depth {
        return Err(BuildError::OrNestingTooDeep { depth, limit: max_depth });
    }
    if children.len() == 1 {
        return lower_leaf(children.into_iter().next().unwrap(), shape, depth, max_depth);
    }
    let lowered = lower_children(children, shape, depth, max_depth)?;
    Ok(Box::new(OrHandler::new(lowered)))
}

fn lower_children(
    children: Vec<ConstraintNode>,
    shape: Shape,
    depth: u32,
    max_depth: u32,
) -> Result<Vec<BoxedHandler>, BuildError> {
    if depth > max_depth {
        return Err(BuildError::OrNestingTooDeep { depth, limit: max_depth });
    }
    children.into_iter().map(|c| lower_leaf(c, shape, depth, max_depth)).collect()
}

/// Lowers a single composite child to exactly one handler. Kinds that cannot produce
/// exactly one handler in isolation (`Pair` splits into many; `FullGridRequiredValues`
/// is inherently grid-wide; `Shape`/`NoBoxes`/`Jigsaw` are meta/multi-region) are
/// rejected with [`BuildError::ConstraintNotAllowedInComposite`].
fn lower_leaf(node: ConstraintNode, shape: Shape, depth: u32, max_depth: u32) -> Result<BoxedHandler, BuildError> {
    match node {
        ConstraintNode::Region { kind, cells } => Ok(Box::new(RegionHandler::new(kind, cells, shape.values()))),
        ConstraintNode::Diagonal { anti } => {
            Ok(Box::new(RegionHandler::new(RegionKind::Diagonal, diagonal_cells(shape, anti), shape.values())))
        }
        ConstraintNode::Sum { kind, cells } => Ok(Box::new(SumHandler::new(kind, cells, shape.values()))),
        ConstraintNode::Binary { kind, a, b } => Ok(Box::new(BinaryHandler::new(kind, a, b))),
        ConstraintNode::Line { pattern, cells } => Ok(Box::new(LineHandler::new(pattern, cells, shape.values()))),
        ConstraintNode::Nfa { nfa, cells } => Ok(Box::new(NfaHandler::new(nfa, cells))),
        ConstraintNode::Outside { kind, cells } => Ok(Box::new(OutsideHandler::new(kind, cells, shape.values()))),
        ConstraintNode::Or(children) => lower_or(children, shape, depth + 1, max_depth),
        ConstraintNode::And(children) => {
            Ok(Box::new(AndHandler::new(lower_children(children, shape, depth + 1, max_depth)?)))
        }
        other => Err(BuildError::ConstraintNotAllowedInComposite { kind: other.kind_name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use variant_sudoku_core::Shape;

    fn shape4x4() -> ConstraintNode {
        ConstraintNode::Shape { rows: 4, cols: 4, values: 4, box_dims: Some((2, 2)) }
    }

    fn build_default(root: ConstraintNode) -> Result<Compiled, BuildError> {
        build(root, EngineOptions::default())
    }

    #[test]
    fn default_shape_is_classic_9x9() {
        let compiled = build_default(ConstraintNode::And(Vec::new())).expect("builds");
        assert_eq!(compiled.shape, Shape::classic(3));
    }

    #[test]
    fn explicit_shape_is_honored() {
        let compiled = build_default(ConstraintNode::And(vec![shape4x4()])).expect("builds");
        assert_eq!(compiled.shape.rows(), 4);
        assert_eq!(compiled.shape.values(), 4);
    }

    #[test]
    fn no_boxes_suppresses_box_regions() {
        let compiled =
            build_default(ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes])).expect("builds");
        // rows + columns only: 4 + 4 = 8 region handlers, no box handlers.
        assert_eq!(compiled.handlers.len(), 8);
    }

    #[test]
    fn duplicate_explicit_regions_over_the_same_cell_set_error() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.row_cells(0).collect();
        let mut reversed = cells.clone();
        reversed.reverse();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::Region { kind: RegionKind::AllDifferent, cells: cells.clone() },
            ConstraintNode::Region { kind: RegionKind::AllDifferent, cells: reversed },
        ]);
        assert!(matches!(build_default(root), Err(BuildError::DuplicateUniquenessConstraint { .. })));
    }

    #[test]
    fn identical_sum_nodes_collapse_to_one_handler() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.row_cells(0).take(2).collect();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Sum { kind: SumKind::Sum { sum: 5 }, cells: cells.clone() },
            ConstraintNode::Sum { kind: SumKind::Sum { sum: 5 }, cells },
        ]);
        let compiled = build_default(root).expect("builds");
        let sum_handlers = compiled.handlers.iter().filter(|h| format!("{h:?}").contains("SumHandler")).count();
        assert_eq!(sum_handlers, 1);
    }

    #[test]
    fn same_key_pairs_merge_and_dedupe() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.cells().collect();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Pair { key: PairKind::NotEqual, pairs: vec![(cells[0], cells[1])] },
            ConstraintNode::Pair {
                key: PairKind::NotEqual,
                pairs: vec![(cells[0], cells[1]), (cells[2], cells[3])],
            },
        ]);
        let compiled = build_default(root).expect("builds");
        let binary_handlers = compiled.handlers.iter().filter(|h| format!("{h:?}").contains("BinaryHandler")).count();
        assert_eq!(binary_handlers, 2);
    }

    #[test]
    fn empty_or_lowers_to_infeasible_handler() {
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, ConstraintNode::Or(Vec::new())]);
        let compiled = build_default(root).expect("builds");
        assert!(compiled.handlers.iter().any(|h| format!("{h:?}").contains("OrHandler")));
    }

    #[test]
    fn single_child_or_unwraps_directly() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.row_cells(0).take(2).collect();
        let child = ConstraintNode::Binary { kind: PairKind::NotEqual, a: cells[0], b: cells[1] };
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, ConstraintNode::Or(vec![child])]);
        let compiled = build_default(root).expect("builds");
        assert!(!compiled.handlers.iter().any(|h| format!("{h:?}").contains("OrHandler")));
        assert!(compiled.handlers.iter().any(|h| format!("{h:?}").contains("BinaryHandler")));
    }

    #[test]
    fn pair_inside_composite_is_rejected() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.cells().collect();
        let pair = ConstraintNode::Pair { key: PairKind::NotEqual, pairs: vec![(cells[0], cells[1])] };
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Or(vec![pair, ConstraintNode::NoBoxes]),
        ]);
        assert!(matches!(build_default(root), Err(BuildError::ConstraintNotAllowedInComposite { .. })));
    }

    #[test]
    fn full_size_cage_upgrades_to_all_different() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.row_cells(0).collect();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Sum { kind: SumKind::Cage { sum: 10, unique: true }, cells },
        ]);
        let compiled = build_default(root).expect("builds");
        assert!(compiled.handlers.iter().any(|h| format!("{h:?}").contains("RegionHandler")));
        assert!(compiled.handlers.iter().any(|h| format!("{h:?}").contains("SumHandler")));
    }

    #[test]
    fn disjoint_full_length_lines_derive_full_grid_required_values() {
        use variant_sudoku_solver::handler::line::LinePattern;
        let shape = Shape::new(2, 4, 4);
        let row0: Vec<_> = shape.row_cells(0).collect();
        let row1: Vec<_> = shape.row_cells(1).collect();
        let root = ConstraintNode::And(vec![
            ConstraintNode::Shape { rows: 2, cols: 4, values: 4, box_dims: None },
            ConstraintNode::NoBoxes,
            ConstraintNode::Line { pattern: LinePattern::Renban, cells: row0 },
            ConstraintNode::Line { pattern: LinePattern::Renban, cells: row1 },
        ]);
        let compiled = build_default(root).expect("builds");
        assert!(compiled
            .handlers
            .iter()
            .any(|h| format!("{h:?}").contains("FullGridRequiredValuesHandler")));
    }

    #[test]
    fn or_nesting_deeper_than_the_configured_limit_is_rejected() {
        let shape = Shape::new(4, 4, 4);
        let cells: Vec<_> = shape.row_cells(0).take(2).collect();
        let leaf = ConstraintNode::Binary { kind: PairKind::NotEqual, a: cells[0], b: cells[1] };
        // Nest `Or(Or(Or(leaf)))`: depth 3 for the innermost `Or`.
        let nested = ConstraintNode::Or(vec![ConstraintNode::Or(vec![ConstraintNode::Or(vec![leaf])])]);
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, nested]);
        let options = EngineOptions { max_or_nesting_depth: 2, ..EngineOptions::default() };
        assert!(matches!(build(root, options), Err(BuildError::OrNestingTooDeep { .. })));
    }

    #[test]
    fn full_rank_clues_out_of_range_are_rejected() {
        let shape = Shape::new(4, 4, 4);
        let row0: Vec<_> = shape.row_cells(0).collect();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Outside {
                kind: OutsideKind::FullRank {
                    rank: 100,
                    reversed: false,
                    tie_mode: variant_sudoku_solver::handler::outside::RankTieMode::None,
                },
                cells: row0,
            },
        ]);
        assert!(matches!(build_default(root), Err(BuildError::FullRankRankOutOfRange { .. })));
    }

    #[test]
    fn full_rank_clues_produce_an_ordering_handler() {
        let shape = Shape::new(4, 4, 4);
        let row0: Vec<_> = shape.row_cells(0).collect();
        let row1: Vec<_> = shape.row_cells(1).collect();
        let root = ConstraintNode::And(vec![
            shape4x4(),
            ConstraintNode::NoBoxes,
            ConstraintNode::Outside {
                kind: OutsideKind::FullRank {
                    rank: 1,
                    reversed: false,
                    tie_mode: variant_sudoku_solver::handler::outside::RankTieMode::None,
                },
                cells: row0,
            },
            ConstraintNode::Outside {
                kind: OutsideKind::FullRank {
                    rank: 2,
                    reversed: false,
                    tie_mode: variant_sudoku_solver::handler::outside::RankTieMode::None,
                },
                cells: row1,
            },
        ]);
        let compiled = build_default(root).expect("builds");
        assert!(compiled.handlers.iter().any(|h| format!("{h:?}").contains("FullRankHandler")));
    }

    #[test]
    fn anti_knight_sugar_expands_to_pair_handlers_over_knight_adjacent_cells() {
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, ConstraintNode::AntiKnight]);
        let compiled = build_default(root).expect("builds");
        let shape = Shape::new(4, 4, 4);
        let expected = knight_adjacent_pairs(shape).len();
        let binary_handlers = compiled.handlers.iter().filter(|h| format!("{h:?}").contains("BinaryHandler")).count();
        assert_eq!(binary_handlers, expected);
    }

    #[test]
    fn anti_king_sugar_expands_to_pair_handlers_over_king_adjacent_cells() {
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, ConstraintNode::AntiKing]);
        let compiled = build_default(root).expect("builds");
        let shape = Shape::new(4, 4, 4);
        let expected = king_adjacent_pairs(shape).len();
        let binary_handlers = compiled.handlers.iter().filter(|h| format!("{h:?}").contains("BinaryHandler")).count();
        assert_eq!(binary_handlers, expected);
    }

    #[test]
    fn anti_consecutive_sugar_expands_to_pair_handlers_over_orthogonal_neighbors() {
        let root = ConstraintNode::And(vec![shape4x4(), ConstraintNode::NoBoxes, ConstraintNode::AntiConsecutive]);
        let compiled = build_default(root).expect("builds");
        let shape = Shape::new(4, 4, 4);
        let expected = orthogonally_adjacent_pairs(shape).len();
        let binary_handlers = compiled.handlers.iter().filter(|h| format!("{h:?}").contains("BinaryHandler")).count();
        assert_eq!(binary_handlers, expected);
    }
}
