//! Puzzle shape: grid dimensions, value count, and box layout.

use std::fmt;

/// Maximum number of distinct values a cell can hold (spec: `1 <= V <= 16`).
pub const MAX_VALUES: u8 = 16;

/// Maximum number of cells a [`Shape`] may describe.
///
/// Bounded by the fixed-width [`CellSet`](crate::CellSet) used throughout the engine.
pub const MAX_CELLS: usize = 256;

/// A flat cell index (`row * numCols + col`), 0-based.
///
/// The spec's canonical *external* form is `R<row>C<col>` (1-indexed); use
/// [`Shape::format_cell`] to render it. `CellId` alone carries no shape context, so row
/// and column must always be recovered through the owning [`Shape`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u16);

impl CellId {
    /// Creates a cell id from a raw flat index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw flat index.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Returns the raw flat index as a `usize`, for slice indexing.
    #[must_use]
    pub const fn index_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

/// Box dimensions for a shape with default (non-jigsaw) boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxDims {
    /// Box height, in rows.
    pub height: u8,
    /// Box width, in columns.
    pub width: u8,
}

/// Immutable descriptor of a puzzle's dimensions.
///
/// Unlike a classic 9x9 solver, where the board size is a compile-time constant, this
/// engine's shape is chosen per puzzle at build time, so `Shape` is ordinary runtime
/// data (a small `Copy` struct) rather than a const-generic type parameter.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    rows: u8,
    cols: u8,
    values: u8,
    box_dims: Option<BoxDims>,
}

impl Shape {
    /// Creates a new shape with no default boxes (jigsaw/box-free puzzles).
    ///
    /// # Panics
    /// Panics if `values` is not in `1..=16`, or if `rows * cols` is zero or exceeds
    /// [`MAX_CELLS`].
    #[must_use]
    pub fn new(rows: u8, cols: u8, values: u8) -> Self {
        Self::with_box_dims(rows, cols, values, None)
    }

    /// Creates a new shape with explicit default box dimensions.
    ///
    /// # Panics
    /// Panics if `values` is not in `1..=16`, if `rows * cols` is zero or exceeds
    /// [`MAX_CELLS`], or if `box_dims` is `Some` and its area does not equal `values`.
    #[must_use]
    pub fn with_box_dims(rows: u8, cols: u8, values: u8, box_dims: Option<BoxDims>) -> Self {
        assert!((1..=MAX_VALUES).contains(&values), "values must be in 1..=16");
        let num_cells = usize::from(rows) * usize::from(cols);
        assert!(num_cells > 0 && num_cells <= MAX_CELLS, "rows * cols must be in 1..=256");
        if let Some(b) = box_dims {
            assert_eq!(
                u16::from(b.height) * u16::from(b.width),
                u16::from(values),
                "box area must equal the value count"
            );
        }
        Self { rows, cols, values, box_dims }
    }

    /// Creates a classic square shape (e.g. 9x9 with 3x3 boxes) from a single box size.
    ///
    /// # Panics
    /// Panics if `box_size * box_size` does not fit in `1..=16`.
    #[must_use]
    pub fn classic(box_size: u8) -> Self {
        let side = box_size * box_size;
        Self::with_box_dims(
            side,
            side,
            side,
            Some(BoxDims { height: box_size, width: box_size }),
        )
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(self) -> u8 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(self) -> u8 {
        self.cols
    }

    /// Number of distinct values per cell.
    #[must_use]
    pub const fn values(self) -> u8 {
        self.values
    }

    /// Default box dimensions, or `None` for a box-free (jigsaw-only) shape.
    #[must_use]
    pub const fn box_dims(self) -> Option<BoxDims> {
        self.box_dims
    }

    /// Total number of cells (`rows * cols`).
    #[must_use]
    pub fn num_cells(self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    /// Returns whether the grid is square (`rows == cols`).
    #[must_use]
    pub const fn is_square(self) -> bool {
        self.rows == self.cols
    }

    /// Converts a `(row, col)` pair (0-indexed) into a [`CellId`].
    ///
    /// # Panics
    /// Panics if `row >= rows()` or `col >= cols()`.
    #[must_use]
    pub fn cell_id(self, row: u8, col: u8) -> CellId {
        assert!(row < self.rows && col < self.cols, "row/col out of range");
        CellId::new(u16::from(row) * u16::from(self.cols) + u16::from(col))
    }

    /// Converts a [`CellId`] back into its `(row, col)` pair.
    #[must_use]
    pub fn row_col(self, cell: CellId) -> (u8, u8) {
        let idx = cell.index();
        let cols = u16::from(self.cols);
        #[allow(clippy::cast_possible_truncation)]
        let row = (idx / cols) as u8;
        #[allow(clippy::cast_possible_truncation)]
        let col = (idx % cols) as u8;
        (row, col)
    }

    /// Returns the default box index containing `cell`, or `None` if this shape has no
    /// default boxes.
    #[must_use]
    pub fn box_index(self, cell: CellId) -> Option<u8> {
        let b = self.box_dims?;
        let (row, col) = self.row_col(cell);
        let boxes_per_row = self.cols / b.width;
        Some((row / b.height) * boxes_per_row + (col / b.width))
    }

    /// Formats a cell in the spec's canonical external form `R<row>C<col>` (1-indexed).
    #[must_use]
    pub fn format_cell(self, cell: CellId) -> String {
        let (row, col) = self.row_col(cell);
        format!("R{}C{}", row + 1, col + 1)
    }

    /// Iterates over every [`CellId`] in row-major order.
    #[must_use]
    pub fn cells(self) -> impl Iterator<Item = CellId> {
        (0..self.num_cells() as u16).map(CellId::new)
    }

    /// Iterates over the [`CellId`]s of row `row`, left to right.
    #[must_use]
    pub fn row_cells(self, row: u8) -> impl Iterator<Item = CellId> {
        let cols = self.cols;
        (0..cols).map(move |col| self.cell_id(row, col))
    }

    /// Iterates over the [`CellId`]s of column `col`, top to bottom.
    #[must_use]
    pub fn col_cells(self, col: u8) -> impl Iterator<Item = CellId> {
        let rows = self.rows;
        (0..rows).map(move |row| self.cell_id(row, col))
    }

    /// Iterates over the [`CellId`]s of the default box `box_index`, in row-major order
    /// within the box, or an empty iterator if this shape has no default boxes or the
    /// index is out of range.
    #[must_use]
    pub fn box_cells(self, box_index: u8) -> Vec<CellId> {
        let Some(b) = self.box_dims else { return Vec::new() };
        let boxes_per_row = self.cols / b.width;
        if boxes_per_row == 0 {
            return Vec::new();
        }
        let box_row = box_index / boxes_per_row;
        let box_col = box_index % boxes_per_row;
        let top = box_row * b.height;
        let left = box_col * b.width;
        let mut cells = Vec::with_capacity(usize::from(b.height) * usize::from(b.width));
        for dr in 0..b.height {
            for dc in 0..b.width {
                cells.push(self.cell_id(top + dr, left + dc));
            }
        }
        cells
    }

    /// Number of default boxes, or 0 if this shape has no default boxes.
    #[must_use]
    pub fn num_boxes(self) -> u8 {
        match self.box_dims {
            Some(b) if b.height > 0 && b.width > 0 => (self.rows / b.height) * (self.cols / b.width),
            _ => 0,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("values", &self.values)
            .field("box_dims", &self.box_dims)
            .finish()
    }
}
