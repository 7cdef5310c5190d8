//! Grid module - manages the playfield
//!
//! The grid is a rows×cols matrix where each cell is empty or holds the color
//! tag of the piece that locked there. Storage is a flat row-major `Vec` for
//! cache locality; the row count never changes after construction.
//!
//! Coordinates: (x, y) where x is the column (left to right) and y the row
//! (top to bottom). Rows above the grid (y < 0) are not stored.

use crate::pieces::Shape;
use crate::types::{Cell, GridSize, PieceKind};

/// The playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.cols as i32 || y >= self.size.rows as i32 {
            return None;
        }
        Some(y as usize * self.size.cols as usize + x as usize)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.size.cols as usize
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is inside the grid and filled
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// One row as a slice; empty for out-of-range rows
    pub fn row(&self, y: usize) -> &[Cell] {
        if y >= self.rows() {
            return &[];
        }
        let start = y * self.cols();
        &self.cells[start..start + self.cols()]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.rows() && self.row(y).iter().all(|cell| cell.is_some())
    }

    /// Indices of complete rows, scanned bottom to top
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.rows())
            .rev()
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove the given rows, shifting everything above them down
    ///
    /// Rows are handled in ascending order; each removal drops one row and
    /// inserts an empty row on top, so indices below the removed row stay
    /// valid for the next iteration. Returns the number of rows removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        let mut ordered: Vec<usize> = rows.iter().copied().filter(|&y| y < self.rows()).collect();
        ordered.sort_unstable();
        ordered.dedup();

        let width = self.cols();
        for &y in &ordered {
            // copy_within handles the overlapping shift
            self.cells.copy_within(0..y * width, width);
            self.cells[..width].fill(None);
        }
        ordered.len()
    }

    /// Write a shape's occupied cells into the grid with the given color
    ///
    /// Cells above the grid (negative rows) or outside it are skipped.
    /// Returns how many cells were written.
    pub fn place(&mut self, shape: &Shape, x: i32, y: i32, kind: PieceKind) -> usize {
        let mut written = 0;
        for (r, c) in shape.occupied() {
            let gy = y + r as i32;
            let gx = x + c as i32;
            if gy >= 0 && self.set(gx, gy, Some(kind)) {
                written += 1;
            }
        }
        written
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a grid from text rows: `.` is empty, a piece letter is filled
    ///
    /// Missing rows at the top are empty; `None` if any row has the wrong
    /// width, there are too many rows, or a character is not recognised.
    pub fn from_strs(size: GridSize, rows: &[&str]) -> Option<Self> {
        if rows.len() > size.rows as usize {
            return None;
        }
        let mut grid = Self::new(size);
        let offset = size.rows as usize - rows.len();
        for (i, line) in rows.iter().enumerate() {
            if line.chars().count() != size.cols as usize {
                return None;
            }
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '.' => None,
                    other => Some(PieceKind::from_str(&other.to_string())?),
                };
                grid.set(x as i32, (offset + i) as i32, cell);
            }
        }
        Some(grid)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}
