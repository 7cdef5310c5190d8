//! Pieces module - shape matrices and the seven-piece catalog
//!
//! Each piece is an N×N boolean matrix (N ∈ {2, 3, 4}) stored in a fixed 4x4
//! array, so shapes are plain `Copy` values: assigning a shape to a piece
//! always copies it and rotating one piece can never touch another piece or
//! the catalog.
//!
//! Rotation is a pure matrix transform (90° clockwise). Wall kicks are handled
//! by the game state, which tries a fixed list of horizontal offsets.

use arrayvec::ArrayVec;

use crate::types::PieceKind;

/// Largest matrix side length in the catalog.
pub const MAX_SHAPE_SIZE: usize = 4;

/// An N×N occupancy matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from rows of 0/1 values.
    ///
    /// Returns `None` unless the rows form a square of side 1..=4.
    pub fn from_rows(rows: &[&[u8]]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_SHAPE_SIZE || rows.iter().any(|row| row.len() != size) {
            return None;
        }

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                cells[r][c] = value != 0;
            }
        }

        Some(Self {
            size: size as u8,
            cells,
        })
    }

    /// Side length N of the matrix.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Whether (row, col) is occupied. Out-of-matrix positions are empty.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size() && col < self.size() && self.cells[row][col]
    }

    /// Occupied cells as (row, col) pairs in row-major order.
    pub fn occupied(&self) -> ArrayVec<(usize, usize), { MAX_SHAPE_SIZE * MAX_SHAPE_SIZE }> {
        let mut out = ArrayVec::new();
        let n = self.size();
        for r in 0..n {
            for c in 0..n {
                if self.cells[r][c] {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.occupied().len()
    }

    /// Return a copy rotated 90° clockwise: `result[i][j] = source[N-1-j][i]`.
    pub fn rotated(&self) -> Self {
        let n = self.size();
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (i, row) in cells.iter_mut().enumerate().take(n) {
            for (j, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - j][i];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Index of the first row holding an occupied cell (0 for an empty shape).
    pub fn top_offset(&self) -> usize {
        (0..self.size())
            .find(|&r| self.cells[r][..self.size()].iter().any(|&c| c))
            .unwrap_or(0)
    }
}

/// Rotate a shape 90° clockwise without touching the input.
pub fn rotate_matrix(shape: &Shape) -> Shape {
    shape.rotated()
}

/// First non-empty row of a shape.
pub fn top_offset(shape: &Shape) -> usize {
    shape.top_offset()
}

const I_ROWS: [&[u8]; 4] = [&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]];
const O_ROWS: [&[u8]; 2] = [&[1, 1], &[1, 1]];
const T_ROWS: [&[u8]; 3] = [&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]];
const S_ROWS: [&[u8]; 3] = [&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]];
const Z_ROWS: [&[u8]; 3] = [&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]];
const J_ROWS: [&[u8]; 3] = [&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]];
const L_ROWS: [&[u8]; 3] = [&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]];

/// Canonical spawn shape for a piece kind.
pub fn get_shape(kind: PieceKind) -> Shape {
    let rows: &[&[u8]] = match kind {
        PieceKind::I => &I_ROWS,
        PieceKind::O => &O_ROWS,
        PieceKind::T => &T_ROWS,
        PieceKind::S => &S_ROWS,
        PieceKind::Z => &Z_ROWS,
        PieceKind::J => &J_ROWS,
        PieceKind::L => &L_ROWS,
    };
    // Catalog rows are square by construction.
    Shape::from_rows(rows).unwrap_or(Shape {
        size: 1,
        cells: [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    })
}

/// A piece template: shape plus color tag, with no position.
///
/// This is what the randomizer hands out and what the next/hold slots keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
}

impl Piece {
    /// Fresh copy of the catalog piece.
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: get_shape(kind),
        }
    }
}
