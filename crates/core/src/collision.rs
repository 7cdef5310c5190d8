//! Collision oracle
//!
//! Pure placement test shared by movement, rotation, spawning and the ghost
//! projection. Cells above the grid (negative rows) only collide with the side
//! walls, so pieces can spawn partly hidden.

use crate::grid::Grid;
use crate::pieces::Shape;

/// Whether `shape` placed with its matrix origin at (x, y) collides.
///
/// A cell collides when its column is outside `[0, cols)`, its row is at or
/// below the floor (`>= rows`), or it lands on an occupied visible cell.
pub fn check_collision(grid: &Grid, shape: &Shape, x: i32, y: i32) -> bool {
    let cols = grid.cols() as i32;
    let rows = grid.rows() as i32;

    shape.occupied().iter().any(|&(r, c)| {
        let gx = x + c as i32;
        let gy = y + r as i32;
        gx < 0 || gx >= cols || gy >= rows || (gy >= 0 && grid.is_occupied(gx, gy))
    })
}
