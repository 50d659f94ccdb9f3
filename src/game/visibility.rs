//! Line-of-sight checks between the two agents
//!
//! Sight only travels along a shared row or column. Any wall strictly between
//! the two positions blocks it; agents standing in between do not.

use super::state::{Cell, Grid, Position};

/// Whether `from` and `to` can see each other on `grid`
///
/// The relation is symmetric: swapping the arguments scans the same cells.
pub fn in_line_of_sight(from: Position, to: Position, grid: &Grid) -> bool {
    if from.x == to.x {
        !between(from.y, to.y).any(|y| grid.get(Position::new(from.x, y)) == Some(Cell::Wall))
    } else if from.y == to.y {
        !between(from.x, to.x).any(|x| grid.get(Position::new(x, from.y)) == Some(Cell::Wall))
    } else {
        false
    }
}

/// Coordinates strictly between `a` and `b`, in either direction
fn between(a: i32, b: i32) -> std::ops::Range<i32> {
    a.min(b) + 1..a.max(b)
}
