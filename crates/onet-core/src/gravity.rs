//! Post-match board transforms.
//!
//! After a pair is cleared some levels shift the remaining tiles toward one
//! edge. The transforms only move tiles into empty cells and keep the
//! relative order of tiles within each row or column.

use crate::{Cell, Grid, Position};
use serde::{Deserialize, Serialize};

/// How tiles move after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Behavior {
    /// Tiles stay where they are.
    #[default]
    Classic,
    /// Tiles in every row pack against the right edge.
    SlideRight,
    /// Tiles in every column fall to the bottom.
    SlideDown,
    /// Tiles in every row pack against the left edge.
    SlideLeft,
}

impl Behavior {
    pub fn name(self) -> &'static str {
        match self {
            Behavior::Classic => "classic",
            Behavior::SlideRight => "slide right",
            Behavior::SlideDown => "slide down",
            Behavior::SlideLeft => "slide left",
        }
    }
}

/// Apply `behavior` to the board in place. Returns true if any tile moved.
pub fn apply(grid: &mut Grid, behavior: Behavior) -> bool {
    match behavior {
        Behavior::Classic => false,
        Behavior::SlideRight => {
            let mut moved = false;
            for row in 0..grid.rows() {
                let line: Vec<Position> = (0..grid.cols()).map(|c| Position::new(row, c)).collect();
                moved |= pack_toward_end(grid, &line);
            }
            moved
        }
        Behavior::SlideLeft => {
            let mut moved = false;
            for row in 0..grid.rows() {
                let line: Vec<Position> = (0..grid.cols()).rev().map(|c| Position::new(row, c)).collect();
                moved |= pack_toward_end(grid, &line);
            }
            moved
        }
        Behavior::SlideDown => {
            let mut moved = false;
            for col in 0..grid.cols() {
                let line: Vec<Position> = (0..grid.rows()).map(|r| Position::new(r, col)).collect();
                moved |= pack_toward_end(grid, &line);
            }
            moved
        }
    }
}

/// Pack the tiles on `line` against its last position, keeping their order.
fn pack_toward_end(grid: &mut Grid, line: &[Position]) -> bool {
    let before: Vec<Cell> = line.iter().filter_map(|&p| grid.get(p)).collect();
    let tiles: Vec<Cell> = before.iter().copied().filter(|c| !c.is_empty()).collect();

    let gap = line.len() - tiles.len();
    let after: Vec<Cell> = std::iter::repeat(Cell::Empty)
        .take(gap)
        .chain(tiles)
        .collect();

    if after == before {
        return false;
    }
    for (&pos, &cell) in line.iter().zip(&after) {
        grid.set(pos, cell);
    }
    true
}
