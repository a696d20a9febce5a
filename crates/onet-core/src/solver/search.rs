//! Turn-bounded breadth-first search.
//!
//! The search runs over the board plus a margin of always-passable cells on
//! every side. A state is the triple (point, incoming direction, turns used);
//! the same point may be visited again under a different direction or turn
//! count, since those states extend differently.

use super::types::{Direction, Path, SolveError};
use crate::{Cell, Grid, Point};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    point: Point,
    heading: Option<Direction>,
    turns: u8,
    parent: Option<usize>,
}

/// Dense index over every (point, heading, turns) triple inside the bounds.
struct StateSpace {
    margin: i32,
    width: usize,
    height: usize,
    turn_levels: usize,
}

/// Heading slots: one per direction plus "no move yet".
const HEADING_SLOTS: usize = 5;

impl StateSpace {
    /// `None` when the padded board does not fit the index arithmetic.
    fn new(grid: &Grid, margin: usize, max_turns: u8) -> Option<Self> {
        let pad = margin.checked_mul(2)?;
        let space = Self {
            margin: i32::try_from(margin).ok()?,
            width: grid.cols().checked_add(pad)?,
            height: grid.rows().checked_add(pad)?,
            turn_levels: usize::from(max_turns) + 1,
        };
        i32::try_from(space.width).ok()?;
        i32::try_from(space.height).ok()?;
        space.checked_len()?;
        Some(space)
    }

    fn checked_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(HEADING_SLOTS)?
            .checked_mul(self.turn_levels)
    }

    fn len(&self) -> usize {
        self.width * self.height * HEADING_SLOTS * self.turn_levels
    }

    fn contains(&self, p: Point) -> bool {
        let row = p.row + self.margin;
        let col = p.col + self.margin;
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    fn index(&self, p: Point, heading: Option<Direction>, turns: u8) -> usize {
        let row = (p.row + self.margin) as usize;
        let col = (p.col + self.margin) as usize;
        let slot = heading.map_or(0, |d| d.slot() + 1);
        ((row * self.width + col) * HEADING_SLOTS + slot) * self.turn_levels + turns as usize
    }
}

/// Number of search states over `grid` with these limits, or `None` when the
/// margin is too wide to index. Every state is enqueued at most once, so one
/// more than this bounds the pops of a correct search.
pub(super) fn state_count(grid: &Grid, margin: usize, max_turns: u8) -> Option<usize> {
    StateSpace::new(grid, margin, max_turns).map(|space| space.len())
}

fn passable(grid: &Grid, p: Point, target: Point) -> bool {
    if p == target {
        return true;
    }
    match grid.cell_at(p) {
        Some(Cell::Empty) => true,
        Some(Cell::Tile(_)) => false,
        // Margin corridor around the board.
        None => true,
    }
}

pub(super) fn search(
    grid: &Grid,
    source: Point,
    target: Point,
    margin: usize,
    max_turns: u8,
    budget: usize,
) -> Result<Option<Path>, SolveError> {
    let space = StateSpace::new(grid, margin, max_turns)
        .ok_or_else(|| SolveError::invalid(format!("margin {} is too wide to search", margin)))?;
    let mut visited = vec![false; space.len()];
    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    visited[space.index(source, None, 0)] = true;
    nodes.push(SearchNode {
        point: source,
        heading: None,
        turns: 0,
        parent: None,
    });
    queue.push_back(0);

    let mut expansions = 0usize;
    while let Some(idx) = queue.pop_front() {
        expansions += 1;
        if expansions > budget {
            return Err(SolveError::SearchBudgetExceeded { limit: budget });
        }

        let node = nodes[idx];
        if node.point == target && node.turns <= max_turns {
            return Ok(Some(trace(&nodes, idx)));
        }

        for dir in Direction::ALL {
            let next = dir.step(node.point);
            if !space.contains(next) {
                continue;
            }
            let turns = node.turns + u8::from(node.heading.is_some_and(|h| h != dir));
            if turns > max_turns || !passable(grid, next, target) {
                continue;
            }
            let key = space.index(next, Some(dir), turns);
            if visited[key] {
                continue;
            }
            visited[key] = true;
            nodes.push(SearchNode {
                point: next,
                heading: Some(dir),
                turns,
                parent: Some(idx),
            });
            queue.push_back(nodes.len() - 1);
        }
    }

    Ok(None)
}

fn trace(nodes: &[SearchNode], mut idx: usize) -> Path {
    let mut points = vec![nodes[idx].point];
    while let Some(parent) = nodes[idx].parent {
        points.push(nodes[parent].point);
        idx = parent;
    }
    points.reverse();
    Path::new(points)
}
