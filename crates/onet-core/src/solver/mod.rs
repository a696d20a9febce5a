//! Connectivity solver.
//!
//! Decides whether two cells can be joined by an orthogonal path with a
//! bounded number of direction changes, routing through empty cells and the
//! margin around the board.

mod search;
mod types;

use crate::{Grid, Point, Position};
use std::collections::BTreeMap;

pub use types::{Direction, Hint, Path, SolveError};

/// Solver limits. Defaults are the most permissive rules: a two-cell margin
/// and two direction changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Width of the passable band around the board.
    pub margin: usize,
    /// Maximum number of direction changes on a path.
    pub max_turns: u8,
    /// Accept orthogonal neighbours without searching.
    pub adjacency_shortcut: bool,
    /// Cap on search expansions; `None` derives it from the state space.
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            margin: 2,
            max_turns: 2,
            adjacency_shortcut: true,
            max_iterations: None,
        }
    }
}

/// Stateless path finder; all search state is per call.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Create a solver with the default rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find a path joining `source` and `target`.
    ///
    /// Tile identity is not checked here; callers compare tiles first. Returns
    /// `Ok(None)` when no admissible path exists.
    pub fn find_path(
        &self,
        grid: &Grid,
        source: Position,
        target: Position,
    ) -> Result<Option<Path>, SolveError> {
        for (name, pos) in [("source", source), ("target", target)] {
            if grid.get(pos).is_none() {
                return Err(SolveError::invalid(format!(
                    "{} {} is outside the {}x{} board",
                    name,
                    pos,
                    grid.rows(),
                    grid.cols()
                )));
            }
        }
        if source == target {
            return Err(SolveError::invalid(format!("source and target are both {}", source)));
        }

        if self.config.adjacency_shortcut && source.is_adjacent(target) {
            return Ok(Some(Path::new(vec![source.into(), target.into()])));
        }

        let states = search::state_count(grid, self.config.margin, self.config.max_turns)
            .ok_or_else(|| {
                SolveError::invalid(format!(
                    "margin {} is too wide for a {}x{} board",
                    self.config.margin,
                    grid.rows(),
                    grid.cols()
                ))
            })?;
        let budget = self.config.max_iterations.unwrap_or(states.saturating_add(1));
        let result = search::search(
            grid,
            Point::from(source),
            Point::from(target),
            self.config.margin,
            self.config.max_turns,
            budget,
        );

        match &result {
            Ok(Some(path)) => tracing::debug!(%source, %target, turns = path.turns(), len = path.len(), "path found"),
            Ok(None) => tracing::debug!(%source, %target, "no path"),
            Err(err) => tracing::debug!(%source, %target, %err, "search failed"),
        }
        result
    }

    /// Whether the two cells hold the same tile and can be connected.
    pub fn can_match(&self, grid: &Grid, a: Position, b: Position) -> Result<bool, SolveError> {
        match (grid.tile(a), grid.tile(b)) {
            (Some(ta), Some(tb)) if ta == tb => Ok(self.find_path(grid, a, b)?.is_some()),
            _ => Ok(false),
        }
    }

    /// First connectable pair on the board, scanning tiles in row-major order.
    pub fn find_hint(&self, grid: &Grid) -> Option<Hint> {
        let mut by_tile: BTreeMap<_, Vec<Position>> = BTreeMap::new();
        for (pos, tile) in grid.tiles() {
            by_tile.entry(tile).or_default().push(pos);
        }

        for (pos, tile) in grid.tiles() {
            let Some(group) = by_tile.get(&tile) else { continue };
            for &other in group.iter().filter(|&&p| p > pos) {
                match self.find_path(grid, pos, other) {
                    Ok(Some(path)) => {
                        return Some(Hint { first: pos, second: other, tile, path });
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(%pos, %other, %err, "hint search skipped a pair"),
                }
            }
        }
        None
    }

    /// Whether any pair on the board can still be matched.
    pub fn has_moves(&self, grid: &Grid) -> bool {
        self.find_hint(grid).is_some()
    }
}

/// Find a path with the default rules. See [`Solver::find_path`].
pub fn find_path(grid: &Grid, source: Position, target: Position) -> Result<Option<Path>, SolveError> {
    Solver::new().find_path(grid, source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Generator;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn pt(row: i32, col: i32) -> Point {
        Point::new(row, col)
    }

    fn solver_with(margin: usize, max_turns: u8) -> Solver {
        Solver::with_config(SolverConfig {
            margin,
            max_turns,
            ..SolverConfig::default()
        })
    }

    /// Every pair of equal tiles on the board.
    fn equal_pairs(grid: &Grid) -> Vec<(Position, Position)> {
        let tiles: Vec<_> = grid.tiles().collect();
        let mut pairs = Vec::new();
        for (i, &(a, ta)) in tiles.iter().enumerate() {
            for &(b, tb) in &tiles[i + 1..] {
                if ta == tb {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_adjacent_cells_use_two_point_path() {
        let grid = Grid::from_layout("BAAB/CDDC").unwrap();
        let path = find_path(&grid, pos(0, 1), pos(0, 2)).unwrap().unwrap();
        assert_eq!(path.points(), &[pt(0, 1), pt(0, 2)]);

        let grid = Grid::from_layout("AB/AB").unwrap();
        let path = find_path(&grid, pos(1, 1), pos(0, 1)).unwrap().unwrap();
        assert_eq!(path.points(), &[pt(1, 1), pt(0, 1)]);
    }

    #[test]
    fn test_adjacent_without_shortcut_still_two_points() {
        let solver = Solver::with_config(SolverConfig {
            adjacency_shortcut: false,
            ..SolverConfig::default()
        });
        let grid = Grid::from_layout("AA/BB").unwrap();
        let path = solver.find_path(&grid, pos(0, 0), pos(0, 1)).unwrap().unwrap();
        assert_eq!(path.points(), &[pt(0, 0), pt(0, 1)]);
    }

    #[test]
    fn test_straight_corridor_has_no_turns() {
        let grid = Grid::from_layout("A..A").unwrap();
        let path = find_path(&grid, pos(0, 0), pos(0, 3)).unwrap().unwrap();
        assert_eq!(path.turns(), 0);
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_blocked_row_routes_over_the_top() {
        let grid = Grid::from_layout("ABBA").unwrap();
        let path = find_path(&grid, pos(0, 0), pos(0, 3)).unwrap().unwrap();
        assert_eq!(
            path.points(),
            &[pt(0, 0), pt(-1, 0), pt(-1, 1), pt(-1, 2), pt(-1, 3), pt(0, 3)]
        );
        assert_eq!(path.turns(), 2);
        assert_eq!(path.waypoints(), vec![pt(0, 0), pt(-1, 0), pt(-1, 3), pt(0, 3)]);
    }

    #[test]
    fn test_zero_margin_keeps_search_on_board() {
        let grid = Grid::from_layout("ABBA").unwrap();
        assert_eq!(solver_with(0, 2).find_path(&grid, pos(0, 0), pos(0, 3)).unwrap(), None);
    }

    #[test]
    fn test_two_turn_s_corridor_is_found() {
        let grid = Grid::from_layout(
            "A.BB
             B.BB
             B..A",
        )
        .unwrap();
        let path = find_path(&grid, pos(0, 0), pos(2, 3)).unwrap().unwrap();
        assert_eq!(
            path.points(),
            &[pt(0, 0), pt(0, 1), pt(1, 1), pt(2, 1), pt(2, 2), pt(2, 3)]
        );
        assert_eq!(path.turns(), 2);
    }

    #[test]
    fn test_three_turn_z_corridor_is_rejected() {
        let grid = Grid::from_layout(
            "A.B
             B.B
             B..
             BBA",
        )
        .unwrap();
        assert_eq!(find_path(&grid, pos(0, 0), pos(3, 2)).unwrap(), None);

        // The same route is admissible once a third turn is allowed.
        let path = solver_with(2, 3).find_path(&grid, pos(0, 0), pos(3, 2)).unwrap().unwrap();
        assert_eq!(path.turns(), 3);
    }

    #[test]
    fn test_corner_walls_need_three_turns() {
        let grid = Grid::from_layout(
            "A..B
             ...B
             ...B
             BBBA",
        )
        .unwrap();
        assert_eq!(find_path(&grid, pos(0, 0), pos(3, 3)).unwrap(), None);

        let path = solver_with(2, 3).find_path(&grid, pos(0, 0), pos(3, 3)).unwrap().unwrap();
        assert_eq!(path.turns(), 3);
        assert!(path.interior().iter().any(|p| !grid.contains(*p)));
    }

    #[test]
    fn test_margin_route_when_board_is_walled_in() {
        let grid = Grid::from_layout(
            "ABBA
             BBBB
             ....
             ....",
        )
        .unwrap();
        let path = find_path(&grid, pos(0, 0), pos(0, 3)).unwrap().unwrap();
        assert_eq!(
            path.points(),
            &[pt(0, 0), pt(-1, 0), pt(-1, 1), pt(-1, 2), pt(-1, 3), pt(0, 3)]
        );
        assert!(path.interior().iter().all(|p| !grid.contains(*p)));
    }

    #[test]
    fn test_invalid_arguments() {
        let grid = Grid::from_layout("A..A").unwrap();
        assert!(matches!(
            find_path(&grid, pos(0, 0), pos(0, 0)),
            Err(SolveError::InvalidArgument { .. })
        ));
        assert!(matches!(
            find_path(&grid, pos(0, 0), pos(1, 0)),
            Err(SolveError::InvalidArgument { .. })
        ));
        assert!(matches!(
            find_path(&grid, pos(0, 9), pos(0, 0)),
            Err(SolveError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_oversized_margin_is_rejected() {
        let grid = Grid::from_layout("A..A").unwrap();
        for margin in [usize::MAX, usize::MAX / 2, i32::MAX as usize] {
            let solver = solver_with(margin, 2);
            assert!(matches!(
                solver.find_path(&grid, pos(0, 0), pos(0, 3)),
                Err(SolveError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_budget_exceeded() {
        let solver = Solver::with_config(SolverConfig {
            max_iterations: Some(1),
            ..SolverConfig::default()
        });
        let grid = Grid::from_layout("A..A").unwrap();
        assert_eq!(
            solver.find_path(&grid, pos(0, 0), pos(0, 3)),
            Err(SolveError::SearchBudgetExceeded { limit: 1 })
        );
    }

    #[test]
    fn test_solver_ignores_tile_identity() {
        // Only traversability matters; the caller compares tiles.
        let grid = Grid::from_layout("A..B").unwrap();
        assert!(find_path(&grid, pos(0, 0), pos(0, 3)).unwrap().is_some());
        assert!(!Solver::new().can_match(&grid, pos(0, 0), pos(0, 3)).unwrap());
    }

    #[test]
    fn test_symmetry_on_generated_boards() {
        for seed in 0..4 {
            let grid = Generator::with_seed(seed).deal(6, 8, 5).unwrap();
            for (a, b) in equal_pairs(&grid) {
                let forward = find_path(&grid, a, b).unwrap().is_some();
                let backward = find_path(&grid, b, a).unwrap().is_some();
                assert_eq!(forward, backward, "asymmetric result for {} / {}", a, b);
            }
        }
    }

    #[test]
    fn test_paths_only_cross_empty_or_margin_cells() {
        let mut grid = Generator::with_seed(7).deal(6, 8, 4).unwrap();
        // Punch some holes so that interior routes exist.
        for p in [pos(2, 2), pos(2, 3), pos(3, 2), pos(3, 3), pos(1, 5), pos(4, 5)] {
            grid.clear(p).unwrap();
        }
        for (a, b) in equal_pairs(&grid) {
            if let Some(path) = find_path(&grid, a, b).unwrap() {
                assert_eq!(path.source(), Point::from(a));
                assert_eq!(path.target(), Point::from(b));
                assert!(path.turns() <= 2);
                for p in path.interior() {
                    let cell = grid.cell_at(*p);
                    assert!(cell.map_or(true, |c| c.is_empty()), "path crosses tile at {}", p);
                }
                for w in path.points().windows(2) {
                    assert!(Direction::between(w[0], w[1]).is_some());
                }
            }
        }
    }

    #[test]
    fn test_paths_stay_within_margin() {
        let grid = Generator::with_seed(11).deal(4, 6, 3).unwrap();
        for margin in 0..=2usize {
            let solver = solver_with(margin, 2);
            let m = margin as i32;
            for (a, b) in equal_pairs(&grid) {
                if let Some(path) = solver.find_path(&grid, a, b).unwrap() {
                    for p in path.points() {
                        assert!(p.row >= -m && p.row < grid.rows() as i32 + m);
                        assert!(p.col >= -m && p.col < grid.cols() as i32 + m);
                    }
                }
            }
        }
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let grid = Generator::with_seed(3).deal(8, 14, 13).unwrap();
        for (a, b) in equal_pairs(&grid).into_iter().take(40) {
            let first = find_path(&grid, a, b).unwrap();
            let second = find_path(&grid, a, b).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_hint_finds_first_pair() {
        let grid = Grid::from_layout("AB/AB").unwrap();
        let hint = Solver::new().find_hint(&grid).unwrap();
        assert_eq!((hint.first, hint.second), (pos(0, 0), pos(1, 0)));
        assert_eq!(hint.path.len(), 2);
    }

    #[test]
    fn test_hint_none_on_dead_board() {
        let grid = Grid::from_layout("AB/BA").unwrap();
        assert!(Solver::new().find_hint(&grid).is_none());
        assert!(!Solver::new().has_moves(&grid));
    }
}
