//! Single-player game state: board, clock, score and level progression.

use crate::gravity;
use crate::{
    Cell, GameSettings, Generator, Grid, GridError, Hint, Level, Path, Position, SolveError,
    Solver, TileId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points for every cleared pair.
pub const MATCH_POINTS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Playing,
    Paused,
    Won,
    TimeUp,
}

/// Result of clicking a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Empty or off-board cell, or the game is not running.
    Ignored,
    /// The selected cell was clicked again.
    Deselected,
    Selected(Position),
    /// The two cells hold different tiles.
    Mismatch { first: Position, second: Position },
    /// Same tiles, but no admissible connection.
    NoPath { first: Position, second: Position },
    Matched {
        first: Position,
        second: Position,
        tile: TileId,
        path: Path,
        /// Match points plus any time-overflow bonus.
        points: u64,
        /// The overflow part of `points`.
        bonus: u64,
    },
}

pub struct GameSession {
    grid: Grid,
    settings: GameSettings,
    level: Level,
    score: u64,
    time_remaining: f64,
    selected: Option<Position>,
    status: GameStatus,
    matches: u32,
    solver: Solver,
    generator: Generator,
}

impl GameSession {
    /// Start a session on a freshly dealt board.
    pub fn new(settings: GameSettings) -> Result<Self, GridError> {
        Self::with_generator(settings, Generator::new())
    }

    pub fn with_seed(settings: GameSettings, seed: u64) -> Result<Self, GridError> {
        Self::with_generator(settings, Generator::with_seed(seed))
    }

    fn with_generator(settings: GameSettings, mut generator: Generator) -> Result<Self, GridError> {
        let settings = settings.normalized();
        let grid = generator.generate(settings.rows, settings.cols, settings.difficulty)?;
        let mut session = Self::from_grid(grid, settings);
        session.generator = generator;
        Ok(session)
    }

    /// Start a session on a given board. Settings other than the board size
    /// still apply.
    pub fn from_grid(grid: Grid, settings: GameSettings) -> Self {
        let level = settings.start_level();
        let solver = Solver::with_config(settings.solver_config());
        tracing::info!(%level, rows = grid.rows(), cols = grid.cols(), "session started");
        Self {
            time_remaining: f64::from(settings.initial_time),
            grid,
            settings,
            level,
            score: 0,
            selected: None,
            status: GameStatus::Playing,
            matches: 0,
            solver,
            generator: Generator::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    /// Remaining time as a fraction of the initial time, for timer bars.
    pub fn time_fraction(&self) -> f64 {
        (self.time_remaining / f64::from(self.settings.initial_time)).clamp(0.0, 1.0)
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Handle a click on `pos`.
    pub fn select(&mut self, pos: Position) -> SelectOutcome {
        if !self.is_playing() {
            return SelectOutcome::Ignored;
        }
        let Some(tile) = self.grid.tile(pos) else {
            return SelectOutcome::Ignored;
        };

        let first = match self.selected {
            None => {
                self.selected = Some(pos);
                return SelectOutcome::Selected(pos);
            }
            Some(first) if first == pos => {
                self.selected = None;
                return SelectOutcome::Deselected;
            }
            Some(first) => first,
        };
        self.selected = None;

        if self.grid.tile(first) != Some(tile) {
            return SelectOutcome::Mismatch { first, second: pos };
        }

        let path = match self.solver.find_path(&self.grid, first, pos) {
            Ok(Some(path)) => path,
            Ok(None) => return SelectOutcome::NoPath { first, second: pos },
            Err(err @ SolveError::SearchBudgetExceeded { .. }) => {
                tracing::error!(%first, second = %pos, %err, "path search aborted");
                return SelectOutcome::NoPath { first, second: pos };
            }
            Err(err) => {
                tracing::warn!(%first, second = %pos, %err, "path query rejected");
                return SelectOutcome::NoPath { first, second: pos };
            }
        };

        let (points, bonus) = self.apply_match(first, pos);
        SelectOutcome::Matched {
            first,
            second: pos,
            tile,
            path,
            points,
            bonus,
        }
    }

    /// Clear the pair, shift the board for the level, and settle the clock
    /// and score. Returns the points awarded and the overflow bonus.
    fn apply_match(&mut self, first: Position, second: Position) -> (u64, u64) {
        self.grid.set(first, Cell::Empty);
        self.grid.set(second, Cell::Empty);
        gravity::apply(&mut self.grid, self.level.behavior);
        self.matches += 1;

        let initial = f64::from(self.settings.initial_time);
        self.time_remaining += f64::from(self.settings.time_bonus);
        let mut bonus = 0;
        if self.time_remaining > initial {
            bonus = (self.time_remaining - initial).floor() as u64;
            self.time_remaining = initial + 1.0;
        }
        let points = MATCH_POINTS + bonus;
        self.score += points;

        if self.grid.is_solved() {
            self.status = GameStatus::Won;
            tracing::info!(level = self.level.number, score = self.score, "board cleared");
        }
        (points, bonus)
    }

    /// Advance the clock by `dt` seconds while playing.
    pub fn tick(&mut self, dt: f64) -> GameStatus {
        if self.is_playing() {
            self.time_remaining -= dt;
            if self.time_remaining <= 0.0 {
                self.time_remaining = 0.0;
                self.status = GameStatus::TimeUp;
                self.selected = None;
                tracing::info!(score = self.score, "time is up");
            }
        }
        self.status
    }

    pub fn pause(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Playing => self.pause(),
            GameStatus::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// A connectable pair, if the board still has one.
    pub fn hint(&self) -> Option<Hint> {
        self.solver.find_hint(&self.grid)
    }

    pub fn has_moves(&self) -> bool {
        self.solver.has_moves(&self.grid)
    }

    /// Deal a new board on the current level with a fresh clock and score.
    pub fn restart(&mut self) -> Result<(), GridError> {
        let grid = self
            .generator
            .generate(self.settings.rows, self.settings.cols, self.settings.difficulty)?;
        self.grid = grid;
        self.score = 0;
        self.matches = 0;
        self.time_remaining = f64::from(self.settings.initial_time);
        self.selected = None;
        self.status = GameStatus::Playing;
        Ok(())
    }

    /// Move to the next level (wrapping after the last) and deal a new board.
    pub fn advance_level(&mut self) -> Result<(), GridError> {
        self.level = self.level.next();
        tracing::info!(level = %self.level, "advancing level");
        self.restart()
    }

    /// Replace the settings and start over from their starting level.
    pub fn apply_settings(&mut self, settings: GameSettings) -> Result<(), GridError> {
        self.settings = settings.normalized();
        self.level = self.settings.start_level();
        self.solver = Solver::with_config(self.settings.solver_config());
        self.restart()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            layout: self.grid.to_layout(),
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            score: self.score,
            time_remaining: self.time_remaining,
            level: self.level.number,
            matches: self.matches,
            status: self.status,
            settings: self.settings.clone(),
        }
    }

    /// Rebuild a session from a snapshot, validating its board.
    pub fn restore(snapshot: SessionSnapshot) -> Result<Self, GridError> {
        let grid = Grid::from_layout(&snapshot.layout)?;
        if (grid.rows(), grid.cols()) != (snapshot.rows, snapshot.cols) {
            return Err(GridError::SizeMismatch {
                rows: grid.rows(),
                cols: grid.cols(),
                expected_rows: snapshot.rows,
                expected_cols: snapshot.cols,
            });
        }
        let mut counts: BTreeMap<TileId, usize> = BTreeMap::new();
        for (_, tile) in grid.tiles() {
            *counts.entry(tile).or_default() += 1;
        }
        if let Some((&tile, _)) = counts.iter().find(|(_, n)| **n % 2 != 0) {
            return Err(GridError::UnpairedTile { tile });
        }

        let mut session = Self::from_grid(grid, snapshot.settings.normalized());
        session.level = Level::get(snapshot.level).unwrap_or_else(Level::first);
        session.score = snapshot.score;
        session.time_remaining = snapshot.time_remaining.max(0.0);
        session.matches = snapshot.matches;
        session.status = snapshot.status;
        Ok(session)
    }
}

/// Serializable session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Board in layout notation, rows separated by `/`.
    pub layout: String,
    pub rows: usize,
    pub cols: usize,
    pub score: u64,
    pub time_remaining: f64,
    pub level: u8,
    pub matches: u32,
    pub status: GameStatus,
    pub settings: GameSettings,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;

    fn session(layout: &str) -> GameSession {
        GameSession::from_grid(Grid::from_layout(layout).unwrap(), GameSettings::default())
    }

    fn at(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_select_and_deselect() {
        let mut s = session("A..A/B..B");
        assert_eq!(s.select(at(0, 1)), SelectOutcome::Ignored);
        assert_eq!(s.select(at(5, 5)), SelectOutcome::Ignored);
        assert_eq!(s.select(at(0, 0)), SelectOutcome::Selected(at(0, 0)));
        assert_eq!(s.selected(), Some(at(0, 0)));
        assert_eq!(s.select(at(0, 0)), SelectOutcome::Deselected);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_mismatch_resets_selection() {
        let mut s = session("AB/BA");
        s.select(at(0, 0));
        assert_eq!(
            s.select(at(0, 1)),
            SelectOutcome::Mismatch { first: at(0, 0), second: at(0, 1) }
        );
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_no_path_leaves_board() {
        let mut s = session("AB/BA");
        s.select(at(0, 0));
        assert_eq!(
            s.select(at(1, 1)),
            SelectOutcome::NoPath { first: at(0, 0), second: at(1, 1) }
        );
        assert_eq!(s.grid().occupied_count(), 4);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_search_budget_exhaustion_counts_as_no_path() {
        let mut s = session("A..A/B..B");
        s.solver = Solver::with_config(crate::SolverConfig {
            max_iterations: Some(1),
            ..s.settings.solver_config()
        });
        s.select(at(0, 0));
        assert_eq!(
            s.select(at(0, 3)),
            SelectOutcome::NoPath { first: at(0, 0), second: at(0, 3) }
        );
        assert_eq!(s.grid().occupied_count(), 4);
        assert_eq!(s.score(), 0);
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn test_match_scores_and_adds_time() {
        let mut s = session("A..A/B..B");
        s.tick(20.0);
        s.select(at(0, 0));
        match s.select(at(0, 3)) {
            SelectOutcome::Matched { tile, path, points, bonus, .. } => {
                assert_eq!(tile, TileId(0));
                assert_eq!(path.turns(), 0);
                assert_eq!((points, bonus), (10, 0));
            }
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(s.score(), 10);
        assert!((s.time_remaining() - 76.0).abs() < 1e-9);
        assert!(s.grid().is_empty(at(0, 0)));
        assert_eq!(s.matches(), 1);
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn test_time_overflow_becomes_bonus() {
        let mut s = session("A..A/B..B");
        s.tick(2.5);
        s.select(at(0, 0));
        let outcome = s.select(at(0, 3));
        assert!(matches!(outcome, SelectOutcome::Matched { points: 13, bonus: 3, .. }));
        assert_eq!(s.score(), 13);
        assert!((s.time_remaining() - 91.0).abs() < 1e-9);
    }

    #[test]
    fn test_last_pair_wins() {
        let mut s = session("AA");
        s.select(at(0, 0));
        assert!(matches!(s.select(at(0, 1)), SelectOutcome::Matched { .. }));
        assert_eq!(s.status(), GameStatus::Won);
        assert_eq!(s.select(at(0, 0)), SelectOutcome::Ignored);
    }

    #[test]
    fn test_level_gravity_applies_after_match() {
        let settings = GameSettings {
            level: 2,
            ..GameSettings::default()
        };
        let mut s = GameSession::from_grid(Grid::from_layout("A.AB/B...").unwrap(), settings);
        s.select(at(0, 0));
        assert!(matches!(s.select(at(0, 2)), SelectOutcome::Matched { .. }));
        assert_eq!(s.grid().to_layout(), "...B/...B");
    }

    #[test]
    fn test_clock_runs_out() {
        let mut s = session("A..A/B..B");
        s.select(at(0, 0));
        assert_eq!(s.tick(89.0), GameStatus::Playing);
        assert_eq!(s.tick(1.5), GameStatus::TimeUp);
        assert_eq!(s.time_remaining(), 0.0);
        assert_eq!(s.selected(), None);
        assert_eq!(s.select(at(0, 0)), SelectOutcome::Ignored);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut s = session("A..A/B..B");
        s.toggle_pause();
        assert_eq!(s.tick(200.0), GameStatus::Paused);
        assert_eq!(s.select(at(0, 0)), SelectOutcome::Ignored);
        s.resume();
        assert_eq!(s.tick(1.0), GameStatus::Playing);
        assert!((s.time_remaining() - 89.0).abs() < 1e-9);
    }

    #[test]
    fn test_hint_and_moves() {
        let s = session("AB/AB");
        let hint = s.hint().unwrap();
        assert_eq!((hint.first, hint.second), (at(0, 0), at(1, 0)));
        assert!(s.has_moves());
        assert!(!session("AB/BA").has_moves());
    }

    #[test]
    fn test_advance_level_deals_new_board() {
        let settings = GameSettings {
            rows: 4,
            cols: 6,
            level: 4,
            difficulty: Difficulty::Easy,
            ..GameSettings::default()
        };
        let mut s = GameSession::with_seed(settings, 5).unwrap();
        s.tick(30.0);
        s.advance_level().unwrap();
        assert_eq!(s.level().number, 1);
        assert_eq!(s.grid().occupied_count(), 24);
        assert_eq!(s.score(), 0);
        assert_eq!(s.time_remaining(), 90.0);
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut s = session("A..A/B..B");
        s.tick(10.0);
        s.select(at(1, 0));
        s.select(at(1, 3));

        let json = s.snapshot().to_json().unwrap();
        let restored = GameSession::restore(SessionSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored.grid(), s.grid());
        assert_eq!(restored.score(), s.score());
        assert_eq!(restored.time_remaining(), s.time_remaining());
        assert_eq!(restored.level(), s.level());
    }

    #[test]
    fn test_restore_rejects_bad_board() {
        let mut snapshot = session("A..A/B..B").snapshot();
        snapshot.layout = "A..A/B..C".to_string();
        assert!(matches!(
            GameSession::restore(snapshot.clone()),
            Err(GridError::UnpairedTile { tile: TileId(1) })
        ));
        snapshot.layout = "AA".to_string();
        assert!(GameSession::restore(snapshot).is_err());
    }

    #[test]
    fn test_cleared_board_snapshot_restores() {
        let mut s = session("AA");
        s.select(at(0, 0));
        s.select(at(0, 1));
        let restored = GameSession::restore(s.snapshot()).unwrap();
        assert_eq!(restored.status(), GameStatus::Won);
        assert!(restored.grid().is_solved());
    }
}
