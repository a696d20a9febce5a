//! Game state management for the browser build

use crate::animations::{Confetti, FloatingText};
use onet_core::{
    GameSession, GameSettings, GameStatus, GridError, Hint, Path, Position, SelectOutcome,
    SessionSnapshot, TileId,
};
use serde::{Deserialize, Serialize};

/// How long a matched path stays on the board.
pub const PATH_FLASH_MS: f64 = 1000.0;
/// How long a status message stays up.
const MESSAGE_MS: f64 = 3000.0;
/// Delay between the points float and the time bonus float.
const BONUS_FLOAT_DELAY_MS: f64 = 200.0;
/// Longest clock step per frame. Hidden tabs stop animation frames, and the
/// time they were hidden does not count against the player.
const MAX_STEP_MS: f64 = 1000.0;

/// Screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenState {
    Playing,
    Paused,
    Won,
    TimeUp,
}

/// A matched pair whose path is still being drawn.
#[derive(Debug, Clone)]
pub struct PathFlash {
    pub path: Path,
    pub first: Position,
    pub second: Position,
    pub tile: TileId,
    until_ms: f64,
}

/// Serializable game state for save/load
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableState {
    pub session: SessionSnapshot,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

/// The game state
pub struct GameState {
    session: GameSession,
    /// Keyboard cursor
    cursor: Position,
    screen: ScreenState,
    /// Current message to display
    message: Option<String>,
    message_until_ms: f64,
    flash: Option<PathFlash>,
    /// Current hint
    hint: Option<Hint>,
    last_tick_ms: Option<f64>,
    confetti: Confetti,
    floats: Vec<FloatingText>,
    /// Canvas size for the confetti burst
    viewport: (f64, f64),
    /// Settings changed since the last call to `take_settings_changed`
    settings_changed: bool,
}

impl GameState {
    /// Create a new game on a freshly dealt board
    pub fn new(settings: GameSettings) -> Result<Self, GridError> {
        Ok(Self::from_session(GameSession::new(settings)?))
    }

    pub fn from_session(session: GameSession) -> Self {
        let screen = screen_for(session.status());
        Self {
            session,
            cursor: Position::new(0, 0),
            screen,
            message: None,
            message_until_ms: 0.0,
            flash: None,
            hint: None,
            last_tick_ms: None,
            confetti: Confetti::new(0x0e7),
            floats: Vec::new(),
            viewport: (800.0, 600.0),
            settings_changed: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn flash(&self) -> Option<&PathFlash> {
        self.flash.as_ref()
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    pub fn confetti(&self) -> &Confetti {
        &self.confetti
    }

    pub fn floats(&self) -> &[FloatingText] {
        &self.floats
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// Whether anything is moving on screen
    pub fn is_animating(&self) -> bool {
        self.flash.is_some() || self.confetti.is_active() || !self.floats.is_empty()
    }

    /// Returns true once after the settings were changed from the keyboard.
    pub fn take_settings_changed(&mut self) -> bool {
        std::mem::take(&mut self.settings_changed)
    }

    fn show_message(&mut self, msg: &str, now_ms: f64) {
        self.message = Some(msg.to_string());
        self.message_until_ms = now_ms + MESSAGE_MS;
    }

    /// Update clocks and animations (called each frame)
    pub fn tick(&mut self, now_ms: f64) {
        let dt_ms = match self.last_tick_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_STEP_MS),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        if self.message.is_some() && now_ms >= self.message_until_ms {
            self.message = None;
        }
        if self.flash.as_ref().is_some_and(|f| now_ms >= f.until_ms) {
            self.flash = None;
        }
        self.floats.retain(|f| f.is_alive(now_ms));
        if self.confetti.is_active() {
            self.confetti.update(now_ms);
        }

        if self.screen == ScreenState::Playing
            && self.session.tick(dt_ms / 1000.0) == GameStatus::TimeUp
        {
            self.screen = ScreenState::TimeUp;
            self.hint = None;
            self.show_message("Time's up!", now_ms);
        }
    }

    /// Handle keyboard input, returns true if the screen needs a redraw
    pub fn handle_key(&mut self, key: &str, now_ms: f64) -> bool {
        match self.screen {
            ScreenState::Won | ScreenState::TimeUp => self.handle_endgame_key(key, now_ms),
            ScreenState::Paused => self.handle_paused_key(key, now_ms),
            ScreenState::Playing => self.handle_playing_key(key, now_ms),
        }
    }

    fn handle_endgame_key(&mut self, key: &str, now_ms: f64) -> bool {
        match key {
            "Enter" | " " | "n" | "N" => {
                if self.screen == ScreenState::Won {
                    self.advance_level(now_ms);
                } else {
                    self.restart(now_ms);
                }
                true
            }
            "r" | "R" => {
                self.restart(now_ms);
                true
            }
            _ => false,
        }
    }

    fn handle_paused_key(&mut self, key: &str, now_ms: f64) -> bool {
        match key {
            "p" | "P" | "Escape" | " " => {
                self.toggle_pause(now_ms);
                true
            }
            _ => false,
        }
    }

    fn handle_playing_key(&mut self, key: &str, now_ms: f64) -> bool {
        match key {
            "ArrowUp" | "k" => self.move_cursor(-1, 0),
            "ArrowDown" | "j" => self.move_cursor(1, 0),
            "ArrowLeft" | "h" => self.move_cursor(0, -1),
            "ArrowRight" | "l" => self.move_cursor(0, 1),
            "Enter" | " " => self.select(self.cursor, now_ms),
            "Escape" => {
                self.session.clear_selection();
                self.hint = None;
            }
            "?" => self.show_hint(now_ms),
            "p" | "P" => self.toggle_pause(now_ms),
            "r" | "R" => {
                self.restart(now_ms);
                self.show_message("New board", now_ms);
            }
            "n" | "N" => self.advance_level(now_ms),
            "d" | "D" => self.cycle_difficulty(now_ms),
            _ => return false,
        }
        true
    }

    /// Click on a board cell
    pub fn handle_cell_click(&mut self, pos: Position, now_ms: f64) -> bool {
        if self.screen != ScreenState::Playing || !self.session.grid().contains(pos.into()) {
            return false;
        }
        self.cursor = pos;
        self.select(pos, now_ms);
        true
    }

    fn move_cursor(&mut self, d_row: i32, d_col: i32) {
        let rows = self.session.grid().rows() as i32;
        let cols = self.session.grid().cols() as i32;
        let row = (self.cursor.row as i32 + d_row).rem_euclid(rows);
        let col = (self.cursor.col as i32 + d_col).rem_euclid(cols);
        self.cursor = Position::new(row as usize, col as usize);
    }

    fn select(&mut self, pos: Position, now_ms: f64) {
        self.hint = None;
        match self.session.select(pos) {
            SelectOutcome::Ignored | SelectOutcome::Selected(_) | SelectOutcome::Deselected => {}
            SelectOutcome::Mismatch { .. } => self.show_message("Those tiles don't match", now_ms),
            SelectOutcome::NoPath { .. } => {
                let turns = self.session.settings().max_turns;
                self.show_message(&format!("No path with at most {} turns", turns), now_ms);
            }
            SelectOutcome::Matched {
                first,
                second,
                tile,
                path,
                points,
                bonus,
            } => {
                self.flash = Some(PathFlash {
                    path,
                    first,
                    second,
                    tile,
                    until_ms: now_ms + PATH_FLASH_MS,
                });
                self.floats.push(FloatingText::new(format!("+{}", points - bonus), now_ms));
                if bonus > 0 {
                    self.floats.push(FloatingText::new(
                        format!("+{} time bonus", bonus),
                        now_ms + BONUS_FLOAT_DELAY_MS,
                    ));
                }

                if self.session.status() == GameStatus::Won {
                    self.screen = ScreenState::Won;
                    let (w, h) = self.viewport;
                    self.confetti.start(w, h, now_ms);
                    self.show_message("Board cleared!", now_ms);
                } else if !self.session.has_moves() {
                    self.show_message("No moves left! Press r for a new board", now_ms);
                }
            }
        }
    }

    fn show_hint(&mut self, now_ms: f64) {
        match self.session.hint() {
            Some(hint) => {
                self.cursor = hint.first;
                self.hint = Some(hint);
            }
            None => self.show_message("No moves left! Press r for a new board", now_ms),
        }
    }

    fn toggle_pause(&mut self, now_ms: f64) {
        self.session.toggle_pause();
        self.screen = screen_for(self.session.status());
        if self.screen == ScreenState::Paused {
            self.show_message("Paused", now_ms);
        } else {
            self.show_message("Resumed", now_ms);
        }
    }

    fn cycle_difficulty(&mut self, now_ms: f64) {
        let mut settings = self.session.settings().clone();
        settings.difficulty = settings.difficulty.next();
        settings.level = self.session.level().number;
        if self.next_board(|s| s.apply_settings(settings), now_ms) {
            self.settings_changed = true;
            let difficulty = self.session.settings().difficulty;
            self.show_message(&format!("Difficulty: {}", difficulty), now_ms);
        }
    }

    /// Deal a new board on the current level
    pub fn restart(&mut self, now_ms: f64) {
        self.next_board(|s| s.restart(), now_ms);
    }

    /// Move on to the next level
    pub fn advance_level(&mut self, now_ms: f64) {
        let wrapped = self.session.level().is_last();
        if self.next_board(|s| s.advance_level(), now_ms) {
            if wrapped {
                self.show_message("All levels complete! Back to level 1", now_ms);
            } else {
                let level = self.session.level();
                self.show_message(&level.to_string(), now_ms);
            }
        }
    }

    /// Replace the settings and deal a new board
    pub fn apply_settings(&mut self, settings: GameSettings, now_ms: f64) -> bool {
        self.next_board(|s| s.apply_settings(settings), now_ms)
    }

    /// Reset per-board state after `deal` replaces the board.
    fn next_board(
        &mut self,
        deal: impl FnOnce(&mut GameSession) -> Result<(), GridError>,
        now_ms: f64,
    ) -> bool {
        if let Err(err) = deal(&mut self.session) {
            tracing::error!(%err, "could not deal a new board");
            self.show_message("Could not deal a new board", now_ms);
            return false;
        }
        self.cursor = Position::new(0, 0);
        self.flash = None;
        self.hint = None;
        self.floats.clear();
        self.confetti.stop();
        self.screen = ScreenState::Playing;
        true
    }

    /// Serialize the game for storage
    pub fn to_json(&self) -> String {
        let state = SerializableState {
            session: self.session.snapshot(),
            cursor_row: self.cursor.row,
            cursor_col: self.cursor.col,
        };
        serde_json::to_string(&state).unwrap_or_default()
    }

    /// Restore a saved game. It always comes back paused.
    pub fn from_json(json: &str) -> Option<Self> {
        let state: SerializableState = serde_json::from_str(json).ok()?;
        let mut session = match GameSession::restore(state.session) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, "discarding saved game");
                return None;
            }
        };
        session.pause();

        let mut game = Self::from_session(session);
        let cursor = Position::new(state.cursor_row, state.cursor_col);
        if game.session.grid().contains(cursor.into()) {
            game.cursor = cursor;
        }
        Some(game)
    }
}

fn screen_for(status: GameStatus) -> ScreenState {
    match status {
        GameStatus::Playing => ScreenState::Playing,
        GameStatus::Paused => ScreenState::Paused,
        GameStatus::Won => ScreenState::Won,
        GameStatus::TimeUp => ScreenState::TimeUp,
    }
}
