use crate::animations::Confetti;
use crate::config;
use crate::stats::{GameResult, StatsManager};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use crossterm::terminal;
use onet_core::{
    GameSession, GameSettings, GameStatus, GridError, Hint, Path, Point, Position, SelectOutcome,
    SessionSnapshot, TileId,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Terminal columns per board cell.
pub const CELL_W: u16 = 3;
/// Seconds a matched path stays on screen.
const PATH_FLASH_SECS: f64 = 1.0;
/// Seconds a status message stays on screen.
const MESSAGE_SECS: f64 = 3.0;

const THEMES: [&str; 3] = ["dark", "light", "high-contrast"];

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Normal gameplay
    Playing,
    /// Board cleared
    Won,
    /// Clock ran out
    TimeUp,
}

/// A matched pair whose connecting path is still being shown.
pub struct PathFlash {
    pub path: Path,
    pub first: Position,
    pub second: Position,
    pub tile: TileId,
    remaining: f64,
}

/// Where the board sits on screen. The board is drawn with a one-cell ring
/// around it; path points further out are clamped onto the ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardGeometry {
    pub x: u16,
    pub y: u16,
    pub rows: usize,
    pub cols: usize,
}

impl BoardGeometry {
    /// Total size on screen, ring included.
    pub fn size(&self) -> (u16, u16) {
        ((self.cols as u16 + 2) * CELL_W, self.rows as u16 + 2)
    }

    /// Clamp a path point onto the drawable area.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.row.clamp(-1, self.rows as i32),
            p.col.clamp(-1, self.cols as i32),
        )
    }

    /// Screen position of the left edge of a (clamped) point's cell.
    pub fn screen(&self, p: Point) -> (u16, u16) {
        let p = self.clamp(p);
        (
            self.x + (p.col + 1) as u16 * CELL_W,
            self.y + (p.row + 1) as u16,
        )
    }

    /// Board cell under a terminal position, if any.
    pub fn hit(&self, column: u16, row: u16) -> Option<Position> {
        if column < self.x || row < self.y {
            return None;
        }
        let col = ((column - self.x) / CELL_W) as i32 - 1;
        let row = (row - self.y) as i32 - 1;
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(Position::new(row as usize, col as usize))
    }
}

/// The main application state
pub struct App {
    pub session: GameSession,
    /// Keyboard cursor
    pub cursor: Position,
    pub theme: Theme,
    theme_index: usize,
    pub message: Option<String>,
    message_timer: f64,
    pub screen_state: ScreenState,
    pub flash: Option<PathFlash>,
    /// Hinted pair to highlight
    pub hint: Option<Hint>,
    pub confetti: Confetti,
    pub stats: StatsManager,
    /// Set by the renderer every frame
    pub geometry: BoardGeometry,
    /// Whether the current board has been recorded (to avoid double recording)
    recorded: bool,
    /// Whether the last recorded board set a new best score
    pub new_best: bool,
}

impl App {
    pub fn new(settings: GameSettings, theme_name: &str) -> Result<Self, GridError> {
        let theme_index = THEMES.iter().position(|t| *t == theme_name).unwrap_or(0);
        Ok(Self {
            session: GameSession::new(settings)?,
            cursor: Position::new(0, 0),
            theme: Theme::from_name(theme_name),
            theme_index,
            message: None,
            message_timer: 0.0,
            screen_state: ScreenState::Playing,
            flash: None,
            hint: None,
            confetti: Confetti::new(),
            stats: StatsManager::load(),
            geometry: BoardGeometry::default(),
            recorded: false,
            new_best: false,
        })
    }

    /// Faster ticks while something is animating.
    pub fn get_tick_rate(&self) -> Duration {
        if self.confetti.is_active() || self.flash.is_some() {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(100)
        }
    }

    /// Advance clocks and animations by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64();

        if self.message_timer > 0.0 {
            self.message_timer -= secs;
            if self.message_timer <= 0.0 {
                self.message = None;
            }
        }

        if let Some(flash) = &mut self.flash {
            flash.remaining -= secs;
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }

        if self.confetti.is_active() {
            self.confetti.update();
        }

        if self.screen_state == ScreenState::Playing
            && self.session.tick(secs) == GameStatus::TimeUp
        {
            self.record_game(GameResult::TimeUp);
            self.screen_state = ScreenState::TimeUp;
            self.hint = None;
            self.show_message("Time's up!");
        }
    }

    /// Record the current board to stats
    fn record_game(&mut self, result: GameResult) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let settings = self.session.settings();
        self.new_best = self.stats.record(
            settings.difficulty,
            self.session.level().number,
            result,
            self.session.score(),
            self.session.matches(),
        );
        self.stats.save();
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = MESSAGE_SECS;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::Won | ScreenState::TimeUp => self.handle_endgame_key(key),
            ScreenState::Playing => self.handle_game_key(key),
        }
    }

    /// Left click at a terminal position.
    pub fn handle_click(&mut self, column: u16, row: u16) {
        if self.screen_state != ScreenState::Playing {
            return;
        }
        if let Some(pos) = self.geometry.hit(column, row) {
            self.cursor = pos;
            self.select(pos);
        }
    }

    fn handle_endgame_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => {
                if self.screen_state == ScreenState::Won {
                    let wrapped = self.session.level().is_last();
                    self.next_board(|s| s.advance_level());
                    if wrapped {
                        self.show_message("All levels complete! Back to level 1");
                    } else {
                        let level = self.session.level();
                        self.show_message(&format!("{}", level));
                    }
                } else {
                    self.next_board(|s| s.restart());
                }
            }
            KeyCode::Char('r') => self.next_board(|s| s.restart()),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => {
                if self.session.matches() > 0 {
                    self.record_game(GameResult::Abandoned);
                }
                return AppAction::Quit;
            }

            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            KeyCode::Enter | KeyCode::Char(' ') => self.select(self.cursor),
            KeyCode::Esc => {
                self.session.clear_selection();
                self.hint = None;
            }

            KeyCode::Char('?') => self.show_hint(),
            KeyCode::Char('p') => {
                self.session.toggle_pause();
                if self.session.status() == GameStatus::Paused {
                    self.show_message("Paused");
                } else {
                    self.show_message("Resumed");
                }
            }
            KeyCode::Char('r') => {
                if self.session.matches() > 0 {
                    self.record_game(GameResult::Abandoned);
                }
                self.next_board(|s| s.restart());
                self.show_message("New board");
            }
            KeyCode::Char('d') => self.cycle_difficulty(),
            KeyCode::Char('t') => {
                self.theme_index = (self.theme_index + 1) % THEMES.len();
                self.theme = Theme::from_name(THEMES[self.theme_index]);
                self.show_message(&format!("Theme: {}", THEMES[self.theme_index]));
            }
            KeyCode::Char('s') => self.save_game(),
            KeyCode::Char('o') => self.load_game(),
            _ => {}
        }
        AppAction::Continue
    }

    fn move_cursor(&mut self, d_row: i32, d_col: i32) {
        let rows = self.session.grid().rows() as i32;
        let cols = self.session.grid().cols() as i32;
        let row = (self.cursor.row as i32 + d_row).rem_euclid(rows);
        let col = (self.cursor.col as i32 + d_col).rem_euclid(cols);
        self.cursor = Position::new(row as usize, col as usize);
    }

    fn select(&mut self, pos: Position) {
        self.hint = None;
        match self.session.select(pos) {
            SelectOutcome::Ignored | SelectOutcome::Selected(_) | SelectOutcome::Deselected => {}
            SelectOutcome::Mismatch { .. } => self.show_message("Those tiles don't match"),
            SelectOutcome::NoPath { .. } => {
                let turns = self.session.settings().max_turns;
                self.show_message(&format!("No path with at most {} turns", turns));
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
                    remaining: PATH_FLASH_SECS,
                });
                if bonus > 0 {
                    self.show_message(&format!("+{} (+{} time bonus)", points - bonus, bonus));
                } else {
                    self.show_message(&format!("+{}", points));
                }

                if self.session.status() == GameStatus::Won {
                    self.record_game(GameResult::Cleared);
                    self.screen_state = ScreenState::Won;
                    let (w, h) = terminal::size().unwrap_or((80, 24));
                    self.confetti.start(w, h);
                } else if !self.session.has_moves() {
                    self.show_message("No moves left! Press r for a new board");
                }
            }
        }
    }

    fn show_hint(&mut self) {
        match self.session.hint() {
            Some(hint) => {
                self.cursor = hint.first;
                self.hint = Some(hint);
            }
            None => self.show_message("No moves left! Press r for a new board"),
        }
    }

    fn cycle_difficulty(&mut self) {
        if self.session.matches() > 0 {
            self.record_game(GameResult::Abandoned);
        }
        let mut settings = self.session.settings().clone();
        settings.difficulty = settings.difficulty.next();
        settings.level = self.session.level().number;
        self.next_board(move |s| s.apply_settings(settings));
        self.persist_settings();
        self.show_message(&format!("Difficulty: {}", self.session.settings().difficulty));
    }

    /// Reset per-board UI state after `deal` replaces the board.
    fn next_board(&mut self, deal: impl FnOnce(&mut GameSession) -> Result<(), GridError>) {
        if let Err(err) = deal(&mut self.session) {
            tracing::error!(%err, "could not deal a new board");
            self.show_message("Could not deal a new board");
            return;
        }
        self.cursor = Position::new(0, 0);
        self.flash = None;
        self.hint = None;
        self.confetti.stop();
        self.recorded = false;
        self.new_best = false;
        self.screen_state = ScreenState::Playing;
    }

    fn save_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("onet_save.json")
    }

    /// Save the current game
    fn save_game(&mut self) {
        let result = self
            .session
            .snapshot()
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| fs::write(Self::save_path(), json).map_err(anyhow::Error::from));
        match result {
            Ok(()) => self.show_message("Game saved"),
            Err(err) => {
                tracing::warn!(%err, "save failed");
                self.show_message("Failed to save");
            }
        }
    }

    /// Load a saved game, paused
    fn load_game(&mut self) {
        let json = match fs::read_to_string(Self::save_path()) {
            Ok(json) => json,
            Err(_) => {
                self.show_message("No save file found");
                return;
            }
        };
        let restored = SessionSnapshot::from_json(&json)
            .map_err(anyhow::Error::from)
            .and_then(|snapshot| GameSession::restore(snapshot).map_err(anyhow::Error::from));
        match restored {
            Ok(mut session) => {
                session.pause();
                let status = session.status();
                self.session = session;
                self.next_board(|_| Ok(()));
                self.screen_state = match status {
                    GameStatus::Won => ScreenState::Won,
                    GameStatus::TimeUp => ScreenState::TimeUp,
                    _ => ScreenState::Playing,
                };
                self.recorded = self.screen_state != ScreenState::Playing;
                self.show_message("Game loaded (paused, press p)");
            }
            Err(err) => {
                tracing::warn!(%err, "load failed");
                self.show_message("Invalid save file");
            }
        }
    }

    /// Write the current settings to the settings file.
    pub fn persist_settings(&self) {
        if let Err(err) = config::save_settings(self.session.settings()) {
            tracing::warn!(%err, "could not persist settings");
        }
    }
}
