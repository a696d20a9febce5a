use crate::{Difficulty, Level, SolverConfig, LEVELS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_ROWS: usize = 2;
pub const MAX_ROWS: usize = 20;
pub const MIN_COLS: usize = 2;
pub const MAX_COLS: usize = 30;
pub const MAX_MARGIN: usize = 4;
pub const MAX_TURNS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown difficulty {0:?}")]
    UnknownDifficulty(String),
    #[error("malformed settings: {0}")]
    Malformed(String),
}

/// Player-tunable game settings, persisted as camelCase JSON by the frontends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Seconds on the clock at the start of a board.
    pub initial_time: u32,
    /// Seconds added for every match.
    pub time_bonus: u32,
    pub rows: usize,
    pub cols: usize,
    pub difficulty: Difficulty,
    /// Starting level, 1-based.
    pub level: u8,
    /// Passable band around the board.
    pub margin_width: usize,
    pub max_turns: u8,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_time: 90,
            time_bonus: 6,
            rows: 8,
            cols: 14,
            difficulty: Difficulty::Medium,
            level: 1,
            margin_width: 2,
            max_turns: 2,
        }
    }
}

impl GameSettings {
    /// Clamp every field into its playable range. An odd cell count is fixed
    /// by widening the board one column.
    pub fn normalized(mut self) -> Self {
        self.initial_time = self.initial_time.max(1);
        self.rows = self.rows.clamp(MIN_ROWS, MAX_ROWS);
        self.cols = self.cols.clamp(MIN_COLS, MAX_COLS);
        // An odd product means odd cols, so cols < MAX_COLS (which is even).
        if (self.rows * self.cols) % 2 != 0 {
            self.cols += 1;
        }
        if Level::get(self.level).is_none() {
            self.level = 1;
        }
        self.margin_width = self.margin_width.min(MAX_MARGIN);
        self.max_turns = self.max_turns.min(MAX_TURNS);
        self
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            margin: self.margin_width,
            max_turns: self.max_turns,
            ..SolverConfig::default()
        }
    }

    pub fn start_level(&self) -> Level {
        Level::get(self.level).unwrap_or(LEVELS[0])
    }

    /// Parse persisted settings. Missing fields take their defaults and the
    /// result is normalized.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str::<GameSettings>(json)
            .map(GameSettings::normalized)
            .map_err(|e| SettingsError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = GameSettings::default();
        assert_eq!((s.initial_time, s.time_bonus, s.rows, s.cols), (90, 6, 8, 14));
        assert_eq!(s.difficulty, Difficulty::Medium);
        assert_eq!(s.solver_config(), SolverConfig::default());
    }

    #[test]
    fn test_normalized_clamps_and_evens() {
        let s = GameSettings {
            rows: 99,
            cols: 1,
            ..GameSettings::default()
        }
        .normalized();
        assert_eq!((s.rows, s.cols), (20, 2));

        let s = GameSettings {
            rows: 5,
            cols: 7,
            level: 9,
            ..GameSettings::default()
        }
        .normalized();
        assert_eq!((s.rows, s.cols, s.level), (5, 8, 1));

        let s = GameSettings {
            rows: 19,
            cols: 30,
            ..GameSettings::default()
        }
        .normalized();
        assert_eq!((s.rows * s.cols) % 2, 0);
    }

    #[test]
    fn test_json_keys() {
        let json = GameSettings::default().to_json();
        assert!(json.contains("\"initialTime\":90"));
        assert!(json.contains("\"timeBonus\":6"));
        assert!(json.contains("\"difficulty\":\"MEDIUM\""));
        assert!(json.contains("\"marginWidth\":2"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = GameSettings::from_json(r#"{"rows":3,"cols":5,"difficulty":"EASY"}"#).unwrap();
        assert_eq!((s.rows, s.cols), (3, 6));
        assert_eq!(s.difficulty, Difficulty::Easy);
        assert_eq!(s.initial_time, 90);

        assert!(matches!(
            GameSettings::from_json("{not json"),
            Err(SettingsError::Malformed(_))
        ));
    }

    #[test]
    fn test_odd_board_stays_within_column_limit() {
        let s = GameSettings::from_json(r#"{"rows":3,"cols":29}"#).unwrap();
        assert_eq!((s.rows, s.cols), (3, 30));
        let s = GameSettings::from_json(r#"{"rows":3,"cols":99}"#).unwrap();
        assert_eq!((s.rows, s.cols), (3, MAX_COLS));
        let s = GameSettings::from_json(r#"{"rows":4,"cols":5}"#).unwrap();
        assert_eq!((s.rows, s.cols), (4, 5));
    }
}
