use onet_core::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Keep this many recent games in the history.
const HISTORY_LEN: usize = 20;

/// How a board ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Cleared,
    TimeUp,
    Abandoned,
}

/// Record of a single played board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub difficulty: Difficulty,
    pub level: u8,
    pub result: GameResult,
    pub score: u64,
    pub matches: u32,
    /// Unix timestamp when the board ended
    pub timestamp: u64,
}

/// Per-difficulty totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub games: usize,
    pub cleared: usize,
    pub best_score: u64,
}

/// Best scores and recent history, persisted as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsManager {
    pub by_difficulty: HashMap<Difficulty, DifficultyStats>,
    pub recent: Vec<GameRecord>,
}

impl StatsManager {
    fn save_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("onet_stats.json")
    }

    /// Load stats from file
    pub fn load() -> Self {
        match fs::read_to_string(Self::save_path()) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save stats to file
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            if let Err(err) = fs::write(Self::save_path(), json) {
                tracing::warn!(%err, "could not save stats");
            }
        }
    }

    pub fn best_score(&self, difficulty: Difficulty) -> u64 {
        self.by_difficulty
            .get(&difficulty)
            .map_or(0, |s| s.best_score)
    }

    /// Record a finished board. Returns true when it set a new best score.
    pub fn record(&mut self, difficulty: Difficulty, level: u8, result: GameResult, score: u64, matches: u32) -> bool {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let stats = self.by_difficulty.entry(difficulty).or_default();
        stats.games += 1;
        if result == GameResult::Cleared {
            stats.cleared += 1;
        }
        let new_best = score > stats.best_score;
        if new_best {
            stats.best_score = score;
        }

        self.recent.insert(
            0,
            GameRecord {
                difficulty,
                level,
                result,
                score,
                matches,
                timestamp,
            },
        );
        self.recent.truncate(HISTORY_LEN);
        new_best
    }
}

/// Format seconds as mm:ss
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
