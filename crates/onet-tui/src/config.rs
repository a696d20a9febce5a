use anyhow::{Context, Result};
use clap::Parser;
use onet_core::{Difficulty, GameSettings};
use std::fs;
use std::path::PathBuf;

/// Onet: connect matching tiles with at most two turns.
#[derive(Debug, Clone, Parser)]
#[command(name = "onet", version, about)]
pub struct Args {
    /// Board rows
    #[arg(long)]
    pub rows: Option<usize>,
    /// Board columns
    #[arg(long)]
    pub cols: Option<usize>,
    /// easy, medium, medium-plus or hard
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,
    /// Starting level (1-4)
    #[arg(short, long)]
    pub level: Option<u8>,
    /// Seconds on the clock at the start of a board
    #[arg(long)]
    pub time: Option<u32>,
    /// Seconds added per match
    #[arg(long)]
    pub bonus: Option<u32>,
    /// Width of the routing band around the board
    #[arg(long)]
    pub margin: Option<usize>,
    /// Maximum direction changes on a connecting path
    #[arg(long)]
    pub max_turns: Option<u8>,
    /// dark, light or high-contrast
    #[arg(long, default_value = "dark")]
    pub theme: String,
    /// Forget the saved settings and start from the defaults
    #[arg(long)]
    pub reset: bool,
    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save: bool,
}

impl Args {
    /// Overlay the command-line flags on `base`.
    pub fn apply(&self, mut base: GameSettings) -> GameSettings {
        if let Some(rows) = self.rows {
            base.rows = rows;
        }
        if let Some(cols) = self.cols {
            base.cols = cols;
        }
        if let Some(difficulty) = self.difficulty {
            base.difficulty = difficulty;
        }
        if let Some(level) = self.level {
            base.level = level;
        }
        if let Some(time) = self.time {
            base.initial_time = time;
        }
        if let Some(bonus) = self.bonus {
            base.time_bonus = bonus;
        }
        if let Some(margin) = self.margin {
            base.margin_width = margin;
        }
        if let Some(max_turns) = self.max_turns {
            base.max_turns = max_turns;
        }
        base.normalized()
    }
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("onet")
        .join("settings.json")
}

/// Load persisted settings, falling back to the defaults when the file is
/// missing or unreadable.
pub fn load_settings() -> GameSettings {
    let path = settings_path();
    match fs::read_to_string(&path) {
        Ok(json) => GameSettings::from_json(&json).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings");
            GameSettings::default()
        }),
        Err(_) => GameSettings::default(),
    }
}

pub fn save_settings(settings: &GameSettings) -> Result<()> {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "settings saved");
    Ok(())
}

pub fn reset_settings() -> Result<()> {
    let path = settings_path();
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(())
}

/// Settings for this run: saved (or default) settings overlaid with flags.
pub fn resolve(args: &Args) -> Result<GameSettings> {
    let base = if args.reset {
        reset_settings()?;
        GameSettings::default()
    } else {
        load_settings()
    };
    let settings = args.apply(base);
    if args.save {
        save_settings(&settings)?;
    }
    Ok(settings)
}
