//! JSON persistence: settings, statistics and saved games.
//!
//! Plain files next to the executable's working directory. A corrupted or
//! missing file is never fatal: settings/statistics fall back to defaults and
//! a bad saved game is reported so the caller starts a new session.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Engine, GameSnapshot};
use crate::types::{
    Difficulty, GameMode, GameSummary, DEFAULT_CHALLENGE_TARGET_ROWS, DEFAULT_TIMED_DURATION_MS,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const STATS_FILE: &str = "stats.json";
pub const SAVE_FILE: &str = "savegame.json";

/// Player-tunable defaults applied to new sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub timed_duration_ms: u32,
    pub challenge_target_rows: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            difficulty: Difficulty::Normal,
            timed_duration_ms: DEFAULT_TIMED_DURATION_MS,
            challenge_target_rows: DEFAULT_CHALLENGE_TARGET_ROWS,
        }
    }
}

/// Lifetime tallies across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub games_played: u32,
    pub games_won: u32,
    pub best_score: u32,
    pub total_rows: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub tetrises: u32,
}

impl Statistics {
    /// Fold one finished session into the tallies.
    pub fn record(&mut self, summary: &GameSummary, won: bool) {
        self.games_played += 1;
        if won {
            self.games_won += 1;
        }
        self.best_score = self.best_score.max(summary.score);
        self.total_rows += summary.rows;
        self.singles += summary.singles;
        self.doubles += summary.doubles;
        self.triples += summary.triples;
        self.tetrises += summary.tetrises;
    }
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_settings(path: &Path) -> Settings {
    read_json(path).unwrap_or_default()
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    write_json(path, settings)
}

/// Load statistics, falling back to zeroes when the file is missing or
/// unreadable.
pub fn load_statistics(path: &Path) -> Statistics {
    read_json(path).unwrap_or_default()
}

pub fn save_statistics(path: &Path, stats: &Statistics) -> Result<()> {
    write_json(path, stats)
}

/// Persist a session snapshot.
pub fn save_game(path: &Path, engine: &Engine) -> Result<()> {
    write_json(path, &engine.snapshot())
}

/// Load and restore a saved session. Fails on missing/corrupted files and on
/// snapshots that do not validate; the caller starts a new game instead.
pub fn load_game(path: &Path) -> Result<Engine> {
    let snapshot: GameSnapshot = read_json(path)
        .with_context(|| format!("reading saved game from {}", path.display()))?;
    let engine = Engine::restore(&snapshot)
        .with_context(|| format!("saved game in {} is not a valid session", path.display()))?;
    Ok(engine)
}

/// Remove a consumed save file; a missing file is fine.
pub fn discard_save(path: &Path) {
    let _ = fs::remove_file(path);
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
