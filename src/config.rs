//! Runner configuration.
//!
//! Reads `blockfall.toml` (or the path given on the command line). A missing
//! file or missing keys fall back to defaults; unknown mode names fall back
//! to marathon.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{rules_by_name, EngineConfig};
use crate::types::{GridSize, ModeId, GRID_COLS, GRID_ROWS, LOCK_DELAY_MS, TICK_MS};

pub const CONFIG_FILE: &str = "blockfall.toml";

/// Grid dimensions accepted from a config file.
const MIN_GRID: u16 = 4;
const MAX_GRID: u16 = 40;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Mode selected on the menu at launch.
    pub mode: ModeId,
    pub tick_ms: u32,
    pub scores_path: PathBuf,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file; `None` disables logging.
    pub file: Option<PathBuf>,
    /// Filter directives in `RUST_LOG` syntax.
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    scores: TomlScores,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_rows")]
    rows: u16,
    #[serde(default = "default_cols")]
    cols: u16,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_lock_delay")]
    lock_delay_ms: u32,
    #[serde(default = "default_tick")]
    tick_ms: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScores {
    #[serde(default = "default_scores_path")]
    path: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_mode() -> String { ModeId::default().as_str().into() }
fn default_rows() -> u16 { GRID_ROWS }
fn default_cols() -> u16 { GRID_COLS }
fn default_lock_delay() -> u32 { LOCK_DELAY_MS }
fn default_tick() -> u32 { TICK_MS }
fn default_scores_path() -> String { "blockfall-scores.json".into() }
fn default_log_file() -> String { "blockfall.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            mode: default_mode(),
            seed: None,
        }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            lock_delay_ms: default_lock_delay(),
            tick_ms: default_tick(),
        }
    }
}

impl Default for TomlScores {
    fn default() -> Self {
        TomlScores {
            path: default_scores_path(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: TomlConfig = toml::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: TomlConfig) -> Self {
        let rows = raw.grid.rows.clamp(MIN_GRID, MAX_GRID);
        let cols = raw.grid.cols.clamp(MIN_GRID, MAX_GRID);

        AppConfig {
            engine: EngineConfig {
                grid: GridSize::new(rows, cols),
                lock_delay_ms: raw.timing.lock_delay_ms,
                // Centre a 4-wide box; column 3 on the standard grid.
                spawn_column: (cols as i32 - 4) / 2,
                seed: raw.game.seed,
            },
            mode: rules_by_name(&raw.game.mode).id,
            tick_ms: raw.timing.tick_ms.max(1),
            scores_path: PathBuf::from(raw.scores.path),
            log: LogConfig {
                file: (!raw.log.file.is_empty()).then(|| PathBuf::from(raw.log.file)),
                level: raw.log.level,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(TomlConfig::default())
    }
}
