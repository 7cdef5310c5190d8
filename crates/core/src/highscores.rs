//! High-score table and its persistence contract
//!
//! The table keeps up to [`HIGH_SCORE_LIMIT`] entries per mode. Sprint ranks
//! by fastest time, every other mode by highest score. Storage is behind the
//! [`ScoreStore`] trait; the game state only loads once and saves after each
//! finished session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mode::rules;
use crate::types::{ModeId, HIGH_SCORE_LIMIT};

/// One finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    /// Wall-clock end of the session, milliseconds since the Unix epoch.
    pub date: u64,
    /// Session time for timed modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
}

/// Ranked entries keyed by mode name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScoreTable {
    modes: BTreeMap<String, Vec<ScoreEntry>>,
}

impl HighScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for a mode, best first.
    pub fn entries(&self, mode: ModeId) -> &[ScoreEntry] {
        self.modes
            .get(mode.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Best entry for a mode.
    pub fn best(&self, mode: ModeId) -> Option<&ScoreEntry> {
        self.entries(mode).first()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.values().all(Vec::is_empty)
    }

    /// Add an entry, re-rank, and trim to the limit.
    ///
    /// Returns the 0-based rank of the new entry, or `None` if it did not
    /// make the cut.
    pub fn insert(&mut self, mode: ModeId, entry: ScoreEntry) -> Option<usize> {
        let list = self.modes.entry(mode.as_str().to_string()).or_default();
        list.push(entry);
        // Stable sorts: an equal newcomer ranks below older entries.
        if mode == ModeId::Sprint {
            // Runs that fell short of the target rank below every finished run.
            let sprint = rules(ModeId::Sprint);
            list.sort_by_key(|e| {
                (
                    !sprint.target_reached(e.lines),
                    e.time.unwrap_or(u64::MAX),
                )
            });
        } else {
            list.sort_by(|a, b| b.score.cmp(&a.score));
        }
        list.truncate(HIGH_SCORE_LIMIT);
        list.iter().rposition(|e| *e == entry)
    }
}

/// Append/read contract for persisted high scores.
pub trait ScoreStore: std::fmt::Debug {
    fn load(&self) -> Result<HighScoreTable>;
    fn save(&mut self, table: &HighScoreTable) -> Result<()>;
}

/// Store that keeps the last saved table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: HighScoreTable,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: HighScoreTable) -> Self {
        Self { table, saves: 0 }
    }

    pub fn table(&self) -> &HighScoreTable {
        &self.table
    }

    /// How many times `save` was called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<HighScoreTable> {
        Ok(self.table.clone())
    }

    fn save(&mut self, table: &HighScoreTable) -> Result<()> {
        self.table = table.clone();
        self.saves += 1;
        Ok(())
    }
}

/// Store backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<HighScoreTable> {
        if !self.path.exists() {
            return Ok(HighScoreTable::default());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading high scores from {}", self.path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing high scores in {}", self.path.display()))
    }

    fn save(&mut self, table: &HighScoreTable) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(table)?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing high scores to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32, time: Option<u64>) -> ScoreEntry {
        ScoreEntry {
            score,
            lines: 0,
            level: 1,
            date: 0,
            time,
        }
    }

    #[test]
    fn test_marathon_ranks_by_score_descending() {
        let mut table = HighScoreTable::new();
        table.insert(ModeId::Marathon, entry(100, None));
        table.insert(ModeId::Marathon, entry(300, None));
        let rank = table.insert(ModeId::Marathon, entry(200, None));

        assert_eq!(rank, Some(1));
        let scores: Vec<_> = table.entries(ModeId::Marathon).iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
    }

    #[test]
    fn test_sprint_ranks_by_time_ascending() {
        let mut table = HighScoreTable::new();
        table.insert(ModeId::Sprint, entry(10, Some(90_000)));
        table.insert(ModeId::Sprint, entry(5, Some(60_000)));
        table.insert(ModeId::Sprint, entry(50, Some(120_000)));

        let times: Vec<_> = table.entries(ModeId::Sprint).iter().map(|e| e.time).collect();
        assert_eq!(times, vec![Some(60_000), Some(90_000), Some(120_000)]);
        assert_eq!(table.best(ModeId::Sprint).map(|e| e.score), Some(5));
    }

    #[test]
    fn test_sprint_unfinished_runs_rank_below_finished() {
        let mut table = HighScoreTable::new();
        let finished = ScoreEntry {
            lines: 40,
            ..entry(900, Some(60_000))
        };
        let short = ScoreEntry {
            lines: 3,
            ..entry(120, Some(5_000))
        };
        table.insert(ModeId::Sprint, finished);
        assert_eq!(table.insert(ModeId::Sprint, short), Some(1));

        let slower = ScoreEntry {
            lines: 41,
            ..entry(950, Some(75_000))
        };
        assert_eq!(table.insert(ModeId::Sprint, slower), Some(1));

        let lines: Vec<_> = table.entries(ModeId::Sprint).iter().map(|e| e.lines).collect();
        assert_eq!(lines, vec![40, 41, 3]);
    }

    #[test]
    fn test_cap_per_mode() {
        let mut table = HighScoreTable::new();
        for score in 0..15 {
            table.insert(ModeId::Survival, entry(score * 10, Some(1_000)));
        }
        assert_eq!(table.entries(ModeId::Survival).len(), HIGH_SCORE_LIMIT);
        assert_eq!(table.best(ModeId::Survival).map(|e| e.score), Some(140));

        // Too low to rank.
        assert_eq!(table.insert(ModeId::Survival, entry(1, Some(5))), None);
        assert!(table.entries(ModeId::Marathon).is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut table = HighScoreTable::new();
        table.insert(ModeId::Marathon, entry(42, None));

        let mut store = MemoryStore::new();
        store.save(&table).unwrap();
        assert_eq!(store.saves(), 1);
        assert_eq!(store.load().unwrap(), table);
    }

    #[test]
    fn test_json_layout_is_keyed_by_mode_name() {
        let mut table = HighScoreTable::new();
        table.insert(ModeId::Sprint, entry(7, Some(61_500)));
        table.insert(ModeId::Marathon, entry(9, None));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["sprint"][0]["time"], 61_500);
        assert!(json["marathon"][0].get("time").is_none());

        let back: HighScoreTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("blockfall-scores-{}", std::process::id()));
        let path = dir.join("scores.json");
        let _ = fs::remove_dir_all(&dir);

        let mut store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_empty());

        let mut table = HighScoreTable::new();
        table.insert(ModeId::Marathon, entry(1200, None));
        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);

        fs::write(&path, "not json").unwrap();
        assert!(store.load().is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
