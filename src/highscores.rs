//! Local score leaderboard
//!
//! Keeps the top 50 finished runs, sorted by score.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};
use crate::sim::GameState;

/// Maximum number of entries to keep
pub const MAX_HIGH_SCORES: usize = 50;

/// Name recorded when no player identity is known
pub const GUEST_PLAYER: &str = "guest";

/// A finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player identity
    pub player: String,
    pub score: u64,
    pub kills: u32,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when submitted
    pub timestamp_ms: f64,
}

impl ScoreRecord {
    /// Snapshot the run's result
    pub fn from_state(state: &GameState) -> Self {
        Self {
            player: GUEST_PLAYER.to_string(),
            score: state.scoring.score,
            kills: state.scoring.kills,
            level: state.progression.level.max(1),
            timestamp_ms: persistence::unix_time_ms(),
        }
    }
}

/// Score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// File name used inside a save directory
    pub const FILE_NAME: &'static str = "leaderboard.json";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a record if it qualifies. Returns the rank achieved (1-indexed).
    ///
    /// Equal scores keep submission order.
    pub fn add(&mut self, record: ScoreRecord) -> Option<usize> {
        if !self.qualifies(record.score) {
            return None;
        }

        let pos = self.entries.iter().position(|e| record.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, record);
                i + 1
            }
            None => {
                self.entries.push(record);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let board: Option<Self> = persistence::read_json(path.as_ref())?;
        match board {
            Some(mut board) => {
                board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                board.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", board.entries.len());
                Ok(board)
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        persistence::write_json(path.as_ref(), self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a timestamp relative to `now_ms`
pub fn format_age(timestamp_ms: f64, now_ms: f64) -> String {
    let diff_mins = (now_ms - timestamp_ms) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        match diff_days.floor() as i64 {
            1 => "Yesterday".to_string(),
            days => format!("{} days ago", days),
        }
    } else if diff_hours >= 1.0 {
        match diff_hours.floor() as i64 {
            1 => "1 hour ago".to_string(),
            hours => format!("{} hours ago", hours),
        }
    } else if diff_mins >= 1.0 {
        match diff_mins.floor() as i64 {
            1 => "1 min ago".to_string(),
            mins => format!("{} mins ago", mins),
        }
    } else {
        "Just now".to_string()
    }
}
