//! Progress records and JSON file storage
//!
//! Features:
//! - Versioned JSON envelope
//! - Backup rotation (old save -> backup, tmp -> save)
//! - Corruption recovery from the backup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::highscores::Leaderboard;
use crate::sim::GameState;

/// Current on-disk envelope version
pub const SAVE_VERSION: u32 = 1;

/// Failure reading or writing saved data
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Wall-clock milliseconds since the Unix epoch
pub fn unix_time_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

/// Level, XP and coins carried between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub level: u32,
    pub xp: f32,
    pub xp_to_next: f32,
    pub coins: u32,
    /// Unix timestamp (ms) when saved
    pub timestamp_ms: f64,
}

impl ProgressRecord {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            level: state.progression.level,
            xp: state.progression.xp,
            xp_to_next: state.progression.xp_to_next,
            coins: state.progression.coins,
            timestamp_ms: unix_time_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    saved_at_ms: f64,
    data: T,
}

/// Read a versioned JSON document. A missing file yields `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&json)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: envelope.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(Some(serde_json::from_value(envelope.data)?))
}

/// Write a versioned JSON document, rotating the previous file to a backup
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let envelope = Envelope {
        version: SAVE_VERSION,
        saved_at_ms: unix_time_ms(),
        data,
    };
    let json = serde_json::to_string_pretty(&envelope)?;

    let tmp = with_suffix(path, "tmp");
    fs::write(&tmp, json)?;
    if path.exists() {
        fs::rename(path, with_suffix(path, "bak"))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read `path`, falling back to its backup when the primary is unreadable
pub fn read_json_with_backup<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, PersistenceError> {
    match read_json(path) {
        Ok(Some(data)) => Ok(Some(data)),
        primary => {
            let backup = with_suffix(path, "bak");
            match read_json(&backup) {
                Ok(Some(data)) => {
                    log::warn!("Recovered {} from backup", path.display());
                    Ok(Some(data))
                }
                _ => primary,
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Save directory holding progress and the leaderboard
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    const PROGRESS_FILE: &'static str = "progress.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_progress(&self, record: &ProgressRecord) -> Result<(), PersistenceError> {
        write_json(&self.dir.join(Self::PROGRESS_FILE), record)?;
        log::debug!("Progress saved: level {}", record.level);
        Ok(())
    }

    pub fn load_progress(&self) -> Result<Option<ProgressRecord>, PersistenceError> {
        read_json_with_backup(&self.dir.join(Self::PROGRESS_FILE))
    }

    pub fn load_leaderboard(&self) -> Result<Leaderboard, PersistenceError> {
        Leaderboard::load(self.dir.join(Leaderboard::FILE_NAME))
    }

    pub fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), PersistenceError> {
        board.save(self.dir.join(Leaderboard::FILE_NAME))
    }
}
