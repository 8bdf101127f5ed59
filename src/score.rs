use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR_NAME: &str = "neon-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Failure reading or writing the persisted best score.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistent home of the best-ever score.
pub trait ScoreStore {
    /// Returns the stored best score, or 0 when nothing was stored yet.
    fn load_best_score(&self) -> Result<u32, StoreError>;

    fn save_best_score(&mut self, score: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// JSON score file on disk.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the per-user data directory.
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(scores_path())
    }
}

impl ScoreStore for FileScoreStore {
    fn load_best_score(&self) -> Result<u32, StoreError> {
        load_high_score_from_path(&self.path)
    }

    fn save_best_score(&mut self, score: u32) -> Result<(), StoreError> {
        save_high_score_to_path(&self.path, score)
    }
}

/// Process-local store, used by tests and when no file location is wanted.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Option<u32>,
    saves: usize,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn with_best(best: u32) -> Self {
        Self {
            best: Some(best),
            saves: 0,
        }
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best_score(&self) -> Result<u32, StoreError> {
        Ok(self.best.unwrap_or(0))
    }

    fn save_best_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.best = Some(score);
        self.saves += 1;
        Ok(())
    }
}

fn load_high_score_from_path(path: &Path) -> Result<u32, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let file: ScoreFile = serde_json::from_str(&raw)?;
    Ok(file.high_score)
}

fn save_high_score_to_path(path: &Path, score: u32) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { high_score: score };
    let json = serde_json::to_string_pretty(&payload)?;

    fs::write(path, json)?;
    Ok(())
}
