//! High score persistence
//!
//! A single integer in a plain text file. Missing, unreadable, or corrupt
//! files fall back to 0 — score persistence is never allowed to interrupt
//! or corrupt a run, so write failures are logged and swallowed.

use std::fs;
use std::path::{Path, PathBuf};

/// Default file name, created next to the executable's working directory
pub const HIGH_SCORE_FILE: &str = "highscore.txt";

/// File-backed store for the best score across runs
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(HIGH_SCORE_FILE)
    }
}

impl HighScoreStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the stored high score. Any fault yields 0 instead of an error.
    pub fn load(&self) -> u32 {
        log::info!("Loading high score from {}", self.path.display());
        match fs::read_to_string(&self.path) {
            Ok(contents) => match contents.trim().parse::<u32>() {
                Ok(score) => {
                    log::info!("High score loaded: {score}");
                    score
                }
                Err(_) => {
                    log::error!(
                        "Invalid high score format in {}. Resetting to 0",
                        self.path.display()
                    );
                    0
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "{} not found. Starting with high score of 0",
                    self.path.display()
                );
                0
            }
            Err(err) => {
                log::error!("Error loading high score: {err}");
                0
            }
        }
    }

    /// Persist a new high score. Failures are logged and swallowed.
    pub fn save(&self, score: u32) {
        log::info!("Saving high score {score} to {}", self.path.display());
        if let Err(err) = fs::write(&self.path, score.to_string()) {
            log::error!("Failed to save high score: {err}");
        } else {
            log::info!("High score saved successfully");
        }
    }
}
