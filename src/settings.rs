//! Game settings and preferences
//!
//! Persisted as JSON, separately from any game state. Loading never fails:
//! a missing or unparsable file just yields the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default settings file name
pub const SETTINGS_FILE: &str = "brickwave_settings.json";

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Show the FPS counter
    pub show_fps: bool,
    /// Reduced motion (skip explosion flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.1,
            sfx_volume: 1.0,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective playback volume for a sound trigger
    pub fn effective_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Nudge the master volume, clamped to [0, 1] (volume keys)
    pub fn adjust_volume(&mut self, delta: f32) {
        self.master_volume = (self.master_volume + delta).clamp(0.0, 1.0);
        log::debug!("Volume set to {}%", (self.master_volume * 100.0) as u32);
    }

    /// Load settings from a JSON file, falling back to defaults on any error.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Could not parse {}: {err}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as JSON. Failures are logged and swallowed.
    pub fn save_to(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    log::error!("Failed to save settings: {err}");
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(err) => log::error!("Failed to serialize settings: {err}"),
        }
    }
}
