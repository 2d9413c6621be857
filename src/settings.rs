//! Runner settings
//!
//! Persisted as JSON next to the game snapshots. Every field has a default, so
//! partial files load fine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::sim::GameKind;
use crate::sim::minesweeper::Difficulty;

/// Refresh intervals in milliseconds, one per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshIntervals {
    pub asteroids: u64,
    pub minesweeper: u64,
    pub stratego: u64,
    pub missile_command: u64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            asteroids: 500,
            minesweeper: 1000,
            stratego: 2000,
            missile_command: 250,
        }
    }
}

/// Runner settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where snapshots and score tables are written
    pub state_dir: PathBuf,
    /// Seed for new games; None picks one from the clock
    pub seed: Option<u64>,
    pub minesweeper_difficulty: Difficulty,

    // === Input ===
    /// Minimum gap between two registered fire presses
    pub fire_cooldown_ms: u64,

    // === Real-time mode ===
    pub refresh_ms: RefreshIntervals,

    pub record_high_scores: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("state"),
            seed: None,
            minesweeper_difficulty: Difficulty::Beginner,
            fire_cooldown_ms: 300,
            refresh_ms: RefreshIntervals::default(),
            record_high_scores: true,
        }
    }
}

impl Settings {
    /// Refresh interval for one game
    pub fn refresh_ms(&self, kind: GameKind) -> u64 {
        match kind {
            GameKind::Asteroids => self.refresh_ms.asteroids,
            GameKind::Minesweeper => self.refresh_ms.minesweeper,
            GameKind::Stratego => self.refresh_ms.stratego,
            GameKind::MissileCommand => self.refresh_ms.missile_command,
        }
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                return Self::default();
            }
            Err(e) => {
                log::warn!("Could not read settings from {}: {e}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arcade-sims-settings-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.fire_cooldown_ms, 300);
        assert_eq!(settings.refresh_ms(GameKind::Asteroids), 500);
        assert_eq!(settings.refresh_ms(GameKind::Minesweeper), 1000);
        assert_eq!(settings.refresh_ms(GameKind::Stratego), 2000);
        assert_eq!(settings.refresh_ms(GameKind::MissileCommand), 250);
        assert!(settings.record_high_scores);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"seed": 9, "refresh_ms": {"stratego": 100}}"#).unwrap();
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.refresh_ms(GameKind::Stratego), 100);
        assert_eq!(settings.refresh_ms(GameKind::Asteroids), 500);
        assert_eq!(settings.state_dir, PathBuf::from("state"));
    }

    #[test]
    fn test_missing_and_malformed_files_use_defaults() {
        let missing = scratch_file("missing");
        let _ = fs::remove_file(&missing);
        assert_eq!(Settings::load(&missing), Settings::default());

        let malformed = scratch_file("malformed");
        fs::write(&malformed, "{ nope").unwrap();
        assert_eq!(Settings::load(&malformed), Settings::default());
        let _ = fs::remove_file(&malformed);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_file("saved");
        let settings = Settings {
            seed: Some(42),
            minesweeper_difficulty: Difficulty::Expert,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = fs::remove_file(&path);
    }
}
