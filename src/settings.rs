//! Sandbox settings with persistence
//!
//! Settings are read from `~/.config/ember/settings.toml`, or from a path
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use ember_combat::CombatConfig;
use ember_core::TimeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All sandbox settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    pub time: TimeConfig,
    pub encounter: EncounterSettings,
    pub combat: CombatConfig,
}

impl SandboxSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ember"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path`, or the default location when `None`.
    /// Anything missing or broken falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let Some(p) = Self::settings_path() else {
                    warn!("Could not determine config directory");
                    return Self::default();
                };
                p
            }
        };

        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {:#}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse settings and validate the combat section
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.combat.validate()?;
        Ok(settings)
    }

    /// Write these settings to the default location
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let path = dir.join("settings.toml");
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// The scripted encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterSettings {
    /// RNG seed for enemy placement and frame jitter
    pub seed: u64,
    /// Common enemies spawned around the player
    pub enemies: u32,
    /// Whether a boss joins the fight
    pub boss: bool,
    /// Enemies spawn between these distances from the player
    pub spawn_min: f32,
    pub spawn_max: f32,
    /// Simulated seconds before the encounter ends
    pub duration: f32,
    /// Average simulated frame length, jittered by +-20%
    pub frame_delta: f32,
    /// Enemy walk speed (units per second) before status slows
    pub enemy_speed: f32,
    pub enemy_hp: f32,
    pub boss_hp: f32,
    /// Seconds between weapon upgrades
    pub upgrade_interval: f32,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            seed: 7,
            enemies: 24,
            boss: true,
            spawn_min: 8.0,
            spawn_max: 20.0,
            duration: 30.0,
            frame_delta: 1.0 / 30.0,
            enemy_speed: 2.5,
            enemy_hp: 60.0,
            boss_hp: 600.0,
            upgrade_interval: 5.0,
        }
    }
}
