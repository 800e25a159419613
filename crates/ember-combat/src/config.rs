//! Combat tuning
//!
//! All numbers the engine uses live here. Every struct deserializes from TOML
//! with `#[serde(default)]`, so a settings file only needs the keys it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::element::StatusKind;
use crate::error::ConfigError;

/// Fallback values for one status kind, used whenever an application passes a
/// non-positive (or non-finite) magnitude, duration, or tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindDefaults {
    pub magnitude: f32,
    /// Seconds
    pub duration: f32,
    /// Seconds between ticks
    pub tick_interval: f32,
}

impl KindDefaults {
    /// Built-in fallbacks for `kind`
    pub fn for_kind(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Fire => Self {
                magnitude: 2.0,
                duration: 4.0,
                tick_interval: 0.5,
            },
            StatusKind::Ice => Self {
                magnitude: 0.3,
                duration: 3.0,
                tick_interval: 1.0,
            },
            StatusKind::Lightning => Self {
                magnitude: 1.0,
                duration: 5.0,
                tick_interval: 1.0,
            },
        }
    }
}

/// A `[status.<kind>]` table; absent keys keep that kind's built-in value
#[derive(Deserialize)]
struct KindOverrides {
    magnitude: Option<f32>,
    duration: Option<f32>,
    tick_interval: Option<f32>,
}

fn kind_table<'de, D: Deserializer<'de>>(
    deserializer: D,
    kind: StatusKind,
) -> Result<KindDefaults, D::Error> {
    let overrides = KindOverrides::deserialize(deserializer)?;
    let base = KindDefaults::for_kind(kind);
    Ok(KindDefaults {
        magnitude: overrides.magnitude.unwrap_or(base.magnitude),
        duration: overrides.duration.unwrap_or(base.duration),
        tick_interval: overrides.tick_interval.unwrap_or(base.tick_interval),
    })
}

fn fire_table<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KindDefaults, D::Error> {
    kind_table(deserializer, StatusKind::Fire)
}

fn ice_table<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KindDefaults, D::Error> {
    kind_table(deserializer, StatusKind::Ice)
}

fn lightning_table<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KindDefaults, D::Error> {
    kind_table(deserializer, StatusKind::Lightning)
}

/// Status resolution tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    #[serde(deserialize_with = "fire_table")]
    pub fire: KindDefaults,
    #[serde(deserialize_with = "ice_table")]
    pub ice: KindDefaults,
    #[serde(deserialize_with = "lightning_table")]
    pub lightning: KindDefaults,
    /// Ice applications needed to freeze a non-boss actor
    pub freeze_threshold: u32,
    /// Seconds a freeze lasts
    pub freeze_duration: f32,
    /// Maximum Ice slow a boss can receive (0.0–1.0)
    pub boss_slow_cap: f32,
    /// Multiplier on Fire DoT ticks against bosses
    pub boss_dot_factor: f32,
    /// Lightning damage-taken bonus per stack
    pub amp_per_stack: f32,
    /// Cap on the total Lightning damage-taken bonus
    pub amp_max: f32,
    /// Search radius for a Lightning mini chain
    pub mini_chain_range: f32,
    /// Damage dealt by each Lightning mini chain
    pub mini_chain_damage: f32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            fire: KindDefaults::for_kind(StatusKind::Fire),
            ice: KindDefaults::for_kind(StatusKind::Ice),
            lightning: KindDefaults::for_kind(StatusKind::Lightning),
            freeze_threshold: 5,
            freeze_duration: 2.0,
            boss_slow_cap: 0.3,
            boss_dot_factor: 0.5,
            amp_per_stack: 0.1,
            amp_max: 0.5,
            mini_chain_range: 4.0,
            mini_chain_damage: 3.0,
        }
    }
}

impl StatusConfig {
    /// Fallback values for the given kind
    pub fn defaults_for(&self, kind: StatusKind) -> &KindDefaults {
        match kind {
            StatusKind::Fire => &self.fire,
            StatusKind::Ice => &self.ice,
            StatusKind::Lightning => &self.lightning,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for &kind in StatusKind::all() {
            let d = self.defaults_for(kind);
            if !(d.magnitude > 0.0 && d.duration > 0.0 && d.tick_interval > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "status.<kind>",
                    reason: format!("{} defaults must all be positive, got {:?}", kind.name(), d),
                });
            }
        }
        if self.freeze_threshold == 0 {
            return Err(invalid("status.freeze_threshold", "must be at least 1"));
        }
        if !(self.freeze_duration > 0.0) {
            return Err(invalid("status.freeze_duration", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.boss_slow_cap) {
            return Err(invalid("status.boss_slow_cap", "must be within 0.0..=1.0"));
        }
        if !(self.boss_dot_factor >= 0.0) {
            return Err(invalid("status.boss_dot_factor", "must not be negative"));
        }
        if !(self.amp_per_stack >= 0.0 && self.amp_max >= 0.0) {
            return Err(invalid("status.amp_per_stack", "amplification must not be negative"));
        }
        if !(self.mini_chain_range >= 0.0 && self.mini_chain_range.is_finite()) {
            return Err(invalid("status.mini_chain_range", "must be finite and not negative"));
        }
        if !(self.mini_chain_damage >= 0.0) {
            return Err(invalid("status.mini_chain_damage", "must not be negative"));
        }
        Ok(())
    }
}

/// Area field and propagation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Two linked fields whose centers are within this distance are adjacent
    pub link_radius: f32,
    /// Edge length of one spatial grid cell
    pub grid_cell_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            link_radius: 6.0,
            grid_cell_size: 4.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub status: StatusConfig,
    pub field: FieldConfig,
}

impl CombatConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml_str(&content)
    }

    /// Check every value is within the range the engine can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.status.validate()?;
        if !(self.field.link_radius >= 0.0 && self.field.link_radius.is_finite()) {
            return Err(invalid("field.link_radius", "must be finite and not negative"));
        }
        if !(self.field.grid_cell_size > 0.0 && self.field.grid_cell_size.is_finite()) {
            return Err(invalid("field.grid_cell_size", "must be finite and positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
