//! Status templates and active entries

use serde::{Deserialize, Serialize};

use crate::config::StatusConfig;
use crate::element::StatusKind;

/// A status application request.
///
/// Weapons and area fields carry one of these as a template and hand it to
/// the resolver on every hit. Values that are not positive are replaced by
/// the configured defaults for the kind when the template is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Fire: damage per tick. Ice: slow fraction (0.0–1.0). Unused by Lightning.
    pub magnitude: f32,
    /// Seconds
    pub duration: f32,
    /// Seconds between ticks (Fire DoT, Lightning mini chain)
    pub tick_interval: f32,
    /// Ice: freeze progress added. Lightning: vulnerability stacks added.
    pub stacks: u32,
}

impl StatusEffect {
    /// A template that uses the configured defaults for every value
    pub fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            magnitude: 0.0,
            duration: 0.0,
            tick_interval: 0.0,
            stacks: 1,
        }
    }

    /// Burning: `damage_per_tick` every tick for `duration` seconds
    pub fn fire(damage_per_tick: f32, duration: f32) -> Self {
        Self {
            magnitude: damage_per_tick,
            duration,
            ..Self::new(StatusKind::Fire)
        }
    }

    /// Chill: slows by `slow` (0.0–1.0) for `duration` seconds
    pub fn ice(slow: f32, duration: f32) -> Self {
        Self {
            magnitude: slow,
            duration,
            ..Self::new(StatusKind::Ice)
        }
    }

    /// Shock: adds `stacks` vulnerability stacks for `duration` seconds
    pub fn lightning(stacks: u32, duration: f32) -> Self {
        Self {
            duration,
            stacks,
            ..Self::new(StatusKind::Lightning)
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: f32) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.stacks = stacks;
        self
    }

    /// Replace out-of-range values with the kind's configured defaults
    pub(crate) fn sanitized(&self, config: &StatusConfig) -> Self {
        let defaults = config.defaults_for(self.kind);
        Self {
            kind: self.kind,
            magnitude: positive_or(self.magnitude, defaults.magnitude),
            duration: positive_or(self.duration, defaults.duration),
            tick_interval: positive_or(self.tick_interval, defaults.tick_interval),
            stacks: self.stacks.max(1),
        }
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// One live status on an actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStatus {
    pub magnitude: f32,
    /// Seconds left; the entry is removed once this reaches zero
    pub remaining: f32,
    pub tick_interval: f32,
    /// Seconds until the next tick fires
    pub tick_timer: f32,
    pub stacks: u32,
    /// Ice only: applications counted toward a freeze
    pub(crate) freeze_progress: u32,
}

impl ActiveStatus {
    pub(crate) fn from_effect(effect: &StatusEffect) -> Self {
        Self {
            magnitude: effect.magnitude,
            remaining: effect.duration,
            tick_interval: effect.tick_interval,
            tick_timer: 0.0,
            stacks: effect.stacks,
            freeze_progress: 0,
        }
    }

    /// Hidden Ice accumulator (applications since the last freeze)
    pub fn freeze_progress(&self) -> u32 {
        self.freeze_progress
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Read-only snapshot of one status, for status icons
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusView {
    pub kind: StatusKind,
    pub magnitude: f32,
    pub remaining: f32,
    pub stacks: u32,
}
