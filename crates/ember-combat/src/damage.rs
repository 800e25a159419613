//! Damage composition
//!
//! Pure functions shared by every weapon, field, and status. Percent terms are
//! always summed first and applied once:
//!
//! `final = max(0, (base + flat) * (1 + global% + elemental%))`
//!
//! Applying the percent terms one after another gives different numbers, so
//! every caller goes through these functions instead of multiplying by hand.

use serde::{Deserialize, Serialize};

use crate::config::StatusConfig;
use crate::element::DamageTag;
use crate::status::ActorStatusState;

/// Default decay rate for [`diminishing_return`]
pub const DEFAULT_DIMINISHING_RATE: f32 = 0.8;

/// [`diminishing_return`] never drops below this fraction of the base value
const DIMINISHING_FLOOR: f32 = 0.1;

/// `max(0, (base + flat) * (1 + percent))`
pub fn compose(base: f32, flat: f32, percent: f32) -> f32 {
    ((base + flat) * (1.0 + percent)).max(0.0)
}

/// `max(0, (base + flat) * (1 + global_percent + elemental_percent))`
pub fn compose_with_elemental(
    base: f32,
    flat: f32,
    global_percent: f32,
    elemental_percent: f32,
) -> f32 {
    compose(base, flat, global_percent + elemental_percent)
}

/// The target's damage-taken multiplier for `tag`, as a signed percent.
///
/// Actors without a status record take neutral damage (0.0).
pub fn elemental_multiplier(
    tag: DamageTag,
    state: Option<&ActorStatusState>,
    config: &StatusConfig,
) -> f32 {
    state.map_or(0.0, |s| s.damage_taken_multiplier(tag, config) - 1.0)
}

/// `max(base * 0.1, base * rate^applied_count)`, never negative.
///
/// Used for repeated purchases of the same upgrade.
pub fn diminishing_return(base: f32, applied_count: u32, rate: f32) -> f32 {
    let exponent = applied_count.min(i32::MAX as u32) as i32;
    let decayed = base * rate.powi(exponent);
    decayed.max(base * DIMINISHING_FLOOR).max(0.0)
}

/// One damage computation's inputs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageRequest {
    pub base: f32,
    pub flat_bonus: f32,
    /// Global percent bonus (0.25 = +25%)
    pub percent_bonus: f32,
    /// Elemental percent from the target's state (see [`elemental_multiplier`])
    pub elemental_percent: f32,
}

impl DamageRequest {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    pub fn with_flat(mut self, flat_bonus: f32) -> Self {
        self.flat_bonus = flat_bonus;
        self
    }

    pub fn with_percent(mut self, percent_bonus: f32) -> Self {
        self.percent_bonus = percent_bonus;
        self
    }

    pub fn with_elemental(mut self, elemental_percent: f32) -> Self {
        self.elemental_percent = elemental_percent;
        self
    }

    /// Final non-negative damage
    pub fn resolve(&self) -> f32 {
        compose_with_elemental(
            self.base,
            self.flat_bonus,
            self.percent_bonus,
            self.elemental_percent,
        )
    }
}
