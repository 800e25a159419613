//! Reference hit-point store
//!
//! A [`DamageIntake`] that keeps hit points per actor, tallies damage per tag,
//! and notifies on-damaged observers (flash, knockback, floating numbers).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::element::{DamageTag, DAMAGE_TAG_COUNT};
use crate::intake::DamageIntake;

/// Hit points for one actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    /// Full health
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// HP as a 0.0-1.0 fraction
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Passed to on-damaged observers after hit points change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    pub target: ActorId,
    pub amount: f32,
    pub tag: DamageTag,
    /// Hit points left after this hit
    pub remaining: f32,
    /// This hit took the actor from alive to dead
    pub killed: bool,
}

type Observer = Box<dyn FnMut(&DamageReport) + Send>;

/// Hit points for every registered actor
#[derive(Default)]
pub struct HealthTable {
    pools: HashMap<ActorId, Health>,
    dealt: [f32; DAMAGE_TAG_COUNT],
    observers: Vec<Observer>,
}

impl fmt::Debug for HealthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthTable")
            .field("pools", &self.pools)
            .field("dealt", &self.dealt)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl HealthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an actor a full pool of `max` hit points
    pub fn insert(&mut self, id: ActorId, max: f32) {
        self.pools.insert(id, Health::new(max));
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Health> {
        self.pools.remove(&id)
    }

    pub fn get(&self, id: ActorId) -> Option<&Health> {
        self.pools.get(&id)
    }

    /// Current hit points (0 for unknown actors)
    pub fn current(&self, id: ActorId) -> f32 {
        self.pools.get(&id).map_or(0.0, |h| h.current)
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.pools.get(&id).is_some_and(Health::is_alive)
    }

    /// Register a callback run after every landed hit
    pub fn on_damaged(&mut self, observer: impl FnMut(&DamageReport) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Total damage landed with `tag`
    pub fn dealt(&self, tag: DamageTag) -> f32 {
        self.dealt[tag.index()]
    }

    /// Total damage landed across all tags
    pub fn dealt_total(&self) -> f32 {
        self.dealt.iter().sum()
    }

    /// Restore every pool to full and zero the tallies
    pub fn reset(&mut self) {
        for health in self.pools.values_mut() {
            health.current = health.max;
        }
        self.dealt = [0.0; DAMAGE_TAG_COUNT];
    }
}

impl DamageIntake for HealthTable {
    fn take_damage(&mut self, target: ActorId, amount: f32, tag: DamageTag) {
        let Some(health) = self.pools.get_mut(&target) else {
            return;
        };
        if !health.is_alive() || !(amount > 0.0) {
            return;
        }

        health.current = (health.current - amount).max(0.0);
        self.dealt[tag.index()] += amount;

        let report = DamageReport {
            target,
            amount,
            tag,
            remaining: health.current,
            killed: !health.is_alive(),
        };
        for observer in &mut self.observers {
            observer(&report);
        }
    }
}
