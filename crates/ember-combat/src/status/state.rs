//! Per-actor elemental status record

use crate::config::StatusConfig;
use crate::element::{DamageTag, StatusKind, STATUS_KIND_COUNT};

use super::effect::{ActiveStatus, StatusEffect, StatusView};

/// Floor for tick intervals on live entries so a hand-edited entry can't spin the tick loop
const MIN_STATUS_TICK: f32 = 0.01;

/// What an application did to the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing changed (unknown actor, or actor opted out of status tracking)
    Ignored,
    /// A new entry was created
    Applied,
    /// Merged into an existing entry of the same kind
    Merged,
    /// Ice accumulation crossed the threshold and froze the actor
    Froze,
}

/// Work produced by aging an actor's statuses for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusTick {
    /// Direct Fire damage to the owning actor (boss penalty already applied)
    FireDot { amount: f32 },
    /// One Lightning mini chain from the owning actor to a neighbor
    LightningChain,
}

/// All elemental statuses on one actor.
///
/// At most one [`ActiveStatus`] per [`StatusKind`]; reapplying a kind always
/// merges into the existing entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorStatusState {
    slots: [Option<ActiveStatus>; STATUS_KIND_COUNT],
    frozen: bool,
    freeze_timer: f32,
    is_boss: bool,
}

impl ActorStatusState {
    pub fn new(is_boss: bool) -> Self {
        Self {
            is_boss,
            ..Default::default()
        }
    }

    pub fn is_boss(&self) -> bool {
        self.is_boss
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Seconds of freeze left (0 when not frozen)
    pub fn freeze_timer(&self) -> f32 {
        self.freeze_timer
    }

    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.slots[kind.index()].as_ref()
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Whether no status is active and the actor is not frozen
    pub fn is_empty(&self) -> bool {
        !self.frozen && self.slots.iter().all(Option::is_none)
    }

    /// Remove one status. Removing Ice also thaws the actor.
    pub fn remove_status(&mut self, kind: StatusKind) -> bool {
        if kind == StatusKind::Ice {
            self.frozen = false;
            self.freeze_timer = 0.0;
        }
        self.slots[kind.index()].take().is_some()
    }

    /// Drop every status and any freeze
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.frozen = false;
        self.freeze_timer = 0.0;
    }

    /// Merge an application into this record.
    pub fn apply(&mut self, effect: &StatusEffect, config: &StatusConfig) -> ApplyOutcome {
        let effect = effect.sanitized(config);
        match effect.kind {
            StatusKind::Fire => self.apply_fire(&effect),
            StatusKind::Ice => self.apply_ice(&effect, config),
            StatusKind::Lightning => self.apply_lightning(&effect),
        }
    }

    fn apply_fire(&mut self, effect: &StatusEffect) -> ApplyOutcome {
        match &mut self.slots[StatusKind::Fire.index()] {
            Some(burn) => {
                burn.magnitude += effect.magnitude;
                burn.remaining = effect.duration;
                // A refreshed burn keeps its cadence but ticks on the very
                // next update.
                burn.tick_timer = 0.0;
                ApplyOutcome::Merged
            }
            slot @ None => {
                *slot = Some(ActiveStatus::from_effect(effect));
                ApplyOutcome::Applied
            }
        }
    }

    fn apply_ice(&mut self, effect: &StatusEffect, config: &StatusConfig) -> ApplyOutcome {
        let mut slow = effect.magnitude.clamp(0.0, 1.0);
        if self.is_boss {
            slow = slow.min(config.boss_slow_cap);
        }

        let mut outcome = ApplyOutcome::Applied;
        let chill = match &mut self.slots[StatusKind::Ice.index()] {
            Some(chill) => {
                chill.magnitude = chill.magnitude.max(slow);
                chill.remaining = effect.duration;
                chill.tick_interval = effect.tick_interval;
                outcome = ApplyOutcome::Merged;
                chill
            }
            slot @ None => {
                let mut fresh = ActiveStatus::from_effect(effect);
                fresh.magnitude = slow;
                slot.insert(fresh)
            }
        };

        chill.freeze_progress = chill.freeze_progress.saturating_add(effect.stacks);
        if !self.is_boss && chill.freeze_progress >= config.freeze_threshold {
            chill.freeze_progress = 0;
            self.frozen = true;
            self.freeze_timer = config.freeze_duration;
            outcome = ApplyOutcome::Froze;
        }
        outcome
    }

    fn apply_lightning(&mut self, effect: &StatusEffect) -> ApplyOutcome {
        match &mut self.slots[StatusKind::Lightning.index()] {
            Some(shock) => {
                shock.stacks = shock.stacks.saturating_add(effect.stacks);
                shock.remaining = effect.duration;
                shock.tick_interval = effect.tick_interval;
                ApplyOutcome::Merged
            }
            slot @ None => {
                let mut fresh = ActiveStatus::from_effect(effect);
                fresh.tick_timer = effect.tick_interval;
                *slot = Some(fresh);
                ApplyOutcome::Applied
            }
        }
    }

    /// Age every status by `dt`, pushing the ticks that fired onto `ticks`.
    ///
    /// Expiry is checked before ticking: an entry whose duration runs out
    /// during this step is removed without firing.
    pub fn advance(&mut self, dt: f32, config: &StatusConfig, ticks: &mut Vec<StatusTick>) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }

        if self.frozen {
            self.freeze_timer -= dt;
            if self.freeze_timer <= 0.0 {
                self.frozen = false;
                self.freeze_timer = 0.0;
            }
        }

        let dot_factor = if self.is_boss {
            config.boss_dot_factor
        } else {
            1.0
        };

        for &kind in StatusKind::all() {
            let slot = &mut self.slots[kind.index()];
            let Some(status) = slot.as_mut() else { continue };

            status.remaining -= dt;
            if !(status.remaining > 0.0) {
                *slot = None;
                continue;
            }

            if kind == StatusKind::Ice {
                continue;
            }

            let interval = status.tick_interval.max(MIN_STATUS_TICK);
            status.tick_timer -= dt;
            // Re-arm additively so variable frame times don't drift the schedule.
            while status.tick_timer <= 0.0 {
                ticks.push(match kind {
                    StatusKind::Fire => StatusTick::FireDot {
                        amount: status.magnitude * dot_factor,
                    },
                    _ => StatusTick::LightningChain,
                });
                status.tick_timer += interval;
            }
        }
    }

    /// Movement scale: 0 while frozen, reduced by Ice, otherwise 1
    pub fn speed_multiplier(&self) -> f32 {
        if self.frozen {
            return 0.0;
        }
        match self.get(StatusKind::Ice) {
            Some(chill) => 1.0 - chill.magnitude.clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Lightning vulnerability stacks currently held
    pub fn lightning_stacks(&self) -> u32 {
        self.get(StatusKind::Lightning).map_or(0, |shock| shock.stacks)
    }

    /// Multiplier on incoming damage of `tag`. Only Lightning damage is amplified.
    pub fn damage_taken_multiplier(&self, tag: DamageTag, config: &StatusConfig) -> f32 {
        if tag != DamageTag::Lightning {
            return 1.0;
        }
        let bonus = config.amp_per_stack * self.lightning_stacks() as f32;
        1.0 + bonus.min(config.amp_max)
    }

    /// Snapshot of every active status, in kind order
    pub fn active_status_effects(&self) -> Vec<StatusView> {
        StatusKind::all()
            .iter()
            .filter_map(|&kind| {
                self.get(kind).map(|status| StatusView {
                    kind,
                    magnitude: status.magnitude,
                    remaining: status.remaining,
                    stacks: status.stacks,
                })
            })
            .collect()
    }

    /// Seconds left on `kind`, or 0 if it isn't active
    pub fn status_duration(&self, kind: StatusKind) -> f32 {
        self.get(kind).map_or(0.0, |status| status.remaining.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn run(
        state: &mut ActorStatusState,
        config: &StatusConfig,
        dt: f32,
        steps: usize,
    ) -> Vec<StatusTick> {
        let mut ticks = Vec::new();
        for _ in 0..steps {
            state.advance(dt, config, &mut ticks);
        }
        ticks
    }

    fn fire_total(ticks: &[StatusTick]) -> f32 {
        ticks
            .iter()
            .map(|t| match t {
                StatusTick::FireDot { amount } => *amount,
                StatusTick::LightningChain => 0.0,
            })
            .sum()
    }

    #[test]
    fn test_fire_reapply_accumulates_magnitude_and_resets_duration() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        for _ in 0..3 {
            state.apply(&StatusEffect::fire(2.0, 4.0), &config);
            run(&mut state, &config, 0.5, 1);
        }
        state.apply(&StatusEffect::fire(2.0, 4.0), &config);

        let burn = state.get(StatusKind::Fire).unwrap();
        assert_eq!(burn.magnitude, 8.0);
        assert_eq!(burn.remaining, 4.0);
        assert_eq!(state.active_status_effects().len(), 1);
    }

    #[test]
    fn test_fire_refresh_ticks_immediately() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(1.0, 10.0).with_tick_interval(2.0), &config);
        run(&mut state, &config, 0.5, 1);
        assert_eq!(state.get(StatusKind::Fire).unwrap().tick_timer, 1.5);

        state.apply(&StatusEffect::fire(1.0, 10.0).with_tick_interval(2.0), &config);
        let ticks = run(&mut state, &config, 0.5, 1);
        assert_eq!(ticks, vec![StatusTick::FireDot { amount: 2.0 }]);
    }

    #[test]
    fn test_fire_reapply_keeps_tick_interval() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(1.0, 10.0).with_tick_interval(2.0), &config);
        state.apply(&StatusEffect::fire(1.0, 10.0).with_tick_interval(0.5), &config);
        assert_eq!(state.get(StatusKind::Fire).unwrap().tick_interval, 2.0);

        // Next tick lands now, the one after a full 2.0s later
        let ticks = run(&mut state, &config, 0.5, 3);
        assert_eq!(ticks.len(), 1);
        let ticks = run(&mut state, &config, 0.5, 1);
        assert_eq!(ticks.len(), 1);
    }

    #[test]
    fn test_fire_dot_total_over_duration() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(2.0, 4.0).with_tick_interval(0.5), &config);
        let ticks = run(&mut state, &config, 0.25, 40);
        assert_eq!(ticks.len(), 8);
        assert!((fire_total(&ticks) - 16.0).abs() < EPS);
        assert!(!state.has_status(StatusKind::Fire));
    }

    #[test]
    fn test_fire_dot_coarse_frames_lose_no_ticks() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(2.0, 4.0).with_tick_interval(0.5), &config);
        let ticks = run(&mut state, &config, 0.5, 10);
        assert!((fire_total(&ticks) - 16.0).abs() < EPS);
    }

    #[test]
    fn test_boss_fire_dot_is_halved() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(true);
        state.apply(&StatusEffect::fire(2.0, 4.0).with_tick_interval(0.5), &config);
        let ticks = run(&mut state, &config, 0.25, 40);
        assert!((fire_total(&ticks) - 8.0).abs() < EPS);
    }

    #[test]
    fn test_ice_max_wins() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::ice(0.6, 3.0), &config);
        state.apply(&StatusEffect::ice(0.3, 3.0), &config);
        assert!((state.speed_multiplier() - 0.4).abs() < EPS);
    }

    #[test]
    fn test_ice_duration_takes_newest() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::ice(0.5, 5.0), &config);
        state.apply(&StatusEffect::ice(0.2, 1.0), &config);
        assert_eq!(state.status_duration(StatusKind::Ice), 1.0);
    }

    #[test]
    fn test_ice_magnitude_clamped() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::ice(3.0, 3.0), &config);
        assert_eq!(state.get(StatusKind::Ice).unwrap().magnitude, 1.0);
        assert_eq!(state.speed_multiplier(), 0.0);
    }

    #[test]
    fn test_boss_slow_cap_and_no_freeze() {
        let config = StatusConfig {
            boss_slow_cap: 0.3,
            ..Default::default()
        };
        let mut state = ActorStatusState::new(true);
        for _ in 0..50 {
            let outcome = state.apply(&StatusEffect::ice(0.9, 3.0), &config);
            assert_ne!(outcome, ApplyOutcome::Froze);
        }
        assert!(!state.is_frozen());
        assert!((state.speed_multiplier() - 0.7).abs() < EPS);
    }

    #[test]
    fn test_freeze_after_threshold_then_thaw() {
        let config = StatusConfig {
            freeze_threshold: 5,
            freeze_duration: 2.0,
            ..Default::default()
        };
        let mut state = ActorStatusState::new(false);
        for _ in 0..4 {
            assert_ne!(state.apply(&StatusEffect::ice(0.3, 10.0), &config), ApplyOutcome::Froze);
        }
        assert!(!state.is_frozen());
        assert_eq!(state.apply(&StatusEffect::ice(0.3, 10.0), &config), ApplyOutcome::Froze);
        assert!(state.is_frozen());
        assert_eq!(state.speed_multiplier(), 0.0);
        assert_eq!(state.get(StatusKind::Ice).unwrap().freeze_progress(), 0);

        run(&mut state, &config, 0.5, 3);
        assert!(state.is_frozen());
        assert_eq!(state.speed_multiplier(), 0.0);

        run(&mut state, &config, 0.5, 1);
        assert!(!state.is_frozen());
        assert!((state.speed_multiplier() - 0.7).abs() < EPS);
    }

    #[test]
    fn test_ice_stacks_count_toward_freeze() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::ice(0.2, 3.0).with_stacks(3), &config);
        assert!(!state.is_frozen());
        let outcome = state.apply(&StatusEffect::ice(0.2, 3.0).with_stacks(2), &config);
        assert_eq!(outcome, ApplyOutcome::Froze);
    }

    #[test]
    fn test_remove_ice_clears_freeze() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        for _ in 0..config.freeze_threshold {
            state.apply(&StatusEffect::ice(0.3, 3.0), &config);
        }
        assert!(state.is_frozen());
        assert!(state.remove_status(StatusKind::Ice));
        assert!(!state.is_frozen());
        assert_eq!(state.speed_multiplier(), 1.0);
        assert!(!state.remove_status(StatusKind::Ice));
    }

    #[test]
    fn test_lightning_amplifies_only_lightning() {
        let config = StatusConfig {
            amp_per_stack: 0.1,
            amp_max: 0.5,
            ..Default::default()
        };
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::lightning(3, 5.0), &config);
        assert!((state.damage_taken_multiplier(DamageTag::Lightning, &config) - 1.3).abs() < EPS);
        assert_eq!(state.damage_taken_multiplier(DamageTag::Fire, &config), 1.0);
        assert_eq!(state.damage_taken_multiplier(DamageTag::Physical, &config), 1.0);

        state.apply(&StatusEffect::lightning(10, 5.0), &config);
        assert_eq!(state.lightning_stacks(), 13);
        assert!((state.damage_taken_multiplier(DamageTag::Lightning, &config) - 1.5).abs() < EPS);
        assert_eq!(state.damage_taken_multiplier(DamageTag::Ice, &config), 1.0);
    }

    #[test]
    fn test_lightning_reapply_keeps_tick_timer() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::lightning(1, 5.0).with_tick_interval(1.0), &config);
        run(&mut state, &config, 0.25, 3);
        assert_eq!(state.get(StatusKind::Lightning).unwrap().tick_timer, 0.25);

        state.apply(&StatusEffect::lightning(1, 8.0).with_tick_interval(2.0), &config);
        let shock = state.get(StatusKind::Lightning).unwrap();
        assert_eq!(shock.tick_timer, 0.25);
        assert_eq!(shock.tick_interval, 2.0);
        assert_eq!(shock.remaining, 8.0);
        assert_eq!(shock.stacks, 2);

        let ticks = run(&mut state, &config, 0.25, 1);
        assert_eq!(ticks, vec![StatusTick::LightningChain]);
    }

    #[test]
    fn test_expiry_precedes_tick() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::lightning(1, 1.0).with_tick_interval(1.0), &config);
        let ticks = run(&mut state, &config, 0.5, 2);
        assert!(ticks.is_empty());
        assert!(!state.has_status(StatusKind::Lightning));
    }

    #[test]
    fn test_invalid_inputs_use_defaults() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(0.0, -3.0), &config);
        let burn = state.get(StatusKind::Fire).unwrap();
        assert_eq!(burn.magnitude, config.fire.magnitude);
        assert_eq!(burn.remaining, config.fire.duration);
    }

    #[test]
    fn test_corrupt_duration_removed_next_step() {
        let config = StatusConfig::default();
        let mut state = ActorStatusState::new(false);
        state.apply(&StatusEffect::fire(1.0, 2.0), &config);
        if let Some(burn) = state.slots[StatusKind::Fire.index()].as_mut() {
            burn.remaining = -5.0;
        }
        assert_eq!(state.status_duration(StatusKind::Fire), 0.0);
        let ticks = run(&mut state, &config, 0.1, 1);
        assert!(ticks.is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_no_status_means_full_speed() {
        let state = ActorStatusState::new(false);
        assert_eq!(state.speed_multiplier(), 1.0);
        assert_eq!(state.status_duration(StatusKind::Fire), 0.0);
        assert!(state.active_status_effects().is_empty());
    }
}
