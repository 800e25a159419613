//! Status resolver
//!
//! Drives every actor's [`ActorStatusState`] once per tick and answers the
//! queries the rest of the game makes (movement scale, damage-taken scale,
//! status icons). Applications on unknown actors or on actors that opted out
//! of status tracking are silently ignored.

use tracing::debug;

use crate::actor::{ActorId, ActorTable};
use crate::config::StatusConfig;
use crate::element::{DamageTag, StatusKind};
use crate::intake::{deliver, DamageIntake, HitEvent, HitSource};
use crate::spatial::SpatialQuery;

use super::effect::{StatusEffect, StatusView};
use super::state::{ActorStatusState, ApplyOutcome, StatusTick};

/// Owns status tuning and runs the per-tick status pass
#[derive(Debug, Clone, Default)]
pub struct StatusResolver {
    config: StatusConfig,
}

impl StatusResolver {
    pub fn new(config: StatusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Apply a status to an actor. Never fails.
    pub fn apply_status(
        &self,
        actors: &mut ActorTable,
        target: ActorId,
        effect: &StatusEffect,
    ) -> ApplyOutcome {
        let Some(row) = actors.get_mut(target) else {
            debug!("status {:?} on unknown {} ignored", effect.kind, target);
            return ApplyOutcome::Ignored;
        };
        let Some(state) = row.status_or_insert() else {
            return ApplyOutcome::Ignored;
        };
        let outcome = state.apply(effect, &self.config);
        if outcome == ApplyOutcome::Froze {
            debug!("{} frozen for {}s", target, self.config.freeze_duration);
        }
        outcome
    }

    /// Age all statuses by `dt` and deliver the damage they produce.
    ///
    /// `spatial` must reflect actor positions for this tick; it is used to
    /// pick Lightning mini-chain targets.
    pub fn update(
        &self,
        dt: f32,
        actors: &mut ActorTable,
        spatial: &dyn SpatialQuery,
        intake: &mut dyn DamageIntake,
        hits: &mut Vec<HitEvent>,
    ) {
        let mut ticks = Vec::new();
        let mut nearby = Vec::new();

        for (id, row) in actors.iter_mut() {
            let Some(state) = row.status.as_mut() else {
                continue;
            };
            ticks.clear();
            state.advance(dt, &self.config, &mut ticks);

            for tick in &ticks {
                match *tick {
                    StatusTick::FireDot { amount } => {
                        if amount > 0.0 {
                            deliver(
                                intake,
                                hits,
                                HitEvent {
                                    target: id,
                                    amount,
                                    tag: DamageTag::Fire,
                                    source: HitSource::Burn,
                                },
                            );
                        }
                    }
                    StatusTick::LightningChain => {
                        nearby.clear();
                        let range = self.config.mini_chain_range;
                        spatial.actors_within(row.position, range, &mut nearby);
                        // First neighbor found wins; no distance ranking.
                        if let Some(&target) = nearby.iter().find(|&&other| other != id) {
                            deliver(
                                intake,
                                hits,
                                HitEvent {
                                    target,
                                    amount: self.config.mini_chain_damage,
                                    tag: DamageTag::Lightning,
                                    source: HitSource::Chain { from: id },
                                },
                            );
                        }
                    }
                }
            }
        }
    }

    /// Movement scale for an actor (1.0 when it has no status record)
    pub fn speed_multiplier(&self, actors: &ActorTable, id: ActorId) -> f32 {
        actors
            .status(id)
            .map_or(1.0, ActorStatusState::speed_multiplier)
    }

    /// Incoming damage scale for `tag` (1.0 when it has no status record)
    pub fn damage_taken_multiplier(&self, actors: &ActorTable, id: ActorId, tag: DamageTag) -> f32 {
        actors
            .status(id)
            .map_or(1.0, |state| state.damage_taken_multiplier(tag, &self.config))
    }

    pub fn is_frozen(&self, actors: &ActorTable, id: ActorId) -> bool {
        actors.status(id).is_some_and(ActorStatusState::is_frozen)
    }

    pub fn has_status(&self, actors: &ActorTable, id: ActorId, kind: StatusKind) -> bool {
        actors.status(id).is_some_and(|state| state.has_status(kind))
    }

    /// Remove one status. Removing Ice also thaws the actor.
    pub fn remove_status(&self, actors: &mut ActorTable, id: ActorId, kind: StatusKind) -> bool {
        actors
            .get_mut(id)
            .and_then(|row| row.status.as_mut())
            .is_some_and(|state| state.remove_status(kind))
    }

    /// Drop every status on one actor
    pub fn clear_statuses(&self, actors: &mut ActorTable, id: ActorId) {
        if let Some(state) = actors.get_mut(id).and_then(|row| row.status.as_mut()) {
            state.clear();
        }
    }

    /// Status icons for an actor
    pub fn active_status_effects(&self, actors: &ActorTable, id: ActorId) -> Vec<StatusView> {
        actors
            .status(id)
            .map(ActorStatusState::active_status_effects)
            .unwrap_or_default()
    }

    /// Seconds left on `kind` for an actor (0 if not active)
    pub fn status_duration(&self, actors: &ActorTable, id: ActorId, kind: StatusKind) -> f32 {
        actors
            .status(id)
            .map_or(0.0, |state| state.status_duration(kind))
    }
}
