//! Combat simulation
//!
//! Owns actors, statuses, fields, and the pending-request queue, and advances
//! them together. One [`CombatSim::tick`] runs, in order:
//!
//! 1. drain queued status requests
//! 2. rebuild the actor grid
//! 3. age statuses (burns, mini chains, freeze countdowns)
//! 4. update fields (membership, lifetime, periodic hits, expiry)

use glam::Vec3;
use tracing::{debug, warn};

use crate::actor::{ActorDesc, ActorId, ActorTable};
use crate::config::CombatConfig;
use crate::damage::{elemental_multiplier, DamageRequest};
use crate::element::{DamageTag, StatusKind};
use crate::field::{
    FieldContext, FieldId, FieldPropagationGraph, FieldRegistry, FieldSpec, PulseReport,
};
use crate::intake::{DamageIntake, HitEvent};
use crate::queue::StatusCommandQueue;
use crate::spatial::SpatialGrid;
use crate::status::{ApplyOutcome, StatusEffect, StatusResolver, StatusView};

/// The whole elemental combat state
pub struct CombatSim {
    config: CombatConfig,
    actors: ActorTable,
    resolver: StatusResolver,
    fields: FieldRegistry,
    graph: FieldPropagationGraph,
    grid: SpatialGrid<ActorId>,
    queue: StatusCommandQueue,
    elapsed: f32,
    ticks: u64,
}

impl Default for CombatSim {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatSim {
    pub fn new(config: CombatConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("combat config out of range, running anyway: {e}");
        }
        Self {
            actors: ActorTable::new(),
            resolver: StatusResolver::new(config.status.clone()),
            fields: FieldRegistry::new(),
            graph: FieldPropagationGraph::new(&config.field),
            grid: SpatialGrid::new(config.field.grid_cell_size),
            queue: StatusCommandQueue::new(),
            elapsed: 0.0,
            ticks: 0,
            config,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn actors(&self) -> &ActorTable {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut ActorTable {
        &mut self.actors
    }

    pub fn resolver(&self) -> &StatusResolver {
        &self.resolver
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldRegistry {
        &mut self.fields
    }

    /// Handle for other threads to queue status applications
    pub fn command_queue(&self) -> StatusCommandQueue {
        self.queue.clone()
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn spawn_actor(&mut self, desc: ActorDesc) -> ActorId {
        self.actors.spawn(desc)
    }

    /// Remove an actor and its statuses. Fields drop it on their next update.
    pub fn despawn_actor(&mut self, id: ActorId) -> bool {
        self.actors.despawn(id)
    }

    pub fn set_actor_position(&mut self, id: ActorId, position: Vec3) -> bool {
        self.actors.set_position(id, position)
    }

    pub fn spawn_field(&mut self, position: Vec3, spec: &FieldSpec) -> FieldId {
        self.fields.spawn(position, spec)
    }

    pub fn despawn_field(&mut self, id: FieldId) -> bool {
        self.fields.despawn(id)
    }

    /// Apply a status right now (simulation thread only; see [`CombatSim::command_queue`])
    pub fn apply_status(&mut self, target: ActorId, effect: &StatusEffect) -> ApplyOutcome {
        self.resolver.apply_status(&mut self.actors, target, effect)
    }

    pub fn speed_multiplier(&self, id: ActorId) -> f32 {
        self.resolver.speed_multiplier(&self.actors, id)
    }

    pub fn damage_taken_multiplier(&self, id: ActorId, tag: DamageTag) -> f32 {
        self.resolver.damage_taken_multiplier(&self.actors, id, tag)
    }

    pub fn is_frozen(&self, id: ActorId) -> bool {
        self.resolver.is_frozen(&self.actors, id)
    }

    pub fn has_status(&self, id: ActorId, kind: StatusKind) -> bool {
        self.resolver.has_status(&self.actors, id, kind)
    }

    pub fn remove_status(&mut self, id: ActorId, kind: StatusKind) -> bool {
        self.resolver.remove_status(&mut self.actors, id, kind)
    }

    pub fn active_status_effects(&self, id: ActorId) -> Vec<StatusView> {
        self.resolver.active_status_effects(&self.actors, id)
    }

    pub fn status_duration(&self, id: ActorId, kind: StatusKind) -> f32 {
        self.resolver.status_duration(&self.actors, id, kind)
    }

    /// Final damage of a direct hit on `target`, including its elemental state
    pub fn resolve_damage(&self, target: ActorId, request: DamageRequest, tag: DamageTag) -> f32 {
        let elemental =
            elemental_multiplier(tag, self.actors.status(target), self.resolver.config());
        request.with_elemental(elemental).resolve()
    }

    /// Advance the simulation by `dt` seconds, returning every hit delivered
    pub fn tick(&mut self, dt: f32, intake: &mut dyn DamageIntake) -> Vec<HitEvent> {
        let mut hits = Vec::new();
        if !dt.is_finite() || dt < 0.0 {
            warn!("tick with invalid dt {dt} skipped");
            return hits;
        }

        self.queue.drain_into(&self.resolver, &mut self.actors);
        self.grid.rebuild_actors(&self.actors);

        self.resolver
            .update(dt, &mut self.actors, &self.grid, intake, &mut hits);

        let mut ctx = FieldContext {
            actors: &mut self.actors,
            resolver: &self.resolver,
            intake,
            hits: &mut hits,
        };
        self.fields.update(dt, &self.grid, &mut ctx);

        self.elapsed += dt;
        self.ticks += 1;
        hits
    }

    /// Pulse a linked field and everything reachable from it
    pub fn pulse(
        &mut self,
        start: FieldId,
        damage: f32,
        tick_interval: f32,
        intake: &mut dyn DamageIntake,
    ) -> PulseReport {
        let mut hits = Vec::new();
        let mut ctx = FieldContext {
            actors: &mut self.actors,
            resolver: &self.resolver,
            intake,
            hits: &mut hits,
        };
        self.graph
            .pulse(&mut self.fields, start, damage, tick_interval, &mut ctx)
    }

    /// End the encounter: tear down every field, drop every status and any
    /// queued request. Actors stay.
    pub fn reset(&mut self) {
        self.fields.clear();
        for id in self.actors.ids() {
            self.resolver.clear_statuses(&mut self.actors, id);
        }
        let dropped = self.queue.take().len();
        debug!("combat reset ({} queued requests dropped)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthTable;
    use crate::intake::HitSource;

    #[test]
    fn test_queue_drains_before_statuses_age() {
        let mut sim = CombatSim::default();
        let enemy = sim.spawn_actor(ActorDesc::enemy(Vec3::ZERO));
        let mut health = HealthTable::new();
        health.insert(enemy, 100.0);

        sim.command_queue()
            .push(enemy, StatusEffect::fire(3.0, 2.0).with_tick_interval(0.5));
        let hits = sim.tick(0.25, &mut health);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, HitSource::Burn);
        assert_eq!(health.current(enemy), 97.0);
    }

    #[test]
    fn test_invalid_dt_is_skipped() {
        let mut sim = CombatSim::default();
        let mut health = HealthTable::new();
        assert!(sim.tick(f32::NAN, &mut health).is_empty());
        assert!(sim.tick(-1.0, &mut health).is_empty());
        assert_eq!(sim.tick_count(), 0);
        sim.tick(0.5, &mut health);
        assert_eq!(sim.tick_count(), 1);
        assert_eq!(sim.elapsed(), 0.5);
    }

    #[test]
    fn test_resolve_damage_uses_target_state() {
        let mut sim = CombatSim::default();
        let enemy = sim.spawn_actor(ActorDesc::enemy(Vec3::ZERO));
        sim.apply_status(enemy, &StatusEffect::lightning(3, 5.0));

        let request = DamageRequest::new(10.0).with_percent(0.2);
        assert!((sim.resolve_damage(enemy, request, DamageTag::Lightning) - 15.0).abs() < 1e-4);
        assert!((sim.resolve_damage(enemy, request, DamageTag::Fire) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_tears_down_fields_and_statuses() {
        let mut sim = CombatSim::default();
        let enemy = sim.spawn_actor(ActorDesc::enemy(Vec3::ZERO));
        sim.spawn_field(Vec3::ZERO, &FieldSpec::new(DamageTag::Ice, 1.0));
        let mut health = HealthTable::new();
        health.insert(enemy, 50.0);
        sim.tick(0.25, &mut health);
        assert!(sim.has_status(enemy, StatusKind::Ice));
        sim.command_queue().push(enemy, StatusEffect::fire(1.0, 1.0));

        sim.reset();
        assert!(sim.fields().is_empty());
        assert_eq!(sim.fields().pooled(), 1);
        assert!(sim.active_status_effects(enemy).is_empty());
        assert_eq!(sim.speed_multiplier(enemy), 1.0);
        assert!(sim.command_queue().is_empty());
        assert!(sim.actors().contains(enemy));
    }
}
