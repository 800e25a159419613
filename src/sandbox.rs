//! Scripted combat encounter
//!
//! The player stands in the middle of a ring of enemies and cycles three
//! weapons: a fire bolt (direct hit plus burn), a frost nova (Ice field),
//! and a storm line (linked Lightning fields that get pulsed). Enemies walk
//! toward the player at their status-adjusted speed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ember_combat::{
    diminishing_return, ActorDesc, ActorId, CombatSim, DamageIntake, DamageRequest, DamageTag,
    FieldSpec, HealthTable, StatusCommandQueue, StatusEffect, DEFAULT_DIMINISHING_RATE,
};
use ember_core::{planar, planar_distance, GameTime};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::settings::{EncounterSettings, SandboxSettings};

/// Base global percent bonus gained per upgrade, before diminishing returns
const UPGRADE_STEP: f32 = 0.15;
/// Fields in one storm line
const STORM_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeaponKind {
    FireBolt,
    FrostNova,
    StormLine,
}

#[derive(Debug, Clone)]
struct Weapon {
    kind: WeaponKind,
    cooldown: f32,
    timer: f32,
}

impl Weapon {
    fn new(kind: WeaponKind, cooldown: f32) -> Self {
        Self {
            kind,
            cooldown,
            timer: cooldown,
        }
    }
}

/// Totals printed at the end of a run
#[derive(Debug, Clone, Default)]
pub struct EncounterReport {
    pub elapsed: f32,
    pub ticks: u64,
    pub damage: [(DamageTag, f32); 4],
    pub kills: usize,
    pub freezes: usize,
    pub pulses: usize,
    pub pulsed_fields: usize,
    pub survivors: usize,
    pub boss_hp: Option<f32>,
}

/// One encounter in progress
pub struct Sandbox {
    sim: CombatSim,
    health: HealthTable,
    queue: StatusCommandQueue,
    rng: StdRng,
    settings: EncounterSettings,
    player: ActorId,
    enemies: Vec<ActorId>,
    boss: Option<ActorId>,
    weapons: Vec<Weapon>,
    upgrades: u32,
    global_percent: f32,
    upgrade_timer: f32,
    frozen: HashSet<ActorId>,
    freezes: usize,
    pulses: usize,
    pulsed_fields: usize,
    kills: Arc<AtomicUsize>,
}

impl Sandbox {
    pub fn new(settings: &SandboxSettings) -> Self {
        let encounter = settings.encounter.clone();
        let mut rng = StdRng::seed_from_u64(encounter.seed);
        let mut sim = CombatSim::new(settings.combat.clone());
        let mut health = HealthTable::new();

        let player = sim.spawn_actor(ActorDesc::player(Vec3::ZERO));

        let mut enemies = Vec::with_capacity(encounter.enemies as usize);
        for _ in 0..encounter.enemies {
            let position = ring_point(&mut rng, encounter.spawn_min, encounter.spawn_max);
            let id = sim.spawn_actor(ActorDesc::enemy(position));
            health.insert(id, encounter.enemy_hp);
            enemies.push(id);
        }

        let boss = encounter.boss.then(|| {
            let position = ring_point(&mut rng, encounter.spawn_max, encounter.spawn_max + 4.0);
            let id = sim.spawn_actor(ActorDesc::boss(position));
            health.insert(id, encounter.boss_hp);
            id
        });

        let kills = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&kills);
        health.on_damaged(move |report| {
            if report.killed {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        info!(
            "Encounter ready: {} enemies{}, seed {}",
            enemies.len(),
            if boss.is_some() { " + boss" } else { "" },
            encounter.seed
        );

        Self {
            queue: sim.command_queue(),
            sim,
            health,
            rng,
            player,
            enemies,
            boss,
            weapons: vec![
                Weapon::new(WeaponKind::FireBolt, 0.6),
                Weapon::new(WeaponKind::FrostNova, 2.5),
                Weapon::new(WeaponKind::StormLine, 4.0),
            ],
            upgrades: 0,
            global_percent: 0.0,
            upgrade_timer: encounter.upgrade_interval,
            frozen: HashSet::new(),
            freezes: 0,
            pulses: 0,
            pulsed_fields: 0,
            kills,
            settings: encounter,
        }
    }

    /// Run on a jittered frame clock until time runs out or every foe is dead
    pub fn run(&mut self, time: &mut GameTime) -> EncounterReport {
        let base = self.settings.frame_delta.max(0.001);
        while (time.total_time as f32) < self.settings.duration && !self.hostiles().is_empty() {
            let frame = base * self.rng.gen_range(0.8..1.2);
            time.update(frame);
            for _ in 0..time.fixed_steps() {
                self.step(time.fixed_timestep());
            }
        }
        self.report()
    }

    /// One fixed combat tick
    pub fn step(&mut self, dt: f32) {
        self.fire_weapons(dt);
        self.upgrade(dt);
        self.move_enemies(dt);
        self.sim.tick(dt, &mut self.health);
        self.track_freezes();
        self.remove_dead();
    }

    fn hostiles(&self) -> Vec<ActorId> {
        self.enemies.iter().copied().chain(self.boss).collect()
    }

    fn nearest_hostile(&self) -> Option<(ActorId, Vec3)> {
        let origin = self.sim.actors().position(self.player)?;
        self.hostiles()
            .into_iter()
            .filter_map(|id| self.sim.actors().position(id).map(|p| (id, p)))
            .min_by(|a, b| {
                planar_distance(origin, a.1).total_cmp(&planar_distance(origin, b.1))
            })
    }

    fn fire_weapons(&mut self, dt: f32) {
        for i in 0..self.weapons.len() {
            self.weapons[i].timer -= dt;
            if self.weapons[i].timer > 0.0 {
                continue;
            }
            self.weapons[i].timer += self.weapons[i].cooldown;
            match self.weapons[i].kind {
                WeaponKind::FireBolt => self.fire_bolt(),
                WeaponKind::FrostNova => self.frost_nova(),
                WeaponKind::StormLine => self.storm_line(),
            }
        }
    }

    fn fire_bolt(&mut self) {
        let Some((target, _)) = self.nearest_hostile() else {
            return;
        };
        let request = DamageRequest::new(8.0).with_percent(self.global_percent);
        let amount = self.sim.resolve_damage(target, request, DamageTag::Fire);
        self.health.take_damage(target, amount, DamageTag::Fire);
        // Burn lands at the start of the next tick
        self.queue
            .push(target, StatusEffect::fire(1.5, 3.0).with_tick_interval(0.5));
    }

    fn frost_nova(&mut self) {
        let Some(origin) = self.sim.actors().position(self.player) else {
            return;
        };
        let mut spec = FieldSpec::new(DamageTag::Ice, 2.0)
            .with_shape(5.0, 3.0, 0.5)
            .with_status(Some(StatusEffect::ice(0.35, 2.5)))
            .with_owner(self.player);
        spec.damage.percent_bonus = self.global_percent;
        self.sim.spawn_field(origin, &spec);
    }

    fn storm_line(&mut self) {
        let (Some(origin), Some((_, target))) =
            (self.sim.actors().position(self.player), self.nearest_hostile())
        else {
            return;
        };
        let direction = planar(target - origin).normalize_or_zero();
        let direction = if direction == Vec2::ZERO {
            Vec3::X
        } else {
            ground(direction)
        };
        let spacing = self.sim.config().field.link_radius * 0.8;

        let spec = FieldSpec::new(DamageTag::Lightning, 3.0)
            .with_shape(2.5, 4.0, 1.0)
            .with_status(Some(StatusEffect::lightning(1, 4.0)))
            .with_owner(self.player);
        let line: Vec<_> = (1..=STORM_LENGTH)
            .map(|n| {
                self.sim
                    .spawn_field(origin + direction * (spacing * n as f32), &spec)
            })
            .collect();
        // The far end is extra exposed
        if let Some(&last) = line.last() {
            self.sim.fields_mut().set_vulnerability(last, 1.5);
        }

        if let Some(&start) = line.first() {
            let report = self.sim.pulse(start, 6.0, 0.75, &mut self.health);
            self.pulses += 1;
            self.pulsed_fields += report.visited.len();
            debug!(
                "storm pulse reached {} fields, {} hits",
                report.visited.len(),
                report.hits.len()
            );
        }
    }

    fn upgrade(&mut self, dt: f32) {
        self.upgrade_timer -= dt;
        if self.upgrade_timer > 0.0 {
            return;
        }
        self.upgrade_timer += self.settings.upgrade_interval.max(0.1);
        let gain = diminishing_return(UPGRADE_STEP, self.upgrades, DEFAULT_DIMINISHING_RATE);
        self.upgrades += 1;
        self.global_percent += gain;
        info!(
            "Upgrade {}: +{:.1}% damage (total +{:.1}%)",
            self.upgrades,
            gain * 100.0,
            self.global_percent * 100.0
        );
    }

    fn move_enemies(&mut self, dt: f32) {
        let Some(goal) = self.sim.actors().position(self.player) else {
            return;
        };
        for id in self.hostiles() {
            let Some(position) = self.sim.actors().position(id) else {
                continue;
            };
            let to_goal = planar(goal - position);
            let distance = to_goal.length();
            if distance < 1.0 {
                continue;
            }
            let speed = self.settings.enemy_speed * self.sim.speed_multiplier(id);
            let step = (speed * dt).min(distance - 1.0);
            self.sim
                .set_actor_position(id, position + ground(to_goal / distance * step));
        }
    }

    fn track_freezes(&mut self) {
        for id in self.hostiles() {
            if self.sim.is_frozen(id) {
                if self.frozen.insert(id) {
                    self.freezes += 1;
                    debug!("{} frozen", id);
                }
            } else {
                self.frozen.remove(&id);
            }
        }
    }

    fn remove_dead(&mut self) {
        let dead: Vec<ActorId> = self
            .hostiles()
            .into_iter()
            .filter(|&id| !self.health.is_alive(id))
            .collect();
        for id in dead {
            self.sim.despawn_actor(id);
            self.frozen.remove(&id);
            if self.boss == Some(id) {
                info!("Boss defeated at {:.1}s", self.sim.elapsed());
                self.boss = None;
            } else {
                self.enemies.retain(|&e| e != id);
            }
        }
    }

    pub fn report(&self) -> EncounterReport {
        EncounterReport {
            elapsed: self.sim.elapsed(),
            ticks: self.sim.tick_count(),
            damage: [
                DamageTag::Physical,
                DamageTag::Fire,
                DamageTag::Ice,
                DamageTag::Lightning,
            ]
            .map(|tag| (tag, self.health.dealt(tag))),
            kills: self.kills.load(Ordering::Relaxed),
            freezes: self.freezes,
            pulses: self.pulses,
            pulsed_fields: self.pulsed_fields,
            survivors: self.enemies.len(),
            boss_hp: self.boss.map(|id| self.health.current(id)),
        }
    }
}

/// Lift an XZ vector back onto the ground plane
fn ground(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Random point on the ground in a ring around the origin
fn ring_point(rng: &mut StdRng, min: f32, max: f32) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = if max > min { rng.gen_range(min..max) } else { min };
    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::TimeConfig;

    fn small() -> SandboxSettings {
        let mut settings = SandboxSettings::default();
        settings.encounter.enemies = 6;
        settings.encounter.duration = 6.0;
        settings
    }

    #[test]
    fn runs_to_completion() {
        let settings = small();
        let mut sandbox = Sandbox::new(&settings);
        let mut time = GameTime::new(TimeConfig::default());
        let report = sandbox.run(&mut time);

        assert!(report.ticks > 0);
        assert!(report.pulses > 0);
        let total: f32 = report.damage.iter().map(|(_, d)| d).sum();
        assert!(total > 0.0);
        assert!(report.survivors <= 6);
    }

    #[test]
    fn same_seed_same_outcome() {
        let settings = small();
        let a = Sandbox::new(&settings).run(&mut GameTime::default());
        let b = Sandbox::new(&settings).run(&mut GameTime::default());
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.kills, b.kills);
        assert_eq!(a.damage, b.damage);
    }

    #[test]
    fn upgrades_diminish() {
        let mut settings = small();
        settings.encounter.upgrade_interval = 1.0;
        let mut sandbox = Sandbox::new(&settings);
        sandbox.upgrade(1.0);
        let first = sandbox.global_percent;
        sandbox.upgrade(1.0);
        let second = sandbox.global_percent - first;
        assert!((first - UPGRADE_STEP).abs() < 1e-6);
        assert!(second < first);
    }
}
