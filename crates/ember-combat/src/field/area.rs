//! Area damage field
//!
//! A positioned, time-boxed zone that hits every actor overlapping it. Fields
//! move through `Spawned -> Active -> Expired`; expiry always wins over a
//! tick that lands on the same step.

use glam::Vec3;
use tracing::warn;

use crate::actor::{ActorId, ActorTable};
use crate::damage::{elemental_multiplier, DamageRequest};
use crate::element::DamageTag;
use crate::error::FieldError;
use crate::intake::{deliver, DamageIntake, HitEvent, HitSource};
use crate::status::{StatusEffect, StatusResolver};

use super::{FieldId, FieldPhase};

/// Smallest tick interval a field will run with
pub const MIN_TICK_INTERVAL: f32 = 0.05;
/// Smallest radius a field will run with
pub const MIN_RADIUS: f32 = 0.1;
/// Shortest lifetime a field will run with
pub const MIN_LIFETIME: f32 = 0.1;

/// Everything a field needs to land hits
pub struct FieldContext<'a> {
    pub actors: &'a mut ActorTable,
    pub resolver: &'a StatusResolver,
    pub intake: &'a mut dyn DamageIntake,
    pub hits: &'a mut Vec<HitEvent>,
}

/// A single damage zone
#[derive(Debug, Clone)]
pub struct AreaField {
    position: Vec3,
    radius: f32,
    lifetime: f32,
    tick_interval: f32,
    tick_timer: f32,
    damage: DamageRequest,
    tag: DamageTag,
    status: Option<StatusEffect>,
    owner: Option<ActorId>,
    members: Vec<ActorId>,
    vulnerability: f32,
    linked: bool,
    phase: FieldPhase,
    returned: bool,
}

impl Default for AreaField {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaField {
    /// A blank field waiting for [`AreaField::setup`]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: MIN_RADIUS,
            lifetime: 0.0,
            tick_interval: MIN_TICK_INTERVAL,
            tick_timer: 0.0,
            damage: DamageRequest::default(),
            tag: DamageTag::Physical,
            status: None,
            owner: None,
            members: Vec::new(),
            vulnerability: 1.0,
            linked: false,
            phase: FieldPhase::Spawned,
            returned: false,
        }
    }

    /// One-time configuration before activation.
    ///
    /// Out-of-range values are clamped with a warning. Rejected once the
    /// field has been activated.
    pub fn setup(
        &mut self,
        radius: f32,
        lifetime: f32,
        tick_interval: f32,
        damage_per_tick: f32,
    ) -> Result<(), FieldError> {
        if self.phase != FieldPhase::Spawned {
            warn!("field setup ignored while {:?}", self.phase);
            return Err(FieldError::AlreadyActive(self.phase));
        }

        self.radius = at_least("radius", radius, MIN_RADIUS);
        self.lifetime = at_least("lifetime", lifetime, MIN_LIFETIME);
        self.tick_interval = at_least("tick interval", tick_interval, MIN_TICK_INTERVAL);
        self.damage.base = at_least("damage per tick", damage_per_tick, 0.0);
        Ok(())
    }

    /// Elemental tag for every hit and the status applied with it
    pub fn configure_effect(&mut self, tag: DamageTag, status: Option<StatusEffect>) {
        self.tag = tag;
        self.status = status;
    }

    /// Flat and percent bonuses folded into every hit
    pub fn set_damage_bonus(&mut self, flat: f32, percent: f32) {
        self.damage.flat_bonus = flat;
        self.damage.percent_bonus = percent;
    }

    /// Actor never counted as a member (usually whoever cast the field)
    pub fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    /// Join or leave the propagation graph
    pub fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    /// Scale this field's own pulse damage. Never spreads to linked fields.
    pub fn set_vulnerability(&mut self, multiplier: f32) {
        if !(multiplier >= 0.0) || !multiplier.is_finite() {
            warn!("field vulnerability {multiplier} out of range, using 1.0");
            self.vulnerability = 1.0;
            return;
        }
        self.vulnerability = multiplier;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Start ticking. The first periodic tick lands one interval from now.
    pub fn activate(&mut self) {
        if self.phase != FieldPhase::Spawned {
            warn!("field activate ignored while {:?}", self.phase);
            return;
        }
        self.members.clear();
        self.tick_timer = self.tick_interval;
        self.phase = FieldPhase::Active;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn tick_interval(&self) -> f32 {
        self.tick_interval
    }

    pub fn tick_timer(&self) -> f32 {
        self.tick_timer
    }

    pub fn damage(&self) -> &DamageRequest {
        &self.damage
    }

    pub fn tag(&self) -> DamageTag {
        self.tag
    }

    pub fn status(&self) -> Option<&StatusEffect> {
        self.status.as_ref()
    }

    pub fn vulnerability(&self) -> f32 {
        self.vulnerability
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == FieldPhase::Active
    }

    /// Actors currently inside, in entry order
    pub fn members(&self) -> &[ActorId] {
        &self.members
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.contains(&actor)
    }

    pub(crate) fn is_returned(&self) -> bool {
        self.returned
    }

    /// Add an actor and hit it once. Already-present actors are ignored.
    pub fn on_enter(&mut self, id: FieldId, actor: ActorId, ctx: &mut FieldContext<'_>) -> bool {
        if !self.is_active() || self.owner == Some(actor) || self.contains(actor) {
            return false;
        }
        self.members.push(actor);
        let request = self.damage;
        self.strike(actor, &request, 1.0, HitSource::FieldEnter(id), ctx);
        true
    }

    /// Remove an actor. No damage.
    pub fn on_exit(&mut self, actor: ActorId) -> bool {
        let before = self.members.len();
        self.members.retain(|&m| m != actor);
        self.members.len() != before
    }

    /// Bring membership in line with the actors found inside this step
    pub(crate) fn sync_members(
        &mut self,
        id: FieldId,
        inside: &[ActorId],
        ctx: &mut FieldContext<'_>,
    ) {
        self.members.retain(|m| inside.contains(m));
        for &actor in inside {
            self.on_enter(id, actor, ctx);
        }
    }

    /// Count down lifetime. Returns `true` once the field has expired.
    pub(crate) fn age(&mut self, dt: f32) -> bool {
        if self.is_active() {
            self.lifetime -= dt;
            if !(self.lifetime > 0.0) {
                self.teardown();
            }
        }
        self.phase == FieldPhase::Expired
    }

    /// Run the periodic tick as many times as `dt` covers
    pub fn advance_ticks(&mut self, id: FieldId, dt: f32, ctx: &mut FieldContext<'_>) -> usize {
        if !self.is_active() {
            return 0;
        }
        let mut fired = 0;
        self.tick_timer -= dt;
        while self.tick_timer <= 0.0 {
            self.tick(id, ctx);
            self.tick_timer += self.tick_interval;
            fired += 1;
        }
        fired
    }

    /// Hit every member once
    pub fn tick(&mut self, id: FieldId, ctx: &mut FieldContext<'_>) {
        for &actor in &self.members {
            self.strike(actor, &self.damage, 1.0, HitSource::FieldTick(id), ctx);
        }
    }

    /// Immediate hit on every member, scaled by this field's vulnerability,
    /// then re-arm the periodic tick with the pulse's parameters.
    pub fn pulse(
        &mut self,
        id: FieldId,
        damage: f32,
        tick_interval: f32,
        ctx: &mut FieldContext<'_>,
    ) {
        if !self.is_active() {
            return;
        }
        let damage = at_least("pulse damage", damage, 0.0);
        let request = DamageRequest {
            base: damage,
            ..self.damage
        };
        let scale = self.vulnerability;
        for &actor in &self.members {
            self.strike(actor, &request, scale, HitSource::FieldPulse(id), ctx);
        }

        self.damage.base = damage;
        self.tick_interval = at_least("pulse tick interval", tick_interval, MIN_TICK_INTERVAL);
        self.tick_timer = self.tick_interval;
    }

    fn strike(
        &self,
        actor: ActorId,
        request: &DamageRequest,
        scale: f32,
        source: HitSource,
        ctx: &mut FieldContext<'_>,
    ) {
        if !ctx.actors.contains(actor) {
            return;
        }
        let elemental = elemental_multiplier(
            self.tag,
            ctx.actors.status(actor),
            ctx.resolver.config(),
        );
        let amount = request.with_elemental(elemental).resolve() * scale;
        if amount > 0.0 {
            deliver(
                ctx.intake,
                ctx.hits,
                HitEvent {
                    target: actor,
                    amount,
                    tag: self.tag,
                    source,
                },
            );
        }
        if let Some(effect) = &self.status {
            ctx.resolver.apply_status(ctx.actors, actor, effect);
        }
    }

    /// Expire now. Shared by natural expiry and forced removal.
    pub(crate) fn teardown(&mut self) {
        self.members.clear();
        self.lifetime = 0.0;
        self.tick_timer = 0.0;
        self.phase = FieldPhase::Expired;
    }

    pub(crate) fn mark_returned(&mut self) {
        self.returned = true;
    }

    /// Wipe a returned instance back to a blank `Spawned` field
    pub(crate) fn reset_for_reuse(&mut self) {
        let mut members = std::mem::take(&mut self.members);
        members.clear();
        *self = Self {
            members,
            ..Self::new()
        };
    }
}

fn at_least(what: &str, value: f32, min: f32) -> f32 {
    if value >= min && value.is_finite() {
        value
    } else {
        warn!("field {what} {value} out of range, clamped to {min}");
        min
    }
}
