//! Live field storage and pooling
//!
//! Owns every active [`AreaField`] and a pool of torn-down instances. Each
//! update diffs a spatial query against field membership, ages lifetimes,
//! runs periodic ticks, and retires expired fields back into the pool.

use ember_ecs::Arena;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actor::ActorId;
use crate::damage::DamageRequest;
use crate::element::DamageTag;
use crate::spatial::SpatialQuery;
use crate::status::StatusEffect;

use super::area::{AreaField, FieldContext};
use super::FieldId;

/// Torn-down fields kept around for reuse
const MAX_POOLED: usize = 64;

/// Everything needed to spawn a field, as carried by a weapon definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpec {
    pub radius: f32,
    /// Seconds
    pub lifetime: f32,
    /// Seconds between periodic hits
    pub tick_interval: f32,
    pub damage: DamageRequest,
    pub tag: DamageTag,
    pub status: Option<StatusEffect>,
    /// Whether the field joins the propagation graph
    pub linked: bool,
    /// Pulse damage scale for this field
    pub vulnerability: f32,
    #[serde(skip)]
    pub owner: Option<ActorId>,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            radius: 3.0,
            lifetime: 5.0,
            tick_interval: 1.0,
            damage: DamageRequest::new(5.0),
            tag: DamageTag::Physical,
            status: None,
            linked: false,
            vulnerability: 1.0,
            owner: None,
        }
    }
}

impl FieldSpec {
    /// A field of `tag` damage. Lightning fields are linked by default.
    pub fn new(tag: DamageTag, damage_per_tick: f32) -> Self {
        Self {
            damage: DamageRequest::new(damage_per_tick),
            tag,
            status: tag.status_kind().map(StatusEffect::new),
            linked: tag == DamageTag::Lightning,
            ..Default::default()
        }
    }

    pub fn with_shape(mut self, radius: f32, lifetime: f32, tick_interval: f32) -> Self {
        self.radius = radius;
        self.lifetime = lifetime;
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_status(mut self, status: Option<StatusEffect>) -> Self {
        self.status = status;
        self
    }

    pub fn with_linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }

    pub fn with_vulnerability(mut self, vulnerability: f32) -> Self {
        self.vulnerability = vulnerability;
        self
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Active fields plus the reuse pool
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Arena<AreaField>,
    pool: Vec<AreaField>,
    inside: Vec<ActorId>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build, configure, and activate a field at `position`
    pub fn spawn(&mut self, position: Vec3, spec: &FieldSpec) -> FieldId {
        let mut field = self.acquire();
        let setup = field.setup(
            spec.radius,
            spec.lifetime,
            spec.tick_interval,
            spec.damage.base,
        );
        if let Err(e) = setup {
            warn!("spawned field kept stale setup: {e}");
        }
        field.set_damage_bonus(spec.damage.flat_bonus, spec.damage.percent_bonus);
        field.configure_effect(spec.tag, spec.status);
        field.set_owner(spec.owner);
        field.set_linked(spec.linked);
        field.set_vulnerability(spec.vulnerability);
        field.set_position(position);
        field.activate();

        let id = FieldId(self.fields.insert(field));
        debug!("{} spawned ({:?}, r={})", id, spec.tag, spec.radius);
        id
    }

    fn acquire(&mut self) -> AreaField {
        while let Some(mut field) = self.pool.pop() {
            if field.is_returned() {
                field.reset_for_reuse();
                return field;
            }
            warn!("pooled field was never returned, discarding it");
        }
        AreaField::new()
    }

    /// Tear a field down and hand it to the pool
    fn retire(&mut self, id: FieldId) -> bool {
        let Some(mut field) = self.fields.remove(id.0) else {
            return false;
        };
        field.teardown();
        field.mark_returned();
        if self.pool.len() < MAX_POOLED {
            self.pool.push(field);
        }
        true
    }

    /// Remove a field early. Same teardown as natural expiry.
    pub fn despawn(&mut self, id: FieldId) -> bool {
        self.retire(id)
    }

    /// Remove every field
    pub fn clear(&mut self) {
        for id in self.ids() {
            self.retire(id);
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&AreaField> {
        self.fields.get(id.0)
    }

    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut AreaField> {
        self.fields.get_mut(id.0)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.fields.contains(id.0)
    }

    /// Per-field pulse scale. Returns `false` for stale ids.
    pub fn set_vulnerability(&mut self, id: FieldId, multiplier: f32) -> bool {
        match self.get_mut(id) {
            Some(field) => {
                field.set_vulnerability(multiplier);
                true
            }
            None => false,
        }
    }

    /// Move a field (e.g. one attached to its caster). Returns `false` for stale ids.
    pub fn set_position(&mut self, id: FieldId, position: Vec3) -> bool {
        match self.get_mut(id) {
            Some(field) => {
                field.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &AreaField)> {
        self.fields.iter().map(|(h, field)| (FieldId(h), field))
    }

    pub fn ids(&self) -> Vec<FieldId> {
        self.fields.handles().into_iter().map(FieldId).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Instances waiting in the pool
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Advance every field by `dt`.
    ///
    /// `spatial` must reflect actor positions for this tick.
    pub fn update(&mut self, dt: f32, spatial: &dyn SpatialQuery, ctx: &mut FieldContext<'_>) {
        if !(dt >= 0.0) || !dt.is_finite() {
            return;
        }

        let mut expired = Vec::new();
        let mut inside = std::mem::take(&mut self.inside);

        for (handle, field) in self.fields.iter_mut() {
            let id = FieldId(handle);
            if field.age(dt) {
                expired.push(id);
                continue;
            }

            inside.clear();
            spatial.actors_within(field.position(), field.radius(), &mut inside);
            field.sync_members(id, &inside, ctx);
            field.advance_ticks(id, dt, ctx);
        }

        self.inside = inside;
        for id in expired {
            debug!("{} expired", id);
            self.retire(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorDesc, ActorTable};
    use crate::field::FieldPhase;
    use crate::intake::{DamageIntake, HitEvent, HitSource};
    use crate::spatial::SpatialGrid;
    use crate::status::StatusResolver;

    #[derive(Default)]
    struct Sink;

    impl DamageIntake for Sink {
        fn take_damage(&mut self, _target: ActorId, _amount: f32, _tag: DamageTag) {}
    }

    struct Rig {
        actors: ActorTable,
        resolver: StatusResolver,
        fields: FieldRegistry,
        grid: SpatialGrid<ActorId>,
        hits: Vec<HitEvent>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                actors: ActorTable::new(),
                resolver: StatusResolver::default(),
                fields: FieldRegistry::new(),
                grid: SpatialGrid::new(4.0),
                hits: Vec::new(),
            }
        }

        fn step(&mut self, dt: f32) {
            self.grid.rebuild_actors(&self.actors);
            let mut sink = Sink;
            let mut ctx = FieldContext {
                actors: &mut self.actors,
                resolver: &self.resolver,
                intake: &mut sink,
                hits: &mut self.hits,
            };
            self.fields.update(dt, &self.grid, &mut ctx);
        }

        fn count(&self, source: HitSource) -> usize {
            self.hits.iter().filter(|h| h.source == source).count()
        }
    }

    fn plain(radius: f32, lifetime: f32, tick: f32) -> FieldSpec {
        FieldSpec::new(DamageTag::Physical, 2.0).with_shape(radius, lifetime, tick)
    }

    #[test]
    fn test_enter_tick_exit_reenter() {
        let mut rig = Rig::new();
        let field = rig.fields.spawn(Vec3::ZERO, &plain(2.0, 100.0, 1.0));
        let a = rig.actors.spawn(ActorDesc::enemy(Vec3::new(20.0, 0.0, 0.0)));

        rig.step(0.5);
        assert!(rig.hits.is_empty());

        rig.actors.set_position(a, Vec3::ZERO);
        rig.step(0.25);
        assert_eq!(rig.count(HitSource::FieldEnter(field)), 1);

        // Three more full intervals inside
        for _ in 0..12 {
            rig.step(0.25);
        }
        assert_eq!(rig.count(HitSource::FieldTick(field)), 3);

        rig.actors.set_position(a, Vec3::new(20.0, 0.0, 0.0));
        rig.step(0.25);
        assert!(rig.fields.get(field).unwrap().members().is_empty());
        for _ in 0..8 {
            rig.step(0.25);
        }
        assert_eq!(rig.count(HitSource::FieldTick(field)), 3);

        rig.actors.set_position(a, Vec3::ZERO);
        rig.step(0.25);
        assert_eq!(rig.count(HitSource::FieldEnter(field)), 2);
    }

    #[test]
    fn test_expiry_skips_final_tick_and_pools() {
        let mut rig = Rig::new();
        let field = rig.fields.spawn(Vec3::ZERO, &plain(2.0, 2.0, 1.0));
        rig.actors.spawn(ActorDesc::enemy(Vec3::ZERO));

        for _ in 0..4 {
            rig.step(0.5);
        }
        assert_eq!(rig.count(HitSource::FieldEnter(field)), 1);
        // Tick at t=1 lands, the one at t=2 coincides with expiry
        assert_eq!(rig.count(HitSource::FieldTick(field)), 1);
        assert!(!rig.fields.contains(field));
        assert_eq!(rig.fields.pooled(), 1);
    }

    #[test]
    fn test_reused_instance_carries_no_residue() {
        let mut rig = Rig::new();
        let spec = plain(2.0, 1.0, 0.5).with_vulnerability(4.0);
        let first = rig.fields.spawn(Vec3::ZERO, &spec);
        rig.actors.spawn(ActorDesc::enemy(Vec3::ZERO));
        rig.step(0.25);
        assert_eq!(rig.fields.get(first).unwrap().members().len(), 1);

        rig.fields.despawn(first);
        assert_eq!(rig.fields.pooled(), 1);

        let second = rig.fields.spawn(Vec3::new(50.0, 0.0, 0.0), &plain(1.0, 3.0, 1.0));
        assert_eq!(rig.fields.pooled(), 0);
        assert_ne!(first, second);
        let field = rig.fields.get(second).unwrap();
        assert!(field.members().is_empty());
        assert_eq!(field.vulnerability(), 1.0);
        assert_eq!(field.tick_timer(), 1.0);
        assert_eq!(field.lifetime(), 3.0);
        assert_eq!(field.phase(), FieldPhase::Active);
    }

    #[test]
    fn test_unreturned_pool_entry_is_refused() {
        let mut fields = FieldRegistry::new();
        let mut stale = AreaField::new();
        stale.set_vulnerability(9.0);
        fields.pool.push(stale);

        let id = fields.spawn(Vec3::ZERO, &plain(1.0, 1.0, 1.0));
        assert_eq!(fields.get(id).unwrap().vulnerability(), 1.0);
        assert_eq!(fields.pooled(), 0);
    }

    #[test]
    fn test_clear_retires_everything() {
        let mut fields = FieldRegistry::new();
        for i in 0..3 {
            fields.spawn(Vec3::new(i as f32, 0.0, 0.0), &plain(1.0, 5.0, 1.0));
        }
        fields.clear();
        assert!(fields.is_empty());
        assert_eq!(fields.pooled(), 3);
    }

    #[test]
    fn test_lightning_spec_defaults() {
        let spec = FieldSpec::new(DamageTag::Lightning, 4.0);
        assert!(spec.linked);
        assert_eq!(spec.status.map(|s| s.kind), Some(crate::element::StatusKind::Lightning));
        assert!(!FieldSpec::new(DamageTag::Fire, 4.0).linked);
        assert!(FieldSpec::new(DamageTag::Physical, 4.0).status.is_none());
    }

    #[test]
    fn test_spec_from_toml() {
        let spec: FieldSpec = toml::from_str(
            r#"
            radius = 4.0
            tag = "Fire"
            linked = true
            [damage]
            base = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(spec.radius, 4.0);
        assert_eq!(spec.tag, DamageTag::Fire);
        assert_eq!(spec.damage.base, 3.0);
        assert_eq!(spec.lifetime, 5.0);
        assert!(spec.linked);
    }
}
