//! Damage delivery seam
//!
//! The engine decides how much damage lands and where; hit points belong to
//! the host. Every hit goes through [`DamageIntake::take_damage`].

use crate::actor::ActorId;
use crate::element::DamageTag;
use crate::field::FieldId;

/// Implemented by whatever owns actor health
pub trait DamageIntake {
    fn take_damage(&mut self, target: ActorId, amount: f32, tag: DamageTag);
}

/// Where a hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    /// Actor stepped into a field
    FieldEnter(FieldId),
    /// A field's periodic tick
    FieldTick(FieldId),
    /// A propagation pulse reaching a field
    FieldPulse(FieldId),
    /// Fire damage over time on the target itself
    Burn,
    /// Lightning mini chain jumping from another actor
    Chain { from: ActorId },
}

/// One damage application, as delivered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub target: ActorId,
    pub amount: f32,
    pub tag: DamageTag,
    pub source: HitSource,
}

/// Hand a hit to the intake and record it
pub(crate) fn deliver(intake: &mut dyn DamageIntake, hits: &mut Vec<HitEvent>, hit: HitEvent) {
    intake.take_damage(hit.target, hit.amount, hit.tag);
    hits.push(hit);
}
