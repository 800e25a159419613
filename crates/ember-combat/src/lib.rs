//! Ember Combat - elemental status and area-field engine
//!
//! Resolves Fire burns, Ice slows and freezes, Lightning vulnerability and
//! mini chains, and area fields that tick on whoever stands in them and
//! chain pulses through linked neighbors.

pub mod actor;
pub mod config;
pub mod damage;
pub mod element;
pub mod error;
pub mod field;
pub mod health;
pub mod intake;
pub mod queue;
pub mod sim;
pub mod spatial;
pub mod status;

pub use actor::{ActorDesc, ActorId, ActorRow, ActorTable};
pub use config::{CombatConfig, FieldConfig, KindDefaults, StatusConfig};
pub use damage::{
    compose, compose_with_elemental, diminishing_return, elemental_multiplier, DamageRequest,
    DEFAULT_DIMINISHING_RATE,
};
pub use element::{DamageTag, StatusKind, DAMAGE_TAG_COUNT, STATUS_KIND_COUNT};
pub use error::{ConfigError, FieldError};
pub use field::{
    AreaField, FieldContext, FieldId, FieldPhase, FieldPropagationGraph, FieldRegistry, FieldSpec,
    PulseReport,
};
pub use health::{DamageReport, Health, HealthTable};
pub use intake::{DamageIntake, HitEvent, HitSource};
pub use queue::StatusCommandQueue;
pub use sim::CombatSim;
pub use spatial::{SpatialGrid, SpatialQuery};
pub use status::{
    ActiveStatus, ActorStatusState, ApplyOutcome, StatusEffect, StatusResolver, StatusTick,
    StatusView,
};
