//! Elemental status system
//!
//! Fire burns, Ice slows and eventually freezes, Lightning stacks a
//! vulnerability and arcs to neighbors.

mod effect;
mod resolver;
mod state;

pub use effect::{ActiveStatus, StatusEffect, StatusView};
pub use resolver::StatusResolver;
pub use state::{ActorStatusState, ApplyOutcome, StatusTick};
