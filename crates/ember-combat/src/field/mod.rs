//! Area fields and pulse propagation

mod area;
mod propagation;
mod registry;

use std::fmt;

use ember_ecs::Handle;

pub use area::{AreaField, FieldContext, MIN_LIFETIME, MIN_RADIUS, MIN_TICK_INTERVAL};
pub use propagation::{FieldPropagationGraph, PulseReport};
pub use registry::{FieldRegistry, FieldSpec};

/// Stable handle to a live field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) Handle);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Lifecycle of an [`AreaField`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    /// Built, waiting for setup and activation
    Spawned,
    /// Tracking members and ticking
    Active,
    /// Torn down; only good for the pool
    Expired,
}
