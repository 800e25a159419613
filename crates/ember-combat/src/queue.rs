//! Cross-thread status requests
//!
//! Weapon logic running off the simulation thread pushes status
//! applications here; the simulation drains them in arrival order at the
//! start of each tick so per-actor merge order stays well defined.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::actor::{ActorId, ActorTable};
use crate::status::{ApplyOutcome, StatusEffect, StatusResolver};

/// Shared FIFO of pending `apply_status` calls. Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct StatusCommandQueue {
    pending: Arc<Mutex<Vec<(ActorId, StatusEffect)>>>,
}

impl StatusCommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an application for the next tick
    pub fn push(&self, target: ActorId, effect: StatusEffect) {
        self.pending.lock().push((target, effect));
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Take everything queued so far, oldest first
    pub fn take(&self) -> Vec<(ActorId, StatusEffect)> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Apply every queued request in arrival order. Returns how many changed state.
    pub fn drain_into(&self, resolver: &StatusResolver, actors: &mut ActorTable) -> usize {
        self.take()
            .into_iter()
            .map(|(target, effect)| resolver.apply_status(actors, target, &effect))
            .filter(|outcome| *outcome != ApplyOutcome::Ignored)
            .count()
    }
}
