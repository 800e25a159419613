//! Actor table
//!
//! Every combat participant is a row keyed by a generational [`ActorId`].
//! The status record is created on the first elemental application and is
//! dropped with the row.

use std::fmt;

use ember_ecs::{Arena, Handle};
use glam::Vec3;

use crate::status::ActorStatusState;

/// Stable handle to an actor row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub(crate) Handle);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Spawn parameters for an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorDesc {
    pub position: Vec3,
    /// Body radius used for overlap tests
    pub radius: f32,
    pub is_boss: bool,
    /// Actors that opt out silently ignore every status application
    pub tracks_status: bool,
}

impl ActorDesc {
    /// The player character
    pub fn player(position: Vec3) -> Self {
        Self {
            position,
            radius: 0.5,
            is_boss: false,
            tracks_status: true,
        }
    }

    /// A common enemy
    pub fn enemy(position: Vec3) -> Self {
        Self {
            position,
            radius: 0.5,
            is_boss: false,
            tracks_status: true,
        }
    }

    /// A boss: capped slows, no freeze, reduced burn damage
    pub fn boss(position: Vec3) -> Self {
        Self {
            position,
            radius: 1.5,
            is_boss: true,
            tracks_status: true,
        }
    }

    /// A damageable object with no elemental bookkeeping (crates, totems)
    pub fn prop(position: Vec3) -> Self {
        Self {
            position,
            radius: 0.5,
            is_boss: false,
            tracks_status: false,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// One actor's combat-relevant data
#[derive(Debug, Clone)]
pub struct ActorRow {
    pub position: Vec3,
    pub radius: f32,
    is_boss: bool,
    tracks_status: bool,
    pub(crate) status: Option<ActorStatusState>,
}

impl ActorRow {
    fn new(desc: ActorDesc) -> Self {
        Self {
            position: desc.position,
            radius: desc.radius.max(0.0),
            is_boss: desc.is_boss,
            tracks_status: desc.tracks_status,
            status: None,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.is_boss
    }

    pub fn tracks_status(&self) -> bool {
        self.tracks_status
    }

    /// Status record, if any status was ever applied
    pub fn status(&self) -> Option<&ActorStatusState> {
        self.status.as_ref()
    }

    /// Status record, created on first use. `None` for actors that opted out.
    pub(crate) fn status_or_insert(&mut self) -> Option<&mut ActorStatusState> {
        if !self.tracks_status {
            return None;
        }
        let is_boss = self.is_boss;
        Some(self.status.get_or_insert_with(|| ActorStatusState::new(is_boss)))
    }
}

/// Central actor storage
#[derive(Default)]
pub struct ActorTable {
    rows: Arena<ActorRow>,
}

impl ActorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, desc: ActorDesc) -> ActorId {
        ActorId(self.rows.insert(ActorRow::new(desc)))
    }

    /// Remove an actor and its status record. Returns `false` for stale ids.
    pub fn despawn(&mut self, id: ActorId) -> bool {
        self.rows.remove(id.0).is_some()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.rows.contains(id.0)
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorRow> {
        self.rows.get(id.0)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorRow> {
        self.rows.get_mut(id.0)
    }

    pub fn position(&self, id: ActorId) -> Option<Vec3> {
        self.get(id).map(|row| row.position)
    }

    /// Move an actor. Returns `false` for stale ids.
    pub fn set_position(&mut self, id: ActorId, position: Vec3) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.position = position;
                true
            }
            None => false,
        }
    }

    pub fn status(&self, id: ActorId) -> Option<&ActorStatusState> {
        self.get(id).and_then(ActorRow::status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &ActorRow)> {
        self.rows.iter().map(|(h, row)| (ActorId(h), row))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ActorId, &mut ActorRow)> {
        self.rows.iter_mut().map(|(h, row)| (ActorId(h), row))
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.rows.handles().into_iter().map(ActorId).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_lookup() {
        let mut actors = ActorTable::new();
        let a = actors.spawn(ActorDesc::enemy(Vec3::new(1.0, 0.0, 2.0)));
        let b = actors.spawn(ActorDesc::boss(Vec3::ZERO));
        assert_eq!(actors.len(), 2);
        assert_eq!(actors.position(a), Some(Vec3::new(1.0, 0.0, 2.0)));
        assert!(actors.get(b).unwrap().is_boss());
        assert!(actors.status(a).is_none());
    }

    #[test]
    fn test_despawned_id_is_stale() {
        let mut actors = ActorTable::new();
        let a = actors.spawn(ActorDesc::enemy(Vec3::ZERO));
        assert!(actors.despawn(a));
        let b = actors.spawn(ActorDesc::enemy(Vec3::ZERO));
        assert_ne!(a, b);
        assert!(!actors.contains(a));
        assert!(!actors.set_position(a, Vec3::ONE));
        assert!(!actors.despawn(a));
    }

    #[test]
    fn test_status_created_lazily() {
        let mut actors = ActorTable::new();
        let boss = actors.spawn(ActorDesc::boss(Vec3::ZERO));
        let prop = actors.spawn(ActorDesc::prop(Vec3::ZERO));

        let state = actors.get_mut(boss).unwrap().status_or_insert().unwrap();
        assert!(state.is_boss());
        assert!(actors.status(boss).is_some());

        assert!(actors.get_mut(prop).unwrap().status_or_insert().is_none());
        assert!(actors.status(prop).is_none());
    }

    #[test]
    fn test_negative_radius_clamped() {
        let mut actors = ActorTable::new();
        let a = actors.spawn(ActorDesc::enemy(Vec3::ZERO).with_radius(-2.0));
        assert_eq!(actors.get(a).unwrap().radius, 0.0);
    }
}
