//! Ember Core - shared types for the Ember combat workspace
//!
//! This crate provides the foundational pieces used by the other crates:
//! - Mathematical primitives (re-exported from glam)
//! - Planar (XZ) distance helpers for top-down gameplay queries
//! - Fixed-step game clock

pub mod planar;
pub mod time;

pub use glam::{Vec2, Vec3};
pub use planar::{planar, planar_distance, planar_distance_squared};
pub use time::{GameTime, TimeConfig};
