//! Planar helpers
//!
//! Gameplay queries ignore height: actors and fields are compared on the
//! XZ ground plane.

use glam::{Vec2, Vec3};

/// Project a world position onto the XZ ground plane.
#[inline]
pub fn planar(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Squared ground-plane distance between two world positions.
#[inline]
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance_squared(planar(b))
}

/// Ground-plane distance between two world positions.
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}
