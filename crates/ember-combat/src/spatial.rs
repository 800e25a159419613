//! Spatial index
//!
//! Uniform grid over the XZ ground plane for radius queries. Rebuilt from
//! scratch once per tick; queries report entries in a stable order (cell by
//! cell, then insertion order inside a cell), which makes "first neighbor
//! found" selections reproducible.

use std::collections::HashMap;

use ember_core::planar_distance_squared;
use glam::Vec3;

use crate::actor::{ActorId, ActorTable};

/// Radius query over actors, as consumed by the status resolver and fields
pub trait SpatialQuery {
    /// Push every actor whose body overlaps the circle at `center` onto `out`
    fn actors_within(&self, center: Vec3, radius: f32, out: &mut Vec<ActorId>);
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    position: Vec3,
    radius: f32,
}

/// Uniform XZ bucket grid
#[derive(Debug, Clone)]
pub struct SpatialGrid<K> {
    cell: f32,
    buckets: HashMap<(i32, i32), Vec<Entry<K>>>,
    /// Inclusive bounds of the occupied cells, `None` while empty
    bounds: Option<((i32, i32), (i32, i32))>,
    max_radius: f32,
    len: usize,
}

impl<K: Copy> SpatialGrid<K> {
    /// Create an empty grid. Non-positive cell sizes fall back to 1.0.
    pub fn new(cell_size: f32) -> Self {
        let cell = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell,
            buckets: HashMap::new(),
            bounds: None,
            max_radius: 0.0,
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.bounds = None;
        self.max_radius = 0.0;
        self.len = 0;
    }

    /// Cell of `position`. Far-out coordinates saturate into the edge cells.
    fn key(&self, position: Vec3) -> (i32, i32) {
        let cx = (position.x / self.cell).floor() as i32;
        let cz = (position.z / self.cell).floor() as i32;
        (cx, cz)
    }

    /// Insert an entry with a body radius (0 for points)
    pub fn insert(&mut self, key: K, position: Vec3, radius: f32) {
        let radius = radius.max(0.0);
        self.max_radius = self.max_radius.max(radius);
        self.len += 1;
        let cell = self.key(position);
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (
                (lo.0.min(cell.0), lo.1.min(cell.1)),
                (hi.0.max(cell.0), hi.1.max(cell.1)),
            ),
            None => (cell, cell),
        });
        self.buckets.entry(cell).or_default().push(Entry {
            key,
            position,
            radius,
        });
    }

    /// Entries whose body overlaps the circle at `center` with `radius`
    pub fn query_circle(&self, center: Vec3, radius: f32, out: &mut Vec<K>) {
        if !(radius >= 0.0) {
            return;
        }
        let Some((lo, hi)) = self.bounds else {
            return;
        };

        // The scan window is clamped to occupied cells, so huge radii and
        // far-away centers cost no more than the populated area.
        let reach = ((radius + self.max_radius) / self.cell).ceil() as i64;
        let (cx, cz) = self.key(center);
        let x0 = (cx as i64).saturating_sub(reach).max(lo.0 as i64);
        let x1 = (cx as i64).saturating_add(reach).min(hi.0 as i64);
        let z0 = (cz as i64).saturating_sub(reach).max(lo.1 as i64);
        let z1 = (cz as i64).saturating_add(reach).min(hi.1 as i64);
        if x0 > x1 || z0 > z1 {
            return;
        }

        let window = (x1 - x0 + 1).saturating_mul(z1 - z0 + 1);
        if window > self.buckets.len() as i64 {
            // Sparse grid: visit the occupied cells instead, in the same
            // x-then-z order a window scan would use.
            let mut cells: Vec<(i32, i32)> = self
                .buckets
                .keys()
                .copied()
                .filter(|&(x, z)| {
                    (x0..=x1).contains(&(x as i64)) && (z0..=z1).contains(&(z as i64))
                })
                .collect();
            cells.sort_unstable();
            for cell in cells {
                self.collect(cell, center, radius, out);
            }
            return;
        }

        for x in x0..=x1 {
            for z in z0..=z1 {
                // Both stay inside the occupied bounds, which are i32 keys.
                self.collect((x as i32, z as i32), center, radius, out);
            }
        }
    }

    fn collect(&self, cell: (i32, i32), center: Vec3, radius: f32, out: &mut Vec<K>) {
        let Some(bucket) = self.buckets.get(&cell) else {
            return;
        };
        for entry in bucket {
            let limit = radius + entry.radius;
            if planar_distance_squared(center, entry.position) <= limit * limit {
                out.push(entry.key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl SpatialGrid<ActorId> {
    /// Re-index every actor at its current position
    pub fn rebuild_actors(&mut self, actors: &ActorTable) {
        self.clear();
        for (id, row) in actors.iter() {
            self.insert(id, row.position, row.radius);
        }
    }
}

impl SpatialQuery for SpatialGrid<ActorId> {
    fn actors_within(&self, center: Vec3, radius: f32, out: &mut Vec<ActorId>) {
        self.query_circle(center, radius, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorDesc;

    #[test]
    fn test_query_finds_points_in_radius() {
        let mut grid = SpatialGrid::new(4.0);
        grid.insert(1u32, Vec3::new(0.0, 0.0, 0.0), 0.0);
        grid.insert(2u32, Vec3::new(3.0, 0.0, 0.0), 0.0);
        grid.insert(3u32, Vec3::new(10.0, 0.0, 0.0), 0.0);

        let mut out = Vec::new();
        grid.query_circle(Vec3::ZERO, 3.0, &mut out);
        out.sort();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_query_counts_body_radius() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert('a', Vec3::new(9.0, 0.0, 0.0), 2.0);
        let mut out = Vec::new();
        grid.query_circle(Vec3::ZERO, 7.5, &mut out);
        assert_eq!(out, vec!['a']);

        out.clear();
        grid.query_circle(Vec3::ZERO, 6.5, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_negative_coordinates_and_height() {
        let mut grid = SpatialGrid::new(4.0);
        grid.insert(7u8, Vec3::new(-5.0, 40.0, -5.0), 0.0);
        let mut out = Vec::new();
        grid.query_circle(Vec3::new(-4.0, 0.0, -4.0), 1.5, &mut out);
        assert_eq!(out, vec![7]);
    }

    #[test]
    fn test_rebuild_from_actors() {
        let mut actors = ActorTable::new();
        let near = actors.spawn(ActorDesc::enemy(Vec3::new(1.0, 0.0, 1.0)));
        let far = actors.spawn(ActorDesc::enemy(Vec3::new(30.0, 0.0, 0.0)));

        let mut grid = SpatialGrid::new(4.0);
        grid.rebuild_actors(&actors);
        assert_eq!(grid.len(), 2);

        let mut out = Vec::new();
        grid.actors_within(Vec3::ZERO, 2.0, &mut out);
        assert_eq!(out, vec![near]);

        actors.set_position(far, Vec3::ZERO);
        grid.rebuild_actors(&actors);
        out.clear();
        grid.actors_within(Vec3::ZERO, 2.0, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_far_positions_do_not_overflow() {
        let mut grid = SpatialGrid::new(4.0);
        grid.insert(1u32, Vec3::new(1e10, 0.0, 0.0), 0.0);
        grid.insert(2u32, Vec3::new(-1e10, 0.0, -1e10), 0.0);
        grid.insert(3u32, Vec3::ZERO, 0.0);

        let mut out = Vec::new();
        grid.query_circle(Vec3::new(1e10, 0.0, 0.0), 4.0, &mut out);
        assert_eq!(out, vec![1]);

        out.clear();
        grid.query_circle(Vec3::new(-1e10, 0.0, -1e10), 4.0, &mut out);
        assert_eq!(out, vec![2]);
    }

    #[test]
    fn test_infinite_radius_finds_everything() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(1u32, Vec3::new(-50.0, 0.0, 3.0), 0.0);
        grid.insert(2u32, Vec3::new(80.0, 0.0, -20.0), 0.5);
        let mut out = Vec::new();
        grid.query_circle(Vec3::ZERO, f32::INFINITY, &mut out);
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_large_radius_matches_window_order() {
        // A sparse grid takes the occupied-cell path; results keep the
        // x-then-z cell order of a window scan.
        let mut grid = SpatialGrid::new(1.0);
        grid.insert('c', Vec3::new(900.0, 0.0, 0.0), 0.0);
        grid.insert('a', Vec3::new(-900.0, 0.0, 5.0), 0.0);
        grid.insert('b', Vec3::new(-900.0, 0.0, 900.0), 0.0);
        let mut out = Vec::new();
        grid.query_circle(Vec3::ZERO, 4000.0, &mut out);
        assert_eq!(out, vec!['a', 'b', 'c']);

        let mut dense = SpatialGrid::new(1.0);
        dense.insert('z', Vec3::new(1.2, 0.0, 1.2), 0.0);
        dense.insert('y', Vec3::new(1.0, 0.0, 0.0), 0.0);
        dense.insert('x', Vec3::new(0.0, 0.0, 1.0), 0.0);
        dense.insert('w', Vec3::new(0.2, 0.0, 0.2), 0.0);
        out.clear();
        dense.query_circle(Vec3::ZERO, 1.5, &mut out);
        assert_eq!(out, vec!['w', 'x', 'y']);
    }

    #[test]
    fn test_clear_empties_grid() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(1u32, Vec3::ZERO, 5.0);
        grid.clear();
        assert!(grid.is_empty());
        let mut out = Vec::new();
        grid.query_circle(Vec3::ZERO, 10.0, &mut out);
        assert!(out.is_empty());
    }
}
