//! Pulse propagation over linked fields
//!
//! Linked fields whose centers sit within `link_radius` of each other form an
//! undirected graph. A pulse starting at one field walks that graph breadth
//! first and reaches every field in the start's connected component exactly
//! once. The graph is snapshotted when the pulse starts, so fields spawned
//! by the pulse's own hits never join it.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::config::FieldConfig;
use crate::intake::HitEvent;
use crate::spatial::SpatialGrid;

use super::area::FieldContext;
use super::registry::FieldRegistry;
use super::FieldId;

/// Outcome of one pulse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PulseReport {
    /// Fields pulsed, in visit order
    pub visited: Vec<FieldId>,
    /// Damage applications delivered by the pulse
    pub hits: Vec<HitEvent>,
}

impl PulseReport {
    pub fn reached(&self, id: FieldId) -> bool {
        self.visited.contains(&id)
    }
}

/// Breadth-first pulse walker
#[derive(Debug, Clone)]
pub struct FieldPropagationGraph {
    link_radius: f32,
    grid: SpatialGrid<FieldId>,
}

impl FieldPropagationGraph {
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            link_radius: config.link_radius.max(0.0),
            grid: SpatialGrid::new(config.grid_cell_size),
        }
    }

    pub fn link_radius(&self) -> f32 {
        self.link_radius
    }

    /// Index every active linked field at its current position
    fn snapshot(&mut self, fields: &FieldRegistry) {
        self.grid.clear();
        for (id, field) in fields.iter() {
            if field.is_linked() && field.is_active() {
                self.grid.insert(id, field.position(), 0.0);
            }
        }
    }

    /// Pulse `start` and everything linked to it.
    ///
    /// Each visited field hits its members once (scaled by its own
    /// vulnerability) and re-arms its periodic tick with `damage` and
    /// `tick_interval`. Unlinked, expired, or stale starts do nothing.
    pub fn pulse(
        &mut self,
        fields: &mut FieldRegistry,
        start: FieldId,
        damage: f32,
        tick_interval: f32,
        ctx: &mut FieldContext<'_>,
    ) -> PulseReport {
        let mut report = PulseReport::default();
        let linked = fields
            .get(start)
            .is_some_and(|f| f.is_linked() && f.is_active());
        if !linked {
            debug!("pulse from {} ignored: not an active linked field", start);
            return report;
        }

        self.snapshot(fields);
        let hits_before = ctx.hits.len();

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut neighbors = Vec::new();

        while let Some(current) = queue.pop_front() {
            let Some(field) = fields.get_mut(current) else {
                continue;
            };
            field.pulse(current, damage, tick_interval, ctx);
            report.visited.push(current);

            neighbors.clear();
            self.grid
                .query_circle(field.position(), self.link_radius, &mut neighbors);
            for &next in &neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        report.hits = ctx.hits[hits_before..].to_vec();
        debug!(
            "pulse from {} reached {} fields, {} hits",
            start,
            report.visited.len(),
            report.hits.len()
        );
        report
    }
}
