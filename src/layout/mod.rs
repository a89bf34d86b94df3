mod force;
mod normalize;
mod radial;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::dataset::SynergyRecord;
use crate::geo::Position3;

pub use force::{Relaxation, expand_to_bounds, force_layout, relax};
pub use normalize::{normalize_positions, spread_positions};
pub use radial::{RingSlot, ring_layout};

pub(crate) const EPSILON: f32 = 1e-3;

/// Clamps both plane axes into `[center - half, center + half]`.
pub fn clamp_to_square(point: Vec2, center: Vec2, half: f32) -> Vec2 {
    vec2(
        point.x.clamp(center.x - half, center.x + half),
        point.y.clamp(center.y - half, center.y + half),
    )
}

/// The bounded square a cluster lives on: `[offset - half, offset + half]` on both plane axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterPlane {
    pub offset: Vec2,
    pub half: f32,
}

impl ClusterPlane {
    pub fn new(offset: Vec2, half: f32) -> Self {
        Self { offset, half }
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        clamp_to_square(point, self.offset, self.half)
    }

    /// Clamps the plane coordinates and keeps the height.
    pub fn clamp_position(&self, position: Position3) -> Position3 {
        position.with_planar(self.clamp(position.planar()))
    }

    pub fn contains(&self, position: Position3) -> bool {
        let local = position.planar() - self.offset;
        local.x.abs() <= self.half + EPSILON && local.y.abs() <= self.half + EPSILON
    }
}

/// Attraction edges for the force layout: every 2-combination of each synergy's participants,
/// in participant-list order. Repeated pairs are kept so their springs add up.
pub fn synergy_edges(company_ids: &[&str], synergies: &[SynergyRecord]) -> Vec<(usize, usize)> {
    let index_by_id = company_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect::<HashMap<_, _>>();

    let mut edges = Vec::new();
    for synergy in synergies {
        for (i, first) in synergy.companies.iter().enumerate() {
            for second in &synergy.companies[i + 1..] {
                if let Some(&source) = index_by_id.get(first.as_str())
                    && let Some(&target) = index_by_id.get(second.as_str())
                    && source != target
                {
                    edges.push((source, target));
                }
            }
        }
    }
    edges
}
