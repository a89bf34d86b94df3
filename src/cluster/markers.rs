use std::collections::{BTreeMap, HashMap};

use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::dataset::SynergyRecord;
use crate::geo::Position3;
use crate::layout::ClusterPlane;
use crate::node_id::NodeRef;

/// Floating marker per synergy at the centroid of its resolved participants.
///
/// A synergy with a single resolved participant is pushed `marker_solo_offset` away from it,
/// along an angle taken from the first character of its id, so it does not hide the company.
/// Synergies with no resolved participant get no marker.
pub fn synergy_markers(
    cluster: &str,
    synergies: &[SynergyRecord],
    positions: &HashMap<&str, Position3>,
    plane: ClusterPlane,
    config: &LayoutConfig,
) -> BTreeMap<NodeRef, Position3> {
    let mut markers = BTreeMap::new();

    for synergy in synergies {
        let resolved = synergy
            .companies
            .iter()
            .filter_map(|company| positions.get(company.as_str()))
            .map(|position| position.planar())
            .collect::<Vec<_>>();
        if resolved.is_empty() {
            continue;
        }

        let centroid = resolved.iter().fold(Vec2::ZERO, |acc, point| acc + *point)
            / resolved.len() as f32;
        let nudge = if resolved.len() == 1 {
            Vec2::angled(marker_angle(&synergy.id)) * config.marker_solo_offset
        } else {
            Vec2::ZERO
        };

        let planar = plane.clamp(centroid + nudge);
        markers.insert(
            NodeRef::synergy(cluster, &synergy.id),
            Position3::new(planar.x, config.marker_elevation, planar.y),
        );
    }

    markers
}

fn marker_angle(id: &str) -> f32 {
    let code = id.chars().next().map_or(0, u32::from);
    ((code % 360) as f32).to_radians()
}
