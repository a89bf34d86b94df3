use std::collections::HashSet;

use eframe::egui::vec2;
use tracing::{debug, warn};

use crate::cache::{LayoutCache, cache_key};
use crate::config::LayoutConfig;
use crate::connections::{RoutingMode, synthesize};
use crate::dataset::{ClusterDefinition, Dataset};
use crate::geo::Position3;
use crate::layout::{ClusterPlane, force_layout, normalize_positions, synergy_edges};
use crate::node_id::NodeRef;

use super::{ClusterLayout, Company, LayoutMode, position_map, synergy_markers};

/// Force-directed layout of one cluster with all members visible.
///
/// Projection, normalization and relaxation happen in cluster-local coordinates; the relaxed
/// positions are memoized in `cache`. A non-empty `preset` replaces them. The result is then
/// moved onto the cluster plane at its offset and clamped to it.
pub fn build_general(
    definition: &ClusterDefinition,
    index: usize,
    dataset: &Dataset,
    config: &LayoutConfig,
    cache: &LayoutCache,
) -> ClusterLayout {
    let cluster = definition.id.as_str();
    let members = definition.member_locations(&dataset.locations);
    let ids = members
        .iter()
        .map(|location| location.company.as_str())
        .collect::<Vec<_>>();
    let synergy_ids = definition
        .synergies
        .iter()
        .map(|synergy| synergy.id.as_str())
        .collect::<Vec<_>>();

    report_unresolved(definition, &ids);

    let projector = dataset.projector();
    let projected = members
        .iter()
        .map(|location| projector.project(location.lat, location.lon, 0.0))
        .collect::<Vec<_>>();
    let normalized = normalize_positions(&projected, config);

    let scope = format!("{cluster}/general");
    let relaxed = cache.layout(&cache_key(&scope, &ids, &synergy_ids, "layout"), || {
        let initial = normalized
            .iter()
            .map(|position| position.planar())
            .collect::<Vec<_>>();
        let edges = synergy_edges(&ids, &definition.synergies);
        let relaxation = force_layout(&initial, &edges, config);
        debug!(
            cluster,
            nodes = initial.len(),
            edges = edges.len(),
            iterations = relaxation.iterations,
            converged = relaxation.converged,
            "force layout finished"
        );
        relaxation
    });

    let offset = definition.offset_for(index);
    let plane = ClusterPlane::new(offset, config.allowed_half());

    let companies = members
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let local = match definition.preset.len() {
                0 => relaxed.positions.get(i).copied().unwrap_or_default(),
                len => {
                    let [x, z] = definition.preset[i % len];
                    vec2(x, z)
                }
            };
            let planar = plane.clamp(local + offset);
            let height = normalized.get(i).map_or(0.0, |position| position.y);

            Company {
                id: location.company.clone(),
                name: location.name.clone(),
                node: NodeRef::company(cluster, &location.company),
                cluster: cluster.to_owned(),
                position: Position3::new(planar.x, height, planar.y),
                maintenance: definition.maintenance_for(&location.company),
                material_needs: definition.material_needs_for(&location.company),
                is_focus: false,
                focus_segments: None,
            }
        })
        .collect::<Vec<_>>();

    let positions = position_map(&companies);
    let [connections, natural_connections] = [RoutingMode::Ordered, RoutingMode::Natural].map(
        |routing| {
            let key = cache_key(&scope, &ids, &synergy_ids, routing.as_str());
            cache
                .connections(&key, || {
                    synthesize(
                        cluster,
                        &definition.synergies,
                        &positions,
                        plane,
                        routing,
                        config.lane_width,
                    )
                })
                .as_ref()
                .clone()
        },
    );
    let synergy_positions =
        synergy_markers(cluster, &definition.synergies, &positions, plane, config);

    ClusterLayout {
        id: definition.id.clone(),
        label: definition.label.clone(),
        description: definition.description.clone(),
        offset: [offset.x, offset.y],
        half: plane.half,
        companies,
        connections,
        natural_connections,
        synergy_positions,
        synergies: definition.synergies.clone(),
        mode: LayoutMode::General,
    }
}

fn report_unresolved(definition: &ClusterDefinition, ids: &[&str]) {
    let known = ids.iter().copied().collect::<HashSet<_>>();
    for synergy in &definition.synergies {
        for company in &synergy.companies {
            if !known.contains(company.as_str()) {
                warn!(
                    cluster = %definition.id,
                    synergy = %synergy.id,
                    company = %company,
                    "synergy participant is not a member of the cluster"
                );
            }
        }
    }
}
