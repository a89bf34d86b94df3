use std::collections::HashMap;

use crate::cache::{LayoutCache, cache_key};
use crate::config::LayoutConfig;
use crate::connections::{Connection, RoutingMode, baseline_connections, synthesize};
use crate::geo::Position3;
use crate::layout::ring_layout;

use super::{ClusterLayout, LayoutMode, position_map, synergy_markers};

/// Radial layout of `base` around `focus`.
///
/// The focus company moves to the cluster offset and every other company, sorted by id, to an
/// evenly spaced ring slot starting at angle zero. Connections are rebuilt against the new
/// positions and only those touching the focus are kept; focus-side endpoints are moved to an
/// anchor on a small circle around the focus, facing the other company. Companies no synergy
/// links to the focus get a baseline connection.
///
/// Always derived from the general layout passed in, so repeated calls give the same result.
/// Returns `None` when `focus` is not a member of `base`.
pub fn personalize(
    base: &ClusterLayout,
    focus: &str,
    config: &LayoutConfig,
    cache: &LayoutCache,
) -> Option<ClusterLayout> {
    let focus_company = base.company(focus)?;
    let plane = base.plane();
    let center = plane.offset;
    let center_height = focus_company.position.y;

    let mut others = base
        .companies
        .iter()
        .filter(|company| company.id != focus)
        .map(|company| company.id.as_str())
        .collect::<Vec<_>>();
    others.sort_unstable();

    let slots = ring_layout(
        center,
        others.len(),
        config.focus_ring_radius(),
        config.focus_anchor_radius,
    );
    let mut targets = HashMap::new();
    let mut anchors = HashMap::new();
    for (company, slot) in others.iter().zip(&slots) {
        targets.insert(*company, plane.clamp(slot.position));
        let anchor = plane.clamp(slot.anchor);
        anchors.insert(*company, Position3::new(anchor.x, center_height, anchor.y));
    }

    let companies = base
        .companies
        .iter()
        .map(|company| {
            let mut company = company.clone();
            if company.id == focus {
                company.position = Position3::new(center.x, center_height, center.y);
                company.is_focus = true;
                company.focus_segments = Some(base.companies.len());
            } else {
                if let Some(target) = targets.get(company.id.as_str()) {
                    company.position = company.position.with_planar(*target);
                }
                company.is_focus = false;
                company.focus_segments = None;
            }
            company
        })
        .collect::<Vec<_>>();

    let positions = position_map(&companies);
    let ids = base
        .companies
        .iter()
        .map(|company| company.id.as_str())
        .collect::<Vec<_>>();
    let synergy_ids = base
        .synergies
        .iter()
        .map(|synergy| synergy.id.as_str())
        .collect::<Vec<_>>();
    let scope = format!("{}/focus={focus}", base.id);

    let [ordered, natural] = [RoutingMode::Ordered, RoutingMode::Natural].map(|routing| {
        let key = cache_key(&scope, &ids, &synergy_ids, routing.as_str());
        cache
            .connections(&key, || {
                synthesize(
                    &base.id,
                    &base.synergies,
                    &positions,
                    plane,
                    routing,
                    config.lane_width,
                )
                .into_iter()
                .filter(|connection| connection.touches(focus))
                .map(|connection| anchor_connection(connection, focus, &anchors))
                .collect()
            })
            .as_ref()
            .clone()
    });

    let members = companies
        .iter()
        .map(|company| (company.id.as_str(), company.position))
        .collect::<Vec<_>>();
    let baseline = baseline_connections(
        &base.id,
        focus,
        &members,
        &ordered,
        config.baseline_strength,
    )
    .into_iter()
    .map(|connection| anchor_connection(connection, focus, &anchors))
    .collect::<Vec<_>>();

    let synergy_positions = synergy_markers(&base.id, &base.synergies, &positions, plane, config);

    Some(ClusterLayout {
        companies,
        connections: ordered.into_iter().chain(baseline.iter().cloned()).collect(),
        natural_connections: natural.into_iter().chain(baseline).collect(),
        synergy_positions,
        mode: LayoutMode::Personalized {
            focus: focus.to_owned(),
        },
        ..base.clone()
    })
}

/// Moves the focus-side endpoint (and the matching end of the path) onto the anchor facing the
/// other company. Heights stay those of the original endpoint.
fn anchor_connection(
    mut connection: Connection,
    focus: &str,
    anchors: &HashMap<&str, Position3>,
) -> Connection {
    if connection.from.company == focus
        && let Some(anchor) = anchors.get(connection.to.company.as_str())
    {
        let anchored = anchor.with_height(connection.from.position.y);
        connection.from.position = anchored;
        if let Some(first) = connection.path.first_mut() {
            *first = anchored;
        }
    }

    if connection.to.company == focus
        && let Some(anchor) = anchors.get(connection.from.company.as_str())
    {
        let anchored = anchor.with_height(connection.to.position.y);
        connection.to.position = anchored;
        if let Some(last) = connection.path.last_mut() {
            *last = anchored;
        }
    }

    connection
}
