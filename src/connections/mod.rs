mod bundle;
mod filter;
mod grouping;
mod routing;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::SynergyRecord;
use crate::geo::Position3;
use crate::layout::ClusterPlane;
use crate::node_id::NodeRef;

pub use bundle::BundleState;
pub use filter::{ConnectionViewMode, active_synergies, filter_connections};
pub use grouping::{
    Bundle, BundleGeometry, ConnectionGroups, group_connections, path_length, path_midpoint,
};
pub use routing::{direct_path, orthogonal_path};

/// Which of the two parallel connection lists is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Lane-routed orthogonal paths.
    #[default]
    Ordered,
    /// Straight segments between endpoints.
    Natural,
}

impl RoutingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Natural => "natural",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Ordered => Self::Natural,
            Self::Natural => Self::Ordered,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Self::Ordered => "synergy",
            Self::Natural => "natural",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Synergy,
    /// Faint focus-to-company line used when no synergy covers the pair.
    Baseline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConnectionPayload {
    Synergy(SynergyRecord),
    Baseline,
    None,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub company: String,
    pub node: NodeRef,
    pub position: Position3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub cluster: String,
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub strength: f32,
    pub path: Vec<Position3>,
    pub payload: ConnectionPayload,
}

impl Connection {
    pub fn synergy(&self) -> Option<&SynergyRecord> {
        match &self.payload {
            ConnectionPayload::Synergy(record) => Some(record),
            ConnectionPayload::Baseline | ConnectionPayload::None => None,
        }
    }

    pub fn touches(&self, company: &str) -> bool {
        self.from.company == company || self.to.company == company
    }

    /// The endpoint opposite `company`, if `company` is one of the two.
    pub fn other_end(&self, company: &str) -> Option<&str> {
        if self.from.company == company {
            Some(&self.to.company)
        } else if self.to.company == company {
            Some(&self.from.company)
        } else {
            None
        }
    }

    /// `cluster|a|b` with the two companies sorted.
    pub fn pair_key(&self) -> String {
        let (first, second) = if self.from.company <= self.to.company {
            (&self.from.company, &self.to.company)
        } else {
            (&self.to.company, &self.from.company)
        };
        format!("{}|{first}|{second}", self.cluster)
    }
}

/// Enumerates every participant pair `(i, j)`, `i < j`, of every synergy in participant-list
/// order and routes one connection per pair.
///
/// Pairs with an endpoint missing from `positions` are skipped, as are pairs naming the same
/// company twice. In ordered mode the lane index is the number of connections emitted so far
/// in this call. Endpoints and every path point are clamped to `plane`.
pub fn synthesize(
    cluster: &str,
    synergies: &[SynergyRecord],
    positions: &HashMap<&str, Position3>,
    plane: ClusterPlane,
    mode: RoutingMode,
    lanes_per_group: usize,
) -> Vec<Connection> {
    let mut connections = Vec::new();

    for synergy in synergies {
        let strength = synergy.strength();
        for (i, first) in synergy.companies.iter().enumerate() {
            for (j, second) in synergy.companies.iter().enumerate().skip(i + 1) {
                if first == second {
                    continue;
                }
                let (Some(&from), Some(&to)) =
                    (positions.get(first.as_str()), positions.get(second.as_str()))
                else {
                    continue;
                };

                let path = match mode {
                    RoutingMode::Ordered => {
                        orthogonal_path(from, to, connections.len(), lanes_per_group)
                    }
                    RoutingMode::Natural => direct_path(from, to),
                };

                connections.push(Connection {
                    id: format!(
                        "connection|{cluster}|{}-{}-{i}-{j}",
                        mode.id_prefix(),
                        synergy.id
                    ),
                    cluster: cluster.to_owned(),
                    from: endpoint(cluster, first, plane.clamp_position(from)),
                    to: endpoint(cluster, second, plane.clamp_position(to)),
                    kind: ConnectionKind::Synergy,
                    strength,
                    path: path
                        .into_iter()
                        .map(|point| plane.clamp_position(point))
                        .collect(),
                    payload: ConnectionPayload::Synergy(synergy.clone()),
                });
            }
        }
    }

    connections
}

/// Direct low-strength connections from `focus` to every company in `companies` that no
/// connection in `existing` already links to it.
pub fn baseline_connections(
    cluster: &str,
    focus: &str,
    companies: &[(&str, Position3)],
    existing: &[Connection],
    strength: f32,
) -> Vec<Connection> {
    let Some(&(_, focus_position)) = companies.iter().find(|(company, _)| *company == focus)
    else {
        return Vec::new();
    };

    let covered = existing
        .iter()
        .filter_map(|connection| connection.other_end(focus))
        .filter(|other| *other != focus)
        .collect::<HashSet<_>>();

    companies
        .iter()
        .filter(|(company, _)| *company != focus && !covered.contains(company))
        .map(|&(company, position)| Connection {
            id: format!("connection|{cluster}|baseline-{focus}-{company}"),
            cluster: cluster.to_owned(),
            from: endpoint(cluster, focus, focus_position),
            to: endpoint(cluster, company, position),
            kind: ConnectionKind::Baseline,
            strength,
            path: direct_path(focus_position, position),
            payload: ConnectionPayload::Baseline,
        })
        .collect()
}

fn endpoint(cluster: &str, company: &str, position: Position3) -> Endpoint {
    Endpoint {
        company: company.to_owned(),
        node: NodeRef::company(cluster, company),
        position,
    }
}
