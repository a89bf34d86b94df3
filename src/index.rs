use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterLayout, Company};
use crate::connections::{Connection, RoutingMode};
use crate::geo::Position3;
use crate::node_id::{NodeKind, NodeRef};

/// Resolved position of one company or synergy marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub node: NodeRef,
    pub kind: NodeKind,
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergy: Option<String>,
    pub position: Position3,
}

/// Everything rendering needs, flattened across clusters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AtlasIndex {
    pub routing: RoutingMode,
    pub focus: Option<String>,
    pub clusters: Vec<ClusterLayout>,
    pub nodes: BTreeMap<NodeRef, NodeEntry>,
    #[serde(skip)]
    cluster_index: HashMap<String, usize>,
}

impl AtlasIndex {
    pub fn aggregate(
        clusters: Vec<ClusterLayout>,
        routing: RoutingMode,
        focus: Option<String>,
    ) -> Self {
        let mut nodes = BTreeMap::new();
        for cluster in &clusters {
            for company in &cluster.companies {
                nodes.insert(
                    company.node.clone(),
                    NodeEntry {
                        node: company.node.clone(),
                        kind: NodeKind::Company,
                        cluster: cluster.id.clone(),
                        company: Some(company.id.clone()),
                        synergy: None,
                        position: company.position,
                    },
                );
            }

            for synergy in &cluster.synergies {
                let node = NodeRef::synergy(&cluster.id, &synergy.id);
                let Some(&position) = cluster.synergy_positions.get(&node) else {
                    continue;
                };
                nodes.insert(
                    node.clone(),
                    NodeEntry {
                        node,
                        kind: NodeKind::Synergy,
                        cluster: cluster.id.clone(),
                        company: None,
                        synergy: Some(synergy.id.clone()),
                        position,
                    },
                );
            }
        }

        let cluster_index = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| (cluster.id.clone(), index))
            .collect();

        Self {
            routing,
            focus,
            clusters,
            nodes,
            cluster_index,
        }
    }

    pub fn cluster(&self, id: &str) -> Option<&ClusterLayout> {
        self.cluster_index
            .get(id)
            .and_then(|index| self.clusters.get(*index))
    }

    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.companies.iter())
    }

    /// Connections of every cluster for the active routing mode.
    pub fn connections(&self) -> Vec<Connection> {
        self.connections_for(self.routing)
    }

    pub fn connections_for(&self, routing: RoutingMode) -> Vec<Connection> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.connections_for(routing).iter().cloned())
            .collect()
    }

    pub fn synergy_positions(&self) -> impl Iterator<Item = (&NodeRef, &Position3)> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.synergy_positions.iter())
    }

    pub fn node(&self, node: &NodeRef) -> Option<&NodeEntry> {
        self.nodes.get(node)
    }

    /// Looks up a `kind|cluster|entity` string; malformed or unknown ids give `None`.
    pub fn lookup(&self, raw: &str) -> Option<&NodeEntry> {
        self.nodes.get(&NodeRef::parse(raw)?)
    }

    pub fn company(&self, node: &NodeRef) -> Option<&Company> {
        if !node.is_company() {
            return None;
        }
        self.cluster(&node.cluster)?.company(&node.entity)
    }
}
