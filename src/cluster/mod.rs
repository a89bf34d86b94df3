mod build;
mod markers;
mod personalize;

use std::collections::{BTreeMap, HashMap};

use eframe::egui::vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connections::{Connection, RoutingMode};
use crate::dataset::SynergyRecord;
use crate::geo::Position3;
use crate::layout::ClusterPlane;
use crate::node_id::NodeRef;

pub use build::build_general;
pub use markers::synergy_markers;
pub use personalize::personalize;

/// A laid-out company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub node: NodeRef,
    pub cluster: String,
    pub position: Position3,
    pub maintenance: Vec<Value>,
    pub material_needs: Vec<Value>,
    #[serde(default)]
    pub is_focus: bool,
    /// Member count of the cluster, set on the focus company only.
    #[serde(default)]
    pub focus_segments: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    General,
    Personalized {
        focus: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterLayout {
    pub id: String,
    pub label: String,
    pub description: String,
    pub offset: [f32; 2],
    /// Half-width of the cluster plane around `offset`.
    pub half: f32,
    pub companies: Vec<Company>,
    /// Lane-routed connections.
    pub connections: Vec<Connection>,
    /// Direct-segment connections, same enumeration as `connections`.
    pub natural_connections: Vec<Connection>,
    pub synergy_positions: BTreeMap<NodeRef, Position3>,
    pub synergies: Vec<SynergyRecord>,
    pub mode: LayoutMode,
}

impl ClusterLayout {
    pub fn plane(&self) -> ClusterPlane {
        ClusterPlane::new(vec2(self.offset[0], self.offset[1]), self.half)
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|company| company.id == id)
    }

    pub fn connections_for(&self, routing: RoutingMode) -> &[Connection] {
        match routing {
            RoutingMode::Ordered => &self.connections,
            RoutingMode::Natural => &self.natural_connections,
        }
    }

    pub fn focus(&self) -> Option<&str> {
        match &self.mode {
            LayoutMode::General => None,
            LayoutMode::Personalized { focus } => Some(focus),
        }
    }
}

pub(crate) fn position_map(companies: &[Company]) -> HashMap<&str, Position3> {
    companies
        .iter()
        .map(|company| (company.id.as_str(), company.position))
        .collect()
}
