use std::collections::HashSet;
use std::path::Path;

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LayoutConfig;
use crate::error::{DatasetError, Result};
use crate::geo::{GeoBounds, GeoLocation, Projector};

const SAMPLE_DATASET: &str = include_str!("../assets/sample_dataset.json");

/// Horizontal spacing between clusters that do not declare an offset.
const DEFAULT_CLUSTER_SPACING: f32 = 70.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyState {
    #[default]
    Pending,
    InRfp,
    Recommended,
    Approved,
    CounterOffer,
    Closed,
    Rejected,
}

impl SynergyState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InRfp => "joint RFP",
            Self::Recommended => "recommended",
            Self::Approved => "approved",
            Self::CounterOffer => "counter-offer",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }
}

/// One detected shared-procurement opportunity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyRecord {
    pub id: String,
    #[serde(default)]
    pub material: String,
    /// Participants in source order; pair enumeration and lane assignment follow this order.
    pub companies: Vec<String>,
    #[serde(default)]
    pub volume: f32,
    #[serde(default)]
    pub company_count: u32,
    #[serde(default)]
    pub state: SynergyState,
}

impl SynergyRecord {
    /// `0.6 * min(1, volume / 500) + 0.4 * min(1, company_count / 6)`.
    pub fn strength(&self) -> f32 {
        let volume_factor = (self.volume / 500.0).clamp(0.0, 1.0);
        let company_factor = (self.company_count as f32 / 6.0).clamp(0.0, 1.0);
        volume_factor * 0.6 + company_factor * 0.4
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub offset: Option<[f32; 2]>,
    /// Member filter over the location table; empty means every location.
    #[serde(default)]
    pub companies: Vec<String>,
    /// Fixed arrangement that replaces the relaxed positions, cycled when shorter than the
    /// member list.
    #[serde(default)]
    pub preset: Vec<[f32; 2]>,
    #[serde(default)]
    pub synergies: Vec<SynergyRecord>,
    #[serde(default)]
    pub maintenance: Vec<Value>,
    #[serde(default)]
    pub material_needs: Vec<Value>,
}

impl ClusterDefinition {
    pub fn offset_for(&self, index: usize) -> Vec2 {
        match self.offset {
            Some([x, z]) => vec2(x, z),
            None => vec2(index as f32 * DEFAULT_CLUSTER_SPACING, 0.0),
        }
    }

    /// Member locations in location-table order.
    pub fn member_locations<'a>(&self, locations: &'a [GeoLocation]) -> Vec<&'a GeoLocation> {
        if self.companies.is_empty() {
            return locations.iter().collect();
        }

        let members = self
            .companies
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>();
        locations
            .iter()
            .filter(|location| members.contains(location.company.as_str()))
            .collect()
    }

    pub fn maintenance_for(&self, company: &str) -> Vec<Value> {
        entries_for(&self.maintenance, company)
    }

    pub fn material_needs_for(&self, company: &str) -> Vec<Value> {
        entries_for(&self.material_needs, company)
    }
}

fn entries_for(entries: &[Value], company: &str) -> Vec<Value> {
    entries
        .iter()
        .filter(|entry| entry.get("company").and_then(Value::as_str) == Some(company))
        .cloned()
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub bounds: GeoBounds,
    #[serde(default)]
    pub layout: LayoutConfig,
    pub locations: Vec<GeoLocation>,
    pub clusters: Vec<ClusterDefinition>,
}

impl Dataset {
    pub fn from_json(raw: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The two-cluster dataset bundled with the binary.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_DATASET)
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.bounds, self.layout.surface_size)
    }

    pub fn location(&self, company: &str) -> Option<&GeoLocation> {
        self.locations
            .iter()
            .find(|location| location.company == company)
    }

    pub fn cluster(&self, id: &str) -> Option<&ClusterDefinition> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }

    fn validate(&self) -> Result<()> {
        if !self.bounds.is_valid() {
            return Err(DatasetError::InvalidBounds {
                north: self.bounds.north,
                south: self.bounds.south,
                east: self.bounds.east,
                west: self.bounds.west,
            });
        }

        let surface = self.layout.surface_size;
        if !surface.is_finite() || surface <= 0.0 {
            return Err(DatasetError::InvalidSurface(surface));
        }

        let mut seen = HashSet::new();
        for cluster in &self.clusters {
            if !seen.insert(cluster.id.as_str()) {
                return Err(DatasetError::DuplicateCluster(cluster.id.clone()));
            }
        }

        Ok(())
    }
}
