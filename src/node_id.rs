use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Company,
    Synergy,
    Provider,
    Rfp,
    Offer,
    Event,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Synergy => "synergy",
            Self::Provider => "provider",
            Self::Rfp => "rfp",
            Self::Offer => "offer",
            Self::Event => "event",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "company" => Self::Company,
            "synergy" => Self::Synergy,
            "provider" => Self::Provider,
            "rfp" => Self::Rfp,
            "offer" => Self::Offer,
            "event" => Self::Event,
            _ => return None,
        })
    }
}

/// Structured node identifier, rendered as `kind|cluster|entity`.
///
/// The entity part may itself contain `|`; everything after the second separator belongs to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeRef {
    pub kind: NodeKind,
    pub cluster: String,
    pub entity: String,
}

impl NodeRef {
    pub fn company(cluster: &str, company: &str) -> Self {
        Self {
            kind: NodeKind::Company,
            cluster: cluster.to_owned(),
            entity: company.to_owned(),
        }
    }

    pub fn synergy(cluster: &str, synergy: &str) -> Self {
        Self {
            kind: NodeKind::Synergy,
            cluster: cluster.to_owned(),
            entity: synergy.to_owned(),
        }
    }

    /// Returns `None` for anything that is not `kind|cluster|entity` with a known kind and
    /// non-empty parts.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, '|');
        let kind = parts.next().filter(|part| !part.is_empty())?;
        let cluster = parts.next().filter(|part| !part.is_empty())?;
        let entity = parts.next()?;

        Some(Self {
            kind: NodeKind::parse(kind)?,
            cluster: cluster.to_owned(),
            entity: entity.to_owned(),
        })
    }

    pub fn is_company(&self) -> bool {
        self.kind == NodeKind::Company
    }

    pub fn is_synergy(&self) -> bool {
        self.kind == NodeKind::Synergy
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.kind.as_str(), self.cluster, self.entity)
    }
}

impl From<NodeRef> for String {
    fn from(value: NodeRef) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for NodeRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("malformed node reference `{value}`"))
    }
}
