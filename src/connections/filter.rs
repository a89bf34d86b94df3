use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::node_id::{NodeKind, NodeRef};

use super::{Connection, ConnectionKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionViewMode {
    #[default]
    All,
    /// Only the strongest connections.
    Key,
    /// Only connections touching the selected company.
    Focus,
}

impl ConnectionViewMode {
    pub const ALL: [Self; 3] = [Self::All, Self::Key, Self::Focus];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Key => "Key",
            Self::Focus => "Focus",
        }
    }
}

const KEY_MIN_CONNECTIONS: usize = 5;
const KEY_FRACTION: f32 = 0.25;

/// Synergy connections visible under `mode` for the current selection.
///
/// `All` ignores the selection. Under `Key` and `Focus` a selected synergy node yields exactly
/// that synergy's connections. `Key` keeps the `max(5, ceil(n / 4))` strongest with ties kept in input order.
pub fn filter_connections<'a>(
    connections: &'a [Connection],
    mode: ConnectionViewMode,
    selection: Option<&NodeRef>,
) -> Vec<&'a Connection> {
    let base = connections
        .iter()
        .filter(|connection| connection.kind == ConnectionKind::Synergy);

    if mode != ConnectionViewMode::All
        && let Some(selected) = selection
        && selected.kind == NodeKind::Synergy
    {
        return base
            .filter(|connection| {
                connection.cluster == selected.cluster
                    && connection
                        .synergy()
                        .is_some_and(|record| record.id == selected.entity)
            })
            .collect();
    }

    match mode {
        ConnectionViewMode::All => base.collect(),
        ConnectionViewMode::Focus => match selection {
            Some(selected) if selected.is_company() => base
                .filter(|connection| {
                    connection.cluster == selected.cluster && connection.touches(&selected.entity)
                })
                .collect(),
            _ => Vec::new(),
        },
        ConnectionViewMode::Key => {
            let mut sorted = base.collect::<Vec<_>>();
            sorted.sort_by(|a, b| b.strength.total_cmp(&a.strength));
            let limit = KEY_MIN_CONNECTIONS
                .max((sorted.len() as f32 * KEY_FRACTION).ceil() as usize);
            sorted.truncate(limit);
            sorted
        }
    }
}

/// Synergy nodes referenced by the given connections.
pub fn active_synergies(connections: &[&Connection]) -> BTreeSet<NodeRef> {
    connections
        .iter()
        .filter_map(|connection| {
            connection
                .synergy()
                .map(|record| NodeRef::synergy(&connection.cluster, &record.id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::Vec2;

    use crate::connections::{RoutingMode, baseline_connections, synthesize};
    use crate::dataset::SynergyRecord;
    use crate::geo::Position3;
    use crate::layout::ClusterPlane;

    use super::*;

    fn record(id: &str, companies: &[&str], volume: f32) -> SynergyRecord {
        SynergyRecord {
            id: id.to_owned(),
            companies: companies.iter().map(|c| (*c).to_owned()).collect(),
            volume,
            company_count: companies.len() as u32,
            ..SynergyRecord::default()
        }
    }

    fn fixture() -> Vec<Connection> {
        let positions = HashMap::from([
            ("a", Position3::new(-5.0, 0.0, -5.0)),
            ("b", Position3::new(5.0, 0.0, -5.0)),
            ("c", Position3::new(5.0, 0.0, 5.0)),
            ("d", Position3::new(-5.0, 0.0, 5.0)),
        ]);
        let synergies = [
            record("big", &["a", "b", "c", "d"], 400.0),
            record("small", &["c", "d"], 5.0),
            record("mid", &["b", "d"], 100.0),
        ];
        let mut connections = synthesize(
            "c1",
            &synergies,
            &positions,
            ClusterPlane::new(Vec2::ZERO, 22.0),
            RoutingMode::Natural,
            6,
        );
        let companies = [("a", positions["a"]), ("z", Position3::default())];
        let baseline = baseline_connections("c1", "a", &companies, &connections, 0.05);
        connections.extend(baseline);
        connections
    }

    #[test]
    fn all_keeps_only_synergy_connections() {
        let connections = fixture();
        assert_eq!(connections.len(), 9);
        let visible = filter_connections(&connections, ConnectionViewMode::All, None);
        assert_eq!(visible.len(), 8);
    }

    #[test]
    fn key_keeps_the_strongest_five() {
        let connections = fixture();
        let visible = filter_connections(&connections, ConnectionViewMode::Key, None);
        assert_eq!(visible.len(), 5);
        assert!(visible.windows(2).all(|pair| pair[0].strength >= pair[1].strength));
        assert!(visible.iter().all(|c| c.synergy().is_some_and(|s| s.id != "small")));
        // ties stay in input order
        assert_eq!(visible[0].id, "connection|c1|natural-big-0-1");
    }

    #[test]
    fn focus_needs_a_selected_company() {
        let connections = fixture();
        assert!(filter_connections(&connections, ConnectionViewMode::Focus, None).is_empty());

        let selected = NodeRef::company("c1", "d");
        let visible = filter_connections(&connections, ConnectionViewMode::Focus, Some(&selected));
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|c| c.touches("d")));

        let elsewhere = NodeRef::company("c2", "d");
        assert!(
            filter_connections(&connections, ConnectionViewMode::Focus, Some(&elsewhere))
                .is_empty()
        );
    }

    #[test]
    fn selected_synergy_narrows_key_and_focus() {
        let connections = fixture();
        let selected = NodeRef::synergy("c1", "mid");
        for mode in [ConnectionViewMode::Key, ConnectionViewMode::Focus] {
            let visible = filter_connections(&connections, mode, Some(&selected));
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].id, "connection|c1|natural-mid-0-1");
        }
    }

    #[test]
    fn all_ignores_a_selected_synergy() {
        let connections = fixture();
        let selected = NodeRef::synergy("c1", "mid");
        let visible = filter_connections(&connections, ConnectionViewMode::All, Some(&selected));
        assert_eq!(visible.len(), 8);
        assert_eq!(visible, filter_connections(&connections, ConnectionViewMode::All, None));
    }

    #[test]
    fn active_synergies_are_collected_per_cluster() {
        let connections = fixture();
        let visible = filter_connections(&connections, ConnectionViewMode::All, None);
        let active = active_synergies(&visible);
        assert_eq!(active.len(), 3);
        assert!(active.contains(&NodeRef::synergy("c1", "small")));
    }
}
