use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::geo::Position3;

use super::{Connection, ConnectionKind};

/// Shared midpoint and fan-out line of a bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleGeometry {
    pub midpoint: Position3,
    /// Unit plane direction from the path start to its end.
    pub tangent: Vec2,
    pub length: f32,
    pub spacing: f32,
    /// Signed distance of each member from the midpoint along `tangent` when fully expanded.
    pub offsets: Vec<f32>,
}

impl BundleGeometry {
    pub fn new(path: &[Position3], members: usize, config: &LayoutConfig) -> Self {
        let length = path_length(path);
        let spacing = if length > 0.0 {
            config
                .bundle_max_spacing
                .min(length / (members as f32 + 1.0))
        } else {
            config.bundle_fallback_spacing
        };

        let tangent = match (path.first(), path.last()) {
            (Some(start), Some(end)) => {
                let direction = end.planar() - start.planar();
                if direction.length() > 0.0 {
                    direction.normalized()
                } else {
                    Vec2::X
                }
            }
            _ => Vec2::X,
        };

        let center = (members as f32 - 1.0) / 2.0;
        let offsets = (0..members)
            .map(|index| (index as f32 - center) * spacing)
            .collect();

        Self {
            midpoint: path_midpoint(path),
            tangent,
            length,
            spacing,
            offsets,
        }
    }

    /// Member `index` at expansion `progress` (0 collapsed, 1 fully fanned out).
    pub fn member_position(&self, index: usize, progress: f32) -> Position3 {
        let offset = self.offsets.get(index).copied().unwrap_or(0.0) * progress.clamp(0.0, 1.0);
        let planar = self.midpoint.planar() + self.tangent * offset;
        self.midpoint.with_planar(planar)
    }

    pub fn member_positions(&self, progress: f32) -> Vec<Position3> {
        (0..self.offsets.len())
            .map(|index| self.member_position(index, progress))
            .collect()
    }
}

/// Synergy connections sharing one company pair within a cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
    /// `cluster|a|b`, companies sorted.
    pub key: String,
    /// Indices into the grouped slice, in input order.
    pub members: Vec<usize>,
    pub geometry: BundleGeometry,
}

/// Partition of a connection slice: every index lands in exactly one bundle or in `singles`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionGroups {
    pub bundles: Vec<Bundle>,
    pub singles: Vec<usize>,
}

impl ConnectionGroups {
    pub fn len(&self) -> usize {
        self.singles.len() + self.bundles.iter().map(|bundle| bundle.members.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups synergy connections by [`Connection::pair_key`]. Keys with more than one member
/// become bundles in order of first appearance; everything else, including non-synergy
/// connections, stays single. The bundle midpoint follows the first member's path.
pub fn group_connections(connections: &[&Connection], config: &LayoutConfig) -> ConnectionGroups {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    let mut singles = Vec::new();

    for (index, connection) in connections.iter().enumerate() {
        if connection.kind != ConnectionKind::Synergy {
            singles.push(index);
            continue;
        }

        let key = connection.pair_key();
        by_key
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(index);
    }

    let mut bundles = Vec::new();
    for key in order {
        let Some(members) = by_key.remove(&key) else {
            continue;
        };
        if members.len() < 2 {
            singles.extend(members);
            continue;
        }

        let geometry = BundleGeometry::new(&connections[members[0]].path, members.len(), config);
        bundles.push(Bundle {
            key,
            members,
            geometry,
        });
    }

    singles.sort_unstable();
    ConnectionGroups { bundles, singles }
}

pub fn path_length(path: &[Position3]) -> f32 {
    path.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// Point halfway along the path by arc length.
pub fn path_midpoint(path: &[Position3]) -> Position3 {
    let Some(&first) = path.first() else {
        return Position3::default();
    };

    let half = path_length(path) / 2.0;
    if half <= 0.0 {
        return first;
    }

    let mut walked = 0.0;
    for pair in path.windows(2) {
        let segment = pair[0].distance(pair[1]);
        if walked + segment >= half {
            let t = if segment > 0.0 {
                (half - walked) / segment
            } else {
                0.0
            };
            return pair[0].lerp(pair[1], t);
        }
        walked += segment;
    }

    path.last().copied().unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use crate::connections::{
        ConnectionPayload, RoutingMode, baseline_connections, orthogonal_path, synthesize,
    };
    use crate::dataset::SynergyRecord;
    use crate::layout::ClusterPlane;

    use super::*;

    fn record(id: &str, companies: &[&str]) -> SynergyRecord {
        SynergyRecord {
            id: id.to_owned(),
            companies: companies.iter().map(|c| (*c).to_owned()).collect(),
            volume: 50.0,
            company_count: companies.len() as u32,
            ..SynergyRecord::default()
        }
    }

    fn sample_connections(mode: RoutingMode) -> Vec<Connection> {
        let positions = HashMap::from([
            ("a", Position3::new(0.0, 0.0, 0.0)),
            ("b", Position3::new(10.0, 0.0, 0.0)),
            ("c", Position3::new(0.0, 0.0, 10.0)),
        ]);
        let synergies = [
            record("s1", &["a", "b"]),
            record("s2", &["b", "a"]),
            record("s3", &["a", "b", "c"]),
        ];
        synthesize(
            "c1",
            &synergies,
            &positions,
            ClusterPlane::new(Vec2::ZERO, 22.0),
            mode,
            6,
        )
    }

    #[test]
    fn midpoint_walks_by_arc_length() {
        let path = [
            Position3::new(0.0, 0.0, 0.0),
            Position3::new(0.0, 0.0, 2.0),
            Position3::new(6.0, 0.0, 2.0),
        ];
        assert_eq!(path_length(&path), 8.0);
        assert!(path_midpoint(&path).distance(Position3::new(2.0, 0.0, 2.0)) < 1e-5);
        assert_eq!(path_midpoint(&path[..1]), path[0]);
        assert_eq!(path_midpoint(&[]), Position3::default());
    }

    #[test]
    fn three_synergies_on_one_pair_form_one_bundle() {
        let config = LayoutConfig::default();
        let connections = sample_connections(RoutingMode::Ordered);
        let refs = connections.iter().collect::<Vec<_>>();
        let groups = group_connections(&refs, &config);

        assert_eq!(groups.bundles.len(), 1);
        let bundle = &groups.bundles[0];
        assert_eq!(bundle.key, "c1|a|b");
        assert_eq!(bundle.members.len(), 3);

        let first_path = &connections[bundle.members[0]].path;
        assert_eq!(bundle.geometry.midpoint, path_midpoint(first_path));

        let collapsed = bundle.geometry.member_positions(0.0);
        assert!(collapsed.iter().all(|p| *p == bundle.geometry.midpoint));

        let expanded = bundle.geometry.member_positions(1.0);
        let mid = bundle.geometry.midpoint;
        assert!(expanded[0].distance(expanded[1]) > 0.1);
        assert!(expanded[1].distance(expanded[2]) > 0.1);
        assert!(expanded[1].distance(mid) < 1e-5);
        assert!((expanded[0].distance(mid) - expanded[2].distance(mid)).abs() < 1e-5);
        let centroid = expanded[0].lerp(expanded[2], 0.5);
        assert!(centroid.distance(mid) < 1e-5);
    }

    #[test]
    fn partition_is_complete() {
        let config = LayoutConfig::default();
        let mut connections = sample_connections(RoutingMode::Natural);
        let companies = [
            ("a", Position3::new(0.0, 0.0, 0.0)),
            ("b", Position3::new(10.0, 0.0, 0.0)),
            ("c", Position3::new(0.0, 0.0, 10.0)),
            ("d", Position3::new(10.0, 0.0, 10.0)),
        ];
        let baseline = baseline_connections("c1", "a", &companies, &connections, 0.05);
        connections.extend(baseline);

        let refs = connections.iter().collect::<Vec<_>>();
        let groups = group_connections(&refs, &config);
        assert_eq!(groups.len(), connections.len());

        let mut seen = groups
            .bundles
            .iter()
            .flat_map(|bundle| bundle.members.iter().copied())
            .chain(groups.singles.iter().copied())
            .collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, (0..connections.len()).collect::<Vec<_>>());

        for single in &groups.singles {
            let connection = &connections[*single];
            if connection.payload == ConnectionPayload::Baseline {
                continue;
            }
            assert_ne!(connection.pair_key(), "c1|a|b");
        }
    }

    #[test]
    fn spacing_follows_path_length() {
        let config = LayoutConfig::default();
        let long = orthogonal_path(Position3::default(), Position3::new(40.0, 0.0, 0.0), 0, 1);
        assert_eq!(BundleGeometry::new(&long, 3, &config).spacing, config.bundle_max_spacing);

        let short = [Position3::default(), Position3::new(4.0, 0.0, 0.0)];
        assert!((BundleGeometry::new(&short, 3, &config).spacing - 1.0).abs() < 1e-6);

        let point = [Position3::default(), Position3::default()];
        let degenerate = BundleGeometry::new(&point, 2, &config);
        assert_eq!(degenerate.spacing, config.bundle_fallback_spacing);
        assert_eq!(degenerate.tangent, Vec2::X);
    }
}
