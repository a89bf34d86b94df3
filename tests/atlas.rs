use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use synergy_atlas::connections::{filter_connections, group_connections, path_midpoint};
use synergy_atlas::{
    Atlas, AtlasIndex, ConnectionKind, ConnectionViewMode, Dataset, LayoutConfig, NodeKind,
    NodeRef, RoutingMode,
};

fn sample() -> Dataset {
    Dataset::sample().expect("bundled dataset parses")
}

fn without_presets() -> Dataset {
    let mut dataset = sample();
    for cluster in &mut dataset.clusters {
        cluster.preset.clear();
    }
    dataset
}

fn assert_on_planes(index: &AtlasIndex) {
    for cluster in &index.clusters {
        let plane = cluster.plane();
        for company in &cluster.companies {
            assert!(plane.contains(company.position), "{}", company.node);
        }
        for connection in cluster.connections.iter().chain(&cluster.natural_connections) {
            assert!(connection.path.len() >= 2, "{}", connection.id);
            for point in &connection.path {
                assert!(plane.contains(*point), "{}", connection.id);
            }
        }
        for (node, marker) in &cluster.synergy_positions {
            assert!(plane.contains(*marker), "{node}");
        }
    }
}

#[test]
fn sample_layout_stays_on_cluster_planes() {
    let atlas = Atlas::new(sample());
    assert_eq!(atlas.index().clusters.len(), 2);
    assert_on_planes(atlas.index());

    let mut relaxed = Atlas::new(without_presets());
    assert_on_planes(relaxed.index());
    assert_on_planes(relaxed.set_routing(RoutingMode::Natural));
}

#[test]
fn force_layout_keeps_companies_apart() {
    let atlas = Atlas::new(without_presets());
    for cluster in &atlas.index().clusters {
        for (i, first) in cluster.companies.iter().enumerate() {
            for second in &cluster.companies[i + 1..] {
                let distance = (first.position.planar() - second.position.planar()).length();
                assert!(distance > 0.5, "{} / {}: {distance}", first.id, second.id);
            }
        }
    }
}

#[test]
fn node_index_covers_companies_and_markers() {
    let atlas = Atlas::new(sample());
    let index = atlas.index();

    let companies = index.companies().count();
    let markers = index.synergy_positions().count();
    assert_eq!(companies, 12);
    assert_eq!(index.nodes.len(), companies + markers);

    for company in index.companies() {
        let entry = index.lookup(&company.node.to_string()).expect("company indexed");
        assert_eq!(entry.kind, NodeKind::Company);
        assert_eq!(entry.position, company.position);
    }

    let marker = index
        .lookup("synergy|petroquimico-cartagena|SNG-2026-01-ALUMINA")
        .expect("marker indexed");
    assert_eq!(marker.position.y, LayoutConfig::default().marker_elevation);
    assert!(index.lookup("company|petroquimico-cartagena").is_none());
}

#[test]
fn regenerating_is_deterministic() {
    let first = Atlas::new(without_presets());
    let mut second = Atlas::new(without_presets());
    assert_eq!(first.index(), second.index());

    second.clear_cache();
    assert_eq!(first.index(), second.regenerate());
}

#[test]
fn personalized_ring_around_reficar() {
    let mut atlas = Atlas::new(sample());
    let index = atlas.personalize(Some("reficar")).clone();
    assert_eq!(index.clusters.len(), 1);

    let cluster = &index.clusters[0];
    assert_eq!(cluster.id, "petroquimico-cartagena");
    let center = vec2(-30.0, 0.0);
    let focus = cluster.company("reficar").expect("focus kept");
    assert_eq!(focus.position.planar(), center);
    assert!(focus.is_focus);

    let radius = LayoutConfig::default().focus_ring_radius();
    for (slot, id) in ["ajover", "argos", "cabot", "essentia", "yara"].iter().enumerate() {
        let company = cluster.company(id).expect("member kept");
        let expected = center + Vec2::angled(slot as f32 * TAU / 5.0) * radius;
        assert!((company.position.planar() - expected).length() < 1e-4, "{id}");
    }

    for connection in &cluster.connections {
        assert!(connection.touches("reficar"), "{}", connection.id);
    }
    // reficar shares a synergy with every other member
    let baselines = cluster
        .connections
        .iter()
        .filter(|connection| connection.kind == ConnectionKind::Baseline)
        .count();
    assert_eq!(baselines, 0);

    assert_eq!(atlas.personalize(Some("reficar")), &index);
}

#[test]
fn baselines_fill_uncovered_members() {
    let mut atlas = Atlas::new(sample());
    let index = atlas.personalize(Some("santa-rita"));
    let cluster = &index.clusters[0];
    let mut baseline_targets = cluster
        .connections
        .iter()
        .filter(|connection| connection.kind == ConnectionKind::Baseline)
        .map(|connection| connection.to.company.as_str())
        .collect::<Vec<_>>();
    baseline_targets.sort_unstable();
    assert_eq!(baseline_targets, vec!["global-meals", "mr-lechon"]);
}

#[test]
fn shared_pairs_collapse_into_bundles() {
    let atlas = Atlas::new(sample());
    let connections = atlas.index().connections();
    let visible = filter_connections(&connections, ConnectionViewMode::All, None);
    let groups = group_connections(&visible, atlas.config());

    assert_eq!(groups.len(), visible.len());
    let mut seen = groups
        .bundles
        .iter()
        .flat_map(|bundle| bundle.members.iter().copied())
        .chain(groups.singles.iter().copied())
        .collect::<Vec<_>>();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), visible.len());

    let bundle = groups
        .bundles
        .iter()
        .find(|bundle| bundle.key == "petroquimico-cartagena|argos|cabot")
        .expect("argos and cabot share three synergies");
    assert_eq!(bundle.members.len(), 3);
    assert_eq!(
        bundle.geometry.midpoint,
        path_midpoint(&visible[bundle.members[0]].path)
    );

    let expanded = bundle.geometry.member_positions(1.0);
    let mid = bundle.geometry.midpoint;
    assert!((expanded[0].distance(mid) - expanded[2].distance(mid)).abs() < 1e-4);
    assert!(expanded[0].distance(expanded[2]) > 0.1);
}

#[test]
fn selecting_a_synergy_shows_only_its_connections() {
    let atlas = Atlas::new(sample());
    let connections = atlas.index().connections();
    let selected = NodeRef::synergy("petroquimico-cartagena", "SNG-2026-01-ALUMINA");
    let visible = filter_connections(&connections, ConnectionViewMode::Key, Some(&selected));
    assert_eq!(visible.len(), 6);
    assert!(visible.iter().all(|connection| {
        connection
            .synergy()
            .is_some_and(|record| record.id == "SNG-2026-01-ALUMINA")
    }));
    assert!(visible.iter().all(|c| (c.strength - 0.507).abs() < 1e-3));
}

#[test]
fn index_exports_as_json() {
    let atlas = Atlas::new(sample());
    let json = serde_json::to_value(atlas.index()).expect("index serializes");
    let nodes = json["nodes"].as_object().expect("node map");
    assert!(nodes.contains_key("company|proteina-blanca-valle|cargill"));
    assert_eq!(json["routing"], "ordered");
    assert_eq!(json["clusters"][0]["mode"]["mode"], "general");
    let first = &json["clusters"][0]["connections"][0];
    assert_eq!(first["type"], "synergy");
    assert_eq!(first["payload"]["type"], "synergy");
}

#[test]
fn projection_inverts_inside_the_bounds() {
    let dataset = sample();
    let bounds = dataset.bounds;
    let projector = dataset.projector();
    for location in &dataset.locations {
        assert!(bounds.contains(location.lat, location.lon), "{}", location.company);
        let projected = projector.project(location.lat, location.lon, 0.0);
        let half = dataset.layout.surface_half() + 1e-3;
        assert!(projected.x.abs() <= half && projected.z.abs() <= half);
    }
    for row in 0..=8 {
        for column in 0..=8 {
            let lat = bounds.south + (bounds.north - bounds.south) * row as f32 / 8.0;
            let lon = bounds.west + (bounds.east - bounds.west) * column as f32 / 8.0;
            let projected = projector.project(lat, lon, 0.0);
            let (back_lat, back_lon) = projector.unproject(projected.x, projected.z);
            assert!((back_lat - lat).abs() < 1e-3, "{lat} -> {back_lat}");
            assert!((back_lon - lon).abs() < 1e-3, "{lon} -> {back_lon}");
        }
    }
}

#[test]
fn malformed_node_ids_resolve_to_nothing() {
    let atlas = Atlas::new(sample());
    let index = atlas.index();
    for raw in ["", "company", "company|petroquimico-cartagena", "vessel|x|y", "||"] {
        assert!(index.lookup(raw).is_none(), "{raw:?}");
    }
}
