use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::geo::Position3;

use super::clamp_to_square;

/// Rescales raw projected positions so their spread fills `[-H, H]` on the wider axis, keeping
/// the aspect ratio, then runs [`spread_positions`].
pub fn normalize_positions(positions: &[Position3], config: &LayoutConfig) -> Vec<Position3> {
    if positions.is_empty() {
        return Vec::new();
    }

    let half = config.allowed_half();
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for position in positions {
        min = min.min(position.planar());
        max = max.max(position.planar());
    }

    let center = (min + max) * 0.5;
    let range = max - min;
    let max_range = range.x.max(range.y);
    let scale = if max_range <= f32::EPSILON {
        1.0
    } else {
        (half * 2.0) / max_range
    };

    let normalized = positions
        .iter()
        .map(|position| {
            let scaled = (position.planar() - center) * scale;
            position.with_planar(clamp_to_square(scaled, Vec2::ZERO, half))
        })
        .collect::<Vec<_>>();

    spread_positions(&normalized, config)
}

/// Pushes apart every pair closer than `min_distance`, each by half the deficit, clamping into
/// `[-H, H]` after every move.
///
/// Exactly coincident pairs are separated along an angle derived from their indices so the
/// result stays reproducible. Pairs may still end up closer than `min_distance` in two cases:
/// points pinned against the boundary when the clamp leaves no room, and crowded inputs that
/// need more than `spread_iterations` rounds to untangle.
pub fn spread_positions(positions: &[Position3], config: &LayoutConfig) -> Vec<Position3> {
    let half = config.allowed_half();
    let min_distance = config.min_distance;
    let mut adjusted = positions.to_vec();

    for _ in 0..config.spread_iterations {
        for i in 0..adjusted.len() {
            for j in (i + 1)..adjusted.len() {
                let delta = adjusted[i].planar() - adjusted[j].planar();
                let distance_sq = delta.length_sq();

                let (direction, push) = if distance_sq == 0.0 {
                    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * TAU;
                    (Vec2::angled(angle), min_distance / 2.0)
                } else {
                    let distance = distance_sq.sqrt();
                    if distance >= min_distance {
                        continue;
                    }
                    (delta / distance, (min_distance - distance) / 2.0)
                };

                let moved_i = clamp_to_square(
                    adjusted[i].planar() + direction * push,
                    Vec2::ZERO,
                    half,
                );
                let moved_j = clamp_to_square(
                    adjusted[j].planar() - direction * push,
                    Vec2::ZERO,
                    half,
                );
                adjusted[i] = adjusted[i].with_planar(moved_i);
                adjusted[j] = adjusted[j].with_planar(moved_j);
            }
        }
    }

    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(f32, f32)]) -> Vec<Position3> {
        raw.iter().map(|&(x, z)| Position3::new(x, 0.0, z)).collect()
    }

    fn within(position: &Position3, half: f32) -> bool {
        position.x.abs() <= half + 1e-5 && position.z.abs() <= half + 1e-5
    }

    #[test]
    fn wider_axis_fills_the_allowed_span() {
        let config = LayoutConfig::default();
        let normalized = normalize_positions(&points(&[(0.0, 0.0), (10.0, 2.0)]), &config);
        assert!((normalized[0].x + 22.0).abs() < 1e-4);
        assert!((normalized[1].x - 22.0).abs() < 1e-4);
        // aspect ratio preserved: z range is 2/10 of the x range
        assert!(((normalized[1].z - normalized[0].z) - 8.8).abs() < 1e-3);
    }

    #[test]
    fn tiny_ranges_are_still_stretched() {
        let config = LayoutConfig::default();
        let normalized = normalize_positions(&points(&[(0.0, 0.0), (0.0005, 0.0)]), &config);
        assert!((normalized[0].x + 22.0).abs() < 1e-2, "{:?}", normalized[0]);
        assert!((normalized[1].x - 22.0).abs() < 1e-2, "{:?}", normalized[1]);
    }

    #[test]
    fn heights_are_preserved() {
        let config = LayoutConfig::default();
        let input = vec![Position3::new(0.0, 3.0, 0.0), Position3::new(5.0, 1.0, 5.0)];
        let normalized = normalize_positions(&input, &config);
        assert_eq!(normalized[0].y, 3.0);
        assert_eq!(normalized[1].y, 1.0);
    }

    #[test]
    fn single_point_stays_at_origin() {
        let config = LayoutConfig::default();
        let normalized = normalize_positions(&points(&[(7.0, -3.0)]), &config);
        assert_eq!(normalized[0].planar(), Vec2::ZERO);
    }

    #[test]
    fn outputs_stay_inside_bounds() {
        let config = LayoutConfig::default();
        let input = points(&[
            (-400.0, 3.0),
            (0.0, 0.0),
            (0.2, 0.1),
            (0.3, -0.1),
            (12.0, 90.0),
            (12.0, 90.0),
        ]);
        for position in normalize_positions(&input, &config) {
            assert!(within(&position, config.allowed_half()), "{position:?}");
        }
    }

    #[test]
    fn close_points_are_pushed_to_min_distance() {
        let config = LayoutConfig::default();
        let input = points(&[(0.0, 0.0), (0.1, 0.0), (100.0, 100.0)]);
        let normalized = normalize_positions(&input, &config);
        let distance = (normalized[0].planar() - normalized[1].planar()).length();
        assert!(distance >= config.min_distance - 1e-3, "distance {distance}");
    }

    #[test]
    fn coincident_points_are_separated_deterministically() {
        let config = LayoutConfig::default();
        let input = points(&[(0.0, 0.0), (0.0, 0.0), (10.0, 10.0)]);
        let first = normalize_positions(&input, &config);
        let second = normalize_positions(&input, &config);
        assert_eq!(first, second);

        let distance = (first[0].planar() - first[1].planar()).length();
        assert!(distance >= config.min_distance - 1e-2, "distance {distance}");
    }

    #[test]
    fn round_budget_can_leave_crowded_pairs_short() {
        let config = LayoutConfig {
            spread_iterations: 1,
            ..LayoutConfig::default()
        };
        let half = config.allowed_half();
        let mut raw = (0..14)
            .map(|i| (i as f32 * 0.01, (i % 3) as f32 * 0.01))
            .collect::<Vec<_>>();
        raw.push((20.0, 20.0));

        let spread = spread_positions(&points(&raw), &config);
        assert!(spread.iter().all(|p| p.x.abs() < half && p.z.abs() < half));
        let mut closest = f32::INFINITY;
        for (i, first) in spread.iter().enumerate() {
            for second in &spread[i + 1..] {
                closest = closest.min((first.planar() - second.planar()).length());
            }
        }
        assert!(closest < config.min_distance / 2.0, "closest {closest}");
    }

    #[test]
    fn already_spread_points_are_untouched() {
        let config = LayoutConfig::default();
        let input = points(&[(-10.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        assert_eq!(spread_positions(&input, &config), input);
    }
}
