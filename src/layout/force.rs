use eframe::egui::Vec2;

use crate::config::LayoutConfig;

use super::{EPSILON, clamp_to_square};

/// Result of a force simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct Relaxation {
    pub positions: Vec<Vec2>,
    pub iterations: usize,
    pub converged: bool,
}

/// Spring/repulsion relaxation followed by [`expand_to_bounds`].
pub fn force_layout(
    initial: &[Vec2],
    edges: &[(usize, usize)],
    config: &LayoutConfig,
) -> Relaxation {
    let relaxed = relax(initial, edges, config);
    Relaxation {
        positions: expand_to_bounds(&relaxed.positions, config),
        ..relaxed
    }
}

/// Explicit Euler integration with velocity damping.
///
/// Every pair repels with `k / d²`, every edge pulls (or pushes) toward the rest length. The
/// whole step is scaled so the fastest node moves at most `max_step`, and the run stops early
/// once the fastest node is slower than `convergence_threshold`. No randomness: identical
/// inputs give bit-identical outputs.
pub fn relax(initial: &[Vec2], edges: &[(usize, usize)], config: &LayoutConfig) -> Relaxation {
    let node_count = initial.len();
    let mut positions = initial.to_vec();
    if node_count < 2 {
        return Relaxation {
            positions,
            iterations: 0,
            converged: true,
        };
    }

    let half = config.allowed_half();
    let mut velocities = vec![Vec2::ZERO; node_count];
    let mut forces = vec![Vec2::ZERO; node_count];

    for iteration in 0..config.force_iterations {
        forces.fill(Vec2::ZERO);

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let delta = positions[i] - positions[j];
                let distance_sq = delta.length_sq() + 0.01;
                let distance = distance_sq.sqrt();
                let repulsion = delta / distance * (config.repulsion_strength / distance_sq);
                forces[i] += repulsion;
                forces[j] -= repulsion;
            }
        }

        for &(source, target) in edges {
            if source >= node_count || target >= node_count || source == target {
                continue;
            }

            let delta = positions[target] - positions[source];
            let distance = delta.length();
            if distance <= 0.0 {
                continue;
            }

            let spring = config.spring_strength * (distance - config.spring_rest_length);
            let pull = delta / distance * spring;
            forces[source] += pull;
            forces[target] -= pull;
        }

        let mut max_velocity = 0.0_f32;
        for (velocity, force) in velocities.iter_mut().zip(&forces) {
            *velocity = (*velocity + *force) * config.damping;
            max_velocity = max_velocity.max(velocity.length());
        }

        let step = if max_velocity > 0.0 {
            (config.max_step / max_velocity).min(1.0)
        } else {
            1.0
        };

        for (position, velocity) in positions.iter_mut().zip(&velocities) {
            *position = clamp_to_square(*position + *velocity * step, Vec2::ZERO, half);
        }

        if max_velocity < config.convergence_threshold {
            return Relaxation {
                positions,
                iterations: iteration + 1,
                converged: true,
            };
        }
    }

    Relaxation {
        positions,
        iterations: config.force_iterations,
        converged: false,
    }
}

/// Scales positions so the largest absolute coordinate reaches `expand_fill * H`, then shifts
/// the centroid back to the origin. Every step is clamped into `[-H, H]`.
pub fn expand_to_bounds(positions: &[Vec2], config: &LayoutConfig) -> Vec<Vec2> {
    if positions.is_empty() {
        return Vec::new();
    }

    let half = config.allowed_half();
    let current_max = positions
        .iter()
        .fold(EPSILON, |acc, position| acc.max(position.x.abs()).max(position.y.abs()));
    let scale = (half * config.expand_fill) / current_max;

    let scaled = positions
        .iter()
        .map(|position| clamp_to_square(*position * scale, Vec2::ZERO, half))
        .collect::<Vec<_>>();

    let centroid = scaled.iter().fold(Vec2::ZERO, |acc, position| acc + *position)
        / scaled.len() as f32;
    if centroid.x.abs() < 0.01 && centroid.y.abs() < 0.01 {
        return scaled;
    }

    scaled
        .into_iter()
        .map(|position| clamp_to_square(position - centroid, Vec2::ZERO, half))
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn ring(count: usize, radius: f32) -> Vec<Vec2> {
        (0..count)
            .map(|index| {
                Vec2::angled(index as f32 / count as f32 * std::f32::consts::TAU) * radius
            })
            .collect()
    }

    #[test]
    fn trivial_inputs_pass_through() {
        let config = LayoutConfig::default();
        assert!(force_layout(&[], &[], &config).positions.is_empty());

        let single = relax(&[vec2(3.0, 4.0)], &[], &config);
        assert_eq!(single.positions, vec![vec2(3.0, 4.0)]);
        assert!(single.converged);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let config = LayoutConfig::default();
        let initial = ring(7, 9.0);
        let edges = [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 6), (6, 0), (0, 1)];
        let first = force_layout(&initial, &edges, &config);
        let second = force_layout(&initial, &edges, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn results_respect_the_allowed_square() {
        let config = LayoutConfig::default();
        let initial = vec![
            vec2(-21.0, -21.0),
            vec2(21.5, 21.5),
            vec2(0.0, 0.0),
            vec2(0.05, 0.0),
            vec2(-10.0, 20.0),
        ];
        let edges = [(0, 1), (2, 3), (3, 4)];
        let half = config.allowed_half();
        for position in force_layout(&initial, &edges, &config).positions {
            assert!(position.x.abs() <= half + 1e-5 && position.y.abs() <= half + 1e-5);
        }
    }

    #[test]
    fn connected_pair_stops_early_and_repeats_exactly() {
        let config = LayoutConfig::default();
        let half = config.allowed_half();
        let initial = [vec2(-1.0, 0.0), vec2(1.0, 0.0)];
        let relaxed = relax(&initial, &[(0, 1)], &config);
        assert!(relaxed.converged);
        assert!(relaxed.iterations < config.force_iterations);
        for position in &relaxed.positions {
            assert!(position.x.abs() <= half && position.y.abs() <= half);
        }
        // stops at the first velocity turning point, past the rest length
        let distance = (relaxed.positions[0] - relaxed.positions[1]).length();
        assert!((distance - 27.06).abs() < 0.01, "distance {distance}");
        assert_eq!(relaxed, relax(&initial, &[(0, 1)], &config));
    }

    #[test]
    fn single_step_is_capped() {
        let config = LayoutConfig {
            force_iterations: 1,
            ..LayoutConfig::default()
        };
        let initial = [vec2(-0.1, 0.0), vec2(0.1, 0.0)];
        let relaxed = relax(&initial, &[], &config);
        for (before, after) in initial.iter().zip(&relaxed.positions) {
            assert!((*after - *before).length() <= config.max_step + 1e-4);
        }
        assert!(!relaxed.converged);
    }

    #[test]
    fn invalid_edges_are_ignored() {
        let config = LayoutConfig::default();
        let initial = ring(3, 5.0);
        let with_bad_edges = relax(&initial, &[(0, 0), (1, 9)], &config);
        let without_edges = relax(&initial, &[], &config);
        assert_eq!(with_bad_edges, without_edges);
    }

    #[test]
    fn expansion_fills_and_recenters() {
        let config = LayoutConfig::default();
        let target = config.allowed_half() * config.expand_fill;

        let symmetric = expand_to_bounds(&[vec2(-1.0, 0.0), vec2(1.0, 0.0)], &config);
        assert!((symmetric[1].x - target).abs() < 1e-4);

        let shifted = expand_to_bounds(&[vec2(0.0, 0.0), vec2(2.0, 0.0)], &config);
        let centroid = (shifted[0] + shifted[1]) / 2.0;
        assert!(centroid.length() < 1e-4);
        assert!((shifted[1].x - target / 2.0).abs() < 1e-4);
    }
}
