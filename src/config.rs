use serde::{Deserialize, Serialize};

/// Numeric knobs for every layout stage.
///
/// Datasets may override any subset of these under their `"layout"` key; missing fields keep
/// the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub surface_size: f32,
    pub surface_padding: f32,
    pub min_distance: f32,
    pub spread_iterations: usize,
    pub repulsion_strength: f32,
    pub spring_strength: f32,
    pub spring_rest_length: f32,
    pub damping: f32,
    pub max_step: f32,
    pub force_iterations: usize,
    pub convergence_threshold: f32,
    pub expand_fill: f32,
    pub lane_width: usize,
    pub focus_anchor_radius: f32,
    pub baseline_strength: f32,
    pub marker_elevation: f32,
    pub marker_solo_offset: f32,
    pub bundle_max_spacing: f32,
    pub bundle_fallback_spacing: f32,
    pub bundle_expand_secs: f32,
    pub bundle_collapse_delay_secs: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            surface_size: 50.0,
            surface_padding: 3.0,
            min_distance: 6.0,
            spread_iterations: 25,
            repulsion_strength: 30.0,
            spring_strength: 0.12,
            spring_rest_length: 12.0,
            damping: 0.85,
            max_step: 1.8,
            force_iterations: 200,
            convergence_threshold: 0.05,
            expand_fill: 0.95,
            lane_width: 6,
            focus_anchor_radius: 4.2,
            baseline_strength: 0.05,
            marker_elevation: 1.2,
            marker_solo_offset: 1.4,
            bundle_max_spacing: 2.4,
            bundle_fallback_spacing: 1.4,
            bundle_expand_secs: 0.24,
            bundle_collapse_delay_secs: 0.16,
        }
    }
}

impl LayoutConfig {
    pub fn surface_half(&self) -> f32 {
        self.surface_size / 2.0
    }

    /// Half-width of the square every laid-out company must stay inside.
    pub fn allowed_half(&self) -> f32 {
        (self.surface_half() - self.surface_padding).max(0.0)
    }

    /// Ring radius used by the personalized layout.
    pub fn focus_ring_radius(&self) -> f32 {
        (self.allowed_half() - 2.0).clamp(8.0, 18.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allowed_half_leaves_margin() {
        let config = LayoutConfig::default();
        assert_eq!(config.allowed_half(), 22.0);
        assert!(config.allowed_half() < config.surface_half());
        assert_eq!(config.focus_ring_radius(), 18.0);
    }

    #[test]
    fn ring_radius_is_clamped_for_small_surfaces() {
        let config = LayoutConfig {
            surface_size: 16.0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.allowed_half(), 5.0);
        assert_eq!(config.focus_ring_radius(), 8.0);
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"min_distance": 4.5, "force_iterations": 50}"#).unwrap();
        assert_eq!(config.min_distance, 4.5);
        assert_eq!(config.force_iterations, 50);
        assert_eq!(config.damping, LayoutConfig::default().damping);
    }
}
