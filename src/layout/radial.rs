use std::f32::consts::TAU;

use eframe::egui::Vec2;

/// Placement of one non-focus member on the personalization ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSlot {
    pub position: Vec2,
    /// Point on the small circle around the center, in the direction of `position`.
    pub anchor: Vec2,
    pub angle: f32,
}

/// Evenly spaces `count` slots around `center` starting at angle zero.
pub fn ring_layout(center: Vec2, count: usize, radius: f32, anchor_radius: f32) -> Vec<RingSlot> {
    if count == 0 {
        return Vec::new();
    }

    let angle_step = TAU / count as f32;
    (0..count)
        .map(|index| {
            let angle = angle_step * index as f32;
            let position = center + Vec2::angled(angle) * radius;
            let offset = position - center;
            let length = offset.length();
            let direction = if length > 0.0 {
                offset / length
            } else {
                Vec2::X
            };

            RingSlot {
                position,
                anchor: center + direction * anchor_radius,
                angle,
            }
        })
        .collect()
}
