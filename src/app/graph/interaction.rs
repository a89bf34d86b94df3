use eframe::egui::{self, Pos2, Rect, Ui, Vec2, vec2};
use synergy_atlas::NodeRef;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 60.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Zooms and pans so every cluster plane of the current index fits into `rect`.
    pub(in crate::app) fn fit_view(&mut self, rect: Rect) {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for cluster in &self.atlas.index().clusters {
            let plane = cluster.plane();
            let half = Vec2::splat(plane.half);
            min = min.min(plane.offset - half);
            max = max.max(plane.offset + half);
        }
        if !min.x.is_finite() || !max.x.is_finite() {
            return;
        }

        let size = (max - min).max(Vec2::splat(1.0));
        let zoom = (rect.width() / size.x).min(rect.height() / size.y) * 0.9;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = -((min + max) * 0.5) * self.zoom;
        self.fit_pending = false;
    }

    /// Closest node whose screen disc contains the pointer.
    pub(in crate::app) fn hovered_node<'a>(
        &self,
        ui: &Ui,
        candidates: &'a [(NodeRef, Pos2, f32)],
    ) -> Option<&'a NodeRef> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        candidates
            .iter()
            .filter_map(|(node, position, radius)| {
                let distance = position.distance(pointer);
                (distance <= *radius).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }
}
