use std::collections::HashSet;
use std::f32::consts::TAU;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2, vec2,
};
use synergy_atlas::connections::{active_synergies, filter_connections, group_connections};
use synergy_atlas::{BundleState, Connection, LayoutMode, NodeRef};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, connection_color, connection_width, dim_color, draw_background,
    polyline_distance, polyline_visible, state_color, world_to_screen,
};

const BUNDLE_HIT_RADIUS: f32 = 14.0;
const MEMBER_HIT_RADIUS: f32 = 8.0;
const MARKER_HIT_RADIUS: f32 = 7.0;
const LINE_HIT_DISTANCE: f32 = 4.0;

struct Camera {
    rect: Rect,
    pan: Vec2,
    zoom: f32,
}

impl Camera {
    fn screen(&self, world: Vec2) -> Pos2 {
        world_to_screen(self.rect, self.pan, self.zoom, world)
    }

    fn path(&self, connection: &Connection) -> Vec<Pos2> {
        connection
            .path
            .iter()
            .map(|point| self.screen(point.planar()))
            .collect()
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.fit_pending {
            self.fit_view(rect);
        }
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        draw_background(&painter, rect, self.pan, self.zoom);

        let camera = Camera {
            rect,
            pan: self.pan,
            zoom: self.zoom,
        };
        let pointer = ui.input(|input| input.pointer.hover_pos());
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let zoom_sqrt = (self.zoom / 8.0).sqrt();
        let index = self.atlas.index();
        let config = self.atlas.config();

        for cluster in &index.clusters {
            let plane = cluster.plane();
            let half = Vec2::splat(plane.half);
            let plane_rect = Rect::from_min_max(
                camera.screen(plane.offset - half),
                camera.screen(plane.offset + half),
            );
            painter.rect_filled(plane_rect, 6.0, Color32::from_rgba_unmultiplied(34, 42, 52, 160));
            painter.rect_stroke(
                plane_rect,
                6.0,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(90, 104, 120, 140)),
                egui::StrokeKind::Inside,
            );
            painter.text(
                plane_rect.left_top() + vec2(8.0, 6.0),
                Align2::LEFT_TOP,
                &cluster.label,
                FontId::proportional(14.0),
                Color32::from_gray(210),
            );

            if matches!(cluster.mode, LayoutMode::Personalized { .. }) {
                painter.circle_stroke(
                    camera.screen(plane.offset),
                    config.focus_ring_radius() * self.zoom,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(245, 206, 93, 70)),
                );
            }
        }

        let visible = filter_connections(&self.connections, self.view_mode, self.selected.as_ref());
        let groups = group_connections(&visible, config);
        let active = active_synergies(&visible);
        let selection_active = self.selected.is_some();

        let mut hovered_line: Option<(f32, usize)> = None;
        for &single in &groups.singles {
            let connection = visible[single];
            let points = camera.path(connection);
            if points.len() < 2 || !polyline_visible(rect, &points, 4.0) {
                continue;
            }
            if let Some(pointer) = pointer {
                let distance = polyline_distance(&points, pointer);
                if distance <= LINE_HIT_DISTANCE
                    && hovered_line.is_none_or(|(best, _)| distance < best)
                {
                    hovered_line = Some((distance, single));
                }
            }
            let color = connection_color(connection);
            painter.add(Shape::line(
                points,
                Stroke::new(connection_width(connection.strength, self.zoom), color),
            ));
        }
        if let Some((_, single)) = hovered_line {
            let connection = visible[single];
            painter.add(Shape::line(
                camera.path(connection),
                Stroke::new(
                    connection_width(connection.strength, self.zoom) + 1.5,
                    blend_color(connection_color(connection), Color32::WHITE, 0.45),
                ),
            ));
        }

        // baselines only exist in the personalized view and never pass the synergy filter
        for connection in self
            .connections
            .iter()
            .filter(|connection| connection.synergy().is_none())
        {
            let points = camera.path(connection);
            if points.len() < 2 {
                continue;
            }
            painter.add(Shape::dashed_line(
                &points,
                Stroke::new(1.0, connection_color(connection)),
                6.0,
                4.0,
            ));
        }

        let mut candidates: Vec<(NodeRef, Pos2, f32)> = Vec::new();
        let mut hovered_bundles = HashSet::new();
        let mut animating = false;

        for bundle in &groups.bundles {
            let state = self
                .bundles
                .entry(bundle.key.clone())
                .or_insert_with(|| BundleState::new(config));
            let geometry = &bundle.geometry;
            let midpoint = camera.screen(geometry.midpoint.planar());
            let members = geometry
                .member_positions(state.progress())
                .into_iter()
                .map(|position| camera.screen(position.planar()))
                .collect::<Vec<_>>();

            let hovered = pointer.is_some_and(|pointer| {
                pointer.distance(midpoint) <= BUNDLE_HIT_RADIUS
                    || (state.shows_members()
                        && members
                            .iter()
                            .any(|member| member.distance(pointer) <= MEMBER_HIT_RADIUS))
            });
            let was_hovered = self.hovered_bundles.contains(&bundle.key);
            if hovered && !was_hovered {
                state.pointer_enter();
            } else if !hovered && was_hovered {
                state.pointer_leave();
            }
            if hovered {
                hovered_bundles.insert(bundle.key.clone());
            }

            state.tick(frame_delta_seconds);
            animating |= state.is_animating();
            let progress = state.progress();

            let first = visible[bundle.members[0]];
            let strongest = bundle
                .members
                .iter()
                .map(|&member| visible[member].strength)
                .fold(0.0_f32, f32::max);
            let shared = camera.path(first);
            if shared.len() >= 2 && polyline_visible(rect, &shared, 4.0) {
                let color = blend_color(
                    connection_color(first),
                    Color32::from_rgb(200, 206, 214),
                    0.35,
                );
                painter.add(Shape::line(
                    shared,
                    Stroke::new(
                        connection_width(strongest, self.zoom),
                        dim_color(color, 1.0 - progress * 0.5),
                    ),
                ));
            }

            if state.shows_members() {
                for (&member, position) in bundle.members.iter().zip(&members) {
                    let connection = visible[member];
                    let color = connection_color(connection);
                    let alpha = (progress * 255.0) as u8;
                    let faded = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha);

                    let own_path = camera.path(connection);
                    if own_path.len() >= 2 {
                        painter.add(Shape::line(
                            own_path,
                            Stroke::new(connection_width(connection.strength, self.zoom), faded),
                        ));
                    }
                    painter.line_segment([midpoint, *position], Stroke::new(1.0, faded));
                    painter.circle_filled(*position, 4.0 + progress * 2.0, faded);

                    if let Some(record) = connection.synergy() {
                        candidates.push((
                            NodeRef::synergy(&connection.cluster, &record.id),
                            *position,
                            MEMBER_HIT_RADIUS,
                        ));
                        if progress > 0.9 {
                            painter.text(
                                *position + vec2(0.0, -10.0),
                                Align2::CENTER_BOTTOM,
                                &record.id,
                                FontId::proportional(11.0),
                                Color32::from_gray(230),
                            );
                        }
                    }
                }
            }

            if state.shows_badge() {
                let alpha = ((1.0 - progress) * 255.0) as u8;
                painter.circle_filled(
                    midpoint,
                    9.0,
                    Color32::from_rgba_unmultiplied(28, 33, 40, alpha),
                );
                painter.circle_stroke(
                    midpoint,
                    9.0,
                    Stroke::new(1.4, Color32::from_rgba_unmultiplied(200, 206, 214, alpha)),
                );
                painter.text(
                    midpoint,
                    Align2::CENTER_CENTER,
                    bundle.members.len().to_string(),
                    FontId::proportional(11.0),
                    Color32::from_rgba_unmultiplied(240, 240, 240, alpha),
                );
            }
        }

        let clicked = response.clicked_by(egui::PointerButton::Primary);
        if clicked && hovered_bundles.is_empty() {
            for state in self.bundles.values_mut() {
                state.dismiss();
            }
        }
        self.hovered_bundles = hovered_bundles;

        for cluster in &index.clusters {
            for synergy in &cluster.synergies {
                let node = NodeRef::synergy(&cluster.id, &synergy.id);
                let Some(position) = cluster.synergy_positions.get(&node) else {
                    continue;
                };
                let center = camera.screen(position.planar());
                if !circle_visible(rect, center, MARKER_HIT_RADIUS) {
                    continue;
                }

                let is_selected = self.selected.as_ref() == Some(&node);
                let base = state_color(synergy.state);
                let color = if is_selected || active.contains(&node) {
                    base
                } else {
                    dim_color(base, 0.35)
                };
                let size = if is_selected { 7.0 } else { 5.0 };
                painter.add(Shape::convex_polygon(
                    vec![
                        center + vec2(0.0, -size),
                        center + vec2(size, 0.0),
                        center + vec2(0.0, size),
                        center + vec2(-size, 0.0),
                    ],
                    color,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
                ));
                candidates.push((node, center, MARKER_HIT_RADIUS));
            }
        }

        let search = self.search.trim().to_lowercase();
        let company_radius = (0.9 * self.zoom).clamp(4.0, 14.0);
        let mut company_nodes = Vec::new();
        for company in index.companies() {
            let center = camera.screen(company.position.planar());
            let radius = if company.is_focus {
                company_radius * 1.5
            } else {
                company_radius
            };
            if !circle_visible(rect, center, radius) {
                continue;
            }
            company_nodes.push((company, center, radius));
            candidates.push((company.node.clone(), center, radius));
        }

        let hovered = self.hovered_node(ui, &candidates).cloned().or_else(|| {
            let (_, single) = hovered_line?;
            let connection = visible[single];
            let record = connection.synergy()?;
            Some(NodeRef::synergy(&connection.cluster, &record.id))
        });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for (company, center, radius) in company_nodes {
            let is_selected = self.selected.as_ref() == Some(&company.node);
            let is_hovered = hovered.as_ref() == Some(&company.node);
            let is_match = !search.is_empty()
                && (company.name.to_lowercase().contains(&search) || company.id.contains(&search));
            let touched = visible
                .iter()
                .any(|connection| connection.touches(&company.id) && connection.cluster == company.cluster);

            let base = if company.is_focus {
                Color32::from_rgb(245, 170, 80)
            } else {
                Color32::from_rgb(88, 164, 224)
            };
            let color = if is_selected {
                selected_color
            } else if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_match {
                blend_color(base, Color32::from_rgb(103, 196, 255), 0.68)
            } else if selection_active && !touched {
                dim_color(base, 0.5)
            } else {
                base
            };

            painter.circle_filled(center, radius, color);
            painter.circle_stroke(
                center,
                radius,
                Stroke::new(
                    if is_selected { 2.2 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );
            if let Some(segments) = company.focus_segments {
                painter.circle_stroke(center, radius + 4.0, Stroke::new(1.6, selected_color));
                for segment in 0..segments {
                    let direction = Vec2::angled(segment as f32 * TAU / segments as f32);
                    painter.line_segment(
                        [center + direction * (radius + 2.0), center + direction * (radius + 7.0)],
                        Stroke::new(1.2, selected_color),
                    );
                }
            }

            if self.show_labels || is_selected || is_hovered || is_match {
                painter.text(
                    center + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &company.name,
                    FontId::proportional(12.0 * zoom_sqrt.clamp(0.85, 1.3)),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(node) = &hovered
            && let Some(entry) = index.node(node)
        {
            let text = match (&entry.company, &entry.synergy) {
                (Some(company), _) => {
                    let degree = self
                        .connections
                        .iter()
                        .filter(|connection| {
                            connection.cluster == entry.cluster && connection.touches(company)
                        })
                        .count();
                    format!("{company}  |  {}  |  connections {degree}", entry.cluster)
                }
                (_, Some(synergy)) => format!("{synergy}  |  {}", entry.cluster),
                _ => node.to_string(),
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        // a click on a bundle only expands it; a click on a member dot selects its synergy
        let hovered_in_bundle = !self.hovered_bundles.is_empty();
        let pending_selection = if clicked && (hovered.is_some() || !hovered_in_bundle) {
            Some(hovered.clone())
        } else {
            None
        };
        let pending_focus = if response.double_clicked() {
            hovered
                .as_ref()
                .filter(|node| node.is_company())
                .map(|node| node.entity.clone())
        } else {
            None
        };

        if animating {
            ui.ctx().request_repaint();
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
        if let Some(focus) = pending_focus {
            self.personalize(Some(&focus));
        }
    }
}
