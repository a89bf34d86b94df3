use std::collections::{HashMap, HashSet};

use eframe::egui::{self, Align, Context, Layout, Vec2};
use synergy_atlas::{Atlas, ConnectionViewMode, NodeRef, RoutingMode};
use tracing::debug;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(atlas: Atlas) -> Self {
        let connections = atlas.index().connections();
        Self {
            atlas,
            connections,
            view_mode: ConnectionViewMode::All,
            selected: None,
            search: String::new(),
            show_labels: true,
            pan: Vec2::ZERO,
            zoom: 8.0,
            fit_pending: true,
            bundles: HashMap::new(),
            hovered_bundles: HashSet::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("synergy-atlas");
                    ui.separator();

                    let index = self.atlas.index();
                    match &index.focus {
                        Some(focus) => ui.label(format!("focus: {focus}")),
                        None => ui.label("general view"),
                    };
                    ui.label(format!("clusters: {}", index.clusters.len()));
                    ui.label(format!("companies: {}", index.companies().count()));
                    ui.label(format!("connections: {}", self.connections.len()));

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Recompute layout").clicked() {
                        self.recompute();
                    }

                    let routing = self.atlas.routing();
                    let toggle_label = match routing {
                        RoutingMode::Ordered => "Natural routing",
                        RoutingMode::Natural => "Ordered routing",
                    };
                    if ui.button(toggle_label).clicked() {
                        self.set_routing(routing.toggled());
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let stats = self.atlas.cache().stats();
                        ui.label(format!(
                            "cache {} entries, {} hits / {} misses",
                            stats.entries, stats.hits, stats.misses
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading dataset...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<NodeRef>) {
        if self.selected == selected {
            return;
        }
        debug!(selected = ?selected.as_ref().map(ToString::to_string), "selection changed");
        self.selected = selected;
    }

    pub(in crate::app) fn personalize(&mut self, company: Option<&str>) {
        self.atlas.personalize(company);
        self.refresh_index();
    }

    pub(in crate::app) fn set_routing(&mut self, routing: RoutingMode) {
        self.atlas.set_routing(routing);
        self.refresh_index();
    }

    fn recompute(&mut self) {
        self.atlas.clear_cache();
        self.atlas.regenerate();
        self.refresh_index();
    }

    /// Picks up a replaced index: connections are re-read, bundle animations restart and a
    /// selection that no longer resolves is dropped.
    fn refresh_index(&mut self) {
        let index = self.atlas.index();
        self.connections = index.connections();
        self.bundles.clear();
        self.hovered_bundles.clear();
        if let Some(selected) = &self.selected
            && index.node(selected).is_none()
        {
            self.selected = None;
        }
        self.fit_pending = true;
    }
}
