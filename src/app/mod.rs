use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context, Vec2};
use synergy_atlas::{
    Atlas, BundleState, Connection, ConnectionViewMode, Dataset, NodeRef, RoutingMode,
};
use tracing::{info, warn};

mod graph;
mod render_utils;
mod ui;

/// How the viewer (or the export mode) builds its atlas.
#[derive(Clone, Debug)]
pub struct Launch {
    pub dataset: Option<PathBuf>,
    pub focus: Option<String>,
    pub routing: RoutingMode,
    pub min_distance: Option<f32>,
    pub force_iterations: Option<usize>,
}

impl Launch {
    pub fn build_atlas(&self) -> anyhow::Result<Atlas> {
        let dataset = match &self.dataset {
            Some(path) => Dataset::load(path)
                .with_context(|| format!("failed to load dataset {}", path.display()))?,
            None => Dataset::sample().context("bundled sample dataset is invalid")?,
        };

        let mut config = dataset.layout.clone();
        if let Some(min_distance) = self.min_distance {
            config.min_distance = min_distance;
        }
        if let Some(iterations) = self.force_iterations {
            config.force_iterations = iterations;
        }

        let mut atlas = Atlas::with_config(dataset, config);
        if atlas.routing() != self.routing {
            atlas.set_routing(self.routing);
        }
        if let Some(focus) = &self.focus
            && atlas.personalize(Some(focus)).focus.is_none()
        {
            warn!(focus = %focus, "focus company not found, showing the general view");
        }
        Ok(atlas)
    }
}

pub struct SynergyAtlasApp {
    launch: Launch,
    state: AppState,
    reload_rx: Option<Receiver<Result<Atlas, String>>>,
}

enum AppState {
    Loading { rx: Receiver<Result<Atlas, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    atlas: Atlas,
    connections: Vec<Connection>,
    view_mode: ConnectionViewMode,
    selected: Option<NodeRef>,
    search: String,
    show_labels: bool,
    pan: Vec2,
    zoom: f32,
    fit_pending: bool,
    bundles: HashMap<String, BundleState>,
    hovered_bundles: HashSet<String>,
}

impl SynergyAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, launch: Launch) -> Self {
        let state = Self::start_load(launch.clone());
        Self {
            launch,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(launch: Launch) -> Receiver<Result<Atlas, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = launch.build_atlas().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(launch: Launch) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(launch),
        }
    }

    fn loaded(result: Result<Atlas, String>) -> AppState {
        match result {
            Ok(atlas) => {
                info!(clusters = atlas.index().clusters.len(), "dataset loaded");
                AppState::Ready(Box::new(ViewModel::new(atlas)))
            }
            Err(error) => {
                warn!(error = %error, "dataset load failed");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for SynergyAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(Self::loaded(result)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Laying out synergy clusters...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the synergy dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.launch.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.launch.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(Self::loaded(result)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
