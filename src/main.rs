mod app;
mod util;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use synergy_atlas::RoutingMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::Launch;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset JSON file; the bundled sample is used when omitted.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Write the computed layout index as JSON to this path and exit.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Company id to center the personalized view on.
    #[arg(long)]
    focus: Option<String>,

    /// Route connections as straight lines instead of orthogonal lanes.
    #[arg(long)]
    natural: bool,

    #[arg(long)]
    min_distance: Option<f32>,

    #[arg(long)]
    force_iterations: Option<usize>,
}

impl Args {
    fn launch(&self) -> Launch {
        Launch {
            dataset: self.dataset.clone(),
            focus: self.focus.clone(),
            routing: if self.natural {
                RoutingMode::Natural
            } else {
                RoutingMode::Ordered
            },
            min_distance: self.min_distance,
            force_iterations: self.force_iterations,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synergy_atlas=info")),
        )
        .init();

    let args = Args::parse();
    let launch = args.launch();

    if let Some(path) = &args.export {
        return export(&launch, path);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "synergy-atlas",
        options,
        Box::new(move |cc| Ok(Box::new(app::SynergyAtlasApp::new(cc, launch)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}

fn export(launch: &Launch, path: &Path) -> anyhow::Result<()> {
    let atlas = launch.build_atlas()?;
    let json = serde_json::to_string_pretty(atlas.index())
        .context("failed to serialize the layout index")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = atlas.index().nodes.len(),
        connections = atlas.index().connections().len(),
        "layout exported"
    );
    Ok(())
}
