mod app;
mod overlay;
mod scene;

use anyhow::{Context as _, Result};
use app::LessonApp;
use clap::Parser;
use primer_assets::{AssetManifest, Lesson};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "primer-desktop", about = "Step-by-step 3D rendering lessons")]
struct Cli {
    /// Lesson to run: triangle, quad, cube, camera or lighting
    #[arg(long, default_value = "lighting")]
    lesson: Lesson,

    /// Root directory that shader and texture paths are relative to
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// JSON file overriding per-lesson asset paths
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(lesson = %cli.lesson, "primer-desktop starting");

    let manifest = match &cli.manifest {
        Some(path) => AssetManifest::load(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?,
        None => AssetManifest::new(),
    };
    let assets = manifest.lesson(cli.lesson).resolved(&cli.assets);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LessonApp::new(cli.lesson, assets);
    event_loop.run_app(&mut app)?;

    match app.take_fatal() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
