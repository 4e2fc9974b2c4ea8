use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use primer_assets::{AssetManifest, Lesson, LessonAssets, TextureImage};
use primer_render::{Stage, StageSource};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "primer-cli", about = "CLI tool for primer lesson assets")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version info
    Info,
    /// List every lesson with its asset paths
    Lessons {
        /// JSON file overriding per-lesson asset paths
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Write the default lesson manifest as JSON
    Manifest {
        /// Output file
        #[arg(short, long, default_value = "lessons.json")]
        out: PathBuf,
    },
    /// Read every shader and decode every texture a lesson needs
    Check {
        /// Lesson to check; all lessons when omitted
        #[arg(long)]
        lesson: Option<Lesson>,
        /// Root directory that asset paths are relative to
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
        /// JSON file overriding per-lesson asset paths
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

fn load_manifest(path: Option<&Path>) -> Result<AssetManifest> {
    match path {
        Some(path) => AssetManifest::load(path)
            .with_context(|| format!("failed to read manifest {}", path.display())),
        None => Ok(AssetManifest::new()),
    }
}

fn describe(lesson: Lesson, assets: &LessonAssets) -> String {
    let texture = assets
        .texture
        .as_ref()
        .map_or_else(|| "-".to_string(), |t| t.display().to_string());
    format!(
        "{lesson:<9} vert={} frag={} texture={texture} geometry={:?} camera={} instances={:?}",
        assets.vertex_shader.display(),
        assets.fragment_shader.display(),
        assets.geometry,
        assets.camera,
        assets.instances,
    )
}

/// Load everything `lesson` needs short of creating GPU objects.
fn check_lesson(lesson: Lesson, assets: &LessonAssets) -> Result<()> {
    tracing::debug!(
        %lesson,
        vertex = %assets.vertex_shader.display(),
        fragment = %assets.fragment_shader.display(),
        "checking lesson assets"
    );
    let vertex = StageSource::read(Stage::Vertex, &assets.vertex_shader)?;
    let fragment = StageSource::read(Stage::Fragment, &assets.fragment_shader)?;
    let geometry = assets.geometry.build();
    let texture = match &assets.texture {
        Some(path) => Some(TextureImage::load(path)?),
        None => None,
    };

    println!(
        "{lesson:<9} OK  shaders={}+{} bytes  vertices={}  draw={}{}",
        vertex.text.len(),
        fragment.text.len(),
        geometry.vertex_count(),
        geometry.draw_count(),
        texture.map_or_else(String::new, |t| format!(
            "  texture={}x{} mips={}",
            t.width(),
            t.height(),
            t.mip_level_count()
        )),
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("primer-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("lessons: {}", Lesson::ALL.len());
        }
        Commands::Lessons { manifest } => {
            let manifest = load_manifest(manifest.as_deref())?;
            for lesson in Lesson::ALL {
                println!("{}", describe(lesson, &manifest.lesson(lesson)));
            }
        }
        Commands::Manifest { out } => {
            let mut manifest = AssetManifest::new();
            for lesson in Lesson::ALL {
                manifest.lessons.insert(lesson, lesson.default_assets());
            }
            manifest.save(&out)?;
            println!("Wrote {} lessons to {}", manifest.lessons.len(), out.display());
        }
        Commands::Check {
            lesson,
            assets,
            manifest,
        } => {
            let manifest = load_manifest(manifest.as_deref())?;
            tracing::info!(root = %assets.display(), "checking lesson assets");
            let lessons = match lesson {
                Some(lesson) => vec![lesson],
                None => Lesson::ALL.to_vec(),
            };

            let mut failed = 0;
            for lesson in lessons {
                let resolved = manifest.lesson(lesson).resolved(&assets);
                if let Err(err) = check_lesson(lesson, &resolved) {
                    tracing::warn!(%lesson, "asset check failed");
                    println!("{lesson:<9} FAILED  {err:#}");
                    failed += 1;
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} lesson(s) failed the asset check");
            }
        }
    }

    Ok(())
}
