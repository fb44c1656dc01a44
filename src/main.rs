//! Atlas-Weave
//!
//! Garment texture atlas builder: takes front and back apparel photos and
//! writes one square UV-ready texture atlas as lossless PNG.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use atlas_weave::config::Settings;
use atlas_weave::{GeometryOverrides, RenderStyle, TexturePipeline, TextureRequest};

/// Build a UV-ready garment texture atlas from two photos.
#[derive(Debug, Parser)]
#[command(name = "atlas-weave", version, about)]
struct Args {
    /// Front-view photo of the garment
    front: PathBuf,

    /// Back-view photo of the garment
    back: PathBuf,

    /// Rendering style (defaults to the configured style)
    #[arg(long, value_enum)]
    style: Option<RenderStyle>,

    /// Output path for the encoded atlas
    #[arg(long)]
    out: Option<PathBuf>,

    /// JSON file with geometry/appearance overrides
    #[arg(long)]
    geometry: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atlas_weave=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load().context("Failed to load configuration")?;

    let overrides: GeometryOverrides = match &args.geometry {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read geometry overrides: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid geometry overrides: {}", path.display()))?
        }
        None => settings.geometry.clone(),
    };

    let request = TextureRequest {
        style: args.style.unwrap_or(settings.pipeline.style),
        overrides,
    };

    info!(
        front = %args.front.display(),
        back = %args.back.display(),
        style = %request.style,
        "Starting atlas-weave v{}",
        env!("CARGO_PKG_VERSION")
    );

    let front = fs::read(&args.front)
        .with_context(|| format!("Failed to read front photo: {}", args.front.display()))?;
    let back = fs::read(&args.back)
        .with_context(|| format!("Failed to read back photo: {}", args.back.display()))?;

    let pipeline = TexturePipeline::new();
    let atlas = pipeline.build_texture(&front, &back, &request)?;

    let out = args.out.unwrap_or(settings.output.path);
    fs::write(&out, &atlas.bytes)
        .with_context(|| format!("Failed to write atlas: {}", out.display()))?;

    info!(
        path = %out.display(),
        width = atlas.width,
        height = atlas.height,
        bytes = atlas.bytes.len(),
        "Texture atlas written"
    );

    Ok(())
}
