use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ptocl_compiler::{compile, raw, render, CpuBackend};
use ptocl_core::Canvas;

mod config;
mod scenes;

use config::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let settings = args.resolve()?;
    log::info!("settings: {settings:?}");

    let scene = scenes::build(&settings)?;

    let start = Instant::now();
    let compiled = compile(&scene).context("failed to compile scene")?;
    log::info!(
        "compiled {} objects, {} triangles, {} groups in {:.2?}",
        compiled.objects.len(),
        compiled.triangles.len(),
        compiled.groups.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let backend = CpuBackend::new();
    let canvas = render(&compiled, &backend, &settings.render_options()).context("render failed")?;
    log::info!("rendered in {:.2?}", start.elapsed());

    save_png(&canvas, &settings.output)?;
    if let Some(path) = &settings.raw {
        raw::write_raw_file(&canvas, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

fn save_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgba8())
        .context("canvas does not match its own dimensions")?;
    image
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(())
}
