//! Render command - build a tile pyramid from a manifest and export it.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use mapatlas::export::export_pyramid;
use mapatlas::Atlas;
use tracing::{debug, info};

use super::common::resolve_export_config;
use crate::error::CliError;
use crate::manifest;
use crate::runner::CliRunner;

/// Arguments for the render command.
pub struct RenderArgs {
    pub manifest: PathBuf,
    pub output: PathBuf,
    pub size: Option<u32>,
    pub serial: bool,
}

/// Run the render command.
pub fn run(args: RenderArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("render");
    let export_config = resolve_export_config(args.size, args.serial, runner.config())?;

    let records = manifest::load(&args.manifest)?;
    let base_dir = manifest::base_dir(&args.manifest);

    let mut atlas = Atlas::new();
    for record in &records {
        debug!(
            id = ?record.id,
            x = record.x,
            z = record.z,
            scale = record.scale,
            "Loading tile"
        );
        atlas.insert(record.load(&base_dir)?)?;
    }
    info!(
        tiles = records.len(),
        megaregions = atlas.len(),
        "Tiles loaded"
    );

    atlas.interpolate_all()?;

    let total: usize = atlas.stacks_by_scale().values().map(Vec::len).sum();
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} tiles ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let summary = export_pyramid(&atlas, &args.output, &export_config, |_| {
        progress.inc(1)
    });
    progress.finish_and_clear();
    let summary = summary?;

    println!(
        "Wrote {} tiles to {}",
        summary.total(),
        args.output.display()
    );
    for (depth, count) in &summary.tiles_per_depth {
        println!("  depth {}: {} tiles", depth, count);
    }
    if let (Some((left, top)), Some((width, height))) = (atlas.top_left(), atlas.dimension()) {
        println!(
            "  megaregions: {} (top-left {},{}; span {}×{})",
            atlas.len(),
            left,
            top,
            width + 1,
            height + 1
        );
    }

    Ok(())
}
