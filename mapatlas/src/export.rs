//! PNG export of a completed pyramid.
//!
//! Every populated cell becomes one file at
//! `<root>/<depth>/<grid_x>/<grid_z>.png`, where `depth = 4 - scale` (so the
//! finest detail is depth 4) and the grid coordinates come from
//! [`Bounds::coords_at`] at the cell's own scale. Cells are composited at
//! 128×128 and scaled to [`ExportConfig::output_size`] with nearest-neighbor
//! sampling.
//!
//! # Example
//!
//! ```no_run
//! use mapatlas::atlas::Atlas;
//! use mapatlas::export::{export_pyramid, ExportConfig};
//!
//! let mut atlas = Atlas::new();
//! // ... insert tiles ...
//! atlas.interpolate_all()?;
//!
//! let summary = export_pyramid(&atlas, "out", &ExportConfig::default(), |_| {})?;
//! println!("wrote {} tiles", summary.total());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::atlas::Atlas;
use crate::bounds::{Bounds, MAX_SCALE};
use crate::error::{AtlasError, AtlasResult};
use crate::layer::{Render, SharedStack, Stack};

/// Default edge length of exported PNGs in pixels.
pub const DEFAULT_OUTPUT_SIZE: u32 = 256;

/// Errors that can occur while writing the pyramid.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Directory creation failed.
    #[error("Failed to create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// PNG encoding or writing failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A cell could not be rendered.
    #[error("Render failed: {0}")]
    Atlas(#[from] AtlasError),

    /// Export settings are unusable.
    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Edge length of each PNG. Must be a power of two.
    pub output_size: u32,

    /// Render and encode cells on the rayon pool.
    pub parallel: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            parallel: true,
        }
    }
}

impl ExportConfig {
    /// Set the output edge length.
    pub fn with_output_size(mut self, size: u32) -> Self {
        self.output_size = size;
        self
    }

    /// Enable or disable parallel export.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the settings can be used.
    pub fn validate(&self) -> Result<(), ExportError> {
        if !self.output_size.is_power_of_two() {
            return Err(ExportError::InvalidConfig(format!(
                "output_size must be a power of two, got {}",
                self.output_size
            )));
        }
        Ok(())
    }
}

/// Output location of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilePath {
    /// Zoom depth, `4 - scale`.
    pub depth: u8,
    pub grid_x: i32,
    pub grid_z: i32,
}

impl TilePath {
    /// Output location for a cell.
    pub fn for_bounds(bounds: &Bounds) -> Self {
        let (grid_x, grid_z) = bounds.coords_at(bounds.scale());
        Self {
            depth: MAX_SCALE - bounds.scale(),
            grid_x,
            grid_z,
        }
    }

    /// Directory holding this file, relative to the export root.
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.depth.to_string()).join(self.grid_x.to_string())
    }

    /// File path relative to the export root.
    pub fn relative_path(&self) -> PathBuf {
        self.relative_dir().join(format!("{}.png", self.grid_z))
    }
}

impl fmt::Display for TilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.depth, self.grid_x, self.grid_z)
    }
}

/// Counts of written files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files written per depth.
    pub tiles_per_depth: BTreeMap<u8, usize>,
}

impl ExportSummary {
    /// Total number of files written.
    pub fn total(&self) -> usize {
        self.tiles_per_depth.values().sum()
    }
}

/// Composite a stack and scale it to `output_size`.
pub fn render_tile(stack: &Stack, output_size: u32) -> AtlasResult<RgbaImage> {
    let image = stack.image()?;
    if image.width() == output_size {
        return Ok(image);
    }
    Ok(imageops::resize(
        &image,
        output_size,
        output_size,
        FilterType::Nearest,
    ))
}

/// Write every populated cell of `atlas` below `root`.
///
/// `on_tile` runs after each file is written; with parallel export it may
/// be called from several threads at once.
pub fn export_pyramid<P, F>(
    atlas: &Atlas,
    root: P,
    config: &ExportConfig,
    on_tile: F,
) -> Result<ExportSummary, ExportError>
where
    P: AsRef<Path>,
    F: Fn(&TilePath) + Send + Sync,
{
    config.validate()?;
    let root = root.as_ref();

    let jobs: Vec<(TilePath, SharedStack)> = atlas
        .stacks_by_scale()
        .into_values()
        .flatten()
        .map(|stack| {
            let path = TilePath::for_bounds(&stack.read().bounds());
            (path, stack)
        })
        .collect();

    let dirs: BTreeSet<PathBuf> = jobs
        .iter()
        .map(|(path, _)| root.join(path.relative_dir()))
        .collect();
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    info!(
        tiles = jobs.len(),
        root = %root.display(),
        parallel = config.parallel,
        "Exporting pyramid"
    );

    let write = |(path, stack): &(TilePath, SharedStack)| -> Result<u8, ExportError> {
        let image = render_tile(&stack.read(), config.output_size)?;
        let file = root.join(path.relative_path());
        image
            .save_with_format(&file, ImageFormat::Png)
            .map_err(|source| ExportError::Encode {
                path: file.clone(),
                source,
            })?;
        debug!(tile = %path, "Wrote tile");
        on_tile(path);
        Ok(path.depth)
    };

    let depths: Vec<u8> = if config.parallel {
        jobs.par_iter().map(&write).collect::<Result<_, _>>()?
    } else {
        jobs.iter().map(&write).collect::<Result<_, _>>()?
    };

    let mut summary = ExportSummary::default();
    for depth in depths {
        *summary.tiles_per_depth.entry(depth).or_default() += 1;
    }

    info!(
        total = summary.total(),
        depths = summary.tiles_per_depth.len(),
        "Export complete"
    );
    Ok(summary)
}
