//! Tile manifest loading.
//!
//! A manifest is a JSON array of tile records. Each record gives the tile's
//! center and scale and exactly one pixel source:
//!
//! ```json
//! [
//!   { "id": 3, "x": 0, "z": 0, "scale": 4, "colors": "map_3.bin" },
//!   { "x": 64, "z": 64, "scale": 0, "image": "detail.png" }
//! ]
//! ```
//!
//! `colors` is a raw file of 128×128 map color indices; `image` is a
//! 128×128 PNG. Relative paths resolve against the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use mapatlas::{Bounds, Tile};
use serde::Deserialize;

use crate::error::CliError;

/// Where a record's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileSource {
    /// Raw map color indices.
    Colors(PathBuf),
    /// RGBA image file.
    Image(PathBuf),
}

/// One entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileRecord {
    /// Map item id, used only for logging.
    #[serde(default)]
    pub id: Option<u32>,
    pub x: i32,
    pub z: i32,
    pub scale: u8,
    #[serde(flatten)]
    pub source: TileSource,
}

impl TileRecord {
    /// Read the pixel source and build a tile.
    pub fn load(&self, base_dir: &Path) -> Result<Tile, CliError> {
        let bounds = Bounds::new(self.x, self.z, self.scale)?;
        match &self.source {
            TileSource::Colors(path) => {
                let path = base_dir.join(path);
                let indices = fs::read(&path).map_err(|e| CliError::TileSource {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(Tile::from_indices(bounds, &indices)?)
            }
            TileSource::Image(path) => {
                let path = base_dir.join(path);
                let pixels = image::open(&path)
                    .map_err(|e| CliError::TileSource {
                        path: path.clone(),
                        message: e.to_string(),
                    })?
                    .to_rgba8();
                Ok(Tile::new(bounds, pixels)?)
            }
        }
    }
}

/// Parse a manifest file.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or lists no records.
pub fn load(path: &Path) -> Result<Vec<TileRecord>, CliError> {
    let manifest_err = |message: String| CliError::Manifest {
        path: path.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|e| manifest_err(e.to_string()))?;
    let records: Vec<TileRecord> =
        serde_json::from_str(&text).map_err(|e| manifest_err(e.to_string()))?;

    if records.is_empty() {
        return Err(CliError::NoRecords(path.to_path_buf()));
    }
    Ok(records)
}

/// Directory relative sources resolve against.
pub fn base_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
