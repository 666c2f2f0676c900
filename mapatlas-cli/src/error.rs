//! CLI error type.

use std::path::PathBuf;

use mapatlas::config::ConfigError;
use mapatlas::export::ExportError;
use mapatlas::AtlasError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line or configuration input.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be read or written.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// Manifest could not be read or parsed.
    #[error("Failed to load manifest {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    /// Manifest lists no tiles.
    #[error("No map records in {}", .0.display())]
    NoRecords(PathBuf),

    /// A tile's pixel source could not be loaded.
    #[error("Failed to load tile {}: {message}", .path.display())]
    TileSource { path: PathBuf, message: String },

    /// Pyramid construction failed.
    #[error("Atlas error: {0}")]
    Atlas(#[from] AtlasError),

    /// Writing the pyramid failed.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}
