//! Shared setup for CLI commands: logging and configuration loading.

use std::path::Path;

use mapatlas::config::ConfigFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `info`, or `debug` when verbose.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loaded state shared by commands.
pub struct CliRunner {
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration from `config_path`, or the default location.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        Ok(Self { config })
    }

    /// Loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            output_size = self.config.export.output_size,
            "MapAtlas starting"
        );
    }
}
