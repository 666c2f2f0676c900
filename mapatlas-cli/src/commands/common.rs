//! Common helpers shared across CLI commands.

use mapatlas::config::ConfigFile;
use mapatlas::export::ExportConfig;

use crate::error::CliError;

/// Resolve export settings from CLI args and config.
///
/// CLI takes precedence, then config, then built-in defaults.
pub fn resolve_export_config(
    cli_size: Option<u32>,
    serial: bool,
    config: &ConfigFile,
) -> Result<ExportConfig, CliError> {
    let mut export = config.export.clone();
    if let Some(size) = cli_size {
        export = export.with_output_size(size);
    }
    if serial {
        export = export.with_parallel(false);
    }
    export
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(export)
}
