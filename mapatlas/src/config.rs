//! INI configuration file.
//!
//! Settings live in `~/.config/mapatlas/config.ini` (or the platform
//! equivalent) and are overridden by command-line flags.
//!
//! ```ini
//! [export]
//! output_size = 256
//! parallel = true
//! ```
//!
//! A missing file is not an error: [`ConfigFile::load`] returns defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::export::ExportConfig;

const SECTION_EXPORT: &str = "export";
const KEY_OUTPUT_SIZE: &str = "output_size";
const KEY_PARALLEL: &str = "parallel";

/// Errors that can occur while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// The file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be parsed.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    /// No setting with this name.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The platform has no configuration directory.
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Default configuration file location.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("mapatlas").join("config.ini"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// `[export]` section.
    pub export: ExportConfig,
}

impl ConfigFile {
    /// Load from the default location, falling back to defaults if the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from an explicit path, falling back to defaults if the file does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), ?config, "Loaded config file");
        Ok(config)
    }

    /// Build from parsed INI contents. Missing keys keep their defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SECTION_EXPORT)) {
            if let Some(value) = section.get(KEY_OUTPUT_SIZE) {
                config.export.output_size = parse_value(KEY_OUTPUT_SIZE, value)?;
            }
            if let Some(value) = section.get(KEY_PARALLEL) {
                config.export.parallel = parse_bool(KEY_PARALLEL, value)?;
            }
        }

        config
            .export
            .validate()
            .map_err(|_| ConfigError::InvalidValue {
                key: format!("{}.{}", SECTION_EXPORT, KEY_OUTPUT_SIZE),
                value: config.export.output_size.to_string(),
            })?;
        Ok(config)
    }

    /// Render as INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_EXPORT))
            .set(KEY_OUTPUT_SIZE, self.export.output_size.to_string())
            .set(KEY_PARALLEL, self.export.parallel.to_string());
        ini
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path()?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }
}

/// A single setting, addressed on the command line as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ExportOutputSize,
    ExportParallel,
}

impl ConfigKey {
    /// Every key in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[ConfigKey::ExportOutputSize, ConfigKey::ExportParallel]
    }

    /// INI section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ExportOutputSize | ConfigKey::ExportParallel => SECTION_EXPORT,
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ExportOutputSize => KEY_OUTPUT_SIZE,
            ConfigKey::ExportParallel => KEY_PARALLEL,
        }
    }

    /// Current value as text.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ExportOutputSize => config.export.output_size.to_string(),
            ConfigKey::ExportParallel => config.export.parallel.to_string(),
        }
    }

    /// Parse and store a new value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::ExportOutputSize => {
                let size = parse_value(self.key_name(), value)?;
                if !size.is_power_of_two() {
                    return Err(ConfigError::InvalidValue {
                        key: self.to_string(),
                        value: value.to_string(),
                    });
                }
                config.export.output_size = size;
            }
            ConfigKey::ExportParallel => {
                config.export.parallel = parse_bool(self.key_name(), value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn parse_value(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}.{}", SECTION_EXPORT, key),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{}.{}", SECTION_EXPORT, key),
            value: value.to_string(),
        }),
    }
}
