// Configuration loading and parsing (event.toml).
//
// The config file is optional: every setting has a default, and a missing
// file simply yields `Config::default()`. Validation rejects values that
// would break the draw animation or the grouping contract.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::grouping::MIN_GROUP_SIZE;

/// Default total spin duration in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 2000;
/// Default spin frame interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 50;
/// Default per-group member count.
pub const DEFAULT_GROUP_SIZE: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

/// Raw deserialization target for the entire event.toml file.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    draw: DrawSection,
    #[serde(default)]
    grouping: GroupingSection,
    #[serde(default)]
    export: ExportSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DrawSection {
    #[serde(default = "default_duration_ms")]
    duration_ms: u64,
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default)]
    allow_repeat: bool,
}

impl Default for DrawSection {
    fn default() -> Self {
        DrawSection {
            duration_ms: DEFAULT_DURATION_MS,
            tick_ms: DEFAULT_TICK_MS,
            allow_repeat: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GroupingSection {
    #[serde(default = "default_group_size")]
    default_size: usize,
}

impl Default for GroupingSection {
    fn default() -> Self {
        GroupingSection {
            default_size: DEFAULT_GROUP_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ExportSection {
    #[serde(default = "default_export_dir")]
    dir: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        ExportSection {
            dir: default_export_dir(),
        }
    }
}

fn default_duration_ms() -> u64 {
    DEFAULT_DURATION_MS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

fn default_export_dir() -> String {
    "export".to_string()
}

/// The assembled application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Total spin animation duration.
    pub draw_duration_ms: u64,
    /// Interval between spin display frames.
    pub draw_tick_ms: u64,
    /// Whether repeat wins are allowed at startup.
    pub allow_repeat: bool,
    /// Per-group member count at startup (already clamped to the minimum).
    pub default_group_size: usize,
    /// Directory CSV exports are written to.
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            draw_duration_ms: DEFAULT_DURATION_MS,
            draw_tick_ms: DEFAULT_TICK_MS,
            allow_repeat: false,
            default_group_size: DEFAULT_GROUP_SIZE,
            export_dir: PathBuf::from(default_export_dir()),
        }
    }
}

/// Load configuration from `event.toml` in the working directory.
///
/// A missing file is not an error; defaults apply.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from(Path::new("event.toml"))
}

/// Load configuration from an explicit path, applying defaults for any
/// missing section or field.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let file = if path.exists() {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<ConfigFile>(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        ConfigFile::default()
    };

    assemble(file)
}

fn assemble(file: ConfigFile) -> Result<Config, ConfigError> {
    if file.draw.tick_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.tick_ms".to_string(),
            message: "must be nonzero".to_string(),
        });
    }
    if file.draw.duration_ms < file.draw.tick_ms {
        return Err(ConfigError::ValidationError {
            field: "draw.duration_ms".to_string(),
            message: format!(
                "must be at least tick_ms ({} < {})",
                file.draw.duration_ms, file.draw.tick_ms
            ),
        });
    }

    Ok(Config {
        draw_duration_ms: file.draw.duration_ms,
        draw_tick_ms: file.draw.tick_ms,
        allow_repeat: file.draw.allow_repeat,
        default_group_size: file.grouping.default_size.max(MIN_GROUP_SIZE),
        export_dir: PathBuf::from(file.export.dir),
    })
}
