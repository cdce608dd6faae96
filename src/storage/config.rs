//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory; a missing file
//! means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::racing::RaceSettings;
use crate::world::npc::NpcSettings;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Race rules
    #[serde(default)]
    pub race: RaceSettings,
    /// AI opponents for simulated races
    #[serde(default)]
    pub npc: NpcSettings,
    /// Simulation loop settings
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            race: RaceSettings::default(),
            npc: NpcSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Check every section for values the engine would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.race
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "simulation.tick_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Simulation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Fixed timestep in milliseconds
    pub tick_ms: u64,
    /// Give up after this many simulated seconds
    pub max_race_seconds: f64,
    /// Write a resume snapshot when the race ends
    pub save_snapshot: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            max_race_seconds: 1800.0,
            save_snapshot: false,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "rustrace", "RustRace")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    Ok(config)
}

/// Load application configuration from `path`.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig {
            data_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;

    config.data_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    Ok(config)
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save application configuration to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
