//! Storage module for configuration and race snapshots.

pub mod config;
pub mod snapshots;

pub use config::{AppConfig, ConfigError, SimulationSettings};
pub use snapshots::{load_snapshot, save_snapshot};
