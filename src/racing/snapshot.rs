//! Minimal persisted race state for resuming mid-race after a reload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::RaceStatus;
use super::record::{RacerId, RacerRecord};
use super::track::CheckpointOrder;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Flat, serializable copy of a race session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub version: u8,
    pub session_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub status: RaceStatus,
    pub countdown_remaining: f64,
    /// Seconds since the green light
    pub race_clock: f64,
    pub total_laps: u32,
    #[serde(default)]
    pub checkpoint_order: CheckpointOrder,
    pub winner: Option<RacerId>,
    pub next_registration: u64,
    /// Records in registration order
    pub racers: Vec<RacerRecord>,
}

impl RaceSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializeError(e.to_string()))
    }

    /// Parse from JSON, rejecting unknown format versions.
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: RaceSnapshot =
            serde_json::from_str(content).map_err(|e| SnapshotError::ParseError(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        Ok(snapshot)
    }
}

/// Snapshot errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u8),
}
