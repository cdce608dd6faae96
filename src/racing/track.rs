//! Static track description: ordered checkpoints plus the finish line.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::events::RacingError;

/// Opaque checkpoint identifier as reported by the trigger layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointId(pub u32);

impl From<u32> for CheckpointId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cp{}", self.0)
    }
}

/// How checkpoints must be crossed within a lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointOrder {
    /// Any order; only completeness is checked at the finish line
    #[default]
    Any,
    /// Checkpoints must be crossed in track order
    Sequential,
}

impl fmt::Display for CheckpointOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointOrder::Any => write!(f, "Any"),
            CheckpointOrder::Sequential => write!(f, "Sequential"),
        }
    }
}

/// Immutable per-track checkpoint layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointSet {
    /// Display name
    #[serde(default)]
    pub name: String,
    checkpoints: Vec<CheckpointId>,
    finish_line: CheckpointId,
}

impl CheckpointSet {
    /// Create a checkpoint set, rejecting duplicate ids and a finish line
    /// that doubles as an intermediate checkpoint.
    pub fn new(
        checkpoints: Vec<CheckpointId>,
        finish_line: CheckpointId,
    ) -> Result<Self, RacingError> {
        let set = Self {
            name: String::new(),
            checkpoints,
            finish_line,
        };
        set.validate()?;
        Ok(set)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Parse a track definition from TOML.
    ///
    /// ```toml
    /// name = "Harbour Loop"
    /// checkpoints = [1, 2, 3]
    /// finish_line = 0
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, RacingError> {
        let set: CheckpointSet =
            toml::from_str(content).map_err(|e| RacingError::InvalidTrack(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<(), RacingError> {
        let mut seen = HashSet::with_capacity(self.checkpoints.len());
        for id in &self.checkpoints {
            if *id == self.finish_line {
                return Err(RacingError::InvalidTrack(format!(
                    "finish line {} is also listed as a checkpoint",
                    id
                )));
            }
            if !seen.insert(*id) {
                return Err(RacingError::InvalidTrack(format!(
                    "checkpoint {} listed twice",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Checkpoints in track order.
    pub fn checkpoints(&self) -> &[CheckpointId] {
        &self.checkpoints
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn finish_line(&self) -> CheckpointId {
        self.finish_line
    }

    /// Whether `id` is an intermediate checkpoint of this track.
    pub fn contains(&self, id: CheckpointId) -> bool {
        self.checkpoints.contains(&id)
    }

    /// Position of `id` in track order.
    pub fn index_of(&self, id: CheckpointId) -> Option<usize> {
        self.checkpoints.iter().position(|c| *c == id)
    }
}
