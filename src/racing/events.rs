//! Race status, inbound trigger events and outbound race events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::record::RacerId;
use super::track::CheckpointId;

/// Race status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    /// Racers being registered
    #[default]
    Idle,
    /// Countdown to the green light
    Countdown,
    /// Race running
    Racing,
    /// Race completed or abandoned
    Finished,
}

impl RaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceStatus::Idle => "idle",
            RaceStatus::Countdown => "countdown",
            RaceStatus::Racing => "racing",
            RaceStatus::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(RaceStatus::Idle),
            "countdown" => Some(RaceStatus::Countdown),
            "racing" => Some(RaceStatus::Racing),
            "finished" => Some(RaceStatus::Finished),
            _ => None,
        }
    }

    /// Whether racers may still be added or removed freely.
    pub fn accepts_registration(&self) -> bool {
        matches!(self, RaceStatus::Idle | RaceStatus::Countdown)
    }
}

/// Crossing reported by the collision/trigger layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEvent {
    /// Racer body entered a checkpoint volume.
    CheckpointCrossed {
        racer: RacerId,
        checkpoint: CheckpointId,
    },
    /// Racer body entered the finish line volume at `timestamp` (race clock).
    FinishLineCrossed { racer: RacerId, timestamp: f64 },
}

/// Event published to HUD/audio/story consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceEvent {
    /// Countdown began.
    CountdownStarted { seconds: u32 },
    /// Whole seconds left on the countdown changed.
    CountdownTick { seconds: u32 },
    /// Green light.
    RaceStarted,
    /// A new checkpoint was recorded for the current lap.
    CheckpointPassed {
        racer: RacerId,
        checkpoint: CheckpointId,
    },
    /// A lap closed legitimately.
    LapCompleted {
        racer: RacerId,
        lap: u32,
        lap_time: f64,
    },
    /// Standing changed since the previous ranking pass.
    PositionChanged { racer: RacerId, position: u32 },
    /// A racer completed the final lap.
    RacerFinished {
        racer: RacerId,
        finish_time: f64,
    },
    /// First finisher of the race. Published once per race.
    RaceFinished { winner: RacerId },
    /// Race was abandoned before everyone finished.
    RaceAborted,
}

/// Why a trigger event was dropped. None of these are faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Race is not in the racing state
    NotRacing,
    /// Racer is not part of this race
    UnknownRacer,
    /// Racer already crossed the line for the last time
    AlreadyFinished,
    /// Checkpoint does not belong to this track
    UnknownCheckpoint,
    /// Checkpoint already recorded this lap
    Duplicate,
    /// Sequential policy: not the next checkpoint in track order
    OutOfOrder,
    /// Finish line crossed before every checkpoint was passed
    IncompleteLap,
    /// Timestamp earlier than the start of the current lap
    StaleTimestamp,
    /// Timestamp is NaN or infinite
    InvalidTimestamp,
}

/// Result of feeding a checkpoint crossing to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckpointOutcome {
    Recorded,
    Ignored(IgnoreReason),
}

/// Result of feeding a finish-line crossing to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LapOutcome {
    /// A lap closed and the racer continues.
    LapCompleted { lap: u32, lap_time: f64 },
    /// The final lap closed.
    Finished { lap_time: f64, finish_time: f64 },
    Ignored(IgnoreReason),
}

/// Fan-out point for outbound race events.
///
/// Sending never blocks; consumers that fall behind by more than the
/// channel capacity lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RaceEvent>,
}

impl EventBus {
    /// Create a bus and its first receiver.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<RaceEvent>) {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Subscribe to race events.
    pub fn subscribe(&self) -> broadcast::Receiver<RaceEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, event: RaceEvent) {
        tracing::trace!(?event, "race event");
        let _ = self.tx.send(event);
    }
}

/// Racing configuration constants.
pub mod constants {
    /// Default number of laps per race
    pub const DEFAULT_TOTAL_LAPS: u32 = 3;

    /// Default countdown duration in seconds
    pub const DEFAULT_COUNTDOWN_SECONDS: f64 = 3.0;

    /// Default outbound event buffer size
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Upper bound on the countdown accepted from configuration (seconds)
    pub const MAX_COUNTDOWN_SECONDS: f64 = 60.0;
}

/// Racing errors.
///
/// These signal misuse by the calling race controller. Trigger noise
/// (unknown racers, duplicate crossings, early finish-line hits) is never an
/// error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RacingError {
    #[error("Racer not registered: {0}")]
    UnknownRacer(RacerId),

    #[error("Racer already registered: {0}")]
    AlreadyRegistered(RacerId),

    #[error("Race already started")]
    RaceAlreadyStarted,

    #[error("Race is not idle (status: {})", .0.as_str())]
    RaceNotIdle(RaceStatus),

    #[error("Race has no registered racers")]
    NoRacers,

    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    #[error("Invalid race configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
