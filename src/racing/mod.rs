//! Race progress tracking and ranking.
//!
//! Turns checkpoint and finish-line crossings into lap counts, finish
//! detection and live standings for any number of racers.

pub mod checkpoints;
pub mod countdown;
pub mod events;
pub mod laps;
pub mod ranking;
pub mod record;
pub mod results;
pub mod session;
pub mod snapshot;
pub mod track;

// Re-export commonly used types
pub use checkpoints::CheckpointValidator;
pub use countdown::Countdown;
pub use events::{
    CheckpointOutcome, IgnoreReason, LapOutcome, RaceEvent, RaceStatus, RacingError, TriggerEvent,
};
pub use laps::LapTracker;
pub use ranking::{PathProgress, PositionRanker};
pub use record::{RacerId, RacerRecord};
pub use results::RaceResults;
pub use session::{RaceSession, RaceSettings};
pub use snapshot::RaceSnapshot;
pub use track::{CheckpointId, CheckpointOrder, CheckpointSet};
