//! RustRace - race progress tracking and ranking
//!
//! Consumes checkpoint and finish-line crossings from a host game loop,
//! validates them, counts laps, detects finishers and keeps live standings.
//! Includes a race countdown, results tables, resumable snapshots and a
//! small simulated world for driving races headlessly.

pub mod racing;
pub mod storage;
pub mod world;

// Re-export commonly used types
pub use racing::{RaceEvent, RaceResults, RaceSession, RaceSettings, RacerId, TriggerEvent};
pub use storage::config::AppConfig;
