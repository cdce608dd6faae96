//! Per-racer progress state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::track::CheckpointId;

/// Opaque handle into the vehicle/AI layer. Only compared for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RacerId(pub u64);

impl From<u64> for RacerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RacerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "racer#{}", self.0)
    }
}

/// Progress of one racer through the current race.
///
/// Records are owned by the race session; everything outside the `racing`
/// module only gets read access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacerRecord {
    racer_id: RacerId,
    /// Monotonic registration counter, used as the last ranking tie-break
    registration_index: u64,
    current_lap: u32,
    /// Checkpoints crossed since the last lap completion, in crossing order
    checkpoints_passed: Vec<CheckpointId>,
    lap_times: Vec<f64>,
    total_race_time: f64,
    finished: bool,
    finish_time: Option<f64>,
    /// 1-based; 0 until the first ranking pass
    position: u32,
    lap_start_time: f64,
    race_start_time: f64,
}

impl RacerRecord {
    pub(crate) fn new(racer_id: RacerId, registration_index: u64) -> Self {
        Self {
            racer_id,
            registration_index,
            current_lap: 1,
            checkpoints_passed: Vec::new(),
            lap_times: Vec::new(),
            total_race_time: 0.0,
            finished: false,
            finish_time: None,
            position: 0,
            lap_start_time: 0.0,
            race_start_time: 0.0,
        }
    }

    pub fn racer_id(&self) -> RacerId {
        self.racer_id
    }

    pub fn registration_index(&self) -> u64 {
        self.registration_index
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    /// Laps fully completed so far.
    pub fn laps_completed(&self) -> u32 {
        self.lap_times.len() as u32
    }

    pub fn checkpoints_passed(&self) -> &[CheckpointId] {
        &self.checkpoints_passed
    }

    pub fn has_passed(&self, checkpoint: CheckpointId) -> bool {
        self.checkpoints_passed.contains(&checkpoint)
    }

    pub fn lap_times(&self) -> &[f64] {
        &self.lap_times
    }

    /// Fastest completed lap.
    pub fn best_lap(&self) -> Option<f64> {
        self.lap_times
            .iter()
            .copied()
            .fold(None, |best, t| match best {
                Some(b) if b <= t => Some(b),
                _ => Some(t),
            })
    }

    pub fn total_race_time(&self) -> f64 {
        self.total_race_time
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Race-clock time at which the racer finished.
    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn lap_start_time(&self) -> f64 {
        self.lap_start_time
    }

    /// Reset timing at the green light.
    pub(crate) fn start(&mut self, now: f64) {
        self.race_start_time = now;
        self.lap_start_time = now;
        self.total_race_time = 0.0;
    }

    /// Returns false if the checkpoint was already recorded this lap.
    pub(crate) fn record_checkpoint(&mut self, checkpoint: CheckpointId) -> bool {
        if self.has_passed(checkpoint) {
            return false;
        }
        self.checkpoints_passed.push(checkpoint);
        true
    }

    /// Close the current lap at `now` and return its duration.
    pub(crate) fn complete_lap(&mut self, now: f64) -> f64 {
        let lap_time = now - self.lap_start_time;
        self.lap_times.push(lap_time);
        self.checkpoints_passed.clear();
        self.lap_start_time = now;
        self.current_lap += 1;
        lap_time
    }

    pub(crate) fn finish(&mut self, now: f64) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.finish_time = Some(now);
        self.total_race_time = now - self.race_start_time;
    }

    pub(crate) fn accrue(&mut self, delta_seconds: f64) {
        if !self.finished {
            self.total_race_time += delta_seconds;
        }
    }

    pub(crate) fn set_position(&mut self, position: u32) -> bool {
        let changed = self.position != position;
        self.position = position;
        changed
    }
}
