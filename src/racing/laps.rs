//! Lap completion and per-racer finish detection.

use super::events::{EventBus, IgnoreReason, LapOutcome, RaceEvent};
use super::record::RacerRecord;
use super::track::CheckpointSet;

/// Closes laps on finish-line crossings.
#[derive(Debug, Clone, Copy)]
pub struct LapTracker {
    total_laps: u32,
}

impl LapTracker {
    pub fn new(total_laps: u32) -> Self {
        Self { total_laps }
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    /// Handle a finish-line crossing at race-clock time `now`.
    ///
    /// A lap only closes once every checkpoint of the track has been
    /// recorded for it, so a racer idling on the line at the start does not
    /// score. On the final lap the record is marked finished; picking the
    /// race winner is left to the session.
    pub fn on_finish_line_crossed(
        &self,
        track: &CheckpointSet,
        record: &mut RacerRecord,
        now: f64,
        bus: &EventBus,
    ) -> LapOutcome {
        if record.is_finished() {
            return ignore(record, IgnoreReason::AlreadyFinished);
        }

        if !now.is_finite() {
            tracing::warn!(racer = %record.racer_id(), now, "non-finite finish line timestamp");
            return LapOutcome::Ignored(IgnoreReason::InvalidTimestamp);
        }

        if record.checkpoints_passed().len() < track.checkpoint_count() {
            return ignore(record, IgnoreReason::IncompleteLap);
        }

        if now < record.lap_start_time() {
            tracing::warn!(
                racer = %record.racer_id(),
                now,
                lap_start = record.lap_start_time(),
                "finish line timestamp precedes lap start"
            );
            return LapOutcome::Ignored(IgnoreReason::StaleTimestamp);
        }

        let lap = record.current_lap();
        let lap_time = record.complete_lap(now);
        bus.publish(RaceEvent::LapCompleted {
            racer: record.racer_id(),
            lap,
            lap_time,
        });

        if record.current_lap() > self.total_laps {
            record.finish(now);
            tracing::info!(racer = %record.racer_id(), finish_time = now, "racer finished");
            bus.publish(RaceEvent::RacerFinished {
                racer: record.racer_id(),
                finish_time: now,
            });
            return LapOutcome::Finished {
                lap_time,
                finish_time: now,
            };
        }

        LapOutcome::LapCompleted { lap, lap_time }
    }
}

fn ignore(record: &RacerRecord, reason: IgnoreReason) -> LapOutcome {
    tracing::debug!(racer = %record.racer_id(), ?reason, "finish line crossing ignored");
    LapOutcome::Ignored(reason)
}
