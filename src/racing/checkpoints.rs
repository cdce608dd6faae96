//! Checkpoint crossing validation.

use super::events::{CheckpointOutcome, EventBus, IgnoreReason, RaceEvent};
use super::record::RacerRecord;
use super::track::{CheckpointId, CheckpointOrder, CheckpointSet};

/// Records checkpoint crossings into a racer's lap progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckpointValidator {
    order: CheckpointOrder,
}

impl CheckpointValidator {
    pub fn new(order: CheckpointOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> CheckpointOrder {
        self.order
    }

    /// Validate a crossing and record it on success.
    ///
    /// Publishes `CheckpointPassed` only when the checkpoint is newly
    /// recorded for the current lap.
    pub fn on_checkpoint_crossed(
        &self,
        track: &CheckpointSet,
        record: &mut RacerRecord,
        checkpoint: CheckpointId,
        bus: &EventBus,
    ) -> CheckpointOutcome {
        if let Some(reason) = self.check(track, record, checkpoint) {
            tracing::debug!(
                racer = %record.racer_id(),
                %checkpoint,
                ?reason,
                "checkpoint crossing ignored"
            );
            return CheckpointOutcome::Ignored(reason);
        }

        record.record_checkpoint(checkpoint);
        bus.publish(RaceEvent::CheckpointPassed {
            racer: record.racer_id(),
            checkpoint,
        });
        CheckpointOutcome::Recorded
    }

    fn check(
        &self,
        track: &CheckpointSet,
        record: &RacerRecord,
        checkpoint: CheckpointId,
    ) -> Option<IgnoreReason> {
        if record.is_finished() {
            return Some(IgnoreReason::AlreadyFinished);
        }

        let index = match track.index_of(checkpoint) {
            Some(index) => index,
            None => return Some(IgnoreReason::UnknownCheckpoint),
        };

        if record.has_passed(checkpoint) {
            return Some(IgnoreReason::Duplicate);
        }

        if self.order == CheckpointOrder::Sequential
            && index != record.checkpoints_passed().len()
        {
            return Some(IgnoreReason::OutOfOrder);
        }

        None
    }
}
