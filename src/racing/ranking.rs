//! Live standings.
//!
//! Ordering, first differing rule wins:
//!
//! 1. finished racers ahead of everyone still racing
//! 2. finishers by finish time, earliest first
//! 3. racers still on track by lap, then by checkpoints passed this lap
//! 4. by path progress along the racing line; a racer with a reading is
//!    ahead of a level racer without one
//! 5. by registration order

use std::cmp::Ordering;

use super::events::{EventBus, RaceEvent};
use super::record::{RacerId, RacerRecord};

/// Continuous progress query supplied by the vehicle/AI layer.
pub trait PathProgress {
    /// Fraction of the current lap's racing line covered, in `0.0..=1.0`.
    /// `None` when the racer has no path information.
    fn path_progress(&self, racer: RacerId) -> Option<f32>;
}

impl<F> PathProgress for F
where
    F: Fn(RacerId) -> Option<f32>,
{
    fn path_progress(&self, racer: RacerId) -> Option<f32> {
        self(racer)
    }
}

/// Recomputes 1..N positions for every registered racer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionRanker;

impl PositionRanker {
    pub fn new() -> Self {
        Self
    }

    /// Sort, assign positions and publish `PositionChanged` for racers whose
    /// position differs from the previous pass. Returns those changes.
    pub fn recompute_positions(
        &self,
        records: &mut [RacerRecord],
        progress: Option<&dyn PathProgress>,
        bus: &EventBus,
    ) -> Vec<(RacerId, u32)> {
        let progress_of: Vec<Option<f32>> = records
            .iter()
            .map(|r| {
                let id = r.racer_id();
                progress.and_then(|p| sanitize_progress(id, p.path_progress(id)))
            })
            .collect();

        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| {
            compare(&records[a], &records[b], progress_of[a], progress_of[b])
        });

        let mut changes = Vec::new();
        for (rank, &index) in order.iter().enumerate() {
            let position = rank as u32 + 1;
            let record = &mut records[index];
            if record.set_position(position) {
                changes.push((record.racer_id(), position));
            }
        }

        for &(racer, position) in &changes {
            bus.publish(RaceEvent::PositionChanged { racer, position });
        }
        changes
    }
}

/// Compare two records; `Less` means `a` is ahead of `b`.
pub fn compare(
    a: &RacerRecord,
    b: &RacerRecord,
    progress_a: Option<f32>,
    progress_b: Option<f32>,
) -> Ordering {
    match (a.is_finished(), b.is_finished()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (true, true) => {
            return cmp_asc_f64(
                a.finish_time().unwrap_or(f64::INFINITY),
                b.finish_time().unwrap_or(f64::INFINITY),
            )
            .then_with(|| a.registration_index().cmp(&b.registration_index()));
        }
        (false, false) => {}
    }

    b.current_lap()
        .cmp(&a.current_lap())
        .then_with(|| {
            b.checkpoints_passed()
                .len()
                .cmp(&a.checkpoints_passed().len())
        })
        .then_with(|| match (progress_a, progress_b) {
            (Some(pa), Some(pb)) => pb.total_cmp(&pa),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.registration_index().cmp(&b.registration_index()))
}

fn cmp_asc_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

fn sanitize_progress(racer: RacerId, value: Option<f32>) -> Option<f32> {
    match value {
        Some(v) if v.is_finite() => Some(v.clamp(0.0, 1.0)),
        Some(v) => {
            tracing::warn!(%racer, value = v, "discarding non-finite path progress");
            None
        }
        None => None,
    }
}
