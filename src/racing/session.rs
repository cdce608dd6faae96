//! Race session: the race clock state machine plus racer registration,
//! event routing and queries.
//!
//! ```text
//! Idle --start_race--> Countdown --countdown expires--> Racing --all finished--> Finished
//!   \                     \                               \
//!    `-------------------- `---------- abort_race -------- `----------------> Finished
//! ```
//!
//! Everything runs on the host's game loop thread. Crossing events for a
//! frame are applied first, then [`RaceSession::tick`] advances time and
//! re-ranks once, so observers never see standings from the middle of a
//! frame.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::checkpoints::CheckpointValidator;
use super::countdown::{Countdown, CountdownStep};
use super::events::{
    constants, CheckpointOutcome, EventBus, IgnoreReason, LapOutcome, RaceEvent, RaceStatus,
    RacingError, TriggerEvent,
};
use super::laps::LapTracker;
use super::ranking::{PathProgress, PositionRanker};
use super::record::{RacerId, RacerRecord};
use super::snapshot::{RaceSnapshot, SNAPSHOT_VERSION};
use super::track::{CheckpointId, CheckpointOrder, CheckpointSet};

/// Per-race settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    /// Laps to complete (at least 1)
    pub total_laps: u32,
    /// Countdown before the green light, in seconds
    pub countdown_seconds: f64,
    /// Checkpoint ordering policy
    pub checkpoint_order: CheckpointOrder,
    /// Outbound event buffer per subscriber
    pub event_capacity: usize,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            total_laps: constants::DEFAULT_TOTAL_LAPS,
            countdown_seconds: constants::DEFAULT_COUNTDOWN_SECONDS,
            checkpoint_order: CheckpointOrder::Any,
            event_capacity: constants::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl RaceSettings {
    pub fn validate(&self) -> Result<(), RacingError> {
        if self.total_laps == 0 {
            return Err(RacingError::InvalidConfig(
                "total_laps must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(RacingError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Countdown::new(self.countdown_seconds)
            .map(|_| ())
            .map_err(|e| RacingError::InvalidConfig(e.to_string()))
    }
}

/// The authoritative state of one race.
pub struct RaceSession {
    id: Uuid,
    track: CheckpointSet,
    status: RaceStatus,
    countdown: Countdown,
    /// Seconds since the green light
    race_clock: f64,
    /// Registration order
    records: Vec<RacerRecord>,
    next_registration: u64,
    validator: CheckpointValidator,
    laps: LapTracker,
    ranker: PositionRanker,
    winner: Option<RacerId>,
    bus: EventBus,
}

impl RaceSession {
    /// Create an idle race on `track`. Returns the session and a receiver
    /// for its events.
    pub fn new(
        track: CheckpointSet,
        settings: &RaceSettings,
    ) -> Result<(Self, broadcast::Receiver<RaceEvent>), RacingError> {
        settings.validate()?;
        let countdown = Countdown::new(settings.countdown_seconds)
            .map_err(|e| RacingError::InvalidConfig(e.to_string()))?;
        let (bus, rx) = EventBus::new(settings.event_capacity);

        Ok((
            Self {
                id: Uuid::new_v4(),
                track,
                status: RaceStatus::Idle,
                countdown,
                race_clock: 0.0,
                records: Vec::new(),
                next_registration: 0,
                validator: CheckpointValidator::new(settings.checkpoint_order),
                laps: LapTracker::new(settings.total_laps),
                ranker: PositionRanker::new(),
                winner: None,
                bus,
            },
            rx,
        ))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to race events.
    pub fn subscribe(&self) -> broadcast::Receiver<RaceEvent> {
        self.bus.subscribe()
    }

    // ---- registration -------------------------------------------------

    /// Add a racer. Only allowed before the green light.
    pub fn register_racer(&mut self, racer: RacerId) -> Result<(), RacingError> {
        if !self.status.accepts_registration() {
            return Err(RacingError::RaceAlreadyStarted);
        }
        if self.index_of(racer).is_some() {
            return Err(RacingError::AlreadyRegistered(racer));
        }

        let record = RacerRecord::new(racer, self.next_registration);
        self.next_registration += 1;
        self.records.push(record);
        tracing::debug!(%racer, count = self.records.len(), "racer registered");
        Ok(())
    }

    /// Remove a racer. A race left with nobody in it is abandoned.
    ///
    /// A removed racer is no longer a candidate when the winner is picked at
    /// the end of the tick; a winner already announced stands.
    pub fn unregister_racer(&mut self, racer: RacerId) -> Result<(), RacingError> {
        let index = self
            .index_of(racer)
            .ok_or(RacingError::UnknownRacer(racer))?;
        self.records.remove(index);
        tracing::debug!(%racer, count = self.records.len(), "racer unregistered");

        let live = matches!(self.status, RaceStatus::Countdown | RaceStatus::Racing);
        if live && self.records.is_empty() {
            tracing::info!(session = %self.id, "last racer left, abandoning race");
            self.countdown.cancel();
            self.status = RaceStatus::Finished;
            self.bus.publish(RaceEvent::RaceAborted);
        } else if matches!(self.status, RaceStatus::Racing | RaceStatus::Finished) {
            // close the gap left in the standings
            self.recompute_positions(None);
        }
        Ok(())
    }

    // ---- race control -------------------------------------------------

    /// Begin the countdown.
    pub fn start_race(&mut self) -> Result<(), RacingError> {
        if self.status != RaceStatus::Idle {
            return Err(RacingError::RaceNotIdle(self.status));
        }
        if self.records.is_empty() {
            return Err(RacingError::NoRacers);
        }

        self.status = RaceStatus::Countdown;
        let seconds = self.countdown.start();
        tracing::info!(
            session = %self.id,
            racers = self.records.len(),
            laps = self.laps.total_laps(),
            seconds,
            "countdown started"
        );
        self.bus.publish(RaceEvent::CountdownStarted { seconds });
        Ok(())
    }

    /// Abandon the race from any state. Standings are frozen as they are.
    pub fn abort_race(&mut self) {
        if self.status == RaceStatus::Finished {
            tracing::debug!(session = %self.id, "abort ignored, race already finished");
            return;
        }

        let was_racing = self.status == RaceStatus::Racing;
        self.countdown.cancel();
        if was_racing {
            self.resolve_winner();
            self.recompute_positions(None);
        }
        self.status = RaceStatus::Finished;
        tracing::info!(session = %self.id, was_racing, "race aborted");
        self.bus.publish(RaceEvent::RaceAborted);
    }

    // ---- inbound trigger events ---------------------------------------

    /// Checkpoint volume entered.
    pub fn on_checkpoint_crossed(
        &mut self,
        racer: RacerId,
        checkpoint: CheckpointId,
    ) -> CheckpointOutcome {
        if self.status != RaceStatus::Racing {
            tracing::debug!(%racer, %checkpoint, status = self.status.as_str(), "crossing outside race");
            return CheckpointOutcome::Ignored(IgnoreReason::NotRacing);
        }
        let Some(index) = self.index_of(racer) else {
            tracing::debug!(%racer, %checkpoint, "crossing by unregistered racer");
            return CheckpointOutcome::Ignored(IgnoreReason::UnknownRacer);
        };

        self.validator.on_checkpoint_crossed(
            &self.track,
            &mut self.records[index],
            checkpoint,
            &self.bus,
        )
    }

    /// Finish line entered at `timestamp` on the race clock.
    pub fn on_finish_line_crossed(&mut self, racer: RacerId, timestamp: f64) -> LapOutcome {
        if self.status != RaceStatus::Racing {
            tracing::debug!(%racer, status = self.status.as_str(), "finish crossing outside race");
            return LapOutcome::Ignored(IgnoreReason::NotRacing);
        }
        let Some(index) = self.index_of(racer) else {
            tracing::debug!(%racer, "finish crossing by unregistered racer");
            return LapOutcome::Ignored(IgnoreReason::UnknownRacer);
        };

        self.laps
            .on_finish_line_crossed(&self.track, &mut self.records[index], timestamp, &self.bus)
    }

    /// Route a trigger event to its handler.
    pub fn apply(&mut self, event: TriggerEvent) {
        match event {
            TriggerEvent::CheckpointCrossed { racer, checkpoint } => {
                self.on_checkpoint_crossed(racer, checkpoint);
            }
            TriggerEvent::FinishLineCrossed { racer, timestamp } => {
                self.on_finish_line_crossed(racer, timestamp);
            }
        }
    }

    /// Apply one frame's crossings in reported order, then tick.
    pub fn process_tick(
        &mut self,
        delta_seconds: f64,
        events: &[TriggerEvent],
        progress: Option<&dyn PathProgress>,
    ) {
        for event in events {
            self.apply(*event);
        }
        self.advance(delta_seconds, progress);
    }

    // ---- per-frame update ---------------------------------------------

    /// Advance the countdown or race clock by `delta_seconds` and re-rank.
    pub fn tick(&mut self, delta_seconds: f64) {
        self.advance(delta_seconds, None);
    }

    /// Like [`tick`](Self::tick), using `progress` to separate racers that
    /// are level on laps and checkpoints.
    pub fn tick_with_progress(&mut self, delta_seconds: f64, progress: &dyn PathProgress) {
        self.advance(delta_seconds, Some(progress));
    }

    fn advance(&mut self, delta_seconds: f64, progress: Option<&dyn PathProgress>) {
        let delta = if delta_seconds.is_finite() && delta_seconds >= 0.0 {
            delta_seconds
        } else {
            tracing::warn!(delta_seconds, "ignoring invalid tick delta");
            0.0
        };

        match self.status {
            RaceStatus::Idle | RaceStatus::Finished => {}
            RaceStatus::Countdown => match self.countdown.tick(delta) {
                CountdownStep::Waiting => {}
                CountdownStep::Tick(seconds) => {
                    self.bus.publish(RaceEvent::CountdownTick { seconds });
                }
                CountdownStep::Expired => {
                    self.begin_racing();
                    self.recompute_positions(progress);
                }
            },
            RaceStatus::Racing => {
                self.race_clock += delta;
                for record in &mut self.records {
                    record.accrue(delta);
                }

                self.resolve_winner();
                self.recompute_positions(progress);

                if self.records.iter().all(RacerRecord::is_finished) {
                    self.status = RaceStatus::Finished;
                    tracing::info!(
                        session = %self.id,
                        race_clock = self.race_clock,
                        winner = ?self.winner,
                        "all racers finished"
                    );
                }
            }
        }
    }

    fn begin_racing(&mut self) {
        self.status = RaceStatus::Racing;
        self.race_clock = 0.0;
        for record in &mut self.records {
            record.start(self.race_clock);
        }
        tracing::info!(session = %self.id, racers = self.records.len(), "race started");
        self.bus.publish(RaceEvent::RaceStarted);
    }

    /// Announce the winner once, choosing the earliest finish time among
    /// everyone finished so far.
    fn resolve_winner(&mut self) {
        if self.winner.is_some() {
            return;
        }

        let first = self
            .records
            .iter()
            .filter(|r| r.is_finished())
            .min_by(|a, b| {
                a.finish_time()
                    .partial_cmp(&b.finish_time())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.registration_index().cmp(&b.registration_index()))
            })
            .map(RacerRecord::racer_id);

        if let Some(winner) = first {
            self.winner = Some(winner);
            tracing::info!(session = %self.id, %winner, "race won");
            self.bus.publish(RaceEvent::RaceFinished { winner });
        }
    }

    fn recompute_positions(&mut self, progress: Option<&dyn PathProgress>) {
        self.ranker
            .recompute_positions(&mut self.records, progress, &self.bus);
    }

    // ---- queries ------------------------------------------------------

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn is_race_finished(&self) -> bool {
        self.status == RaceStatus::Finished
    }

    /// Seconds left on the countdown. The full duration before the race is
    /// started, zero once the lights are green.
    pub fn countdown_remaining(&self) -> f64 {
        match self.status {
            RaceStatus::Idle => self.countdown.duration(),
            RaceStatus::Countdown => self.countdown.remaining(),
            RaceStatus::Racing | RaceStatus::Finished => 0.0,
        }
    }

    /// Seconds since the green light.
    pub fn race_clock(&self) -> f64 {
        self.race_clock
    }

    pub fn total_laps(&self) -> u32 {
        self.laps.total_laps()
    }

    pub fn checkpoint_order(&self) -> CheckpointOrder {
        self.validator.order()
    }

    pub fn track(&self) -> &CheckpointSet {
        &self.track
    }

    /// First finisher, once known.
    pub fn winner(&self) -> Option<RacerId> {
        self.winner
    }

    pub fn racer_count(&self) -> usize {
        self.records.len()
    }

    /// Current position; 0 until the first ranking pass.
    pub fn position(&self, racer: RacerId) -> Result<u32, RacingError> {
        self.require(racer).map(RacerRecord::position)
    }

    /// Current lap (`total_laps + 1` once finished).
    pub fn lap(&self, racer: RacerId) -> Result<u32, RacingError> {
        self.require(racer).map(RacerRecord::current_lap)
    }

    /// Time raced so far, or the final race time once finished.
    pub fn race_time(&self, racer: RacerId) -> Result<f64, RacingError> {
        self.require(racer).map(RacerRecord::total_race_time)
    }

    pub fn record(&self, racer: RacerId) -> Option<&RacerRecord> {
        self.records.iter().find(|r| r.racer_id() == racer)
    }

    /// All records in registration order.
    pub fn records(&self) -> &[RacerRecord] {
        &self.records
    }

    /// Records ordered by position; unranked racers last, by registration.
    pub fn standings(&self) -> Vec<&RacerRecord> {
        let mut standings: Vec<&RacerRecord> = self.records.iter().collect();
        standings.sort_by_key(|r| (r.position() == 0, r.position(), r.registration_index()));
        standings
    }

    fn index_of(&self, racer: RacerId) -> Option<usize> {
        self.records.iter().position(|r| r.racer_id() == racer)
    }

    fn require(&self, racer: RacerId) -> Result<&RacerRecord, RacingError> {
        self.record(racer).ok_or(RacingError::UnknownRacer(racer))
    }

    // ---- persistence --------------------------------------------------

    /// Capture everything needed to resume this race.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            version: SNAPSHOT_VERSION,
            session_id: self.id,
            saved_at: Utc::now(),
            status: self.status,
            countdown_remaining: self.countdown_remaining(),
            race_clock: self.race_clock,
            total_laps: self.laps.total_laps(),
            checkpoint_order: self.validator.order(),
            winner: self.winner,
            next_registration: self.next_registration,
            racers: self.records.clone(),
        }
    }

    /// Rebuild a session from a snapshot taken on the same track.
    ///
    /// `settings` supplies what the snapshot does not carry: countdown
    /// length and event capacity.
    pub fn restore(
        track: CheckpointSet,
        snapshot: RaceSnapshot,
        settings: &RaceSettings,
    ) -> Result<(Self, broadcast::Receiver<RaceEvent>), RacingError> {
        if snapshot.total_laps == 0 {
            return Err(RacingError::InvalidSnapshot(
                "total_laps must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(snapshot.racers.len());
        for record in &snapshot.racers {
            if !seen.insert(record.racer_id()) {
                return Err(RacingError::InvalidSnapshot(format!(
                    "{} appears twice",
                    record.racer_id()
                )));
            }
            if let Some(cp) = record
                .checkpoints_passed()
                .iter()
                .find(|cp| !track.contains(**cp))
            {
                return Err(RacingError::InvalidSnapshot(format!(
                    "{} passed {} which is not on this track",
                    record.racer_id(),
                    cp
                )));
            }
            if record.registration_index() >= snapshot.next_registration {
                return Err(RacingError::InvalidSnapshot(format!(
                    "{} has registration index beyond the counter",
                    record.racer_id()
                )));
            }
        }

        let duration = settings.countdown_seconds.max(snapshot.countdown_remaining);
        let mut countdown =
            Countdown::new(duration).map_err(|e| RacingError::InvalidSnapshot(e.to_string()))?;
        if snapshot.status == RaceStatus::Countdown {
            countdown.resume(snapshot.countdown_remaining);
        }

        let (bus, rx) = EventBus::new(settings.event_capacity);
        let session = Self {
            id: snapshot.session_id,
            track,
            status: snapshot.status,
            countdown,
            race_clock: snapshot.race_clock,
            records: snapshot.racers,
            next_registration: snapshot.next_registration,
            validator: CheckpointValidator::new(snapshot.checkpoint_order),
            laps: LapTracker::new(snapshot.total_laps),
            ranker: PositionRanker::new(),
            winner: snapshot.winner,
            bus,
        };
        tracing::info!(
            session = %session.id,
            status = session.status.as_str(),
            racers = session.records.len(),
            "race session restored"
        );
        Ok((session, rx))
    }
}

impl std::fmt::Debug for RaceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceSession")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("race_clock", &self.race_clock)
            .field("racers", &self.records.len())
            .field("winner", &self.winner)
            .finish()
    }
}
