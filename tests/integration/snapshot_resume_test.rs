//! Integration tests for saving a race mid-way and resuming it

use rustrace::racing::{
    CheckpointId, CheckpointOrder, CheckpointSet, IgnoreReason, LapOutcome, RaceEvent, RaceSession,
    RaceSettings, RaceStatus, RacerId,
};
use rustrace::storage::{load_snapshot, save_snapshot};
use tempfile::TempDir;

const A: CheckpointId = CheckpointId(1);
const B: CheckpointId = CheckpointId(2);

fn track() -> CheckpointSet {
    CheckpointSet::new(vec![A, B], CheckpointId(0))
        .unwrap()
        .with_name("Resume Loop")
}

fn settings() -> RaceSettings {
    RaceSettings {
        total_laps: 2,
        countdown_seconds: 2.0,
        checkpoint_order: CheckpointOrder::Sequential,
        ..Default::default()
    }
}

/// Test a race saved mid-lap resumes with identical state and finishes
#[test]
fn test_resume_mid_race() {
    let dir = TempDir::new().unwrap();
    let (p, q) = (RacerId(1), RacerId(2));

    let (mut session, _rx) = RaceSession::new(track(), &settings()).unwrap();
    session.register_racer(p).unwrap();
    session.register_racer(q).unwrap();
    session.start_race().unwrap();
    session.tick(2.0);

    session.on_checkpoint_crossed(p, A);
    session.on_checkpoint_crossed(p, B);
    session.on_finish_line_crossed(p, 15.0);
    session.on_checkpoint_crossed(p, A);
    session.on_checkpoint_crossed(q, A);
    session.tick(16.0);

    let path = save_snapshot(dir.path(), &session.snapshot()).unwrap();
    let snapshot = load_snapshot(&path).unwrap();

    let (mut resumed, mut rx) = RaceSession::restore(track(), snapshot, &settings()).unwrap();
    assert_eq!(resumed.id(), session.id());
    assert_eq!(resumed.status(), RaceStatus::Racing);
    assert_eq!(resumed.race_clock(), 16.0);
    assert_eq!(resumed.checkpoint_order(), CheckpointOrder::Sequential);
    assert_eq!(resumed.records(), session.records());
    assert_eq!(resumed.position(p), Ok(1));

    // sequential order is still enforced after the reload
    assert_eq!(
        resumed.on_finish_line_crossed(p, 20.0),
        LapOutcome::Ignored(IgnoreReason::IncompleteLap)
    );
    resumed.on_checkpoint_crossed(p, B);
    assert_eq!(
        resumed.on_finish_line_crossed(p, 31.0),
        LapOutcome::Finished {
            lap_time: 16.0,
            finish_time: 31.0
        }
    );
    resumed.tick(15.0);

    assert_eq!(resumed.winner(), Some(p));
    assert!(std::iter::from_fn(|| rx.try_recv().ok())
        .any(|e| e == RaceEvent::RaceFinished { winner: p }));

    // registration stays closed
    assert!(resumed.register_racer(RacerId(3)).is_err());
}

/// Test a countdown saved part way resumes from where it stopped
#[test]
fn test_resume_during_countdown() {
    let (mut session, _rx) = RaceSession::new(track(), &settings()).unwrap();
    session.register_racer(RacerId(1)).unwrap();
    session.start_race().unwrap();
    session.tick(0.5);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.countdown_remaining, 1.5);

    let (mut resumed, _rx) = RaceSession::restore(track(), snapshot, &settings()).unwrap();
    assert_eq!(resumed.status(), RaceStatus::Countdown);
    assert_eq!(resumed.countdown_remaining(), 1.5);

    resumed.tick(1.0);
    assert_eq!(resumed.status(), RaceStatus::Countdown);
    resumed.tick(0.5);
    assert_eq!(resumed.status(), RaceStatus::Racing);
}

/// Test a finished race restores as finished and keeps its winner
#[test]
fn test_resume_finished_race() {
    let (mut session, _rx) = RaceSession::new(track(), &settings()).unwrap();
    session.register_racer(RacerId(1)).unwrap();
    session.start_race().unwrap();
    session.tick(2.0);
    for at in [10.0, 20.0] {
        session.on_checkpoint_crossed(RacerId(1), A);
        session.on_checkpoint_crossed(RacerId(1), B);
        session.on_finish_line_crossed(RacerId(1), at);
    }
    session.tick(20.0);
    assert!(session.is_race_finished());

    let (resumed, _rx) =
        RaceSession::restore(track(), session.snapshot(), &settings()).unwrap();
    assert!(resumed.is_race_finished());
    assert_eq!(resumed.winner(), Some(RacerId(1)));
    assert_eq!(resumed.race_time(RacerId(1)), Ok(20.0));
}
