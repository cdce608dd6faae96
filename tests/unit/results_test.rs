//! Unit tests for race results

use rustrace::racing::results::{format_delta, format_time};
use rustrace::racing::{
    CheckpointId, CheckpointSet, RaceResults, RaceSession, RaceSettings, RaceStatus, RacerId,
};

const CP: CheckpointId = CheckpointId(1);

fn race(laps: u32, racers: &[RacerId]) -> RaceSession {
    let track = CheckpointSet::new(vec![CP], CheckpointId(0)).unwrap();
    let settings = RaceSettings {
        total_laps: laps,
        countdown_seconds: 0.0,
        ..Default::default()
    };
    let (mut session, _rx) = RaceSession::new(track, &settings).unwrap();
    for racer in racers {
        session.register_racer(*racer).unwrap();
    }
    session.start_race().unwrap();
    session.tick(0.0);
    session
}

fn lap(session: &mut RaceSession, racer: RacerId, at: f64) {
    session.on_checkpoint_crossed(racer, CP);
    session.on_finish_line_crossed(racer, at);
}

/// Test time formatting
#[test]
fn test_format_time() {
    assert_eq!(format_time(0.0), "00:00.0");
    assert_eq!(format_time(59.94), "00:59.9");
    assert_eq!(format_time(59.96), "01:00.0");
    assert_eq!(format_time(754.25), "12:34.3");
    assert_eq!(format_delta(1.2), "+00:01.2");
    assert_eq!(format_delta(-0.5), "-00:00.5");
}

/// Test results for a completed race
#[test]
fn test_results_complete_race() {
    let (p, q) = (RacerId(1), RacerId(2));
    let mut session = race(2, &[p, q]);

    lap(&mut session, q, 20.0);
    lap(&mut session, p, 21.0);
    lap(&mut session, p, 40.0);
    lap(&mut session, q, 41.5);
    session.tick(41.5);

    let results = RaceResults::from_session(&session);
    assert!(results.is_complete());
    assert_eq!(results.status, RaceStatus::Finished);
    assert_eq!(results.winner, Some(p));
    assert_eq!(results.total_participants, 2);

    assert_eq!(results.finishers[0].racer_id, p);
    assert_eq!(results.finishers[0].gap_to_winner, 0.0);
    let second = results.finisher(q).unwrap();
    assert_eq!(second.position, 2);
    assert!((second.gap_to_winner - 1.5).abs() < 1e-9);

    let fastest = results.fastest_lap.unwrap();
    assert_eq!(fastest.racer_id, p);
    assert_eq!(fastest.lap, 2);
    assert_eq!(fastest.lap_time, 19.0);
}

/// Test racers still on track are listed as not finished
#[test]
fn test_results_with_dnf() {
    let (p, q) = (RacerId(1), RacerId(2));
    let mut session = race(1, &[p, q]);

    lap(&mut session, p, 30.0);
    session.tick(35.0);
    session.abort_race();

    let results = RaceResults::from_session(&session);
    assert!(!results.is_complete());
    assert_eq!(results.dnf_count(), 1);
    assert_eq!(results.did_not_finish[0].racer_id, q);
    assert_eq!(results.did_not_finish[0].position, 2);
    assert_eq!(results.did_not_finish[0].laps_completed, 0);
    assert_eq!(results.did_not_finish[0].race_time, 35.0);
}
