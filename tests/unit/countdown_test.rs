//! Unit tests for the race countdown and race clock state machine

use rustrace::racing::countdown::{CountdownError, CountdownStep};
use rustrace::racing::{
    CheckpointId, CheckpointSet, Countdown, RaceEvent, RaceSession, RaceSettings, RaceStatus,
    RacerId, RacingError,
};

fn session(countdown_seconds: f64) -> RaceSession {
    let track = CheckpointSet::new(vec![CheckpointId(1)], CheckpointId(0)).unwrap();
    let settings = RaceSettings {
        countdown_seconds,
        ..Default::default()
    };
    let (mut session, _rx) = RaceSession::new(track, &settings).unwrap();
    session.register_racer(RacerId(1)).unwrap();
    session
}

/// Test the countdown reports whole seconds as they pass
#[test]
fn test_countdown_ticks() {
    let mut countdown = Countdown::new(3.0).unwrap();
    assert_eq!(countdown.start(), 3);

    assert_eq!(countdown.tick(0.5), CountdownStep::Waiting);
    assert_eq!(countdown.tick(0.5), CountdownStep::Tick(2));
    assert_eq!(countdown.tick(1.0), CountdownStep::Tick(1));
    assert_eq!(countdown.remaining(), 1.0);
    assert_eq!(countdown.tick(1.5), CountdownStep::Expired);
    assert!(!countdown.is_running());
    assert_eq!(countdown.remaining(), 0.0);
}

/// Test a stopped countdown does nothing
#[test]
fn test_countdown_not_started() {
    let mut countdown = Countdown::default();
    assert_eq!(countdown.tick(10.0), CountdownStep::Waiting);
    assert!(!countdown.is_running());
}

/// Test invalid durations are rejected
#[test]
fn test_countdown_invalid_duration() {
    assert!(matches!(
        Countdown::new(-1.0),
        Err(CountdownError::InvalidDuration(_))
    ));
    assert!(Countdown::new(f64::NAN).is_err());
    assert!(Countdown::new(3600.0).is_err());
    assert!(Countdown::new(0.0).is_ok());
}

/// Test the session walks Idle -> Countdown -> Racing
#[test]
fn test_session_countdown_to_racing() {
    let mut session = session(3.0);
    let mut rx = session.subscribe();
    assert_eq!(session.status(), RaceStatus::Idle);
    assert_eq!(session.countdown_remaining(), 3.0);

    session.start_race().unwrap();
    assert_eq!(session.status(), RaceStatus::Countdown);

    session.tick(1.0);
    session.tick(1.0);
    assert_eq!(session.status(), RaceStatus::Countdown);
    assert_eq!(session.countdown_remaining(), 1.0);

    // overshoot is discarded; the race clock starts at zero
    session.tick(1.75);
    assert_eq!(session.status(), RaceStatus::Racing);
    assert_eq!(session.race_clock(), 0.0);
    assert_eq!(session.countdown_remaining(), 0.0);

    let events: Vec<RaceEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(
        events[..4],
        [
            RaceEvent::CountdownStarted { seconds: 3 },
            RaceEvent::CountdownTick { seconds: 2 },
            RaceEvent::CountdownTick { seconds: 1 },
            RaceEvent::RaceStarted,
        ]
    );
}

/// Test the race clock only advances while racing
#[test]
fn test_race_clock_advances() {
    let mut session = session(0.5);
    session.tick(5.0);
    assert_eq!(session.race_clock(), 0.0);

    session.start_race().unwrap();
    session.tick(0.5);
    session.tick(2.0);
    session.tick(0.25);
    assert_eq!(session.race_clock(), 2.25);
}

/// Test invalid tick deltas are ignored
#[test]
fn test_invalid_delta_ignored() {
    let mut session = session(0.0);
    session.start_race().unwrap();
    session.tick(0.0);

    session.tick(-4.0);
    session.tick(f64::NAN);
    assert_eq!(session.race_clock(), 0.0);
}

/// Test start_race only works from Idle and registration closes at the green light
#[test]
fn test_start_twice_rejected() {
    let mut session = session(1.0);
    session.start_race().unwrap();

    assert_eq!(
        session.start_race(),
        Err(RacingError::RaceNotIdle(RaceStatus::Countdown))
    );
    // late joiners are welcome until the green light
    assert_eq!(session.register_racer(RacerId(2)), Ok(()));

    session.tick(1.0);
    assert_eq!(
        session.register_racer(RacerId(3)),
        Err(RacingError::RaceAlreadyStarted)
    );
}

/// Test aborting during the countdown never reaches Racing
#[test]
fn test_abort_during_countdown() {
    let mut session = session(3.0);
    let mut rx = session.subscribe();
    session.start_race().unwrap();

    session.abort_race();
    session.tick(5.0);

    assert_eq!(session.status(), RaceStatus::Finished);
    assert_eq!(session.winner(), None);
    let events: Vec<RaceEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(events.contains(&RaceEvent::RaceAborted));
    assert!(!events.contains(&RaceEvent::RaceStarted));
}

/// Test removing the only racer abandons a live race
#[test]
fn test_last_racer_leaving_aborts() {
    let mut session = session(3.0);
    session.start_race().unwrap();

    session.unregister_racer(RacerId(1)).unwrap();

    assert!(session.is_race_finished());
    assert_eq!(
        session.unregister_racer(RacerId(1)),
        Err(RacingError::UnknownRacer(RacerId(1)))
    );
}
