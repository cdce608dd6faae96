//! Unit tests for race snapshot files

use rustrace::racing::snapshot::{SnapshotError, SNAPSHOT_VERSION};
use rustrace::racing::{
    CheckpointId, CheckpointSet, RaceSession, RaceSettings, RaceSnapshot, RaceStatus, RacerId,
    RacingError,
};
use rustrace::storage::snapshots::{remove_snapshot, snapshot_path};
use rustrace::storage::{load_snapshot, save_snapshot};
use tempfile::TempDir;

fn track() -> CheckpointSet {
    CheckpointSet::new(vec![CheckpointId(1), CheckpointId(2)], CheckpointId(0)).unwrap()
}

fn mid_race_snapshot() -> RaceSnapshot {
    let settings = RaceSettings {
        countdown_seconds: 0.0,
        ..Default::default()
    };
    let (mut session, _rx) = RaceSession::new(track(), &settings).unwrap();
    session.register_racer(RacerId(1)).unwrap();
    session.register_racer(RacerId(2)).unwrap();
    session.start_race().unwrap();
    session.tick(0.0);
    session.on_checkpoint_crossed(RacerId(2), CheckpointId(1));
    session.tick(4.0);
    session.snapshot()
}

/// Test a snapshot is written and read back unchanged
#[test]
fn test_save_and_load_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = mid_race_snapshot();

    let path = save_snapshot(dir.path(), &snapshot).unwrap();
    assert_eq!(path, snapshot_path(dir.path(), snapshot.session_id));

    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.status, RaceStatus::Racing);
    assert_eq!(loaded.racers.len(), 2);
}

/// Test saving again replaces the earlier snapshot
#[test]
fn test_snapshot_overwrite() {
    let dir = TempDir::new().unwrap();
    let mut snapshot = mid_race_snapshot();

    save_snapshot(dir.path(), &snapshot).unwrap();
    snapshot.race_clock = 99.0;
    let path = save_snapshot(dir.path(), &snapshot).unwrap();

    assert_eq!(load_snapshot(&path).unwrap().race_clock, 99.0);
}

/// Test removing a snapshot, including one that was never written
#[test]
fn test_remove_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = mid_race_snapshot();
    let path = save_snapshot(dir.path(), &snapshot).unwrap();

    remove_snapshot(dir.path(), snapshot.session_id).unwrap();
    assert!(!path.exists());
    remove_snapshot(dir.path(), snapshot.session_id).unwrap();
}

/// Test unknown format versions are refused
#[test]
fn test_unsupported_version() {
    let mut snapshot = mid_race_snapshot();
    snapshot.version = SNAPSHOT_VERSION + 1;
    let json = serde_json::to_string(&snapshot).unwrap();

    assert!(matches!(
        RaceSnapshot::from_json(&json),
        Err(SnapshotError::UnsupportedVersion(_))
    ));
}

/// Test garbage input reports a parse error
#[test]
fn test_corrupt_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("race.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        load_snapshot(&path),
        Err(SnapshotError::ParseError(_))
    ));
    assert!(matches!(
        load_snapshot(&dir.path().join("missing.json")),
        Err(SnapshotError::IoError(_))
    ));
}

/// Test restoring onto a different track is refused
#[test]
fn test_restore_on_wrong_track() {
    let snapshot = mid_race_snapshot();
    let other = CheckpointSet::new(vec![CheckpointId(7)], CheckpointId(0)).unwrap();

    let result = RaceSession::restore(other, snapshot, &RaceSettings::default());
    assert!(matches!(result, Err(RacingError::InvalidSnapshot(_))));
}

/// Test duplicate racers in a snapshot are refused
#[test]
fn test_restore_duplicate_racer() {
    let mut snapshot = mid_race_snapshot();
    let copy = snapshot.racers[0].clone();
    snapshot.racers.push(copy);

    let result = RaceSession::restore(track(), snapshot, &RaceSettings::default());
    assert!(matches!(result, Err(RacingError::InvalidSnapshot(_))));
}
