//! Race snapshot files for mid-race resume.
//!
//! One JSON file per session under `<data_dir>/snapshots/`.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::racing::snapshot::{RaceSnapshot, SnapshotError};

/// Directory holding snapshot files.
pub fn snapshot_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("snapshots")
}

/// File path for a session's snapshot.
pub fn snapshot_path(data_dir: &Path, session_id: Uuid) -> PathBuf {
    snapshot_dir(data_dir).join(format!("race-{}.json", session_id))
}

/// Write `snapshot`, replacing any earlier one for the same session.
pub fn save_snapshot(data_dir: &Path, snapshot: &RaceSnapshot) -> Result<PathBuf, SnapshotError> {
    let path = snapshot_path(data_dir, snapshot.session_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SnapshotError::IoError(e.to_string()))?;
    }

    let content = snapshot.to_json()?;
    // Write to a temp file and rename into place
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(|e| SnapshotError::IoError(e.to_string()))?;
    std::fs::rename(&tmp, &path).map_err(|e| SnapshotError::IoError(e.to_string()))?;

    tracing::debug!(path = %path.display(), "race snapshot saved");
    Ok(path)
}

/// Read a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<RaceSnapshot, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
    RaceSnapshot::from_json(&content)
}

/// Delete a session's snapshot once the race session is torn down.
pub fn remove_snapshot(data_dir: &Path, session_id: Uuid) -> Result<(), SnapshotError> {
    let path = snapshot_path(data_dir, session_id);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SnapshotError::IoError(e.to_string())),
    }
}
