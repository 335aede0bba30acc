//! Shared heartbeat-file helpers (spec §4.4, §4.6 — the scheduler writes a
//! monotonic timestamp at job-start/job-end; the supervisor reads it back to
//! detect a wedged scheduler).

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

/// Write the current time to `path`, creating parent directories as needed.
pub fn touch(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, Utc::now().to_rfc3339())
}

/// Read back the last-written timestamp, if any.
pub fn read(path: &Path) -> Option<DateTime<Utc>> {
    let contents = fs::read_to_string(path).ok()?;
    DateTime::parse_from_rfc3339(contents.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether the heartbeat at `path` is older than `max_age`, or missing entirely.
pub fn is_stale(path: &Path, max_age: chrono::Duration) -> bool {
    match read(path) {
        Some(last) => Utc::now().signed_duration_since(last) > max_age,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.heartbeat");
        touch(&path).unwrap();
        assert!(read(&path).is_some());
        assert!(!is_stale(&path, chrono::Duration::minutes(1)));
    }

    #[test]
    fn test_missing_file_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.heartbeat");
        assert!(is_stale(&path, chrono::Duration::minutes(1)));
    }
}
