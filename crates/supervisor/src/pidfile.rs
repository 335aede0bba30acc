//! Per-service PID + start-time file (spec §4.6: "persists PID and
//! start-time to a per-service file for recovery across supervisor
//! restarts").

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PidRecord {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

pub fn write(path: &Path, pid: u32) -> Result<(), SupervisorError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let record = PidRecord { pid, started_at: Utc::now() };
    std::fs::write(path, serde_json::to_string(&record)?)?;
    Ok(())
}

pub fn read(path: &Path) -> Option<PidRecord> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn remove(path: &Path) {
    let _ = std::fs::remove_file(path);
}

/// Best-effort check for whether `pid` still refers to a live process.
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_alive(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.pid");
        write(&path, 4242).unwrap();

        let record = read(&path).unwrap();
        assert_eq!(record.pid, 4242);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(&dir.path().join("missing.pid")).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.pid");
        write(&path, 1).unwrap();
        remove(&path);
        remove(&path);
        assert!(read(&path).is_none());
    }
}
