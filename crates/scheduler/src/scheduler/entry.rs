//! Per-job schedule entry type.

use chrono::{DateTime, Utc};

/// Scheduling state for a single job.
#[derive(Debug, Clone)]
pub struct JobScheduleEntry {
    /// Job identifier (matches `JobDefinition.name`).
    pub job_name: String,
    /// Normalized 6-field cron expression (seconds prepended).
    pub cron_expression: String,
    /// Timestamp of the last successful trigger.
    pub last_triggered: Option<DateTime<Utc>>,
    /// Whether the job is enabled for scheduling.
    pub enabled: bool,
    /// Whether a tick of this job is currently executing — a second tick
    /// arriving while this is true is skipped, not queued (spec §4.4).
    pub running: bool,
}
