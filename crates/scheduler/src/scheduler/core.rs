//! [`JobScheduler`] — manages scheduling state for all registered jobs.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use quotron_core::JobDefinition;
use tracing::warn;

use super::cron::{is_cron_due, normalize_cron};
use super::entry::JobScheduleEntry;

/// Manages scheduling state for all loaded job definitions.
///
/// Call [`sync_jobs`](JobScheduler::sync_jobs) whenever the job set changes,
/// and [`due_jobs`](JobScheduler::due_jobs) from the tick loop to find which
/// jobs should execute.
pub struct JobScheduler {
    entries: HashMap<String, JobScheduleEntry>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Synchronize scheduling entries with the current set of job definitions.
    /// Adds new jobs, updates changed ones (preserving `last_triggered`), and
    /// removes jobs no longer present.
    pub fn sync_jobs(&mut self, jobs: &[JobDefinition]) {
        let current_names: std::collections::HashSet<&str> =
            jobs.iter().map(|j| j.name.as_str()).collect();

        self.entries.retain(|name, _| current_names.contains(name.as_str()));

        for job in jobs {
            let cron_expr = normalize_cron(&job.cron);
            match self.entries.get_mut(&job.name) {
                Some(entry) => {
                    entry.cron_expression = cron_expr;
                    entry.enabled = job.enabled;
                }
                None => {
                    self.entries.insert(
                        job.name.clone(),
                        JobScheduleEntry {
                            job_name: job.name.clone(),
                            cron_expression: cron_expr,
                            last_triggered: None,
                            enabled: job.enabled,
                            running: false,
                        },
                    );
                }
            }
        }
    }

    /// Whether a job should run at the given instant: known, enabled, not
    /// already running, and its cron window has arrived.
    pub fn should_run(&self, job_name: &str, now: DateTime<Utc>) -> bool {
        let entry = match self.entries.get(job_name) {
            Some(e) => e,
            None => return false,
        };

        if !entry.enabled || entry.running {
            return false;
        }

        match Schedule::from_str(&entry.cron_expression) {
            Ok(schedule) => is_cron_due(&schedule, now, entry.last_triggered),
            Err(e) => {
                warn!(job = %job_name, cron = %entry.cron_expression, error = %e, "invalid cron expression");
                false
            }
        }
    }

    /// Mark a job as currently executing — guards against overlapping ticks.
    pub fn mark_running(&mut self, job_name: &str) {
        if let Some(entry) = self.entries.get_mut(job_name) {
            entry.running = true;
        }
    }

    /// Mark a job finished and record the trigger time.
    pub fn mark_finished(&mut self, job_name: &str) {
        if let Some(entry) = self.entries.get_mut(job_name) {
            entry.running = false;
            entry.last_triggered = Some(Utc::now());
        }
    }

    pub fn record_trigger_at(&mut self, job_name: &str, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(job_name) {
            entry.last_triggered = Some(at);
        }
    }

    /// Whether `job_name` currently has a tick in flight (used by the manual
    /// "run now" command to defer rather than preempt).
    pub fn is_running(&self, job_name: &str) -> bool {
        self.entries.get(job_name).map(|e| e.running).unwrap_or(false)
    }

    pub fn due_jobs(&self, now: DateTime<Utc>) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|name| self.should_run(name, now))
            .map(String::as_str)
            .collect()
    }

    pub fn get(&self, job_name: &str) -> Option<&JobScheduleEntry> {
        self.entries.get(job_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}
