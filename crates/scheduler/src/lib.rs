//! Cron-driven job runner: schedules symbol-fetch jobs against the gateway
//! and publishes results to the bus (spec §4.4).

pub mod heartbeat;
pub mod job;
pub mod loader;
pub mod monitor_job;
pub mod scheduler;

pub use job::{JobOutcome, JobRunner, JOB_DEADLINE};
pub use monitor_job::MonitorJob;
pub use scheduler::{JobScheduleEntry, JobScheduler};
