//! Combined status view (spec §4.6: "process-liveness, port-responsiveness,
//! and (for scheduler) heartbeat freshness").

use std::path::Path;

use chrono::Duration as ChronoDuration;
use serde::Serialize;

use crate::config::{ServiceSpec, SupervisorConfig};
use crate::{liveness, pidfile};

/// Heartbeat is considered stale if it hasn't advanced in this long (spec
/// §8: "one cron period plus a small slack" — a minute covers every stock
/// cron job shipped with the default job file).
const HEARTBEAT_STALE_AFTER: ChronoDuration = ChronoDuration::minutes(2);

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub process_alive: bool,
    pub responsive: bool,
    pub pid: Option<u32>,
    pub heartbeat_stale: Option<bool>,
    /// Times the monitor has restarted this service since the supervisor
    /// started (spec §6.5 — a count, not full log tailing).
    pub restart_count: u64,
}

pub async fn check_one(
    name: &str,
    spec: &ServiceSpec,
    pid_file: &Path,
    heartbeat_file: Option<&Path>,
    restart_count: u64,
) -> ServiceStatus {
    let pid_record = pidfile::read(pid_file);
    let process_alive = pid_record.map(|r| pidfile::is_alive(r.pid)).unwrap_or(false);
    let responsive = liveness::is_responsive(spec).await;
    let heartbeat_stale = heartbeat_file.map(|p| quotron_core::heartbeat::is_stale(p, HEARTBEAT_STALE_AFTER));

    ServiceStatus {
        name: name.to_string(),
        process_alive,
        responsive,
        pid: pid_record.map(|r| r.pid),
        heartbeat_stale,
        restart_count,
    }
}

pub async fn check_all(
    config: &SupervisorConfig,
    process: &quotron_core::config::ProcessConfig,
    restart_counts: &std::collections::HashMap<String, u64>,
) -> Vec<ServiceStatus> {
    let mut out = Vec::new();
    for name in config.names() {
        let spec = config.get(&name).expect("name came from config.names()");
        let pid_file = config.pid_file(process, &name);
        let heartbeat_file = (name == "scheduler").then(|| process.heartbeat_file(&name));
        let restart_count = restart_counts.get(&name).copied().unwrap_or(0);
        out.push(check_one(&name, spec, &pid_file, heartbeat_file.as_deref(), restart_count).await);
    }
    out
}

impl ServiceStatus {
    /// A service counts as healthy when its process is alive and responsive,
    /// and (if applicable) its heartbeat hasn't gone stale.
    pub fn is_healthy(&self) -> bool {
        self.process_alive && self.responsive && !self.heartbeat_stale.unwrap_or(false)
    }
}
