//! Core start/stop/monitor orchestration (spec §4.6).

use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::process::{self, ManagedProcess};
use crate::{liveness, pidfile, status};
use quotron_core::config::ProcessConfig;

pub struct Supervisor {
    pub config: SupervisorConfig,
    pub process_config: ProcessConfig,
    children: HashMap<String, ManagedProcess>,
    restart_counts: HashMap<String, u64>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig, process_config: ProcessConfig) -> Self {
        Self { config, process_config, children: HashMap::new(), restart_counts: HashMap::new() }
    }

    /// Start `targets` (empty = all configured services), dependency-closed
    /// and idempotent: a service already running and responsive is left
    /// alone (spec §4.6).
    pub async fn start(&mut self, targets: &[String]) -> Result<(), SupervisorError> {
        let targets = if targets.is_empty() { self.config.names() } else { targets.to_vec() };
        let order = self.config.start_order(&targets)?;

        for name in order {
            let spec = self.config.get(&name)?.clone();
            if liveness::is_responsive(&spec).await {
                info!(service = %name, "already running and responsive — skipping");
                continue;
            }

            info!(service = %name, binary = %spec.binary, "starting");
            let child = process::spawn(&name, &spec.binary, &spec.args, &HashMap::new())?;
            if let Some(pid) = child.pid() {
                pidfile::write(&self.config.pid_file(&self.process_config, &name), pid)?;
            }
            self.children.insert(name, child);
        }
        Ok(())
    }

    /// Stop `targets` (empty = all configured services) in reverse
    /// dependency order: SIGTERM, wait, SIGKILL, then always remove the PID
    /// file (spec §4.6).
    pub async fn stop(&mut self, targets: &[String]) -> Result<(), SupervisorError> {
        let targets = if targets.is_empty() { self.config.names() } else { targets.to_vec() };
        let order = self.config.stop_order(&targets)?;

        for name in order {
            if let Some(mut child) = self.children.remove(&name) {
                info!(service = %name, "stopping");
                child.stop().await;
            } else {
                warn!(service = %name, "no in-process handle — only clearing its PID file");
            }
            pidfile::remove(&self.config.pid_file(&self.process_config, &name));
        }
        Ok(())
    }

    pub async fn status(&self) -> Vec<status::ServiceStatus> {
        status::check_all(&self.config, &self.process_config, &self.restart_counts).await
    }

    /// Recheck every managed service and restart (with its dependency
    /// closure) any that failed (spec §4.6 monitor mode).
    pub async fn monitor_tick(&mut self) -> Result<(), SupervisorError> {
        let statuses = self.status().await;
        let unhealthy: Vec<String> =
            statuses.iter().filter(|s| !s.is_healthy()).map(|s| s.name.clone()).collect();

        for name in &unhealthy {
            warn!(service = %name, "unhealthy — restarting");
            self.children.remove(name);
            *self.restart_counts.entry(name.clone()).or_insert(0) += 1;
        }
        if !unhealthy.is_empty() {
            self.start(&unhealthy).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_supervisor() -> Supervisor {
        let core = quotron_core::Config::for_profile("test");
        let config = SupervisorConfig::from_core(&core);
        Supervisor::new(config, core.process)
    }

    #[test]
    fn new_supervisor_has_no_children_tracked() {
        let supervisor = make_supervisor();
        assert!(supervisor.children.is_empty());
    }
}
