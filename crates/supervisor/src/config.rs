//! Managed-service registry and supervisor-specific configuration (spec §6.4).
//!
//! Host/port/credential configuration itself lives in `quotron_core::Config`
//! (the same layered env config every other Quotron process reads); this
//! module only adds the supervisor's own view: which binaries exist, in what
//! dependency order, and where their PID/log files live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

/// One managed service's static definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Binary name (looked up via `cargo run --bin <binary>` in development).
    pub binary: String,
    /// Extra CLI arguments passed to the binary.
    #[serde(default)]
    pub args: Vec<String>,
    /// Host used for the liveness probe.
    pub host: String,
    /// Port used for the liveness probe.
    pub port: u16,
    /// Path probed for liveness (defaults to `/health`).
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Services that must be running (and responsive) before this one starts.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_health_path() -> String {
    "/health".to_string()
}

/// Full supervisor configuration: the managed-service table plus the
/// process-lifecycle file locations shared with every other Quotron process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub services: HashMap<String, ServiceSpec>,
    /// Default ticker interval for monitor mode (spec §4.6, default 30s).
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
}

fn default_monitor_interval_secs() -> u64 {
    30
}

impl SupervisorConfig {
    /// Build the default service table from a loaded `quotron_core::Config`
    /// (spec §6.4's recognized keys: `api_host`/`port`,
    /// `yfinance_proxy_host`/`port`, `redis_host`/`port`, `db_*`).
    pub fn from_core(config: &quotron_core::Config) -> Self {
        let mut services = HashMap::new();

        services.insert(
            "upstream-proxy".to_string(),
            ServiceSpec {
                binary: "yfinance-proxy".to_string(),
                args: Vec::new(),
                host: config.adapters.yfinance_proxy_host.clone(),
                port: config.adapters.yfinance_proxy_port,
                health_path: "/".to_string(),
                depends_on: Vec::new(),
            },
        );
        services.insert(
            "gateway".to_string(),
            ServiceSpec {
                binary: "quotron-gateway".to_string(),
                args: Vec::new(),
                host: config.gateway.host.clone(),
                port: config.gateway.port,
                health_path: "/health".to_string(),
                depends_on: vec!["upstream-proxy".to_string()],
            },
        );
        services.insert(
            "scheduler".to_string(),
            ServiceSpec {
                binary: "quotron-scheduler".to_string(),
                args: vec![
                    "--gateway-url".to_string(),
                    format!("http://{}:{}", config.gateway.host, config.gateway.port),
                ],
                host: config.gateway.host.clone(),
                port: config.gateway.port,
                health_path: "/health".to_string(),
                depends_on: vec!["gateway".to_string()],
            },
        );
        services.insert(
            "etl".to_string(),
            ServiceSpec {
                binary: "quotron-etl".to_string(),
                args: Vec::new(),
                host: config.bus.redis_host.clone(),
                port: config.bus.redis_port,
                health_path: String::new(),
                depends_on: Vec::new(),
            },
        );

        Self {
            services,
            monitor_interval_secs: default_monitor_interval_secs(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SupervisorError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SupervisorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> Result<&ServiceSpec, SupervisorError> {
        self.services.get(name).ok_or_else(|| SupervisorError::UnknownService(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Topologically order `targets` (and their transitive `depends_on`) so
    /// dependencies always precede dependents (spec §4.6 "dependency-closed").
    pub fn start_order(&self, targets: &[String]) -> Result<Vec<String>, SupervisorError> {
        let mut closure: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack: Vec<String> = targets.to_vec();

        while let Some(name) = stack.pop() {
            if seen.contains(&name) {
                continue;
            }
            let spec = self.get(&name)?;
            seen.insert(name.clone());
            stack.push(name.clone());
            for dep in &spec.depends_on {
                if !seen.contains(dep) {
                    stack.push(dep.clone());
                }
            }
            closure.push(name.clone());
        }

        topological_order(&self.services, &closure)
    }

    /// Reverse of [`Self::start_order`] — used to stop services in
    /// reverse-dependency order (spec §4.6).
    pub fn stop_order(&self, targets: &[String]) -> Result<Vec<String>, SupervisorError> {
        let mut order = self.start_order(targets)?;
        order.reverse();
        Ok(order)
    }

    pub fn pid_file(&self, process: &quotron_core::config::ProcessConfig, service: &str) -> PathBuf {
        process.pid_file(service)
    }

    pub fn log_file(&self, process: &quotron_core::config::ProcessConfig, service: &str) -> PathBuf {
        process.log_file(service)
    }
}

/// Kahn's-algorithm topological sort restricted to `subset`, dependencies
/// before dependents. Kept from the teacher's pipeline-stage sort
/// (`eisenbahn::config::topological_sort`), generalized to service names.
fn topological_order(
    services: &HashMap<String, ServiceSpec>,
    subset: &[String],
) -> Result<Vec<String>, SupervisorError> {
    let subset_set: std::collections::HashSet<&String> = subset.iter().collect();

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in subset {
        in_degree.entry(name.as_str()).or_insert(0);
        dependents.entry(name.as_str()).or_default();
    }

    for name in subset {
        let spec = services
            .get(name)
            .ok_or_else(|| SupervisorError::UnknownService(name.clone()))?;
        for dep in &spec.depends_on {
            if !subset_set.contains(dep) {
                continue;
            }
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
            *in_degree.entry(name.as_str()).or_insert(0) += 1;
        }
    }

    let mut queue: std::collections::VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut sorted = Vec::with_capacity(subset.len());

    while let Some(node) = queue.pop_front() {
        sorted.push(node.to_string());
        if let Some(deps) = dependents.get(node) {
            for &dep in deps {
                if let Some(deg) = in_degree.get_mut(dep) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dep);
                    }
                }
            }
        }
    }

    if sorted.len() != subset.len() {
        return Err(SupervisorError::Config(
            "circular service dependency detected".to_string(),
        ));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> SupervisorConfig {
        SupervisorConfig::from_core(&quotron_core::Config::for_profile("test"))
    }

    #[test]
    fn start_order_places_dependencies_first() {
        let config = make_config();
        let order = config.start_order(&["scheduler".to_string()]).unwrap();
        let proxy_pos = order.iter().position(|s| s == "upstream-proxy").unwrap();
        let gateway_pos = order.iter().position(|s| s == "gateway").unwrap();
        let scheduler_pos = order.iter().position(|s| s == "scheduler").unwrap();
        assert!(proxy_pos < gateway_pos);
        assert!(gateway_pos < scheduler_pos);
    }

    #[test]
    fn stop_order_is_reverse_of_start_order() {
        let config = make_config();
        let start = config.start_order(&["scheduler".to_string()]).unwrap();
        let stop = config.stop_order(&["scheduler".to_string()]).unwrap();
        assert_eq!(start.into_iter().rev().collect::<Vec<_>>(), stop);
    }

    #[test]
    fn unknown_service_is_rejected() {
        let config = make_config();
        assert!(config.get("nonexistent").is_err());
    }

    #[test]
    fn gen_config_round_trips_through_json() {
        let config = make_config();
        let json = config.to_json_pretty().unwrap();
        let parsed: SupervisorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.names(), config.names());
    }
}
