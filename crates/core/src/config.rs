//! Layered configuration shared by every Quotron service (spec §6.4).
//!
//! Precedence is env-var overrides last: a JSON/YAML file loaded by the
//! caller seeds defaults, then `{PROFILE}_{KEY}` / `{KEY}` environment
//! variables override, and CLI flags (parsed by each binary's `clap`
//! struct) win over both.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load `.env` (silently ignored if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub gateway: GatewayConfig,
    pub adapters: AdaptersConfig,
    pub bus: BusConfig,
    pub postgres: PostgresConfig,
    pub health: HealthConfig,
    pub process: ProcessConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &["DB_HOST", "REDIS_HOST", "ALPHA_VANTAGE_API_KEY"];

impl Config {
    /// Build config from environment variables (call [`load_dotenv`] first).
    /// Profile is read from `QUOTRON_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("QUOTRON_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            gateway: GatewayConfig::from_env_profiled(p),
            adapters: AdaptersConfig::from_env_profiled(p),
            bus: BusConfig::from_env_profiled(p),
            postgres: PostgresConfig::from_env_profiled(p),
            health: HealthConfig::from_env_profiled(p),
            process: ProcessConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("config loaded (profile: {})", self.profile_label());
        tracing::info!("  gateway:  host={} port={}", self.gateway.host, self.gateway.port);
        tracing::info!(
            "  adapters: proxy={}:{} secondary_key_set={}",
            self.adapters.yfinance_proxy_host,
            self.adapters.yfinance_proxy_port,
            self.adapters.alpha_vantage_api_key.is_some()
        );
        tracing::info!("  bus:      redis={}:{}", self.bus.redis_host, self.bus.redis_port);
        tracing::info!(
            "  postgres: host={} db={} configured={}",
            self.postgres.host,
            self.postgres.database,
            self.postgres.is_configured()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "gateway": { "host": self.gateway.host, "port": self.gateway.port },
            "bus": { "redis_host": self.bus.redis_host, "redis_port": self.bus.redis_port },
            "postgres": {
                "host": self.postgres.host,
                "port": self.postgres.port,
                "database": self.postgres.database,
                "configured": self.postgres.is_configured(),
            },
            "health": { "health_service_url": self.health.health_service_url },
        })
    }
}

// ── Gateway (C2) ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl GatewayConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "API_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "API_PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Upstream adapters (C1) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptersConfig {
    pub yfinance_proxy_host: String,
    pub yfinance_proxy_port: u16,
    pub alpha_vantage_api_key: Option<String>,
}

impl AdaptersConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            yfinance_proxy_host: profiled_env_or(p, "YFINANCE_PROXY_HOST", "localhost"),
            yfinance_proxy_port: profiled_env_u16(p, "YFINANCE_PROXY_PORT", 5000),
            alpha_vantage_api_key: profiled_env_opt(p, "ALPHA_VANTAGE_API_KEY"),
        }
    }
}

// ── Bus (C3) ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub stream_maxlen: usize,
}

impl BusConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            redis_host: profiled_env_or(p, "REDIS_HOST", "localhost"),
            redis_port: profiled_env_u16(p, "REDIS_PORT", 6379),
            stream_maxlen: profiled_env_u32(p, "STREAM_MAXLEN", 1000) as usize,
        }
    }
}

// ── Store (C5, PostgreSQL) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_connections: u32,
}

impl PostgresConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "DB_HOST", "localhost"),
            port: profiled_env_u16(p, "DB_PORT", 5432),
            database: profiled_env_or(p, "DB_NAME", "quotron"),
            username: profiled_env_opt(p, "DB_USER"),
            password: profiled_env_opt(p, "DB_PASSWORD"),
            max_connections: profiled_env_u32(p, "DB_MAX_CONNECTIONS", 10),
        }
    }

    pub fn connection_string(&self) -> String {
        let user = self.username.as_deref().unwrap_or("postgres");
        let pass = self.password.as_deref().unwrap_or("");
        format!(
            "postgres://{}:{}@{}:{}/{}",
            user, pass, self.host, self.port, self.database
        )
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some()
    }
}

// ── External health aggregator ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub health_service_url: Option<String>,
}

impl HealthConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            health_service_url: profiled_env_opt(p, "HEALTH_SERVICE_URL"),
        }
    }
}

// ── Process lifecycle (supervisor) ────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub pid_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ProcessConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            pid_dir: PathBuf::from(profiled_env_or(p, "PID_DIR", "run")),
            log_dir: PathBuf::from(profiled_env_or(p, "LOG_DIR", "log")),
        }
    }

    /// Per-service PID file path (`{service}_pid_file` in spec §6.4).
    pub fn pid_file(&self, service: &str) -> PathBuf {
        self.pid_dir.join(format!("{service}.pid"))
    }

    /// Per-service log file path (`{service}_log_file` in spec §6.4).
    pub fn log_file(&self, service: &str) -> PathBuf {
        self.log_dir.join(format!("{service}.log"))
    }

    /// Per-service heartbeat file, used by the scheduler/supervisor pair.
    pub fn heartbeat_file(&self, service: &str) -> PathBuf {
        self.pid_dir.join(format!("{service}.heartbeat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_config() {
        let config = Config::for_profile("");
        assert_eq!(config.gateway.port, 3001);
        assert_eq!(config.bus.redis_port, 6379);
    }

    #[test]
    fn test_profiled_override() {
        std::env::set_var("TEST1_API_PORT", "9999");
        let config = Config::for_profile("test1");
        assert_eq!(config.gateway.port, 9999);
        std::env::remove_var("TEST1_API_PORT");
    }

    #[test]
    fn test_pid_file_naming() {
        let config = ProcessConfig {
            pid_dir: PathBuf::from("run"),
            log_dir: PathBuf::from("log"),
        };
        assert_eq!(config.pid_file("gateway"), PathBuf::from("run/gateway.pid"));
        assert_eq!(config.log_file("gateway"), PathBuf::from("log/gateway.log"));
    }
}
