use thiserror::Error;

/// Errors that can occur in the process supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to spawn {service}: {source}")]
    Spawn {
        service: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} did not become responsive within {timeout:?}")]
    StartupTimeout { service: String, timeout: std::time::Duration },

    #[error("{0} is not running")]
    NotRunning(String),
}
