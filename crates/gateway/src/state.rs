use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use quotron_bus::RedisBus;
use quotron_core::Config;

use crate::client_manager::ClientManager;
use crate::metrics::Metrics;

/// Shared application state injected into every axum handler.
pub struct AppState {
    pub config: Config,
    pub clients: ClientManager,
    pub store: Option<PgPool>,
    pub bus: Option<Arc<RedisBus>>,
    pub metrics: Metrics,
}

pub type SharedState = Arc<AppState>;

/// Live in-process view of data-source health, read by `/data-source/health`
/// and updated by [`ClientManager`] after every fetch attempt.
pub type HealthRegistry = Arc<RwLock<std::collections::HashMap<String, quotron_core::SourceHealth>>>;
