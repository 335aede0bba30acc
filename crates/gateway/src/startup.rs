//! Server startup: shared state initialization.

use std::sync::Arc;

use tracing::{info, warn};

use quotron_adapters::{KeyedAdapter, ProxyAdapter};
use quotron_bus::RedisBus;
use quotron_core::Config;

use crate::client_manager::ClientManager;
use crate::metrics::Metrics;
use crate::state::AppState;

/// Build `AppState`: adapters, store pool, bus handle. Connection failures to
/// the store or bus are logged and leave the corresponding field `None` —
/// the gateway degrades (quote lookups keep working; history/bus-publish
/// do not) rather than refusing to start.
pub async fn build_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let primary = Arc::new(ProxyAdapter::new(
        &config.adapters.yfinance_proxy_host,
        config.adapters.yfinance_proxy_port,
    ));
    let secondary_key = config
        .adapters
        .alpha_vantage_api_key
        .clone()
        .unwrap_or_default();
    let secondary = Arc::new(KeyedAdapter::new(secondary_key));
    let clients = ClientManager::new(primary, secondary);

    let store = if config.postgres.is_configured() {
        let url = quotron_store::database_url(
            &config.postgres.host,
            config.postgres.port,
            config.postgres.username.as_deref().unwrap_or("postgres"),
            config.postgres.password.as_deref().unwrap_or(""),
            &config.postgres.database,
        );
        quotron_store::init_pg_pool(&url).await
    } else {
        info!("postgres not configured — quote history disabled");
        None
    };

    let bus = match RedisBus::connect(&config.bus.redis_host, config.bus.redis_port).await {
        Ok(bus) => Some(Arc::new(bus)),
        Err(e) => {
            warn!("bus unavailable: {e} — publishing disabled");
            None
        }
    };

    Ok(Arc::new(AppState {
        config,
        clients,
        store,
        bus,
        metrics: Metrics::default(),
    }))
}
