//! Primary/secondary upstream failover (spec §4.2).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::{timeout, Duration};

use quotron_adapters::{AdapterError, QuoteSource};
use quotron_core::{HealthStatus, MarketIndex, Quote, SourceHealth, SourceType};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("primary failed: {primary}; secondary failed: {secondary}")]
    BothFailed {
        primary: AdapterError,
        secondary: AdapterError,
    },
    #[error(transparent)]
    NonRetryable(#[from] AdapterError),
}

pub struct ClientManager {
    primary: Arc<dyn QuoteSource>,
    secondary: Arc<dyn QuoteSource>,
    health: RwLock<HashMap<&'static str, SourceHealth>>,
    failover_count: std::sync::atomic::AtomicU64,
}

impl ClientManager {
    pub fn new(primary: Arc<dyn QuoteSource>, secondary: Arc<dyn QuoteSource>) -> Self {
        let mut health = HashMap::new();
        health.insert("primary", SourceHealth::unknown(SourceType::Primary, primary.name()));
        health.insert("secondary", SourceHealth::unknown(SourceType::Secondary, secondary.name()));
        Self {
            primary,
            secondary,
            health: RwLock::new(health),
            failover_count: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Number of times a call fell through from primary to secondary.
    pub fn failover_count(&self) -> u64 {
        self.failover_count.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub async fn health_snapshot(&self) -> Vec<SourceHealth> {
        self.health.read().await.values().cloned().collect()
    }

    pub async fn get_quote(&self, symbol: &str, deadline: Duration) -> Result<Quote, ClientError> {
        self.call(deadline, |src, d| {
            let symbol = symbol.to_string();
            async move { timeout(d, src.fetch_quote(&symbol)).await }
        })
        .await
    }

    pub async fn get_index(&self, name: &str, deadline: Duration) -> Result<MarketIndex, ClientError> {
        self.call(deadline, |src, d| {
            let name = name.to_string();
            async move { timeout(d, src.fetch_index(&name)).await }
        })
        .await
    }

    /// Shared failover policy (spec §4.2 steps 1-4). `op` performs one timed call
    /// against a given adapter and is invoked once for primary, once for secondary.
    async fn call<T, F, Fut>(&self, deadline: Duration, op: F) -> Result<T, ClientError>
    where
        F: Fn(Arc<dyn QuoteSource>, Duration) -> Fut,
        Fut: std::future::Future<Output = Result<Result<T, AdapterError>, tokio::time::error::Elapsed>>,
    {
        let start = Instant::now();
        let primary_err = match op(self.primary.clone(), deadline).await {
            Ok(Ok(value)) => {
                self.record_success("primary").await;
                return Ok(value);
            }
            Ok(Err(e)) => e,
            Err(_) => AdapterError::BadResponse("primary timed out".into()),
        };

        if !primary_err.is_retryable() {
            self.record_failure("primary", false, primary_err.to_string()).await;
            return Err(ClientError::NonRetryable(primary_err));
        }
        self.record_failure("primary", true, primary_err.to_string()).await;
        self.failover_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let remaining = deadline.saturating_sub(start.elapsed());
        let secondary_err = match op(self.secondary.clone(), remaining).await {
            Ok(Ok(value)) => {
                self.record_success("secondary").await;
                return Ok(value);
            }
            Ok(Err(e)) => e,
            Err(_) => AdapterError::BadResponse("secondary timed out".into()),
        };
        self.record_failure(
            "secondary",
            secondary_err.is_retryable(),
            secondary_err.to_string(),
        )
        .await;

        Err(ClientError::BothFailed {
            primary: primary_err,
            secondary: secondary_err,
        })
    }

    async fn record_success(&self, slot: &str) {
        let mut health = self.health.write().await;
        if let Some(h) = health.get_mut(slot) {
            h.status = HealthStatus::Healthy;
            h.last_check = Utc::now();
            h.last_success = Some(Utc::now());
            h.error_count = 0;
            h.error_message = None;
        }
    }

    /// `degrades` is false for non-retryable errors — spec step 4 says those
    /// never degrade the secondary's recorded health. A single retryable
    /// failure that triggers failover already marks the source `Degraded`
    /// (spec §8 scenario 2) — there is no consecutive-failure threshold.
    async fn record_failure(&self, slot: &str, degrades: bool, message: String) {
        let mut health = self.health.write().await;
        if let Some(h) = health.get_mut(slot) {
            h.last_check = Utc::now();
            h.error_count += 1;
            h.error_message = Some(message);
            if degrades {
                h.status = HealthStatus::Degraded;
            }
        }
    }
}
