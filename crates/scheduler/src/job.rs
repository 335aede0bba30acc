//! Job execution: fetch from the gateway, publish to the bus (spec §4.4).

use std::sync::Arc;
use std::time::Duration;

use quotron_bus::{BusProducer, RedisBus};
use quotron_core::{JobDefinition, StreamCategory};
use reqwest::Client;
use tracing::{instrument, warn};

/// Hard cap on a single job tick (spec §4.4).
pub const JOB_DEADLINE: Duration = Duration::from_secs(5 * 60);
const PER_SYMBOL_DEADLINE: Duration = Duration::from_secs(10);

pub struct JobRunner {
    client: Client,
    gateway_base_url: String,
    bus: Arc<RedisBus>,
    stream_maxlen: usize,
}

impl JobRunner {
    pub fn new(gateway_base_url: String, bus: Arc<RedisBus>, stream_maxlen: usize) -> Self {
        Self {
            client: Client::builder()
                .timeout(PER_SYMBOL_DEADLINE)
                .build()
                .unwrap_or_else(|_| Client::new()),
            gateway_base_url,
            bus,
            stream_maxlen,
        }
    }

    /// Run one tick of `job`: fetch each target symbol, publish each success
    /// to its matching stream and broadcast channel. Failures on individual
    /// symbols are logged and counted but do not abort the remaining symbols.
    #[instrument(skip(self, job), fields(job = %job.name))]
    pub async fn run(&self, job: &JobDefinition) -> JobOutcome {
        let category = category_for(job);
        let mut ok = 0u32;
        let mut failed = 0u32;

        for symbol in job.symbols() {
            match self.fetch_and_publish(category, &symbol).await {
                Ok(()) => ok += 1,
                Err(e) => {
                    warn!(job = %job.name, symbol = %symbol, error = %e, "job target fetch failed");
                    failed += 1;
                }
            }
        }

        JobOutcome { ok, failed }
    }

    async fn fetch_and_publish(&self, category: StreamCategory, symbol: &str) -> anyhow::Result<()> {
        let payload = match category {
            StreamCategory::Indices => {
                let url = format!("{}/index/{symbol}", self.gateway_base_url);
                let body = self.client.get(url).send().await?.error_for_status()?;
                body.text().await?
            }
            StreamCategory::Crypto => {
                let url = format!("{}/crypto/{symbol}", self.gateway_base_url);
                let body = self.client.get(url).send().await?.error_for_status()?;
                body.text().await?
            }
            StreamCategory::Stocks => {
                let url = format!("{}/quote/{symbol}", self.gateway_base_url);
                let body = self.client.get(url).send().await?.error_for_status()?;
                body.text().await?
            }
        };

        self.bus
            .publish_log(category.stream_name(), &payload, self.stream_maxlen)
            .await?;
        self.bus.publish_broadcast(&category.channel_name(), &payload).await?;
        Ok(())
    }
}

pub struct JobOutcome {
    pub ok: u32,
    pub failed: u32,
}

fn category_for(job: &JobDefinition) -> StreamCategory {
    match job.params.get("category").map(String::as_str) {
        Some("crypto") => StreamCategory::Crypto,
        Some("indices") => StreamCategory::Indices,
        _ => StreamCategory::Stocks,
    }
}
