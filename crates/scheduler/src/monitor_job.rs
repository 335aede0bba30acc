//! The monitor job: watches one symbol, emits `Alert`s on the broadcast
//! channel only — never persisted through the ETL path (spec §4.4).

use std::sync::Arc;
use std::time::Duration;

use quotron_bus::{BusProducer, RedisBus};
use quotron_core::{Alert, StreamCategory};
use reqwest::Client;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::warn;

pub struct MonitorJob {
    client: Client,
    gateway_base_url: String,
    bus: Arc<RedisBus>,
    symbol: String,
    threshold: Decimal,
    last_price: Mutex<Option<Decimal>>,
}

impl MonitorJob {
    pub fn new(gateway_base_url: String, bus: Arc<RedisBus>, symbol: String, threshold: Decimal) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            gateway_base_url,
            bus,
            symbol,
            threshold,
            last_price: Mutex::new(None),
        }
    }

    /// Fetch the current price, compare to the previous observation, and
    /// publish an `Alert` if the move exceeds the threshold.
    pub async fn tick(&self) {
        let quote: quotron_core::Quote = match self.fetch_quote().await {
            Ok(q) => q,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "monitor job fetch failed");
                return;
            }
        };

        let mut last = self.last_price.lock().await;
        let change_percent = match *last {
            Some(previous) if previous != Decimal::ZERO => {
                (quote.price - previous) / previous * Decimal::from(100)
            }
            _ => {
                *last = Some(quote.price);
                return;
            }
        };
        *last = Some(quote.price);
        drop(last);

        if change_percent.abs() >= self.threshold {
            let alert = Alert {
                symbol: quote.symbol.clone(),
                price: quote.price,
                change_percent,
                threshold: self.threshold,
                timestamp: quote.timestamp,
            };
            self.publish_alert(&alert).await;
        }
    }

    async fn fetch_quote(&self) -> anyhow::Result<quotron_core::Quote> {
        let url = format!("{}/quote/{}", self.gateway_base_url, self.symbol);
        let quote = self.client.get(url).send().await?.error_for_status()?.json().await?;
        Ok(quote)
    }

    async fn publish_alert(&self, alert: &Alert) {
        let Ok(payload) = serde_json::to_string(alert) else { return };
        if let Err(e) = self
            .bus
            .publish_broadcast(&StreamCategory::Stocks.channel_name(), &payload)
            .await
        {
            warn!(symbol = %alert.symbol, error = %e, "failed to publish alert");
        }
    }
}
