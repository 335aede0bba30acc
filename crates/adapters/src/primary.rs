//! Primary upstream adapter — a same-network proxy, no API key required
//! (spec §4.1).

use std::time::Duration;

use async_trait::async_trait;
use quotron_core::{MarketIndex, Quote, Source};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AdapterError;
use crate::normalize::{normalize_exchange, normalize_timestamp};
use crate::traits::QuoteSource;

/// Talks to a yfinance-style proxy sitting on the same network.
pub struct ProxyAdapter {
    client: Client,
    base_url: String,
}

impl ProxyAdapter {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: format!("http://{host}:{port}"),
        }
    }
}

#[derive(Deserialize)]
struct ProxyQuoteResponse {
    symbol: String,
    price: Decimal,
    change: Decimal,
    change_percent: Decimal,
    volume: u64,
    timestamp: i64,
    exchange: String,
}

#[derive(Deserialize)]
struct ProxyIndexResponse {
    name: String,
    value: Decimal,
    change: Decimal,
    change_percent: Decimal,
    timestamp: i64,
}

async fn map_response_error(response: reqwest::Response) -> AdapterError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::NOT_FOUND {
        AdapterError::NotFound(body)
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        AdapterError::RateLimit
    } else if status == reqwest::StatusCode::BAD_REQUEST {
        AdapterError::Malformed(body)
    } else {
        AdapterError::BadResponse(format!("{status}: {body}"))
    }
}

#[async_trait]
impl QuoteSource for ProxyAdapter {
    fn name(&self) -> &str {
        "yfinance-proxy"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AdapterError> {
        let response = self
            .client
            .get(format!("{}/quote/{symbol}", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(map_response_error(response).await);
        }

        let body: ProxyQuoteResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::BadResponse(e.to_string()))?;

        Ok(Quote {
            exchange: normalize_exchange(&body.symbol, &body.exchange),
            symbol: body.symbol,
            price: body.price,
            change: body.change,
            change_percent: body.change_percent,
            volume: body.volume,
            timestamp: normalize_timestamp(body.timestamp),
            source: Source::ApiScraper,
        })
    }

    async fn fetch_index(&self, name: &str) -> Result<MarketIndex, AdapterError> {
        let response = self
            .client
            .get(format!("{}/index/{name}", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(map_response_error(response).await);
        }

        let body: ProxyIndexResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::BadResponse(e.to_string()))?;

        Ok(MarketIndex {
            name: body.name,
            value: body.value,
            change: body.change,
            change_percent: body.change_percent,
            timestamp: normalize_timestamp(body.timestamp),
            source: Source::ApiScraper,
        })
    }
}
