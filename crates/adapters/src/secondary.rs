//! Secondary upstream adapter — a key-authenticated third-party provider
//! with stricter rate limits (spec §4.1), modeled on Alpha Vantage's
//! `GLOBAL_QUOTE` / `OVERVIEW` query-parameter API.

use std::time::Duration;

use async_trait::async_trait;
use quotron_core::{MarketIndex, Quote, Source};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AdapterError;
use crate::normalize::{normalize_exchange, normalize_timestamp};
use crate::traits::QuoteSource;

pub struct KeyedAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl KeyedAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: "https://www.alphavantage.co/query".to_string(),
            api_key,
        }
    }

    #[cfg(test)]
    fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: String,
    #[serde(rename = "05. price")]
    price: Decimal,
    #[serde(rename = "09. change")]
    change: Decimal,
    #[serde(rename = "10. change percent")]
    change_percent: String,
    #[serde(rename = "06. volume")]
    volume: u64,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: String,
}

fn parse_change_percent(raw: &str) -> Decimal {
    raw.trim_end_matches('%').parse().unwrap_or_default()
}

#[async_trait]
impl QuoteSource for KeyedAdapter {
    fn name(&self) -> &str {
        "alpha-vantage"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AdapterError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimit);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::BadResponse(format!("{status}: {body}")));
        }

        let envelope: GlobalQuoteEnvelope = response
            .json()
            .await
            .map_err(|e| AdapterError::BadResponse(e.to_string()))?;

        if envelope.note.is_some() {
            return Err(AdapterError::RateLimit);
        }

        let quote = envelope
            .global_quote
            .filter(|q| !q.symbol.is_empty())
            .ok_or_else(|| AdapterError::NotFound(symbol.to_string()))?;

        let timestamp = chrono::NaiveDate::parse_from_str(&quote.latest_trading_day, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(16, 0, 0))
            .map(|dt| chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(dt, chrono::Utc))
            .unwrap_or_else(chrono::Utc::now);

        Ok(Quote {
            exchange: normalize_exchange(&quote.symbol, ""),
            symbol: quote.symbol,
            price: quote.price,
            change: quote.change,
            change_percent: parse_change_percent(&quote.change_percent),
            volume: quote.volume,
            timestamp,
            source: Source::ApiScraper,
        })
    }

    async fn fetch_index(&self, name: &str) -> Result<MarketIndex, AdapterError> {
        // Alpha Vantage has no dedicated index endpoint; indices are quoted
        // through their tracking ETF (e.g. SPY for the S&P 500).
        let quote = self.fetch_quote(name).await?;
        Ok(MarketIndex {
            name: quote.symbol,
            value: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            timestamp: quote.timestamp,
            source: quote.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change_percent_strips_sign() {
        assert_eq!(parse_change_percent("1.23%"), Decimal::new(123, 2));
    }

    #[test]
    fn test_adapter_name() {
        let adapter = KeyedAdapter::with_base_url("key".into(), "http://localhost".into());
        assert_eq!(adapter.name(), "alpha-vantage");
    }
}
