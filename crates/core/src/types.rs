//! Shared domain entities (spec §3.1).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exchange a quote was observed on. Cryptos are always `CRYPTO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nyse,
    Nasdaq,
    Amex,
    Otc,
    Crypto,
    Other,
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Exchange::Nyse => "NYSE",
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Amex => "AMEX",
            Exchange::Otc => "OTC",
            Exchange::Crypto => "CRYPTO",
            Exchange::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

/// Coarse origin category for a stored record (spec §3.1). Provider
/// identity (primary vs. secondary adapter) is intentionally dropped here —
/// see DESIGN.md's "source-enum lossy mapping" note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    ApiScraper,
    BrowserScraper,
    Manual,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::ApiScraper => "api-scraper",
            Source::BrowserScraper => "browser-scraper",
            Source::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// A single priced instrument observation — covers both equities and
/// cryptocurrencies (cryptos use `exchange = Crypto`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
    pub exchange: Exchange,
    pub source: Source,
}

/// A market-wide index value (S&P 500, etc).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub name: String,
    pub value: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub timestamp: DateTime<Utc>,
    pub source: Source,
}

/// Observed reliability of one upstream provider, updated in place on every
/// client-manager call (spec §3.1, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Which kind of upstream source this health record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Primary,
    Secondary,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceType::Primary => "primary",
            SourceType::Secondary => "secondary",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub source_type: SourceType,
    pub source_name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub last_success: Option<DateTime<Utc>>,
    pub error_count: u64,
    pub error_message: Option<String>,
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SourceHealth {
    pub fn unknown(source_type: SourceType, source_name: impl Into<String>) -> Self {
        Self {
            source_type,
            source_name: source_name.into(),
            status: HealthStatus::Unknown,
            last_check: Utc::now(),
            last_success: None,
            error_count: 0,
            error_message: None,
            response_time_ms: None,
            metadata: HashMap::new(),
        }
    }

    /// `status = healthy` requires at least one success within the freshness
    /// window (spec §3.2 invariant). Called after every client-manager call.
    pub fn recompute_status(&mut self, freshness: chrono::Duration) {
        self.status = match self.last_success {
            Some(t) if Utc::now() - t <= freshness => {
                if self.status == HealthStatus::Unhealthy {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                }
            }
            Some(_) => HealthStatus::Unhealthy,
            None => HealthStatus::Unknown,
        };
    }
}

/// A scheduled job's static configuration (spec §3.1). Loaded once at
/// scheduler start; reread only on explicit reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    pub cron: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl JobDefinition {
    /// Split a comma-separated symbol list out of `params["symbols"]`.
    pub fn symbols(&self) -> Vec<String> {
        self.params
            .get("symbols")
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Bus stream categories (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamCategory {
    Stocks,
    Crypto,
    Indices,
}

impl StreamCategory {
    pub fn stream_name(self) -> &'static str {
        match self {
            StreamCategory::Stocks => "stocks",
            StreamCategory::Crypto => "crypto",
            StreamCategory::Indices => "indices",
        }
    }

    pub fn channel_name(self) -> String {
        format!("{}:broadcast", self.stream_name())
    }
}

/// Envelope wrapping a serialized entity on its way through the bus (spec
/// §3.1, §6.2). `id` is broker-assigned and monotonic within the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMessage {
    pub id: String,
    pub data: String,
}

/// An alert emitted by the scheduler's monitor job onto the broadcast
/// channel only — never persisted through the ETL path (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub symbol: String,
    pub price: Decimal,
    pub change_percent: Decimal,
    pub threshold: Decimal,
    pub timestamp: DateTime<Utc>,
}
