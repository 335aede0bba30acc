//! Quote persistence — `stock_quotes` table (spec §6.3).

use chrono::{DateTime, Utc};
use quotron_core::{Exchange, Quote, Source};
use sqlx::PgPool;

use crate::error::StoreError;

/// Idempotent on `(symbol, timestamp, source)` — a duplicate insert from
/// bus at-least-once redelivery (spec §8) is a silent no-op rather than
/// a second row.
pub async fn insert_quote(pool: &PgPool, quote: &Quote) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO stock_quotes
            (symbol, price, change, change_percent, volume, timestamp, exchange, source)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (symbol, timestamp, source) DO NOTHING
        "#,
    )
    .bind(&quote.symbol)
    .bind(quote.price)
    .bind(quote.change)
    .bind(quote.change_percent)
    .bind(quote.volume as i64)
    .bind(quote.timestamp)
    .bind(quote.exchange.to_string())
    .bind(quote.source.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// `GET /quotes/history/{symbol}?days=N` (spec §4.2) — most recent first.
pub async fn query_history(pool: &PgPool, symbol: &str, days: i64) -> Result<Vec<Quote>, StoreError> {
    let cutoff = Utc::now() - chrono::Duration::days(days);

    let rows = sqlx::query_as::<_, QuoteRow>(
        r#"
        SELECT symbol, price, change, change_percent, volume, timestamp, exchange, source
        FROM stock_quotes
        WHERE symbol = $1 AND timestamp >= $2
        ORDER BY timestamp DESC
        "#,
    )
    .bind(symbol)
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(|r| r.into_quote()).collect())
}

#[derive(sqlx::FromRow)]
struct QuoteRow {
    symbol: String,
    price: rust_decimal::Decimal,
    change: rust_decimal::Decimal,
    change_percent: rust_decimal::Decimal,
    volume: i64,
    timestamp: DateTime<Utc>,
    exchange: String,
    source: String,
}

impl QuoteRow {
    fn into_quote(self) -> Option<Quote> {
        Some(Quote {
            symbol: self.symbol,
            price: self.price,
            change: self.change,
            change_percent: self.change_percent,
            volume: self.volume as u64,
            timestamp: self.timestamp,
            exchange: parse_exchange(&self.exchange)?,
            source: parse_source(&self.source)?,
        })
    }
}

fn parse_exchange(s: &str) -> Option<Exchange> {
    match s {
        "NYSE" => Some(Exchange::Nyse),
        "NASDAQ" => Some(Exchange::Nasdaq),
        "AMEX" => Some(Exchange::Amex),
        "OTC" => Some(Exchange::Otc),
        "CRYPTO" => Some(Exchange::Crypto),
        "OTHER" => Some(Exchange::Other),
        _ => None,
    }
}

fn parse_source(s: &str) -> Option<Source> {
    match s {
        "api-scraper" => Some(Source::ApiScraper),
        "browser-scraper" => Some(Source::BrowserScraper),
        "manual" => Some(Source::Manual),
        _ => None,
    }
}
