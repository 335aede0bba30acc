//! HTTP routing (spec §4.2).

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use quotron_core::Quote;

use crate::http_error::ApiError;
use crate::state::SharedState;
use tracing::instrument;

const SINGLE_DEADLINE: Duration = Duration::from_secs(5);
const BATCH_DEADLINE: Duration = Duration::from_secs(10);
const MAX_QUOTE_BATCH: usize = 20;
const MAX_INDEX_BATCH: usize = 10;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/quote/{symbol}", get(get_quote))
        .route("/crypto/{symbol}", get(get_crypto))
        .route("/index/{name}", get(get_index))
        .route("/quotes/batch", post(post_quotes_batch))
        .route("/indices/batch", post(post_indices_batch))
        .route("/quotes/history/{symbol}", get(get_history))
        .route("/data-source/health", get(get_data_source_health))
        .route("/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    profile: String,
}

#[instrument(skip(state))]
async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    state.metrics.record_request("/health");
    Json(HealthResponse {
        status: "ok",
        profile: state.config.profile_label().to_string(),
    })
}

#[instrument(skip(state), fields(symbol = %symbol))]
async fn get_quote(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    state.metrics.record_request("/quote/:symbol");
    let quote = state.clients.get_quote(&symbol, SINGLE_DEADLINE).await?;
    persist_quote(&state, &quote).await;
    Ok(Json(quote))
}

#[instrument(skip(state), fields(symbol = %symbol))]
async fn get_crypto(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    state.metrics.record_request("/crypto/:symbol");
    let symbol = if symbol.contains('-') {
        symbol
    } else {
        format!("{symbol}-USD")
    };
    let mut quote = state.clients.get_quote(&symbol, SINGLE_DEADLINE).await?;
    quote.exchange = quotron_core::Exchange::Crypto;
    persist_quote(&state, &quote).await;
    Ok(Json(quote))
}

#[instrument(skip(state), fields(symbol = %name))]
async fn get_index(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<quotron_core::MarketIndex>, ApiError> {
    state.metrics.record_request("/index/:name");
    let index = state.clients.get_index(&name, SINGLE_DEADLINE).await?;
    if let Some(pool) = &state.store {
        if let Err(e) = quotron_store::indices::insert_index(pool, &index).await {
            state.metrics.record_store_write_failure();
            tracing::warn!(error = %e, "failed to persist index");
        }
    }
    Ok(Json(index))
}

#[derive(Deserialize)]
struct SymbolsBody {
    symbols: Vec<String>,
}

#[derive(Serialize)]
struct QuotesBatchResponse {
    quotes: Vec<Quote>,
    errors: HashMap<String, String>,
}

#[instrument(skip(state, body), fields(count = body.symbols.len()))]
async fn post_quotes_batch(
    State(state): State<SharedState>,
    Json(body): Json<SymbolsBody>,
) -> Result<Json<QuotesBatchResponse>, ApiError> {
    state.metrics.record_request("/quotes/batch");
    if body.symbols.is_empty() {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "symbols must not be empty".to_string(),
        });
    }
    if body.symbols.len() > MAX_QUOTE_BATCH {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: format!("at most {MAX_QUOTE_BATCH} symbols per batch"),
        });
    }

    let futures = body.symbols.into_iter().map(|symbol| {
        let state = state.clone();
        async move {
            let result = state.clients.get_quote(&symbol, BATCH_DEADLINE).await;
            (symbol, result)
        }
    });
    let results = futures::future::join_all(futures).await;

    let mut quotes = Vec::new();
    let mut errors = HashMap::new();
    for (symbol, result) in results {
        match result {
            Ok(quote) => {
                persist_quote(&state, &quote).await;
                quotes.push(quote);
            }
            Err(e) => {
                errors.insert(symbol, e.to_string());
            }
        }
    }

    Ok(Json(QuotesBatchResponse { quotes, errors }))
}

#[derive(Serialize)]
struct IndicesBatchResponse {
    indices: Vec<quotron_core::MarketIndex>,
    errors: HashMap<String, String>,
}

#[instrument(skip(state, body), fields(count = body.symbols.len()))]
async fn post_indices_batch(
    State(state): State<SharedState>,
    Json(body): Json<SymbolsBody>,
) -> Result<Json<IndicesBatchResponse>, ApiError> {
    state.metrics.record_request("/indices/batch");
    if body.symbols.is_empty() {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "symbols must not be empty".to_string(),
        });
    }
    if body.symbols.len() > MAX_INDEX_BATCH {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: format!("at most {MAX_INDEX_BATCH} indices per batch"),
        });
    }

    let futures = body.symbols.into_iter().map(|name| {
        let state = state.clone();
        async move {
            let result = state.clients.get_index(&name, BATCH_DEADLINE).await;
            (name, result)
        }
    });
    let results = futures::future::join_all(futures).await;

    let mut indices = Vec::new();
    let mut errors = HashMap::new();
    for (name, result) in results {
        match result {
            Ok(index) => {
                if let Some(pool) = &state.store {
                    if let Err(e) = quotron_store::indices::insert_index(pool, &index).await {
                        state.metrics.record_store_write_failure();
                        tracing::warn!(error = %e, "failed to persist index");
                    }
                }
                indices.push(index);
            }
            Err(e) => {
                errors.insert(name, e.to_string());
            }
        }
    }

    Ok(Json(IndicesBatchResponse { indices, errors }))
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    7
}

#[instrument(skip(state), fields(symbol = %symbol, days = query.days))]
async fn get_history(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    state.metrics.record_request("/quotes/history/:symbol");
    if !(1..=30).contains(&query.days) {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "days must be between 1 and 30".to_string(),
        });
    }
    let days = query.days;

    let pool = state.store.as_ref().ok_or_else(|| ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "store not configured".to_string(),
    })?;

    let history = quotron_store::quotes::query_history(pool, &symbol, days)
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        })?;

    if !history.is_empty() {
        return Ok(Json(history));
    }

    // Empty store result — fall back to a single live fetch (spec §4.2).
    let quote = state.clients.get_quote(&symbol, SINGLE_DEADLINE).await?;
    persist_quote(&state, &quote).await;
    Ok(Json(vec![quote]))
}

#[instrument(skip(state))]
async fn get_data_source_health(
    State(state): State<SharedState>,
) -> Result<Json<Vec<quotron_core::SourceHealth>>, ApiError> {
    state.metrics.record_request("/data-source/health");
    let health = state.clients.health_snapshot().await;
    if health.is_empty() {
        return Err(ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "no data-source health recorded yet".to_string(),
        });
    }
    Ok(Json(health))
}

/// Plain counters, not a Prometheus exporter (spec §4.2.1).
async fn get_metrics(State(state): State<SharedState>) -> impl IntoResponse {
    let mut body = state.metrics.snapshot();
    if let Some(obj) = body.as_object_mut() {
        obj.insert(
            "failover_count".to_string(),
            serde_json::json!(state.clients.failover_count()),
        );
    }
    Json(body)
}

/// Writes a fetched quote to the store and marks its source healthy (spec
/// §4.2). Bus publication is owned by the scheduler (spec §4.4), not by
/// direct gateway reads — a client hitting `/quote/{symbol}` should not
/// itself fan the result out onto the log streams.
async fn persist_quote(state: &SharedState, quote: &Quote) {
    if let Some(pool) = &state.store {
        if let Err(e) = quotron_store::quotes::insert_quote(pool, quote).await {
            state.metrics.record_store_write_failure();
            tracing::warn!(error = %e, symbol = %quote.symbol, "failed to persist quote");
        }
    }
}
