//! Gateway HTTP surface integration tests: failover, batch limits, history
//! validation — driven directly against the router via `tower::ServiceExt`
//! (no live upstream or database required).

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quotron_adapters::{AdapterError, QuoteSource};
use quotron_core::{Config, Exchange, MarketIndex, Quote, Source};
use quotron_gateway::client_manager::ClientManager;
use quotron_gateway::metrics::Metrics;
use quotron_gateway::router::build_router;
use quotron_gateway::state::AppState;
use tower::ServiceExt;

fn sample_quote(symbol: &str) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price: rust_decimal::Decimal::new(10050, 2),
        change: rust_decimal::Decimal::new(50, 2),
        change_percent: rust_decimal::Decimal::new(50, 3),
        volume: 1_000,
        timestamp: chrono::Utc::now(),
        exchange: Exchange::Nasdaq,
        source: Source::ApiScraper,
    }
}

fn sample_index(name: &str) -> MarketIndex {
    MarketIndex {
        name: name.to_string(),
        value: rust_decimal::Decimal::new(450000, 2),
        change: rust_decimal::Decimal::new(120, 2),
        change_percent: rust_decimal::Decimal::new(30, 3),
        timestamp: chrono::Utc::now(),
        source: Source::ApiScraper,
    }
}

/// Always succeeds or always fails with a fixed error, depending on how it's
/// constructed — enough to drive the client-manager's failover branches.
struct ScriptedSource {
    name: &'static str,
    outcome: Outcome,
}

#[derive(Clone)]
enum Outcome {
    Succeed,
    Fail(&'static str),
}

fn scripted_error(tag: &str) -> AdapterError {
    match tag {
        "retryable" => AdapterError::RateLimit,
        "not-found" => AdapterError::NotFound("no such symbol".to_string()),
        _ => AdapterError::BadResponse(tag.to_string()),
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AdapterError> {
        match &self.outcome {
            Outcome::Succeed => Ok(sample_quote(symbol)),
            Outcome::Fail(tag) => Err(scripted_error(tag)),
        }
    }

    async fn fetch_index(&self, name: &str) -> Result<MarketIndex, AdapterError> {
        match &self.outcome {
            Outcome::Succeed => Ok(sample_index(name)),
            Outcome::Fail(tag) => Err(scripted_error(tag)),
        }
    }
}

fn test_state(primary: Outcome, secondary: Outcome) -> Arc<AppState> {
    let primary = Arc::new(ScriptedSource { name: "primary-mock", outcome: primary });
    let secondary = Arc::new(ScriptedSource { name: "secondary-mock", outcome: secondary });
    Arc::new(AppState {
        config: Config::for_profile("test"),
        clients: ClientManager::new(primary, secondary),
        store: None,
        bus: None,
        metrics: Metrics::default(),
    })
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn failover_to_secondary_marks_primary_degraded() {
    let state = test_state(Outcome::Fail("retryable"), Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/quote/AAPL").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let quote = body_json(resp).await;
    assert_eq!(quote["symbol"], "AAPL");

    let resp = app
        .oneshot(Request::builder().uri("/data-source/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let health = body_json(resp).await;
    let primary = health
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["sourceType"] == "primary")
        .expect("primary entry present");
    assert_eq!(primary["status"], "degraded");
}

#[tokio::test]
async fn both_sources_failing_returns_500() {
    let state = test_state(Outcome::Fail("retryable"), Outcome::Fail("retryable"));
    let app = build_router(state);

    let resp = app
        .oneshot(Request::builder().uri("/quote/AAPL").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_retryable_primary_error_does_not_fail_over() {
    let state = test_state(Outcome::Fail("not-found"), Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .oneshot(Request::builder().uri("/quote/NOPE").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_quote_batch_is_rejected() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quotes/batch")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"symbols": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_quote_batch_is_rejected() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let symbols: Vec<String> = (0..21).map(|i| format!("SYM{i}")).collect();
    let body = serde_json::json!({ "symbols": symbols });
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quotes/batch")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_batch_within_limit_succeeds() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let body = serde_json::json!({ "symbols": ["AAPL", "MSFT"] });
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quotes/batch")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = body_json(resp).await;
    assert_eq!(parsed["quotes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_index_batch_is_rejected() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/indices/batch")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"symbols": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_rejects_out_of_range_days() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/quotes/history/AAPL?days=90")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_without_store_reports_unavailable() {
    // No live Postgres in this test environment — with `store: None`, a
    // valid `days` still surfaces the store's absence rather than silently
    // falling back, matching `get_history`'s `SERVICE_UNAVAILABLE` branch.
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/quotes/history/AAPL?days=7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metrics_endpoint_reports_request_counts() {
    let state = test_state(Outcome::Succeed, Outcome::Succeed);
    let app = build_router(state);

    let _ = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let metrics = body_json(resp).await;
    assert_eq!(metrics["requests_by_route"]["/health"], 1);
}
