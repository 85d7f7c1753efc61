//! Behavior-driven tests for the server-side error contract.
//!
//! These tests drive the real router and verify the wire-level outcomes a
//! client observes: status codes, Problem payloads, trace correlation, and
//! the guarantee that internal failure text never leaks.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tickergrid_core::{Exchange, PricePoint, PriceRange, Sector, Stock, Symbol};
use tickergrid_tests::{sample_app, sample_app_with};
use tickergrid_web::{
    app, AppState, MarketStore, ServerConfig, StorageError, StoreFuture, TRACE_HEADER,
};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request builds")
}

// =============================================================================
// Error Contract: Expected Failures
// =============================================================================

#[tokio::test]
async fn when_stock_is_missing_user_receives_a_404_problem() {
    // Given: The sample data set without symbol ZZZZ
    let app = sample_app();

    // When: The missing stock is requested
    let response = app.oneshot(get("/stocks/ZZZZ")).await.expect("infallible");

    // Then: A structured Problem crosses the wire
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["detail"], "Stock with identifier 'ZZZZ' was not found");
    assert_eq!(body["instance"], "/stocks/ZZZZ");
    assert!(
        !body["traceId"].as_str().unwrap_or_default().is_empty(),
        "every error response carries a trace id"
    );
}

#[tokio::test]
async fn when_caller_supplies_a_trace_id_it_round_trips() {
    // Given: A request carrying an external correlation id
    let app = sample_app();
    let request = Request::builder()
        .uri("/stocks/ZZZZ")
        .header(TRACE_HEADER, "support-ticket-4711")
        .body(Body::empty())
        .expect("request builds");

    // When: The request fails
    let response = app.oneshot(request).await.expect("infallible");

    // Then: Both the payload and the response header echo the id
    assert_eq!(
        response
            .headers()
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("support-ticket-4711")
    );
    let body = body_json(response).await;
    assert_eq!(body["traceId"], "support-ticket-4711");
}

#[tokio::test]
async fn when_search_parameters_are_missing_guards_reject_with_400() {
    let app = sample_app();

    let response = app
        .oneshot(get("/stocks/search"))
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .unwrap_or_default()
            .contains("required parameter 'q'"),
        "detail names the missing parameter: {body}"
    );
}

#[tokio::test]
async fn when_search_limit_is_out_of_range_guards_reject_with_400() {
    let app = sample_app();

    let response = app
        .oneshot(get("/stocks/search?q=apple&limit=0"))
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("limit"));
}

#[tokio::test]
async fn when_symbol_is_malformed_user_gets_an_actionable_400() {
    let app = sample_app();

    let response = app
        .oneshot(get("/stocks/3M!"))
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("symbol"));
}

#[tokio::test]
async fn when_price_range_is_inverted_the_date_guard_fires() {
    let app = sample_app();

    let response = app
        .oneshot(get(
            "/stocks/AAPL/prices?from=2026-02-01T00:00:00Z&to=2026-01-01T00:00:00Z",
        ))
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("range start must not exceed range end"));
}

#[tokio::test]
async fn when_payload_fields_are_blank_every_violation_is_listed() {
    // Given: An update with two blank fields
    let app = sample_app();
    let request = put_json(
        "/stocks/AAPL",
        "{\"name\":\"\",\"exchangeCode\":\"XNAS\",\"sectorId\":\"  \"}",
    );

    // When: The update is submitted
    let response = app.oneshot(request).await.expect("infallible");

    // Then: The response enumerates both violations, not just the first
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let errors = body["errors"].as_array().expect("errors array present");
    assert_eq!(errors.len(), 2);
    let fields: Vec<&str> = errors
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"sectorId"));
}

#[tokio::test]
async fn when_stock_already_exists_creation_conflicts_with_409() {
    let app = sample_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/stocks/AAPL")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            "{\"name\":\"Apple Inc.\",\"exchangeCode\":\"XNAS\",\"sectorId\":\"tech\"}",
        ))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("infallible");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Stock with identifier 'AAPL' already exists");
}

#[tokio::test]
async fn when_update_moves_a_stock_across_exchanges_rule_violation_is_422() {
    let app = sample_app();
    let request = put_json(
        "/stocks/AAPL",
        "{\"name\":\"Apple Inc.\",\"exchangeCode\":\"XNYS\",\"sectorId\":\"tech\"}",
    );

    let response = app.oneshot(request).await.expect("infallible");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("cannot move"));
}

// =============================================================================
// Error Contract: Authentication
// =============================================================================

fn keyed_config() -> ServerConfig {
    ServerConfig {
        api_key: Some(String::from("expected-key")),
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn when_mutation_lacks_the_api_key_response_is_401() {
    let app = sample_app_with(keyed_config());
    let request = put_json(
        "/stocks/AAPL",
        "{\"name\":\"Apple Inc.\",\"exchangeCode\":\"XNAS\",\"sectorId\":\"tech\"}",
    );

    let response = app.oneshot(request).await.expect("infallible");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn when_mutation_presents_the_wrong_key_response_is_403() {
    let app = sample_app_with(keyed_config());
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/stocks/AAPL")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", "wrong-key")
        .body(Body::from(
            "{\"name\":\"Apple Inc.\",\"exchangeCode\":\"XNAS\",\"sectorId\":\"tech\"}",
        ))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("infallible");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Error Contract: Unexpected Failures
// =============================================================================

/// Store whose reads fail with an infrastructure error carrying sensitive
/// internal detail.
struct BrokenStore;

impl MarketStore for BrokenStore {
    fn exchanges(&self) -> StoreFuture<'_, Vec<Exchange>> {
        Box::pin(async {
            Err(StorageError::Unavailable(String::from(
                "pool exhausted on db-primary-2 (password=hunter2)",
            )))
        })
    }

    fn sectors(&self) -> StoreFuture<'_, Vec<Sector>> {
        Box::pin(async { panic!("sector index corrupted") })
    }

    fn stock<'a>(&'a self, _symbol: &'a Symbol) -> StoreFuture<'a, Option<Stock>> {
        Box::pin(async {
            Err(StorageError::Corrupted(String::from("page checksum mismatch")))
        })
    }

    fn search_stocks<'a>(&'a self, _query: &'a str) -> StoreFuture<'a, Vec<Stock>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn prices<'a>(
        &'a self,
        _symbol: &'a Symbol,
        _range: &'a PriceRange,
    ) -> StoreFuture<'a, Vec<PricePoint>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn upsert_stock(&self, stock: Stock) -> StoreFuture<'_, (Stock, bool)> {
        Box::pin(async move { Ok((stock, false)) })
    }
}

fn broken_app() -> axum::Router {
    app(Arc::new(AppState::new(
        Arc::new(BrokenStore),
        ServerConfig::default(),
    )))
}

#[tokio::test]
async fn when_storage_fails_the_interceptor_returns_a_scrubbed_500() {
    // Given: A store that fails with sensitive internal detail
    let app = broken_app();

    // When: A request hits the failing path
    let response = app.oneshot(get("/exchanges")).await.expect("infallible");

    // Then: A 500 Problem with generic detail; nothing internal leaks
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], 500);
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(!detail.contains("hunter2"), "secret leaked: {detail}");
    assert!(!detail.contains("db-primary-2"), "topology leaked: {detail}");
    assert!(
        !body["traceId"].as_str().unwrap_or_default().is_empty(),
        "500s still correlate with server logs"
    );
}

#[tokio::test]
async fn when_a_handler_panics_exactly_one_problem_response_is_produced() {
    let app = broken_app();

    let response = app.oneshot(get("/sectors")).await.expect("infallible");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(
        !detail.contains("corrupted"),
        "panic text must stay in the logs: {detail}"
    );
}

/// Store whose price reads stall past any reasonable budget.
struct StalledStore;

impl MarketStore for StalledStore {
    fn exchanges(&self) -> StoreFuture<'_, Vec<Exchange>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn sectors(&self) -> StoreFuture<'_, Vec<Sector>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn stock<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, Option<Stock>> {
        Box::pin(async move {
            Ok(Some(Stock {
                symbol: symbol.clone(),
                name: String::from("Apple Inc."),
                exchange_code: String::from("XNAS"),
                sector_id: String::from("tech"),
            }))
        })
    }

    fn search_stocks<'a>(&'a self, _query: &'a str) -> StoreFuture<'a, Vec<Stock>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn prices<'a>(
        &'a self,
        _symbol: &'a Symbol,
        _range: &'a PriceRange,
    ) -> StoreFuture<'a, Vec<PricePoint>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Vec::new())
        })
    }

    fn upsert_stock(&self, stock: Stock) -> StoreFuture<'_, (Stock, bool)> {
        Box::pin(async move { Ok((stock, false)) })
    }
}

#[tokio::test]
async fn when_the_price_query_exceeds_its_budget_the_response_is_408() {
    // Given: A store slower than the configured budget
    let app = app(Arc::new(AppState::new(
        Arc::new(StalledStore),
        ServerConfig {
            request_budget: Duration::from_millis(10),
            ..ServerConfig::default()
        },
    )));

    // When: A price series is requested
    let response = app
        .oneshot(get(
            "/stocks/AAPL/prices?from=2026-01-01T00:00:00Z&to=2026-01-31T00:00:00Z",
        ))
        .await
        .expect("infallible");

    // Then: The timeout classifies to 408
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body = body_json(response).await;
    assert_eq!(body["status"], 408);
    assert_eq!(body["title"], "Request Timeout");
}

// =============================================================================
// Error Contract: Happy Path Control
// =============================================================================

#[tokio::test]
async fn when_the_stock_exists_the_payload_is_returned_unwrapped() {
    let app = sample_app();

    let response = app.oneshot(get("/stocks/AAPL")).await.expect("infallible");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["exchangeCode"], "XNAS");
}

#[tokio::test]
async fn when_requests_succeed_the_trace_header_is_still_echoed() {
    let app = sample_app();
    let request = Request::builder()
        .uri("/exchanges")
        .header(TRACE_HEADER, "ok-path-trace")
        .body(Body::empty())
        .expect("request builds");

    let response = app.oneshot(request).await.expect("infallible");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("ok-path-trace")
    );
}
