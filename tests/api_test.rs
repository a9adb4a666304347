//! Integration tests for API endpoints
//!
//! The router runs in-process against mock providers via `oneshot`.

mod common;

use augur::config::Config;
use augur::services::SignalEngine;
use augur::{api, AppState, SignalPolicy, Timeframe};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{engine_config, trend, MockSource};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(primary: Arc<MockSource>, secondary: Arc<MockSource>) -> Router {
    let engine_config = engine_config(SignalPolicy::Crossover);
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        engine: engine_config.clone(),
        yahoo: Default::default(),
        deriv: Default::default(),
    };
    let state = AppState {
        config: Arc::new(config),
        engine: Arc::new(SignalEngine::new(primary, secondary, engine_config)),
    };
    api::router().with_state(state)
}

fn post_trade(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/trade")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// POST /api/trade
// ============================================================================

#[tokio::test]
async fn test_trade_success_shape() {
    let primary = Arc::new(MockSource::new("primary").with(Timeframe::ThirtyMinutes, trend(260, 100.0, 1.0)));
    let secondary = Arc::new(MockSource::new("secondary"));

    let (status, body) = send(
        app(primary, secondary),
        post_trade(r#"{"symbol":"EURUSD","amount":"10","contract_type":"CALL"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Trade signal: buy");
    assert_eq!(body["entry_price"], 359.0);
    assert_eq!(body["timeframe_used"], "30m");
    assert_eq!(body["signal_policy"], "crossover");
    assert!(body["probability"].as_str().unwrap().ends_with('%'));
    assert!(body["stop_loss"].as_f64().unwrap() < 359.0);
    assert!(body["take_profit"].as_f64().unwrap() > 359.0);

    let lots = body["recommended_lot_sizes"].as_object().unwrap();
    assert_eq!(lots.len(), 7);
    assert!(lots.contains_key("Account Balance 100"));
    assert!(lots.contains_key("Account Balance 10000"));
}

#[tokio::test]
async fn test_trade_without_data_is_hold() {
    let primary = Arc::new(MockSource::new("primary"));
    let secondary = Arc::new(MockSource::new("secondary"));

    let (status, body) = send(
        app(primary, secondary),
        post_trade(r#"{"symbol":"EURUSD","amount":10,"contract_type":"CALL"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Trade signal: hold");
    assert!(body["entry_price"].is_null());
    assert!(body["stop_loss"].is_null());
    assert_eq!(body["probability"], "0%");
    assert_eq!(body["timeframe_used"], "no-signal");
}

#[tokio::test]
async fn test_invalid_input_rejected_before_fetch() {
    for payload in [
        r#"{"amount":10,"contract_type":"CALL"}"#,
        r#"{"symbol":"","amount":10,"contract_type":"CALL"}"#,
        r#"{"symbol":"EURUSD","contract_type":"CALL"}"#,
        r#"{"symbol":"EURUSD","amount":10}"#,
        r#"not json"#,
    ] {
        let primary = Arc::new(MockSource::new("primary"));
        let secondary = Arc::new(MockSource::new("secondary"));

        let (status, body) = send(app(primary.clone(), secondary.clone()), post_trade(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["errors"], "Invalid input");
        assert_eq!(body["status"], 400);
        assert_eq!(primary.calls(), 0);
        assert_eq!(secondary.calls(), 0);
    }
}

#[tokio::test]
async fn test_negative_stop_loss_is_bad_request() {
    let primary = Arc::new(MockSource::new("primary"));
    let secondary = Arc::new(MockSource::new("secondary"));

    let (status, body) = send(
        app(primary.clone(), secondary),
        post_trade(r#"{"symbol":"EURUSD","amount":10,"contract_type":"CALL","stop_loss_percent":-2}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(primary.calls(), 0);
}

// ============================================================================
// GET /api/analyze/:symbol and /api/health
// ============================================================================

#[tokio::test]
async fn test_analyze_lists_every_timeframe() {
    let primary = Arc::new(MockSource::new("primary").with(Timeframe::OneDay, trend(260, 100.0, 1.0)));
    let secondary = Arc::new(MockSource::new("secondary"));

    let request = Request::builder()
        .uri("/api/analyze/EURUSD")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(primary, secondary), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "EURUSD");
    assert_eq!(body["signal_policy"], "crossover");

    let lanes = body["timeframes"].as_array().unwrap();
    assert_eq!(lanes.len(), 6);
    let daily = lanes.iter().find(|l| l["timeframe"] == "1d").unwrap();
    assert_eq!(daily["primary_bars"], 260);
    assert_eq!(daily["snapshot"]["signal"], 1);
    let hourly = lanes.iter().find(|l| l["timeframe"] == "1h").unwrap();
    assert!(hourly["snapshot"].is_null());

    assert_eq!(body["recommendation"]["timeframe_used"], "1d");
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(
        app(Arc::new(MockSource::new("a")), Arc::new(MockSource::new("b"))),
        request,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["signal_policy"], "crossover");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let request = Request::builder()
        .uri("/api/nope")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(
        app(Arc::new(MockSource::new("a")), Arc::new(MockSource::new("b"))),
        request,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
