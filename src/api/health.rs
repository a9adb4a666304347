use crate::types::{SignalPolicy, Timeframe};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    signal_policy: SignalPolicy,
    timeframes: Vec<Timeframe>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = &state.config.engine;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        signal_policy: engine.policy,
        timeframes: engine.timeframes.clone(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
