//! Diagnostic per-timeframe analysis endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::Result;
use crate::services::LaneReport;
use crate::types::{ProbabilityModel, RiskParams, SignalPolicy, TradeRecommendation};
use crate::AppState;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub symbol: String,
    pub signal_policy: SignalPolicy,
    pub probability_model: ProbabilityModel,
    pub timeframes: Vec<LaneReport>,
    /// Computed with the default risk parameters.
    pub recommendation: TradeRecommendation,
}

async fn analyze_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<AnalyzeResponse>> {
    let analysis = state
        .engine
        .analyze(&symbol, &RiskParams::default(), None)
        .await?;
    let config = state.engine.config();

    Ok(Json(AnalyzeResponse {
        symbol: analysis.recommendation.symbol.clone(),
        signal_policy: config.policy,
        probability_model: config.probability_model,
        timeframes: analysis.lanes,
        recommendation: analysis.recommendation,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze/:symbol", get(analyze_symbol))
}
