//! Trade signal endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::types::{RiskParams, TradeRequest, TradeResponse};
use crate::AppState;

const INVALID_INPUT: &str = "Invalid input";

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
struct ValidTrade {
    symbol: String,
    amount: f64,
    contract_type: String,
    risk: RiskParams,
}

/// Required fields present and non-empty, amount positive.
fn validate(request: &TradeRequest) -> Option<ValidTrade> {
    let symbol = request.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let contract_type = request
        .contract_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let amount = request.amount.filter(|a| a.is_finite() && *a > 0.0)?;

    let defaults = RiskParams::default();
    Some(ValidTrade {
        symbol: symbol.to_string(),
        amount,
        contract_type: contract_type.to_string(),
        risk: RiskParams {
            stop_loss_percent: request
                .stop_loss_percent
                .unwrap_or(defaults.stop_loss_percent),
            take_profit_percent: request
                .take_profit_percent
                .unwrap_or(defaults.take_profit_percent),
        },
    })
}

fn invalid_input() -> AppError {
    AppError::BadRequest(INVALID_INPUT.to_string())
}

/// Analyze a symbol and answer with a trade signal.
async fn create_trade(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeResponse>> {
    let Json(request) = payload.map_err(|e| {
        debug!("Rejected trade body: {}", e);
        invalid_input()
    })?;
    let trade = validate(&request).ok_or_else(invalid_input)?;

    info!(
        "Trade request: {} {} amount {}",
        trade.symbol, trade.contract_type, trade.amount
    );

    let analysis = state
        .engine
        .analyze(&trade.symbol, &trade.risk, request.deriv_api_token.as_deref())
        .await?;

    Ok(Json(TradeResponse::from(analysis.recommendation)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/trade", post(create_trade))
}
