use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Failures raised by the signal engine itself.
///
/// Provider failures never surface here; they degrade to missing data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid risk parameter {name}: {value}")]
    InvalidRiskParameter { name: &'static str, value: f64 },

    #[error("symbol is empty")]
    EmptySymbol,

    #[error("no timeframes configured")]
    NoTimeframes,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Engine(e @ EngineError::InvalidRiskParameter { .. })
            | AppError::Engine(e @ EngineError::EmptySymbol) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(json!({
            "errors": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
