//! HTTP route handlers

pub mod board;
pub mod game;
pub mod status;
pub mod units;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hexfront_core::IllegalAction;
use serde_json::json;

/// Handler failure, rendered as `{"success": false, "error": ...}`
#[derive(Debug)]
pub enum ApiError {
    NoGame,
    Rejected(IllegalAction),
    BadRequest(String),
}

impl From<IllegalAction> for ApiError {
    fn from(err: IllegalAction) -> Self {
        ApiError::Rejected(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NoGame => (StatusCode::NOT_FOUND, "no game in progress".to_string()),
            ApiError::Rejected(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        tracing::debug!("Request rejected ({}): {}", status, message);
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
