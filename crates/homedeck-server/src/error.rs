// ── Error → response mapping ──
//
// Gateway failures answer `{"error": ...}`; relay failures answer
// `{"ok": false, "error": ...}` except the missing-url case, which keeps
// the gateway's shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use homedeck_core::{GatewayError, RelayError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Gateway(e) => {
                let status = if e.is_server_side() {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
            Self::Relay(e) => {
                let message = e.to_string();
                let (status, body) = match e {
                    RelayError::MissingUrl => {
                        (StatusCode::BAD_REQUEST, json!({ "error": message }))
                    }
                    RelayError::InvalidBody { .. } => (
                        StatusCode::BAD_REQUEST,
                        json!({ "ok": false, "error": message }),
                    ),
                    RelayError::Transport(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "ok": false, "error": message }),
                    ),
                    RelayError::ShuttingDown => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        json!({ "ok": false, "error": message }),
                    ),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
