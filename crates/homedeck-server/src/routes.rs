use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use homedeck_core::{AdminAction, GatewayError, RelayOutcome, RelayRequest};

use crate::AppState;
use crate::error::ApiError;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Empty 200; the CORS layers add the headers.
pub(crate) async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `POST /device-admin`
///
/// The body is validated before the configuration check, so malformed
/// requests get a 400 even on an unconfigured host.
pub(crate) async fn device_admin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let action = AdminAction::from_json(&body)?;
    let gateway = state.gateway.as_ref().ok_or(GatewayError::NotConfigured)?;
    gateway.execute(action).await?;
    Ok(Json(json!({ "ok": true })))
}

/// `POST /relay-webhook`
pub(crate) async fn relay_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = RelayRequest::from_json(&body)?;

    match state.relay.relay(request).await? {
        RelayOutcome::Delivered(delivery) => Ok(Json(delivery).into_response()),
        RelayOutcome::Accepted { .. } => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "ok": true, "accepted": true })),
        )
            .into_response()),
    }
}
