//! HTTP handlers for the BFHL service.

use crate::dtos::{HealthStatus, OperationRequest, ResponseEnvelope};
use crate::services::{metrics, OperationError};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use tracing::Instrument;

/// Liveness probe: `{is_success, official_email}`.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (status, body) = state.health.check();
    (status, Json(body))
}

/// Readiness check endpoint for K8s readiness probes.
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Endpoint listing.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "BFHL API is running",
        "health": "/health",
        "bfhl": "/bfhl",
        "metrics": "/metrics"
    }))
}

/// Prometheus metrics endpoint.
pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    let body = metrics::get_metrics()?;
    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    ))
}

/// `POST /bfhl`: one operation per request, always answered with an
/// envelope, including for bodies that are not valid JSON.
pub async fn bfhl(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> (StatusCode, Json<ResponseEnvelope>) {
    let request_id = request_id
        .map(|Extension(id)| id.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());
    let span = tracing::info_span!("bfhl", request_id = %request_id);

    let (status, envelope) = match payload {
        Ok(Json(request)) => state.dispatcher.dispatch(request).instrument(span).await,
        Err(rejection) => {
            let _guard = span.enter();
            state.dispatcher.failure(&OperationError::validation(format!(
                "invalid request body: {}",
                rejection.body_text()
            )))
        }
    };

    (status, Json(envelope))
}
