//! Administrative endpoints.

use axum::{
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};

use super::{ApiError, AppState, auth_error_response, error_response};

/// Prometheus text exposition content type
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render all recorded metrics in Prometheus text format
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics_handle.render(),
    )
}

/// Delete every user together with their chirps and refresh tokens.
///
/// Only available when `PLATFORM=dev`; anywhere else this is `403 Forbidden`.
pub async fn reset(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    if !state.platform.is_dev() {
        tracing::warn!("Rejected reset outside dev platform");
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Reset is only allowed in dev environment",
        ));
    }

    state
        .auth_manager
        .reset()
        .await
        .map_err(|e| auth_error_response(&e))?;

    Ok("Users deleted")
}
