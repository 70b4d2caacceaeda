//! Payment provider webhooks.
//!
//! Polka calls `POST /api/polka/webhooks` with `Authorization: ApiKey <key>`.
//! Only the `user.upgraded` event does anything; every other event is
//! acknowledged so the provider stops retrying.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chirpy::auth::{AuthError, bearer};
use serde::Deserialize;
use uuid::Uuid;

use super::{
    ApiError, AppState, auth_error_response, error_response, json_body,
    middleware::authorization_header,
};
use crate::logging;

/// Event that grants Chirpy Red
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    pub user_id: Option<String>,
}

/// Handle a Polka webhook.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong API key
/// - `400 Bad Request`: Invalid body or user ID
/// - `404 Not Found`: Upgrade for an unknown user
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let api_key = bearer::extract_api_key(authorization_header(&headers))
        .map_err(|e| auth_error_response(&AuthError::from(e)))?;

    if !bearer::api_key_matches(api_key, &state.polka_key) {
        logging::log_security_event("webhook_rejected", None, "api_key_mismatch");
        return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }

    let payload = json_body(payload)?;
    if payload.event != USER_UPGRADED_EVENT {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload
        .data
        .user_id
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Invalid user_id"))?;

    match state.auth_manager.upgrade_to_red(user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(AuthError::UserNotFound) => {
            Err(error_response(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => Err(auth_error_response(&e)),
    }
}
