//! User and session API handlers.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8080/api/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "walt@breakingbad.com", "password": "04234"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "walt@breakingbad.com", "password": "04234"}'
//! ```
//!
//! Renew the access token:
//! ```bash
//! curl -X POST http://localhost:8080/api/refresh \
//!   -H "Authorization: Bearer <refresh_token>"
//! ```

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chirpy::auth::{
    AuthError, LoginRequest, RegisterRequest, UpdateUserRequest, User, UserId, bearer,
};
use serde::Serialize;

use super::{
    ApiError, AppState, auth_error_response, error_response, json_body,
    middleware::authorization_header,
};
use crate::{logging, metrics};

/// Login response: the user plus both session tokens
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Register a new user account.
///
/// # Request Body
///
/// ```json
/// { "email": "walt@breakingbad.com", "password": "04234" }
/// ```
///
/// # Response
///
/// `201 Created` with the user (no password hash).
///
/// # Errors
///
/// - `400 Bad Request`: Invalid body, email or empty password
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let request = json_body(payload)?;

    let user = state
        .auth_manager
        .register(request)
        .await
        .map_err(|e| auth_error_response(&e))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace the authenticated user's email and password.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid body, email or empty password
/// - `404 Not Found`: Token is valid but the user was deleted
/// - `409 Conflict`: Email owned by another user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let request = json_body(payload)?;

    match state.auth_manager.update_credentials(user_id, request).await {
        Ok(user) => Ok(Json(user)),
        Err(AuthError::UserNotFound) => {
            Err(error_response(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => Err(auth_error_response(&e)),
    }
}

/// Authenticate a user and issue session tokens.
///
/// # Response
///
/// ```json
/// {
///   "id": "…", "created_at": "…", "updated_at": "…",
///   "email": "walt@breakingbad.com", "is_chirpy_red": false,
///   "token": "eyJhbGciOiJIUzI1NiIs…",
///   "refresh_token": "56aa8263…"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;

    match state.auth_manager.login(request).await {
        Ok((user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(LoginResponse {
                user,
                token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            if !e.is_internal() {
                logging::log_security_event("failed_login", None, e.kind());
            }
            Err(auth_error_response(&e))
        }
    }
}

/// Mint a new access token from `Authorization: Bearer <refresh token>`.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing header, or unknown, expired or revoked token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let result = match bearer::extract(authorization_header(&headers)) {
        Ok(refresh_token) => state.auth_manager.refresh(refresh_token).await,
        Err(e) => Err(AuthError::from(e)),
    };

    match result {
        Ok(token) => Ok(Json(RefreshResponse { token })),
        Err(e) => {
            if !e.is_internal() {
                logging::log_security_event("refresh_token_rejected", None, e.kind());
                metrics::token_rejections_total(e.kind());
            }
            Err(auth_error_response(&e))
        }
    }
}

/// Revoke the refresh token in `Authorization: Bearer <refresh token>`.
///
/// Unknown tokens are reported as revoked: `204 No Content` either way.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer::extract(authorization_header(&headers))
        .map_err(|e| auth_error_response(&AuthError::from(e)))?;

    match state.auth_manager.revoke(refresh_token).await {
        Ok(()) | Err(AuthError::RefreshTokenNotFound) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(auth_error_response(&e)),
    }
}
