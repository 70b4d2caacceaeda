//! Authentication middleware for protected endpoints.
//!
//! The middleware resolves the `Authorization: Bearer <token>` header through
//! [`chirpy::AuthManager::authenticate`] and injects the authenticated
//! [`chirpy::UserId`] into request extensions for downstream handlers.
//!
//! # Extracting User ID
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use chirpy::UserId;
//!
//! async fn protected_handler(Extension(user_id): Extension<UserId>) -> String {
//!     format!("Authenticated as user {}", user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::{ApiError, AppState, auth_error_response};
use crate::{logging, metrics};

/// Raw `Authorization` header value, if it is valid UTF-8
pub(crate) fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Validate the access token and inject the user ID.
///
/// Every rejection is a `401 Unauthorized` with the same message; the
/// specific reason is only logged and counted.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(request.headers());

    match state.auth_manager.authenticate(header) {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            Ok(next.run(request).await)
        }
        Err(e) => {
            logging::log_security_event("access_token_rejected", None, e.kind());
            metrics::token_rejections_total(e.kind());
            Err(auth_error_response(&e))
        }
    }
}
