//! HTTP API for the Chirpy server.
//!
//! # Modules
//!
//! - [`users`]: Registration, login, token refresh and revocation
//! - [`chirps`]: Posting, listing and deleting chirps
//! - [`webhooks`]: Payment provider callbacks
//! - [`admin`]: Metrics and development reset
//! - [`middleware`]: Authentication middleware for protected endpoints
//! - [`request_id`]: Request correlation and access logging
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /api/healthz                 - Liveness probe (public)
//! POST   /api/users                   - Register (public)
//! PUT    /api/users                   - Change email and password (auth required)
//! POST   /api/login                   - Login (public)
//! POST   /api/refresh                 - New access token (Bearer <refresh token>)
//! POST   /api/revoke                  - Revoke refresh token (Bearer <refresh token>)
//! POST   /api/chirps                  - Post chirp (auth required)
//! GET    /api/chirps                  - List chirps, ?author_id=&sort=asc|desc (public)
//! GET    /api/chirps/{chirp_id}       - Get chirp (public)
//! DELETE /api/chirps/{chirp_id}       - Delete own chirp (auth required)
//! POST   /api/polka/webhooks          - Membership upgrade (ApiKey <key>)
//! GET    /admin/metrics               - Prometheus metrics
//! POST   /admin/reset                 - Delete all users (PLATFORM=dev only)
//! ```
//!
//! Errors are returned as `{"error": "<message>"}`. Messages never reveal
//! why a credential was rejected.
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod admin;
pub mod chirps;
pub mod middleware;
pub mod request_id;
pub mod users;
pub mod webhooks;

use axum::{
    Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
};
use chirpy::{AuthError, AuthManager, ChirpError, ChirpManager};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Platform;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub chirp_manager: Arc<ChirpManager>,
    /// Expected `Authorization: ApiKey <key>` value for webhooks
    pub polka_key: Arc<str>,
    pub platform: Platform,
    pub metrics_handle: PrometheusHandle,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Unwrap a JSON body, answering 400 for anything undecodable
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "invalid request body"))
}

/// Map an authentication failure to a status code and client-safe message
pub(crate) fn auth_error_response(err: &AuthError) -> ApiError {
    let status = match err {
        e if e.is_internal() => {
            tracing::error!(kind = e.kind(), "Internal auth failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNAUTHORIZED,
    };
    error_response(status, err.client_message())
}

/// Map a chirp failure to a status code and client-safe message
pub(crate) fn chirp_error_response(err: &ChirpError) -> ApiError {
    let status = match err {
        ChirpError::Database(e) => {
            tracing::error!("Chirp storage failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ChirpError::TooLong { .. } | ChirpError::EmptyBody => StatusCode::BAD_REQUEST,
        ChirpError::NotFound | ChirpError::AuthorNotFound => StatusCode::NOT_FOUND,
        ChirpError::NotOwner => StatusCode::FORBIDDEN,
    };
    error_response(status, err.client_message())
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use chirpy_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/api/healthz", get(health_check))
        .route("/api/users", post(users::create_user))
        .route("/api/login", post(users::login))
        .route("/api/refresh", post(users::refresh))
        .route("/api/revoke", post(users::revoke))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/{chirp_id}", get(chirps::get_chirp))
        .route("/api/polka/webhooks", post(webhooks::polka_webhook))
        .route("/admin/metrics", get(admin::metrics))
        .route("/admin/reset", post(admin::reset));

    // Protected routes (require a valid access token)
    let protected_routes = Router::new()
        .route("/api/users", put(users::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(chirps::delete_chirp))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe
async fn health_check() -> &'static str {
    "OK"
}
