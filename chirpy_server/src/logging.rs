//! Structured logging configuration.
//!
//! This module provides structured logging with request correlation and
//! security event tracking. Library crates log through the `log` facade;
//! `tracing-subscriber` picks those records up alongside native spans.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use chirpy_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// `reason` carries the internal error kind; it is never sent to clients.
///
/// # Example
///
/// ```
/// use chirpy_server::logging::log_security_event;
///
/// log_security_event("token_rejected", None, "expired");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<Uuid>, reason: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id.map(|id| id.to_string()),
        "SECURITY: {}",
        reason
    );
}

/// Log API request/response
///
/// # Arguments
///
/// * `request_id` - Correlation ID from the `x-request-id` header
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    tracing::info!(
        request_id = request_id,
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        "API request completed"
    );
}
