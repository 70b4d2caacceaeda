//! Prometheus metrics for monitoring server health and traffic.
//!
//! The recorder is installed once at startup; `GET /admin/metrics` renders
//! the returned handle in Prometheus text format.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts by method and status
//! - **Auth Metrics**: Login attempts, token rejections by kind
//! - **Chirp Metrics**: Chirps created
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use chirpy_server::metrics;
//!
//! let handle = metrics::init_metrics().unwrap();
//! metrics::http_requests_total("POST", 201);
//! println!("{}", handle.render());
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
///
/// # Errors
///
/// Fails if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))
}

/// A handle that renders an empty registry, for tests and tools that must
/// not touch the global recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment rejected access/refresh token counter.
///
/// `kind` is the internal rejection reason, e.g. `expired` or `missing_header`.
pub fn token_rejections_total(kind: &'static str) {
    metrics::counter!("token_rejections_total", "kind" => kind).increment(1);
}

// ============================================================================
// Chirp Metrics
// ============================================================================

/// Increment chirps created counter.
pub fn chirps_created_total() {
    metrics::counter!("chirps_created_total").increment(1);
}
