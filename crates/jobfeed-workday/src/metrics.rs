//! Workday client metrics collection.
//!
//! Provides standardized metrics for monitoring upstream calls:
//! - Request counters by operation and status
//! - Latency histograms
//! - Token refresh counters by outcome

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total upstream requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "workday_requests_total";

    /// Total token refresh attempts by outcome.
    pub const TOKEN_REFRESHES_TOTAL: &str = "workday_token_refreshes_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "workday_latency_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed upstream request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    let status_str = status.to_string();

    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_str
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a token refresh attempt (`outcome` is "ok" or "error").
pub fn record_token_refresh(outcome: &str) {
    counter!(
        names::TOKEN_REFRESHES_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================
