//! Signed URL metrics collection.
//!
//! Provides standardized metrics for monitoring signing operations:
//! - Request counters by operation and status
//! - Latency histograms
//! - Client construction counters

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total signing requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "fileupload_sign_requests_total";

    /// Signing latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "fileupload_sign_latency_seconds";

    /// Total client handles constructed.
    pub const CLIENT_INITS_TOTAL: &str = "fileupload_client_inits_total";
}

/// Outcome label values.
pub mod status {
    pub const OK: &str = "ok";
    pub const ERROR: &str = "error";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed signing request.
pub fn record_request(operation: &str, status: &'static str, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a client handle construction.
pub fn record_client_init() {
    counter!(names::CLIENT_INITS_TOTAL).increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(names::REQUESTS_TOTAL, "fileupload_sign_requests_total");
        assert_eq!(names::LATENCY_SECONDS, "fileupload_sign_latency_seconds");
        assert_eq!(names::CLIENT_INITS_TOTAL, "fileupload_client_inits_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("put", status::OK, 12.5);
        record_request("post", status::ERROR, 3.0);
        record_client_init();
    }
}
