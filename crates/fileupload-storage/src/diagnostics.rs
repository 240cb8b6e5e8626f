//! Diagnostics sink for audit and research logging.
//!
//! The issuer reports timing markers around every outbound call and hands
//! full error detail here, since callers only ever see an opaque failure.

use std::error::Error;
use std::time::Instant;

use tracing::{debug, error, info};

/// Marker for a timing audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditPhase {
    /// Before building a client handle.
    InitStart,
    /// After building a client handle.
    InitEnd,
    /// Before a Signer Service call.
    Start,
    /// After a successful Signer Service call.
    End,
}

impl AuditPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditPhase::InitStart => "Init-Start",
            AuditPhase::InitEnd => "Init-End",
            AuditPhase::Start => "Start",
            AuditPhase::End => "End",
        }
    }
}

/// Where the issuer sends its diagnostics.
pub trait Diagnostics: Send + Sync {
    /// General-purpose debug message.
    fn log(&self, message: &str);

    /// Timing marker for `operation`, relative to the request start.
    fn timing_audit_log(&self, phase: AuditPhase, operation: &str, started_at: Instant);

    /// Record a failure with enough context for a postmortem.
    fn log_error_for_research(&self, error: &dyn Error, context: &str);
}

/// [`Diagnostics`] backed by `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn timing_audit_log(&self, phase: AuditPhase, operation: &str, started_at: Instant) {
        debug!(
            phase = phase.as_str(),
            operation = %operation,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Timing audit"
        );
    }

    fn log_error_for_research(&self, error: &dyn Error, context: &str) {
        error!(error = %error, context = %context, "Error logged for research");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_phase_str() {
        assert_eq!(AuditPhase::InitStart.as_str(), "Init-Start");
        assert_eq!(AuditPhase::InitEnd.as_str(), "Init-End");
        assert_eq!(AuditPhase::Start.as_str(), "Start");
        assert_eq!(AuditPhase::End.as_str(), "End");
    }

    #[test]
    fn test_tracing_diagnostics_without_subscriber() {
        let diagnostics = TracingDiagnostics;
        diagnostics.log("hello");
        diagnostics.timing_audit_log(AuditPhase::Start, "S3 Signed URL - Get File URL", Instant::now());
        diagnostics.log_error_for_research(
            &crate::error::SignerError::sdk("AccessDenied"),
            "Cause: S3 Signed URL",
        );
    }
}
