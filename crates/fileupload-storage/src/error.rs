//! Signer error types.

use thiserror::Error;

/// Result type for Signer Service operations.
pub type SignerResult<T> = Result<T, SignerError>;

/// Errors raised while building a client or signing a request.
///
/// These never reach callers of the issuer; they are logged for research and
/// collapsed into [`SignFailure`].
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Failed to configure signer: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Presign failed: {0}")]
    Presign(String),

    #[error("Policy signing failed: {0}")]
    Policy(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AWS SDK error: {0}")]
    Sdk(String),
}

impl SignerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn presign(msg: impl Into<String>) -> Self {
        Self::Presign(msg.into())
    }

    pub fn sdk(msg: impl Into<String>) -> Self {
        Self::Sdk(msg.into())
    }
}

/// Caller-visible failure of a signing operation.
///
/// Carries no detail: a missing bucket, a network timeout and an invalid key
/// all look the same from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signing operation failed")]
pub struct SignFailure;

/// Result type for issuer operations.
pub type IssueResult<T> = Result<T, SignFailure>;
