//! Signed URL issuance for S3-compatible object storage.
//!
//! This crate provides:
//! - Presigned POST forms for browser uploads (with optional size limits)
//! - Presigned PUT upload URLs
//! - Presigned GET download URLs
//! - Lazy, per-context S3 client construction
//! - Research logging of failures without leaking SDK errors to callers

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod issuer;
pub mod metrics;
pub mod post_policy;
pub mod s3;
pub mod signer;

pub use config::{FileUploadConfig, FileUploadConfigOverride};
pub use context::InstanceContext;
pub use diagnostics::{AuditPhase, Diagnostics, TracingDiagnostics};
pub use error::{IssueResult, SignFailure, SignerError, SignerResult};
pub use issuer::SignedUrlIssuer;
pub use s3::{S3ClientFactory, S3Signer};
pub use signer::{
    ClientFactory, ObjectCommand, PolicyCondition, PostPolicyParams, PresignParams, SignerService,
    S3_API_VERSION,
};
