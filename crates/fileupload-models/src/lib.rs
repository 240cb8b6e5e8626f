//! Shared data models for signed URL issuance.
//!
//! This crate provides Serde-serializable types for:
//! - Signed URL operation kinds (POST form upload, PUT upload, GET download)
//! - Logical signed URL requests with optional expiry and size limits
//! - Signed URL payloads returned to callers

pub mod operation;
pub mod request;
pub mod signed_url;

// Re-export common types
pub use operation::OperationKind;
pub use request::SignedUrlRequest;
pub use signed_url::{PostUpload, SignedUrl};
