//! Signer Service capability.
//!
//! The issuer never talks to the SDK directly. It holds a client handle
//! implementing [`SignerService`], built on first use by a [`ClientFactory`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fileupload_models::PostUpload;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::config::FileUploadConfig;
use crate::error::SignerResult;

/// S3 API version every client handle is pinned to.
pub const S3_API_VERSION: &str = "2006-03-01";

/// A POST policy condition.
///
/// Serializes to the array form S3 expects inside a policy document, e.g.
/// `["content-length-range", 0, 1048576]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCondition {
    /// Upload body size must fall within `[min, max]` bytes.
    ContentLengthRange { min: u64, max: u64 },
}

impl PolicyCondition {
    pub fn content_length_range(min: u64, max: u64) -> Self {
        Self::ContentLengthRange { min, max }
    }
}

impl Serialize for PolicyCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        match self {
            PolicyCondition::ContentLengthRange { min, max } => {
                seq.serialize_element("content-length-range")?;
                seq.serialize_element(min)?;
                seq.serialize_element(max)?;
            }
        }
        seq.end()
    }
}

/// Parameters for a presigned POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostPolicyParams {
    pub bucket: String,
    pub key: String,
    /// Extra form fields to sign.
    pub fields: BTreeMap<String, String>,
    pub conditions: Vec<PolicyCondition>,
    /// Policy lifetime in seconds. `None` lets the signer pick its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
}

impl PostPolicyParams {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            fields: BTreeMap::new(),
            conditions: Vec::new(),
            expires: None,
        }
    }
}

/// Object addressed by a PUT or GET command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectCommand {
    pub bucket: String,
    pub key: String,
}

impl ObjectCommand {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Presigning options for PUT/GET URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignParams {
    /// URL time-to-live in seconds. `None` lets the signer pick its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Signing capability backed by an object-storage SDK client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignerService: Send + Sync {
    /// Create a presigned POST (URL + form fields) for browser uploads.
    async fn create_presigned_post(&self, params: &PostPolicyParams) -> SignerResult<PostUpload>;

    /// Create a signed URL for a PUT object command.
    async fn presign_put_object(
        &self,
        command: &ObjectCommand,
        params: &PresignParams,
    ) -> SignerResult<String>;

    /// Create a signed URL for a GET object command.
    async fn presign_get_object(
        &self,
        command: &ObjectCommand,
        params: &PresignParams,
    ) -> SignerResult<String>;
}

/// Builds client handles from configuration.
pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &FileUploadConfig) -> SignerResult<Arc<dyn SignerService>>;
}
