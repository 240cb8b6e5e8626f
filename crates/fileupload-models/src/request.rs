//! Logical signed URL requests.

use serde::{Deserialize, Serialize};

use crate::operation::OperationKind;

/// A request for one signed URL.
///
/// `expire_time` and `max_allowed_size` treat `0` the same as absent: no
/// expiry is passed to the signer (its default applies) and no size limit is
/// added to the upload policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrlRequest {
    /// Operation the URL grants.
    pub kind: OperationKind,
    /// Bucket holding the object.
    pub bucket: String,
    /// Full object key.
    pub key: String,
    /// URL lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<u64>,
    /// Max upload size in bytes. Only honored for POST uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_allowed_size: Option<u64>,
}

impl SignedUrlRequest {
    /// Create a request without expiry or size limit.
    pub fn new(kind: OperationKind, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind,
            bucket: bucket.into(),
            key: key.into(),
            expire_time: None,
            max_allowed_size: None,
        }
    }

    /// Browser-form POST upload request.
    pub fn post(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(OperationKind::Post, bucket, key)
    }

    /// PUT upload request.
    pub fn put(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(OperationKind::Put, bucket, key)
    }

    /// GET download request.
    pub fn get(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(OperationKind::Get, bucket, key)
    }

    pub fn with_expire_time(mut self, seconds: u64) -> Self {
        self.expire_time = Some(seconds);
        self
    }

    pub fn with_max_allowed_size(mut self, bytes: u64) -> Self {
        self.max_allowed_size = Some(bytes);
        self
    }

    /// Expiry to forward to the signer, if any.
    pub fn effective_expire_time(&self) -> Option<u64> {
        self.expire_time.filter(|secs| *secs > 0)
    }

    /// Size limit to add to the upload policy, if any.
    pub fn effective_size_limit(&self) -> Option<u64> {
        if !self.kind.supports_size_limit() {
            return None;
        }
        self.max_allowed_size.filter(|bytes| *bytes > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expiry_is_ignored() {
        let request = SignedUrlRequest::put("bucket", "a.jpg").with_expire_time(0);
        assert_eq!(request.effective_expire_time(), None);

        let request = SignedUrlRequest::put("bucket", "a.jpg").with_expire_time(3600);
        assert_eq!(request.effective_expire_time(), Some(3600));
    }

    #[test]
    fn test_size_limit_only_for_post() {
        let post = SignedUrlRequest::post("bucket", "a.jpg").with_max_allowed_size(1_048_576);
        assert_eq!(post.effective_size_limit(), Some(1_048_576));

        let zero = SignedUrlRequest::post("bucket", "a.jpg").with_max_allowed_size(0);
        assert_eq!(zero.effective_size_limit(), None);

        let get = SignedUrlRequest::get("bucket", "a.jpg").with_max_allowed_size(1_048_576);
        assert_eq!(get.effective_size_limit(), None);
    }

    #[test]
    fn test_request_deserializes_without_optionals() {
        let json = r#"{"kind":"post","bucket":"dev-test-bucket-674","key":"client_upload/new_img.jpg"}"#;
        let request: SignedUrlRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request, SignedUrlRequest::post("dev-test-bucket-674", "client_upload/new_img.jpg"));
        assert!(request.expire_time.is_none());
        assert!(request.max_allowed_size.is_none());
    }
}
