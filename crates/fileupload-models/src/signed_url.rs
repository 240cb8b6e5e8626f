//! Signed URL payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Presigned POST upload: target URL plus the form fields the browser must send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpload {
    /// Form action URL.
    pub url: String,
    /// Form fields (policy, signature, key, ...).
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl PostUpload {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Successful signed URL payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignedUrl {
    /// Browser-form POST upload.
    Post(PostUpload),
    /// Plain signed URL (PUT upload or GET download).
    Url(String),
}

impl SignedUrl {
    /// The signed URL regardless of kind.
    pub fn url(&self) -> &str {
        match self {
            SignedUrl::Post(post) => &post.url,
            SignedUrl::Url(url) => url,
        }
    }

    /// Form fields, present only for POST uploads.
    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            SignedUrl::Post(post) => Some(&post.fields),
            SignedUrl::Url(_) => None,
        }
    }
}

impl From<PostUpload> for SignedUrl {
    fn from(post: PostUpload) -> Self {
        SignedUrl::Post(post)
    }
}

impl From<String> for SignedUrl {
    fn from(url: String) -> Self {
        SignedUrl::Url(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_upload_serializes_url_and_fields() {
        let post = PostUpload::new("https://example/bucket").with_field("key", "client_upload/new_img.jpg");
        let json = serde_json::to_value(SignedUrl::from(post)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://example/bucket",
                "fields": { "key": "client_upload/new_img.jpg" }
            })
        );
    }

    #[test]
    fn test_plain_url_accessors() {
        let signed = SignedUrl::from("https://example/bucket/a.jpg?X-Amz-Signature=abc".to_string());
        assert_eq!(signed.url(), "https://example/bucket/a.jpg?X-Amz-Signature=abc");
        assert!(signed.fields().is_none());
    }
}
