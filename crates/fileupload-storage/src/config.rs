//! Signer configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{SignerError, SignerResult};

/// Default region when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default max attempts per SDK request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default SDK operation timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for building S3 signer clients.
///
/// Built once at process start and shared read-only (`Arc`) by every issuer.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUploadConfig {
    /// Access key ID
    pub key: String,
    /// Secret access key
    pub secret: String,
    /// Bucket region
    pub region: String,
    /// Max attempts per SDK request
    pub max_retries: u32,
    /// SDK operation timeout
    pub timeout: Duration,
    /// Custom S3 endpoint (MinIO, R2, LocalStack, ...)
    pub endpoint_url: Option<String>,
    /// Address buckets as `<endpoint>/<bucket>` instead of `<bucket>.<endpoint>`
    pub force_path_style: bool,
}

impl Default for FileUploadConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            secret: String::new(),
            region: DEFAULT_REGION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for FileUploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUploadConfig")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("region", &self.region)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl FileUploadConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// `FILEUPLOAD_*` variables win over the standard `AWS_*` ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().find_map(|name| lookup(*name));

        Self {
            key: first(&["FILEUPLOAD_KEY", "AWS_ACCESS_KEY_ID"]).unwrap_or_default(),
            secret: first(&["FILEUPLOAD_SECRET", "AWS_SECRET_ACCESS_KEY"]).unwrap_or_default(),
            region: first(&["FILEUPLOAD_REGION", "AWS_REGION"])
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            max_retries: lookup("FILEUPLOAD_MAX_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            timeout: Duration::from_secs(
                lookup("FILEUPLOAD_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            endpoint_url: lookup("FILEUPLOAD_ENDPOINT_URL").filter(|s| !s.is_empty()),
            force_path_style: lookup("FILEUPLOAD_FORCE_PATH_STYLE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Overlay an override record on top of this config.
    ///
    /// Shallow, key-wise: every key present in `overrides` replaces the
    /// current value, absent keys keep it.
    pub fn merge(mut self, overrides: FileUploadConfigOverride) -> Self {
        if let Some(key) = overrides.key {
            self.key = key;
        }
        if let Some(secret) = overrides.secret {
            self.secret = secret;
        }
        if let Some(region) = overrides.region {
            self.region = region;
        }
        if let Some(max_retries) = overrides.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = Duration::from_secs(timeout);
        }
        if let Some(endpoint_url) = overrides.endpoint_url {
            self.endpoint_url = Some(endpoint_url).filter(|s| !s.is_empty());
        }
        if let Some(force_path_style) = overrides.force_path_style {
            self.force_path_style = force_path_style;
        }
        self
    }

    /// Check that a client can be built from this config.
    pub fn validate(&self) -> SignerResult<()> {
        if self.key.is_empty() {
            return Err(SignerError::config("access key is not set"));
        }
        if self.secret.is_empty() {
            return Err(SignerError::config("secret key is not set"));
        }
        if self.region.is_empty() {
            return Err(SignerError::config("region is not set"));
        }
        if let Some(endpoint) = &self.endpoint_url {
            Url::parse(endpoint)
                .map_err(|e| SignerError::Config(format!("invalid endpoint URL {}: {}", endpoint, e)))?;
        }
        Ok(())
    }
}

/// Custom configuration supplied by the host application.
///
/// Deserializes from the loader's record form:
/// `{"KEY": .., "SECRET": .., "REGION": .., "MAX_RETRIES": .., "TIMEOUT": ..}`
/// where `TIMEOUT` is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FileUploadConfigOverride {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub region: Option<String>,
    pub max_retries: Option<u32>,
    pub timeout: Option<u64>,
    pub endpoint_url: Option<String>,
    pub force_path_style: Option<bool>,
}

impl FileUploadConfigOverride {
    /// Parse an override record from JSON.
    pub fn from_json(json: &str) -> SignerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FileUploadConfig::from_lookup(|_| None);
        assert_eq!(config, FileUploadConfig::default());
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_fileupload_vars_win_over_aws_vars() {
        let config = FileUploadConfig::from_lookup(lookup_from(&[
            ("FILEUPLOAD_KEY", "fu-key"),
            ("AWS_ACCESS_KEY_ID", "aws-key"),
            ("AWS_SECRET_ACCESS_KEY", "aws-secret"),
            ("AWS_REGION", "eu-west-1"),
            ("FILEUPLOAD_MAX_RETRIES", "5"),
            ("FILEUPLOAD_TIMEOUT_SECS", "10"),
            ("FILEUPLOAD_FORCE_PATH_STYLE", "1"),
        ]));

        assert_eq!(config.key, "fu-key");
        assert_eq!(config.secret, "aws-secret");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.force_path_style);
    }

    #[test]
    fn test_merge_is_shallow_last_write_wins() {
        let base = FileUploadConfig {
            key: "default-key".to_string(),
            secret: "default-secret".to_string(),
            ..FileUploadConfig::default()
        };

        let overrides =
            FileUploadConfigOverride::from_json(r#"{"KEY":"custom-key","REGION":"ap-south-1","TIMEOUT":5}"#)
                .unwrap();
        let merged = base.merge(overrides);

        assert_eq!(merged.key, "custom-key");
        assert_eq!(merged.secret, "default-secret");
        assert_eq!(merged.region, "ap-south-1");
        assert_eq!(merged.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(merged.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate() {
        assert!(FileUploadConfig::default().validate().is_err());

        let mut config = FileUploadConfig {
            key: "AKIDEXAMPLE".to_string(),
            secret: "secret".to_string(),
            ..FileUploadConfig::default()
        };
        assert!(config.validate().is_ok());

        config.endpoint_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(SignerError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = FileUploadConfig {
            secret: "top-secret".to_string(),
            ..FileUploadConfig::default()
        };
        assert!(!format!("{:?}", config).contains("top-secret"));
    }
}
