//! S3 implementation of the Signer Service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use chrono::Utc;
use fileupload_models::PostUpload;
use tracing::{debug, info};

use crate::config::FileUploadConfig;
use crate::error::{SignerError, SignerResult};
use crate::post_policy::{self, PolicySigningKey};
use crate::signer::{
    ClientFactory, ObjectCommand, PostPolicyParams, PresignParams, SignerService, S3_API_VERSION,
};

/// Default lifetime of PUT/GET URLs when the caller gives none (15 minutes).
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 900;

/// Signer Service backed by `aws-sdk-s3`.
///
/// PUT/GET URLs are presigned by the SDK. POST forms are signed locally with
/// the same credentials (see [`post_policy`]).
#[derive(Clone)]
pub struct S3Signer {
    client: Client,
    access_key: String,
    secret_key: String,
    region: String,
    endpoint_url: Option<String>,
    force_path_style: bool,
}

impl std::fmt::Debug for S3Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Signer")
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3Signer {
    /// Create a new S3 signer from configuration.
    pub fn new(config: &FileUploadConfig) -> SignerResult<Self> {
        config.validate()?;

        let credentials = Credentials::new(&config.key, &config.secret, None, None, "fileupload");

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_retries.max(1)))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            )
            .force_path_style(config.force_path_style);

        if let Some(endpoint_url) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        let client = Client::from_conf(builder.build());

        Ok(Self {
            client,
            access_key: config.key.clone(),
            secret_key: config.secret.clone(),
            region: config.region.clone(),
            endpoint_url: config.endpoint_url.clone(),
            force_path_style: config.force_path_style,
        })
    }

    /// S3 API version this client speaks.
    pub fn api_version(&self) -> &'static str {
        S3_API_VERSION
    }

    fn presigning_config(params: &PresignParams) -> SignerResult<PresigningConfig> {
        let expires_in = Duration::from_secs(params.expires_in.unwrap_or(DEFAULT_URL_EXPIRY_SECS));
        PresigningConfig::expires_in(expires_in).map_err(|e| SignerError::presign(e.to_string()))
    }
}

fn validate_command(command: &ObjectCommand) -> SignerResult<()> {
    if command.bucket.is_empty() {
        return Err(SignerError::invalid_request("bucket is empty"));
    }
    if command.key.is_empty() {
        return Err(SignerError::invalid_request("key is empty"));
    }
    Ok(())
}

#[async_trait]
impl SignerService for S3Signer {
    async fn create_presigned_post(&self, params: &PostPolicyParams) -> SignerResult<PostUpload> {
        debug!(bucket = %params.bucket, key = %params.key, "Signing POST policy");

        let url = post_policy::post_url(
            &params.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            self.force_path_style,
        )?;
        let signing = PolicySigningKey {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region,
        };

        post_policy::sign_post_policy(params, url, &signing, Utc::now())
    }

    async fn presign_put_object(
        &self,
        command: &ObjectCommand,
        params: &PresignParams,
    ) -> SignerResult<String> {
        validate_command(command)?;
        debug!(bucket = %command.bucket, key = %command.key, "Presigning PUT");

        let presigned = self
            .client
            .put_object()
            .bucket(&command.bucket)
            .key(&command.key)
            .presigned(Self::presigning_config(params)?)
            .await
            .map_err(|e| SignerError::sdk(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn presign_get_object(
        &self,
        command: &ObjectCommand,
        params: &PresignParams,
    ) -> SignerResult<String> {
        validate_command(command)?;
        debug!(bucket = %command.bucket, key = %command.key, "Presigning GET");

        let presigned = self
            .client
            .get_object()
            .bucket(&command.bucket)
            .key(&command.key)
            .presigned(Self::presigning_config(params)?)
            .await
            .map_err(|e| SignerError::sdk(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

/// Production [`ClientFactory`] building [`S3Signer`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3ClientFactory;

impl ClientFactory for S3ClientFactory {
    fn build(&self, config: &FileUploadConfig) -> SignerResult<Arc<dyn SignerService>> {
        let signer = S3Signer::new(config)?;
        info!(
            region = %config.region,
            api_version = signer.api_version(),
            max_retries = config.max_retries,
            "Built S3 signer client"
        );
        Ok(Arc::new(signer))
    }
}
