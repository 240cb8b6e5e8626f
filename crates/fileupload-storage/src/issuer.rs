//! Signed URL issuer.
//!
//! Turns logical upload/download requests into signed URLs through the
//! Signer Service attached to an [`InstanceContext`]. Every failure is logged
//! for research and collapsed into [`SignFailure`]; no SDK detail reaches the
//! caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use fileupload_models::{OperationKind, PostUpload, SignedUrl, SignedUrlRequest};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FileUploadConfig;
use crate::context::InstanceContext;
use crate::diagnostics::{AuditPhase, Diagnostics, TracingDiagnostics};
use crate::error::{IssueResult, SignFailure, SignerError, SignerResult};
use crate::metrics::{self as sign_metrics, status};
use crate::s3::S3ClientFactory;
use crate::signer::{
    ClientFactory, ObjectCommand, PolicyCondition, PostPolicyParams, PresignParams, SignerService,
};

/// Audit label for client construction.
const CLIENT_INIT_OPERATION: &str = "S3 Server Connection (fileupload)";

/// Issues signed URLs for object uploads and downloads.
#[derive(Clone)]
pub struct SignedUrlIssuer {
    config: Arc<FileUploadConfig>,
    factory: Arc<dyn ClientFactory>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SignedUrlIssuer {
    /// Create an issuer with explicit collaborators.
    pub fn new(
        config: Arc<FileUploadConfig>,
        factory: Arc<dyn ClientFactory>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            config,
            factory,
            diagnostics,
        }
    }

    /// Create an issuer backed by S3 and `tracing` diagnostics.
    pub fn from_config(config: FileUploadConfig) -> Self {
        Self::new(
            Arc::new(config),
            Arc::new(S3ClientFactory),
            Arc::new(TracingDiagnostics),
        )
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::from_config(FileUploadConfig::from_env())
    }

    pub fn config(&self) -> &FileUploadConfig {
        &self.config
    }

    /// Signed URL + form fields for a browser-form POST upload.
    ///
    /// # Arguments
    /// * `bucket` - Bucket the file is uploaded to.
    /// * `key` - Full object key.
    /// * `expire_time` - URL lifetime in seconds. `None`/`0` uses the signer default.
    /// * `max_allowed_size` - Max upload size in bytes. `None`/`0` means no limit.
    pub async fn issue_post_upload(
        &self,
        ctx: &InstanceContext,
        bucket: &str,
        key: &str,
        expire_time: Option<u64>,
        max_allowed_size: Option<u64>,
    ) -> IssueResult<PostUpload> {
        let request = SignedUrlRequest {
            kind: OperationKind::Post,
            bucket: bucket.to_string(),
            key: key.to_string(),
            expire_time,
            max_allowed_size,
        };
        self.post_upload(ctx, &request).await
    }

    /// Signed URL for uploading an object with HTTP PUT.
    pub async fn issue_put_upload(
        &self,
        ctx: &InstanceContext,
        bucket: &str,
        key: &str,
        expire_time: Option<u64>,
    ) -> IssueResult<String> {
        let request = SignedUrlRequest {
            expire_time,
            ..SignedUrlRequest::put(bucket, key)
        };
        self.object_url(ctx, &request).await
    }

    /// Signed URL for downloading an object with HTTP GET.
    pub async fn issue_get_download(
        &self,
        ctx: &InstanceContext,
        bucket: &str,
        key: &str,
        expire_time: Option<u64>,
    ) -> IssueResult<String> {
        let request = SignedUrlRequest {
            expire_time,
            ..SignedUrlRequest::get(bucket, key)
        };
        self.object_url(ctx, &request).await
    }

    /// Issue a signed URL for any request kind.
    pub async fn issue(
        &self,
        ctx: &InstanceContext,
        request: &SignedUrlRequest,
    ) -> IssueResult<SignedUrl> {
        match request.kind {
            OperationKind::Post => self.post_upload(ctx, request).await.map(SignedUrl::Post),
            OperationKind::Put | OperationKind::Get => {
                self.object_url(ctx, request).await.map(SignedUrl::Url)
            }
        }
    }

    async fn post_upload(
        &self,
        ctx: &InstanceContext,
        request: &SignedUrlRequest,
    ) -> IssueResult<PostUpload> {
        let params = post_policy_params(request);
        let described = to_json(&params);

        self.execute(ctx, request.kind, described, |signer| async move {
            signer.create_presigned_post(&params).await
        })
        .await
    }

    async fn object_url(
        &self,
        ctx: &InstanceContext,
        request: &SignedUrlRequest,
    ) -> IssueResult<String> {
        let command = ObjectCommand::new(&request.bucket, &request.key);
        let params = PresignParams {
            expires_in: request.effective_expire_time(),
        };
        let described = format!("{}{}", to_json(&command), to_json(&params));
        let kind = request.kind;

        self.execute(ctx, kind, described, |signer| async move {
            match kind {
                OperationKind::Get => signer.presign_get_object(&command, &params).await,
                _ => signer.presign_put_object(&command, &params).await,
            }
        })
        .await
    }

    /// Run one Signer Service call with audits, metrics and failure absorption.
    async fn execute<T, F, Fut>(
        &self,
        ctx: &InstanceContext,
        kind: OperationKind,
        described: String,
        call: F,
    ) -> IssueResult<T>
    where
        F: FnOnce(Arc<dyn SignerService>) -> Fut,
        Fut: Future<Output = SignerResult<T>>,
    {
        let started = Instant::now();
        let operation = format!("S3 Signed URL - {}", kind.description());

        let signer = match ctx.s3_client_or_try_init(|| self.build_client(ctx)).await {
            Ok(signer) => Arc::clone(signer),
            Err(e) => return Err(self.absorb(kind, &e, &described, started)),
        };

        debug!(request_id = %ctx.request_id(), operation = %operation, "Issuing signed URL");
        self.diagnostics
            .timing_audit_log(AuditPhase::Start, &operation, ctx.started_at());

        match call(signer).await {
            Ok(value) => {
                self.diagnostics
                    .timing_audit_log(AuditPhase::End, &operation, ctx.started_at());
                sign_metrics::record_request(kind.as_str(), status::OK, elapsed_ms(started));
                Ok(value)
            }
            Err(e) => Err(self.absorb(kind, &e, &described, started)),
        }
    }

    async fn build_client(&self, ctx: &InstanceContext) -> SignerResult<Arc<dyn SignerService>> {
        self.diagnostics
            .timing_audit_log(AuditPhase::InitStart, CLIENT_INIT_OPERATION, ctx.started_at());

        let client = self.factory.build(&self.config)?;
        sign_metrics::record_client_init();
        self.diagnostics.log(&format!(
            "S3 client attached to context {} (region {})",
            ctx.request_id(),
            self.config.region
        ));

        self.diagnostics
            .timing_audit_log(AuditPhase::InitEnd, CLIENT_INIT_OPERATION, ctx.started_at());
        Ok(client)
    }

    fn absorb(
        &self,
        kind: OperationKind,
        error: &SignerError,
        described: &str,
        started: Instant,
    ) -> SignFailure {
        warn!(operation = kind.as_str(), "Signed URL request failed");

        let context = format!(
            "Cause: S3 Signed URL\ncmd: {}\nparams: {}",
            kind.description(),
            described
        );
        self.diagnostics.log_error_for_research(error, &context);
        sign_metrics::record_request(kind.as_str(), status::ERROR, elapsed_ms(started));

        SignFailure
    }
}

impl std::fmt::Debug for SignedUrlIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Outbound POST parameters for a request.
fn post_policy_params(request: &SignedUrlRequest) -> PostPolicyParams {
    let mut params = PostPolicyParams::new(&request.bucket, &request.key);

    if let Some(max_allowed_size) = request.effective_size_limit() {
        params
            .conditions
            .push(PolicyCondition::content_length_range(0, max_allowed_size));
    }
    params.expires = request.effective_expire_time();

    params
}

/// Outbound parameters rendered for research logs.
fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
