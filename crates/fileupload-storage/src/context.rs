//! Per-request instance context.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::error::SignerResult;
use crate::signer::SignerService;

/// Storage client handles attached to a context.
#[derive(Default)]
pub struct StorageCapabilities {
    s3: OnceCell<Arc<dyn SignerService>>,
}

impl StorageCapabilities {
    fn with_s3(signer: Arc<dyn SignerService>) -> Self {
        Self {
            s3: OnceCell::from(signer),
        }
    }
}

/// Caller-owned context for one logical request or session.
///
/// The issuer memoizes its S3 client handle here. The handle is built at most
/// once per context, including under concurrent first use, and is never
/// shared with other contexts.
pub struct InstanceContext {
    request_id: Uuid,
    started_at: Instant,
    storage: StorageCapabilities,
}

impl InstanceContext {
    /// Create an empty context. The S3 client is built on first use.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            started_at: Instant::now(),
            storage: StorageCapabilities::default(),
        }
    }

    /// Create a context with an already-built S3 client handle.
    pub fn with_signer(signer: Arc<dyn SignerService>) -> Self {
        Self {
            storage: StorageCapabilities::with_s3(signer),
            ..Self::new()
        }
    }

    /// Unique ID for log correlation.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// When the context was created. Timing audits are relative to this.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Check if an S3 client handle is attached.
    pub fn has_s3_client(&self) -> bool {
        self.storage.s3.initialized()
    }

    /// The attached S3 client handle, if any.
    pub fn s3_client(&self) -> Option<&Arc<dyn SignerService>> {
        self.storage.s3.get()
    }

    /// Return the S3 client handle, running `init` if none is attached yet.
    ///
    /// Concurrent callers wait for the first `init` to finish. A failed `init`
    /// leaves the slot empty so the next call tries again.
    pub(crate) async fn s3_client_or_try_init<F, Fut>(
        &self,
        init: F,
    ) -> SignerResult<&Arc<dyn SignerService>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SignerResult<Arc<dyn SignerService>>>,
    {
        self.storage.s3.get_or_try_init(init).await
    }
}

impl Default for InstanceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceContext")
            .field("request_id", &self.request_id)
            .field("started_at", &self.started_at)
            .field("has_s3_client", &self.has_s3_client())
            .finish()
    }
}
