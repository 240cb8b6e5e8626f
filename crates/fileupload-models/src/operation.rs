//! Signed URL operation kinds.

use serde::{Deserialize, Serialize};

/// Kind of access a signed URL grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Browser-form upload (URL + form fields).
    Post,
    /// Direct upload with HTTP PUT.
    Put,
    /// Download with HTTP GET.
    Get,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Post => "post",
            OperationKind::Put => "put",
            OperationKind::Get => "get",
        }
    }

    /// Human-readable name used in audit and error logs.
    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Post => "Upload File (POST)",
            OperationKind::Put => "Upload File (PUT)",
            OperationKind::Get => "Get File URL",
        }
    }

    /// Check if this kind accepts an upload size limit.
    pub fn supports_size_limit(&self) -> bool {
        matches!(self, OperationKind::Post)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
