use manifest_sync_core::contract::EventError;
use manifest_sync_core::manifest::ValidationError;

/// Failure of one resolver invocation, named by the step that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    #[error("received invalid event: {0}")]
    MalformedEvent(#[from] EventError),
    #[error("failed to fetch manifest s3://{bucket}/{key}: {message}")]
    ManifestFetch {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed to decode manifest: {0}")]
    ManifestDecode(ValidationError),
    #[error("failed to look up keys in bucket {bucket}: {message}")]
    TargetLookup { bucket: String, message: String },
    #[error("failed to build include filter: {0}")]
    FilterPattern(ValidationError),
    #[error("failed to start transfer task {task_arn}: {message}")]
    TransferStart { task_arn: String, message: String },
    #[error("failed to upload error log s3://{bucket}/{key}: {message}")]
    LogUpload {
        bucket: String,
        key: String,
        message: String,
    },
}

impl ResolverError {
    /// Stable short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "malformed_event",
            Self::ManifestFetch { .. } => "manifest_fetch",
            Self::ManifestDecode(_) => "manifest_decode",
            Self::TargetLookup { .. } => "target_lookup",
            Self::FilterPattern(_) => "filter_pattern",
            Self::TransferStart { .. } => "transfer_start",
            Self::LogUpload { .. } => "log_upload",
        }
    }
}
