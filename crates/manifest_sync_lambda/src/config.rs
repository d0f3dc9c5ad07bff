use manifest_sync_core::storage_keys::DEFAULT_ERROR_LOG_PREFIX;

pub const TASK_ARN_VAR: &str = "DATASYNC_TASK_ARN";
pub const TARGET_BUCKET_VAR: &str = "BAM_FILES_BUCKET";
pub const ERROR_LOG_PREFIX_VAR: &str = "ERROR_LOG_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

/// Settings resolved once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub task_arn: String,
    pub target_bucket: String,
    pub error_log_prefix: String,
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            task_arn: required(TASK_ARN_VAR)?,
            target_bucket: required(TARGET_BUCKET_VAR)?,
            error_log_prefix: lookup(ERROR_LOG_PREFIX_VAR)
                .map(|value| value.trim().trim_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_ERROR_LOG_PREFIX.to_string()),
        })
    }
}
