use chrono::{DateTime, Utc};
use manifest_sync_core::contract::{ManifestLocation, ResolverResponse};
use manifest_sync_core::manifest::{
    build_include_pattern, parse_manifest, partition_keys, pattern_fingerprint,
};
use manifest_sync_core::storage_keys::{
    error_log_object_key, render_error_log, ERROR_LOG_TIMESTAMP_FORMAT,
};
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::object_store::ObjectStore;
use crate::adapters::transfer::TransferTaskStarter;
use crate::config::ResolverConfig;
use crate::error::ResolverError;

const COMPONENT: &str = "manifest_resolver";

pub fn error_log_timestamp(now: DateTime<Utc>) -> String {
    now.format(ERROR_LOG_TIMESTAMP_FORMAT).to_string()
}

/// Resolves one manifest notification into a filtered DataSync execution.
///
/// Keys missing from the target bucket are written to an error log in the
/// manifest's bucket, named by `log_timestamp`. The log is written whether or
/// not a transfer was started, including when every key was found.
pub fn handle_manifest_event(
    event: &Value,
    config: &ResolverConfig,
    log_timestamp: &str,
    store: &impl ObjectStore,
    transfer: &impl TransferTaskStarter,
) -> Result<ResolverResponse, ResolverError> {
    resolve_manifest(event, config, log_timestamp, store, transfer).inspect_err(|failure| {
        error!(
            component = COMPONENT,
            event = "resolver_failed",
            kind = failure.kind(),
            error = %failure,
            "manifest resolution failed"
        );
    })
}

fn resolve_manifest(
    event: &Value,
    config: &ResolverConfig,
    log_timestamp: &str,
    store: &impl ObjectStore,
    transfer: &impl TransferTaskStarter,
) -> Result<ResolverResponse, ResolverError> {
    let manifest = ManifestLocation::from_event(event)?;
    info!(
        component = COMPONENT,
        event = "manifest_received",
        bucket = %manifest.bucket,
        key = %manifest.key,
        "manifest received"
    );

    let body = store
        .get_object(&manifest.bucket, &manifest.key)
        .map_err(|message| ResolverError::ManifestFetch {
            bucket: manifest.bucket.clone(),
            key: manifest.key.clone(),
            message,
        })?;
    let candidates = parse_manifest(&body).map_err(ResolverError::ManifestDecode)?;
    info!(
        component = COMPONENT,
        event = "manifest_decoded",
        candidate_count = candidates.len(),
        bytes = body.len(),
        "manifest decoded"
    );

    let partition = partition_keys(candidates, |key| -> Result<bool, String> {
        let present = store.has_objects_with_prefix(&config.target_bucket, key)?;
        if !present {
            info!(
                component = COMPONENT,
                event = "key_not_found",
                key,
                bucket = %config.target_bucket,
                "key not found in target bucket"
            );
        }
        Ok(present)
    })
    .map_err(|message| ResolverError::TargetLookup {
        bucket: config.target_bucket.clone(),
        message,
    })?;
    info!(
        component = COMPONENT,
        event = "keys_partitioned",
        found_count = partition.found.len(),
        not_found_count = partition.not_found.len(),
        "manifest keys partitioned"
    );

    let response = if partition.found.is_empty() {
        info!(
            component = COMPONENT,
            event = "transfer_skipped",
            bucket = %config.target_bucket,
            "no manifest keys found in target bucket"
        );
        ResolverResponse::nothing_to_transfer()
    } else {
        let include_pattern =
            build_include_pattern(&partition.found).map_err(ResolverError::FilterPattern)?;
        let execution = transfer
            .start_task_execution(&config.task_arn, &include_pattern)
            .map_err(|message| ResolverError::TransferStart {
                task_arn: config.task_arn.clone(),
                message,
            })?;
        info!(
            component = COMPONENT,
            event = "transfer_started",
            task_arn = %config.task_arn,
            task_execution_arn = %execution.task_execution_arn,
            found_count = partition.found.len(),
            filter_fingerprint = %pattern_fingerprint(&include_pattern),
            "transfer task execution started"
        );
        ResolverResponse::started(execution, partition.not_found.clone())
    };

    let log_key = error_log_object_key(&config.error_log_prefix, log_timestamp);
    let log_body = render_error_log(&config.target_bucket, &partition.not_found);
    store
        .put_object(&manifest.bucket, &log_key, log_body.as_bytes())
        .map_err(|message| ResolverError::LogUpload {
            bucket: manifest.bucket.clone(),
            key: log_key.clone(),
            message,
        })?;
    info!(
        component = COMPONENT,
        event = "error_log_written",
        bucket = %manifest.bucket,
        key = %log_key,
        not_found_count = partition.not_found.len(),
        "error log written"
    );

    Ok(response)
}
