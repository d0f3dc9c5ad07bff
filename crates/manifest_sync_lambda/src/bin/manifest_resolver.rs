use aws_sdk_datasync::types::{FilterRule, FilterType};
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use manifest_sync_core::contract::{ResolverResponse, TaskExecutionResponse};
use manifest_sync_lambda::adapters::object_store::ObjectStore;
use manifest_sync_lambda::adapters::transfer::TransferTaskStarter;
use manifest_sync_lambda::config::ResolverConfig;
use manifest_sync_lambda::handlers::resolver::{error_log_timestamp, handle_manifest_event};
use manifest_sync_lambda::logging::init_tracing;
use serde_json::Value;
use tracing::info;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to read object from s3: {error}"))?;
                output
                    .body
                    .collect()
                    .await
                    .map(|data| data.into_bytes().to_vec())
                    .map_err(|error| format!("failed to read s3 object body: {error}"))
            })
        })
    }

    fn has_objects_with_prefix(&self, bucket: &str, prefix: &str) -> Result<bool, String> {
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(prefix)
                    .max_keys(1)
                    .send()
                    .await
                    .map(|output| !output.contents().is_empty())
                    .map_err(|error| format!("failed to list objects in s3: {error}"))
            })
        })
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type("text/plain; charset=utf-8")
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

struct DataSyncTransferStarter {
    datasync_client: aws_sdk_datasync::Client,
}

impl TransferTaskStarter for DataSyncTransferStarter {
    fn start_task_execution(
        &self,
        task_arn: &str,
        include_pattern: &str,
    ) -> Result<TaskExecutionResponse, String> {
        let task_arn = task_arn.to_string();
        let include_filter = FilterRule::builder()
            .filter_type(FilterType::SimplePattern)
            .value(include_pattern)
            .build();
        let client = self.datasync_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .start_task_execution()
                    .task_arn(task_arn)
                    .includes(include_filter)
                    .send()
                    .await
                    .map_err(|error| format!("failed to start datasync task execution: {error}"))?;
                output
                    .task_execution_arn()
                    .map(|arn| TaskExecutionResponse {
                        task_execution_arn: arn.to_string(),
                    })
                    .ok_or_else(|| {
                        "datasync start_task_execution returned no task execution arn".to_string()
                    })
            })
        })
    }
}

struct RuntimeDependencies {
    config: ResolverConfig,
    store: S3ObjectStore,
    transfer: DataSyncTransferStarter,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ResolverResponse, Error> {
    let log_timestamp = error_log_timestamp(Utc::now());
    handle_manifest_event(
        &event.payload,
        &deps.config,
        &log_timestamp,
        &deps.store,
        &deps.transfer,
    )
    .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = ResolverConfig::from_env()?;
    info!(
        component = "manifest_resolver",
        event = "cold_start",
        task_arn = %config.task_arn,
        target_bucket = %config.target_bucket,
        error_log_prefix = %config.error_log_prefix,
        "resolver configured"
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        config,
        store: S3ObjectStore {
            s3_client: aws_sdk_s3::Client::new(&aws_config),
        },
        transfer: DataSyncTransferStarter {
            datasync_client: aws_sdk_datasync::Client::new(&aws_config),
        },
    };

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &deps)
    }))
    .await
}
