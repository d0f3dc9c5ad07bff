use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NOTHING_TO_TRANSFER_MESSAGE: &str = "No links found in S3 bucket";

/// S3 object-created notification, reduced to the fields the resolver reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationEvent {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3Object {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("notification event has no records")]
    NoRecords,
    #[error("unable to locate manifest bucket and key in event: {0}")]
    Shape(String),
    #[error("manifest key '{0}' is not valid percent-encoded UTF-8")]
    KeyEncoding(String),
}

/// Bucket and decoded key of the manifest named by a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    pub bucket: String,
    pub key: String,
}

impl ManifestLocation {
    /// Resolves the manifest from the first record of a raw notification.
    ///
    /// S3 delivers object keys form-encoded (`+` for space, `%XX` escapes), so
    /// the key is decoded before it is used for a lookup.
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let notification = NotificationEvent::deserialize(event)
            .map_err(|error| EventError::Shape(error.to_string()))?;
        let record = notification
            .records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?;

        let bucket = record.s3.bucket.name;
        if bucket.trim().is_empty() {
            return Err(EventError::Shape("bucket name is empty".to_string()));
        }

        let raw_key = record.s3.object.key;
        if raw_key.trim().is_empty() {
            return Err(EventError::Shape("object key is empty".to_string()));
        }

        let key = decode_object_key(&raw_key)?;
        Ok(Self { bucket, key })
    }
}

pub fn decode_object_key(raw_key: &str) -> Result<String, EventError> {
    let spaced = raw_key.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EventError::KeyEncoding(raw_key.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskExecutionResponse {
    #[serde(rename = "TaskExecutionArn")]
    pub task_execution_arn: String,
}

/// Value returned to the invoking runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResolverResponse {
    Started {
        response: TaskExecutionResponse,
        links_not_found: Vec<String>,
    },
    NothingToTransfer {
        response: String,
    },
}

impl ResolverResponse {
    pub fn started(response: TaskExecutionResponse, links_not_found: Vec<String>) -> Self {
        Self::Started {
            response,
            links_not_found,
        }
    }

    pub fn nothing_to_transfer() -> Self {
        Self::NothingToTransfer {
            response: NOTHING_TO_TRANSFER_MESSAGE.to_string(),
        }
    }

    pub fn links_not_found(&self) -> &[String] {
        match self {
            Self::Started {
                links_not_found, ..
            } => links_not_found,
            Self::NothingToTransfer { .. } => &[],
        }
    }
}
