//! S3, SQS and CloudWatch implementations of the capability traits.
//!
//! Handlers are synchronous, so each call bridges onto the Lambda's tokio
//! runtime with `block_in_place`. That requires the multi-threaded runtime
//! the binaries start with `#[tokio::main]`.

use std::future::Future;

use aws_sdk_cloudwatch::types::{MetricDatum, StandardUnit};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;

use crate::adapters::metrics::{Counter, MetricsSink};
use crate::adapters::object_store::{KeyListing, ObjectStore};
use crate::adapters::queue::{MessageQueue, OutboundMessage, RejectedEntry};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

#[derive(Debug, Clone)]
pub struct S3Bucket {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Bucket {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

impl ObjectStore for S3Bucket {
    fn list_keys(&self, start_after: Option<&str>, max_keys: usize) -> Result<KeyListing, String> {
        let max_keys = i32::try_from(max_keys)
            .map_err(|_| format!("max_keys {max_keys} exceeds the S3 request limit"))?;
        let request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys)
            .set_start_after(start_after.map(str::to_string));

        let response = block_on(request.send()).map_err(|error| {
            format!(
                "failed to list s3://{}: {}",
                self.bucket,
                aws_sdk_s3::error::DisplayErrorContext(&error)
            )
        })?;

        Ok(KeyListing {
            keys: response
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect(),
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    fn read_object(&self, key: &str) -> Result<Vec<u8>, String> {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let object_key = key.to_string();

        block_on(async move {
            let response = client
                .get_object()
                .bucket(&bucket)
                .key(&object_key)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to get s3://{bucket}/{object_key}: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })?;
            let body = response.body.collect().await.map_err(|error| {
                format!("failed to read body of s3://{bucket}/{object_key}: {error}")
            })?;
            Ok(body.into_bytes().to_vec())
        })
    }

    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()));

        block_on(request.send()).map(|_| ()).map_err(|error| {
            format!(
                "failed to put s3://{}/{key}: {}",
                self.bucket,
                aws_sdk_s3::error::DisplayErrorContext(&error)
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }
}

impl MessageQueue for SqsQueue {
    fn send_message(&self, body: &str) -> Result<(), String> {
        let request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body);

        block_on(request.send()).map(|_| ()).map_err(|error| {
            format!(
                "failed to send message to {}: {}",
                self.queue_url,
                aws_sdk_sqs::error::DisplayErrorContext(&error)
            )
        })
    }

    fn send_message_batch(&self, entries: &[OutboundMessage]) -> Result<Vec<RejectedEntry>, String> {
        let entries = entries
            .iter()
            .map(|entry| {
                SendMessageBatchRequestEntry::builder()
                    .id(&entry.id)
                    .message_body(&entry.body)
                    .build()
                    .map_err(|error| format!("invalid batch entry '{}': {error}", entry.id))
            })
            .collect::<Result<Vec<_>, String>>()?;

        let request = self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries));

        let response = block_on(request.send()).map_err(|error| {
            format!(
                "failed to send message batch to {}: {}",
                self.queue_url,
                aws_sdk_sqs::error::DisplayErrorContext(&error)
            )
        })?;

        Ok(response
            .failed()
            .iter()
            .map(|entry| RejectedEntry {
                id: entry.id().to_string(),
                reason: format!(
                    "{}: {}",
                    entry.code(),
                    entry.message().unwrap_or("no message")
                ),
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct CloudWatchMetrics {
    client: aws_sdk_cloudwatch::Client,
    namespace: String,
}

impl CloudWatchMetrics {
    pub fn new(client: aws_sdk_cloudwatch::Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

impl MetricsSink for CloudWatchMetrics {
    fn put_counters(&self, counters: &[Counter]) -> Result<(), String> {
        let data = counters
            .iter()
            .map(|counter| {
                MetricDatum::builder()
                    .metric_name(counter.name)
                    .value(counter.value)
                    .unit(StandardUnit::Count)
                    .build()
            })
            .collect();

        let request = self
            .client
            .put_metric_data()
            .namespace(&self.namespace)
            .set_metric_data(Some(data));

        block_on(request.send()).map(|_| ()).map_err(|error| {
            format!(
                "failed to put metric data in {}: {}",
                self.namespace,
                aws_sdk_cloudwatch::error::DisplayErrorContext(&error)
            )
        })
    }
}
