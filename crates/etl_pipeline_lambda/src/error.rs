use etl_pipeline_core::contract::ContractError;
use etl_pipeline_core::listing::ListingError;
use etl_pipeline_core::records::RecordError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure of one stage invocation.
///
/// None of these are retried in-process; returning one fails the invocation
/// and leaves redelivery to the orchestrator or the queue.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invocation state is malformed: {0}")]
    InvalidState(#[source] serde_json::Error),

    #[error("malformed queue event: {0}")]
    MalformedEvent(String),

    #[error("failed to list source objects: {message}")]
    Listing { message: String },

    #[error("source listing is not in key order: {0}")]
    KeyOrder(#[from] ListingError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("failed to enqueue page ending at '{last_key}': {message}")]
    PageSend { last_key: String, message: String },

    #[error("{failed_pages} page(s) and {failed_batches} object batch(es) were not fully enqueued: {details}")]
    SplitIncomplete {
        failed_pages: usize,
        failed_batches: usize,
        details: String,
    },

    #[error("failed to read source object '{key}': {message}")]
    Read { key: String, message: String },

    #[error("failed to transform object '{key}': {source}")]
    Transform {
        key: String,
        #[source]
        source: RecordError,
    },

    #[error("failed to write destination object '{key}': {message}")]
    Write { key: String, message: String },

    #[error("listing did not complete within {invocations} invocations")]
    ListingStalled { invocations: usize },
}
