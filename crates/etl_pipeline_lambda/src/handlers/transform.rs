use std::time::Instant;

use etl_pipeline_core::records::transform_ndjson;
use tracing::{info, warn};

use crate::adapters::metrics::{Counter, MetricsSink};
use crate::adapters::object_store::ObjectStore;
use crate::error::EtlError;
use crate::handlers::queue_event::QueueRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutcome {
    pub objects_processed: usize,
    pub lines_processed: usize,
}

/// Flattens one source object into the destination under the same key.
///
/// The destination object is replaced in a single write, so running this
/// twice for unchanged source content leaves identical bytes behind.
pub fn transform_object(
    key: &str,
    source: &impl ObjectStore,
    destination: &impl ObjectStore,
) -> Result<usize, EtlError> {
    let started_at = Instant::now();

    let body = source.read_object(key).map_err(|message| EtlError::Read {
        key: key.to_string(),
        message,
    })?;
    let transformed = transform_ndjson(&body).map_err(|source| EtlError::Transform {
        key: key.to_string(),
        source,
    })?;
    destination
        .write_object(key, &transformed.body)
        .map_err(|message| EtlError::Write {
            key: key.to_string(),
            message,
        })?;

    info!(
        key,
        lines = transformed.lines_processed,
        source_bytes = body.len(),
        destination_bytes = transformed.body.len(),
        sha256 = %transformed.sha256_hex(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "object_transformed"
    );
    Ok(transformed.lines_processed)
}

/// Transforms every key in the batch, stopping at the first failure.
///
/// A failure fails the whole invocation so the queue redelivers the batch;
/// keys already written are rewritten identically on redelivery. Counter
/// emission is best effort and never fails the batch.
pub fn handle_transform(
    records: &[QueueRecord],
    source: &impl ObjectStore,
    destination: &impl ObjectStore,
    metrics: &impl MetricsSink,
) -> Result<TransformOutcome, EtlError> {
    let mut outcome = TransformOutcome::default();

    for record in records {
        let key = record.body.as_str();
        if key.is_empty() {
            return Err(EtlError::MalformedEvent(format!(
                "message {} carries an empty object key",
                record.message_id
            )));
        }

        let lines_processed = transform_object(key, source, destination)?;
        outcome.objects_processed += 1;
        outcome.lines_processed += lines_processed;

        if let Err(error) = metrics.put_counters(&Counter::for_processed_object(lines_processed)) {
            warn!(key, %error, "counter_emission_failed");
        }
    }

    Ok(outcome)
}
