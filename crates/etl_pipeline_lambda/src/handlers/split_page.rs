use std::collections::HashMap;

use etl_pipeline_core::batching::compute_batch_plan;
use etl_pipeline_core::contract::{decode_page, SEND_BATCH_LIMIT};
use tracing::{debug, info, warn};

use crate::adapters::queue::{MessageQueue, OutboundMessage};
use crate::error::EtlError;
use crate::handlers::queue_event::QueueRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitFailure {
    MalformedPage {
        message_id: String,
        reason: String,
    },
    Batch {
        message_id: String,
        batch_id: usize,
        keys: Vec<String>,
        reason: String,
    },
}

impl SplitFailure {
    fn describe(&self) -> String {
        match self {
            Self::MalformedPage { message_id, reason } => {
                format!("page {message_id}: {reason}")
            }
            Self::Batch {
                message_id,
                batch_id,
                keys,
                reason,
            } => format!(
                "page {message_id} batch {batch_id} ({} keys): {reason}",
                keys.len()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub pages: usize,
    pub keys_enqueued: usize,
    pub batches_sent: usize,
    pub failures: Vec<SplitFailure>,
}

/// Fans every page out as per-key messages and fails if anything was lost.
///
/// All pages and batches are attempted before the error is returned, so one
/// bad batch never stops the others from being enqueued.
pub fn handle_split_pages(
    records: &[QueueRecord],
    objects_queue: &impl MessageQueue,
) -> Result<SplitOutcome, EtlError> {
    let outcome = split_page_records(records, objects_queue);
    if outcome.failures.is_empty() {
        return Ok(outcome);
    }

    let failed_pages = outcome
        .failures
        .iter()
        .filter(|failure| matches!(failure, SplitFailure::MalformedPage { .. }))
        .count();
    Err(EtlError::SplitIncomplete {
        failed_pages,
        failed_batches: outcome.failures.len() - failed_pages,
        details: outcome
            .failures
            .iter()
            .map(SplitFailure::describe)
            .collect::<Vec<_>>()
            .join("; "),
    })
}

/// Splits each page into batches of [`SEND_BATCH_LIMIT`] and sends them,
/// collecting failures instead of stopping at the first one.
pub fn split_page_records(records: &[QueueRecord], objects_queue: &impl MessageQueue) -> SplitOutcome {
    let mut outcome = SplitOutcome::default();
    debug!(pages = records.len(), "split_started");

    for record in records {
        let keys = match decode_page(&record.body) {
            Ok(keys) => keys,
            Err(error) => {
                warn!(message_id = %record.message_id, %error, "page_rejected");
                outcome.failures.push(SplitFailure::MalformedPage {
                    message_id: record.message_id.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        outcome.pages += 1;
        split_page(&record.message_id, &keys, objects_queue, &mut outcome);
    }

    info!(
        pages = outcome.pages,
        keys_enqueued = outcome.keys_enqueued,
        batches_sent = outcome.batches_sent,
        failures = outcome.failures.len(),
        "pages_split"
    );
    outcome
}

fn split_page(
    message_id: &str,
    keys: &[String],
    objects_queue: &impl MessageQueue,
    outcome: &mut SplitOutcome,
) {
    let plan = match compute_batch_plan(keys.len(), SEND_BATCH_LIMIT) {
        Ok(plan) => plan,
        Err(error) => {
            outcome.failures.push(SplitFailure::MalformedPage {
                message_id: message_id.to_string(),
                reason: error.to_string(),
            });
            return;
        }
    };

    for assignment in plan {
        let batch_keys = &keys[assignment.range()];
        let entries: Vec<OutboundMessage> = batch_keys
            .iter()
            .map(|key| OutboundMessage::with_generated_id(key.as_str()))
            .collect();

        match objects_queue.send_message_batch(&entries) {
            Ok(rejected) if rejected.is_empty() => {
                outcome.batches_sent += 1;
                outcome.keys_enqueued += entries.len();
            }
            Ok(rejected) => {
                let key_by_id: HashMap<&str, &str> = entries
                    .iter()
                    .map(|entry| (entry.id.as_str(), entry.body.as_str()))
                    .collect();
                let lost: Vec<String> = rejected
                    .iter()
                    .filter_map(|entry| key_by_id.get(entry.id.as_str()))
                    .map(|key| key.to_string())
                    .collect();
                let reason = rejected
                    .iter()
                    .map(|entry| entry.reason.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                warn!(
                    message_id,
                    batch_id = assignment.batch_id,
                    rejected = lost.len(),
                    %reason,
                    "batch_partially_rejected"
                );
                outcome.batches_sent += 1;
                outcome.keys_enqueued += entries.len() - lost.len();
                outcome.failures.push(SplitFailure::Batch {
                    message_id: message_id.to_string(),
                    batch_id: assignment.batch_id,
                    keys: lost,
                    reason,
                });
            }
            Err(reason) => {
                warn!(message_id, batch_id = assignment.batch_id, %reason, "batch_send_failed");
                outcome.failures.push(SplitFailure::Batch {
                    message_id: message_id.to_string(),
                    batch_id: assignment.batch_id,
                    keys: batch_keys.to_vec(),
                    reason,
                });
            }
        }
    }
}
