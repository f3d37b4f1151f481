use std::time::{Duration, Instant};

use etl_pipeline_core::contract::{encode_page, ListingState, PAGE_SIZE};
use etl_pipeline_core::listing::{ListingPhase, Page, PageCursor};
use tracing::{debug, info};

use crate::adapters::deadline::TimeBudget;
use crate::adapters::object_store::ObjectStore;
use crate::adapters::queue::MessageQueue;
use crate::error::EtlError;

/// What one listing invocation did and the checkpoint to hand back.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPagesOutcome {
    pub state: ListingState,
    pub phase: ListingPhase,
    pub pages_sent: usize,
    pub keys_sent: usize,
}

/// Walks the source key space from the bookmark, queueing one message per
/// page of [`PAGE_SIZE`] keys.
///
/// Before each key the remaining time is compared against `safety_margin`;
/// once it drops below, the invocation stops and returns a checkpoint at the
/// last queued page. Reaching the end of the key space flushes the remaining
/// keys as a final short page and marks the run complete.
pub fn handle_list_pages(
    state: ListingState,
    source: &impl ObjectStore,
    pages_queue: &impl MessageQueue,
    budget: &impl TimeBudget,
    safety_margin: Duration,
) -> Result<ListPagesOutcome, EtlError> {
    let started_at = Instant::now();
    let remaining_at_start = budget.remaining();
    info!(
        bookmark = state.bookmark.as_deref().unwrap_or(""),
        remaining_ms = remaining_at_start.as_millis() as u64,
        "listing_started"
    );

    let mut cursor = PageCursor::resume(state);
    let mut pages_sent = 0usize;
    let mut keys_sent = 0usize;

    loop {
        let listing = source
            .list_keys(cursor.scan_position(), PAGE_SIZE)
            .map_err(|message| EtlError::Listing { message })?;
        let exhausted = !listing.is_truncated || listing.keys.is_empty();

        for key in listing.keys {
            if budget.remaining() < safety_margin {
                let buffered = cursor.buffered();
                let state = cursor.suspend();
                info!(
                    bookmark = state.bookmark.as_deref().unwrap_or(""),
                    pages_sent,
                    keys_sent,
                    discarded_partial_keys = buffered,
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    "listing_yielded"
                );
                return Ok(ListPagesOutcome {
                    state,
                    phase: ListingPhase::Yielded,
                    pages_sent,
                    keys_sent,
                });
            }

            if let Some(page) = cursor.accept(key)? {
                send_page(pages_queue, &page)?;
                cursor.commit(&page);
                pages_sent += 1;
                keys_sent += page.len();
            }
        }

        if exhausted {
            break;
        }
    }

    let completion = cursor.finish();
    if let Some(page) = &completion.final_page {
        send_page(pages_queue, page)?;
        pages_sent += 1;
        keys_sent += page.len();
    }

    info!(
        bookmark = completion.state.bookmark.as_deref().unwrap_or(""),
        pages_sent,
        keys_sent,
        duration_ms = started_at.elapsed().as_millis() as u64,
        "listing_completed"
    );

    Ok(ListPagesOutcome {
        state: completion.state,
        phase: ListingPhase::Done,
        pages_sent,
        keys_sent,
    })
}

fn send_page(pages_queue: &impl MessageQueue, page: &Page) -> Result<(), EtlError> {
    let body = encode_page(page.keys())?;
    let last_key = page.last_key().unwrap_or_default();

    pages_queue
        .send_message(&body)
        .map_err(|message| EtlError::PageSend {
            last_key: last_key.to_string(),
            message,
        })?;

    debug!(keys = page.len(), last_key, "page_sent");
    Ok(())
}
