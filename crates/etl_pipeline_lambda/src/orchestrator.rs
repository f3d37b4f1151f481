//! Re-invocation loop for the page lister.
//!
//! In production a state machine re-invokes the listing Lambda with its own
//! previous output until `all_pages_listed` is `"TRUE"`. This is the same loop
//! as a library function, used for local runs and tests.

use etl_pipeline_core::contract::ListingState;
use etl_pipeline_core::listing::ListingPhase;
use tracing::debug;

use crate::error::EtlError;

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationSummary {
    pub state: ListingState,
    pub invocations: usize,
}

pub fn run_listing_until_complete<F>(
    initial: ListingState,
    max_invocations: usize,
    mut invoke: F,
) -> Result<OrchestrationSummary, EtlError>
where
    F: FnMut(ListingState) -> Result<ListingState, EtlError>,
{
    let mut state = initial;

    for invocation in 1..=max_invocations {
        state = invoke(state)?;
        let phase = ListingPhase::of(&state);
        debug!(
            invocation,
            ?phase,
            bookmark = state.bookmark.as_deref().unwrap_or(""),
            "listing_invocation_returned"
        );

        if phase.is_terminal() {
            return Ok(OrchestrationSummary {
                state,
                invocations: invocation,
            });
        }
    }

    Err(EtlError::ListingStalled {
        invocations: max_invocations,
    })
}
