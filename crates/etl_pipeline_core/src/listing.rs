//! Resumable enumeration of an ordered key space.
//!
//! A listing run is split across many short invocations. Each invocation
//! resumes a [`PageCursor`] from the previous [`ListingState`], feeds it keys
//! in the store's lexicographic order, and either suspends with a checkpoint
//! or finishes with a final short page. The cursor performs no I/O, so the
//! whole protocol can be exercised without a deadline or an object store.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::contract::{ListingState, PAGE_SIZE};

/// Where a listing run stands after an invocation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPhase {
    Scanning,
    Yielded,
    Done,
}

impl ListingPhase {
    pub fn of(state: &ListingState) -> Self {
        if state.all_pages_listed {
            Self::Done
        } else if state.bookmark.is_some() {
            Self::Yielded
        } else {
            Self::Scanning
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }
}

/// Up to [`PAGE_SIZE`] keys emitted as one queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    keys: Vec<String>,
}

impl Page {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn last_key(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("key '{key}' does not sort after '{previous}'")]
    OutOfOrder { key: String, previous: String },
}

/// Final output of a listing run that reached the end of the key space.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCompletion {
    pub final_page: Option<Page>,
    pub state: ListingState,
}

#[derive(Debug, Clone)]
pub struct PageCursor {
    committed: Option<String>,
    scanned: Option<String>,
    buffer: Vec<String>,
    passthrough: Map<String, Value>,
}

impl PageCursor {
    pub fn resume(state: ListingState) -> Self {
        Self {
            scanned: state.bookmark.clone(),
            committed: state.bookmark,
            buffer: Vec::with_capacity(PAGE_SIZE),
            passthrough: state.passthrough,
        }
    }

    /// Last key accepted by this cursor; the next listing call starts after it.
    pub fn scan_position(&self) -> Option<&str> {
        self.scanned.as_deref()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Takes `key` into the current page and returns the page once it is full.
    pub fn accept(&mut self, key: String) -> Result<Option<Page>, ListingError> {
        if let Some(previous) = self.scanned.as_deref() {
            if key.as_str() <= previous {
                return Err(ListingError::OutOfOrder {
                    key,
                    previous: previous.to_string(),
                });
            }
        }

        self.scanned = Some(key.clone());
        self.buffer.push(key);

        if self.buffer.len() < PAGE_SIZE {
            return Ok(None);
        }
        let keys = std::mem::replace(&mut self.buffer, Vec::with_capacity(PAGE_SIZE));
        Ok(Some(Page { keys }))
    }

    /// Records that `page` reached the queue.
    pub fn commit(&mut self, page: &Page) {
        if let Some(last_key) = page.last_key() {
            self.committed = Some(last_key.to_string());
        }
    }

    /// Checkpoint for an invocation that ran out of time.
    ///
    /// Buffered keys of an unfinished page are dropped; the bookmark stays at
    /// the last committed key so they are listed again on the next call.
    pub fn suspend(self) -> ListingState {
        ListingState {
            bookmark: self.committed,
            all_pages_listed: false,
            passthrough: self.passthrough,
        }
    }

    /// Flushes the remaining keys as a final page and marks the run complete.
    pub fn finish(self) -> ListingCompletion {
        let final_page = (!self.buffer.is_empty()).then_some(Page { keys: self.buffer });
        ListingCompletion {
            final_page,
            state: ListingState {
                bookmark: self.scanned,
                all_pages_listed: true,
                passthrough: self.passthrough,
            },
        }
    }
}
