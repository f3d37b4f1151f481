use uuid::Uuid;

/// Entry of a batch-send call. `id` only needs to be unique within the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub id: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn with_generated_id(body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            body: body.into(),
        }
    }
}

/// Batch entry the queue refused while accepting the rest of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub id: String,
    pub reason: String,
}

pub trait MessageQueue {
    fn send_message(&self, body: &str) -> Result<(), String>;
    /// Sends all entries in one call and returns those the queue rejected.
    fn send_message_batch(&self, entries: &[OutboundMessage]) -> Result<Vec<RejectedEntry>, String>;
}
