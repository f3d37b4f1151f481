use serde_json::Value;

use crate::error::EtlError;

/// Message delivered to a queue-triggered Lambda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    pub message_id: String,
    pub body: String,
}

impl QueueRecord {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

pub fn is_sqs_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == "aws:sqs")
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

/// Decodes an event only if every record came from SQS.
pub fn decode_sqs_event(event: &Value) -> Result<Vec<QueueRecord>, EtlError> {
    if !is_sqs_event(event) {
        return Err(EtlError::MalformedEvent(
            "expected a non-empty batch of aws:sqs records".into(),
        ));
    }
    decode_queue_records(event)
}

pub fn decode_queue_records(event: &Value) -> Result<Vec<QueueRecord>, EtlError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| EtlError::MalformedEvent("SQS event must include Records array".into()))?;

    let mut decoded = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EtlError::MalformedEvent(format!("SQS record {index} body must be a string"))
            })?;
        let message_id = record
            .get("messageId")
            .and_then(Value::as_str)
            .unwrap_or_default();
        decoded.push(QueueRecord::new(message_id, body));
    }

    Ok(decoded)
}
