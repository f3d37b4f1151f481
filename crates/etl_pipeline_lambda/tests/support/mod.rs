#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;
use std::time::Duration;

use etl_pipeline_lambda::adapters::deadline::TimeBudget;
use etl_pipeline_lambda::adapters::metrics::{Counter, MetricsSink};
use etl_pipeline_lambda::adapters::object_store::{KeyListing, ObjectStore};
use etl_pipeline_lambda::adapters::queue::{MessageQueue, OutboundMessage, RejectedEntry};
use serde_json::{json, Value};

/// Sorted in-memory bucket with the same `start_after` semantics as S3.
pub struct InMemoryBucket {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    list_calls: Mutex<usize>,
    writes: Mutex<usize>,
}

impl InMemoryBucket {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            list_calls: Mutex::new(0),
            writes: Mutex::new(0),
        }
    }

    /// Bucket holding `count` one-line objects under `logs/`.
    pub fn with_ndjson_objects(count: usize) -> Self {
        let bucket = Self::new();
        for index in 0..count {
            bucket.put(
                &object_key(index),
                format!("{{\"id\":{index},\"meta\":{{\"source\":\"fixture\"}}}}\n").as_bytes(),
            );
        }
        bucket
    }

    pub fn put(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().expect("poisoned mutex").get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().expect("poisoned mutex")
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().expect("poisoned mutex")
    }
}

impl ObjectStore for InMemoryBucket {
    fn list_keys(&self, start_after: Option<&str>, max_keys: usize) -> Result<KeyListing, String> {
        *self.list_calls.lock().expect("poisoned mutex") += 1;
        let objects = self.objects.lock().expect("poisoned mutex");
        let lower = start_after.map_or(Bound::Unbounded, |key| Bound::Excluded(key.to_string()));
        let mut remaining = objects.range::<String, _>((lower, Bound::Unbounded));
        let keys: Vec<String> = remaining
            .by_ref()
            .take(max_keys)
            .map(|(key, _)| key.clone())
            .collect();
        Ok(KeyListing {
            keys,
            is_truncated: remaining.next().is_some(),
        })
    }

    fn read_object(&self, key: &str) -> Result<Vec<u8>, String> {
        self.get(key).ok_or_else(|| format!("NoSuchKey: {key}"))
    }

    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        *self.writes.lock().expect("poisoned mutex") += 1;
        self.put(key, body);
        Ok(())
    }
}

/// Queue that records single sends and batch sends separately.
pub struct RecordingQueue {
    messages: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<OutboundMessage>>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("poisoned mutex").clone()
    }

    pub fn batches(&self) -> Vec<Vec<OutboundMessage>> {
        self.batches.lock().expect("poisoned mutex").clone()
    }

    pub fn batch_bodies(&self) -> Vec<String> {
        self.batches()
            .into_iter()
            .flatten()
            .map(|entry| entry.body)
            .collect()
    }
}

impl MessageQueue for RecordingQueue {
    fn send_message(&self, body: &str) -> Result<(), String> {
        self.messages
            .lock()
            .expect("poisoned mutex")
            .push(body.to_string());
        Ok(())
    }

    fn send_message_batch(&self, entries: &[OutboundMessage]) -> Result<Vec<RejectedEntry>, String> {
        self.batches
            .lock()
            .expect("poisoned mutex")
            .push(entries.to_vec());
        Ok(Vec::new())
    }
}

pub struct RecordingMetrics {
    calls: Mutex<Vec<Vec<Counter>>>,
    fail: bool,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Vec<Counter>> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn total(&self, name: &str) -> f64 {
        self.calls()
            .iter()
            .flatten()
            .filter(|counter| counter.name == name)
            .map(|counter| counter.value)
            .sum()
    }
}

impl MetricsSink for RecordingMetrics {
    fn put_counters(&self, counters: &[Counter]) -> Result<(), String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(counters.to_vec());
        if self.fail {
            return Err("ServiceUnavailable".to_string());
        }
        Ok(())
    }
}

/// Reports ample time for a fixed number of checks, then none.
pub struct CheckBudget {
    checks: Cell<usize>,
}

impl CheckBudget {
    pub fn unlimited() -> Self {
        Self::allowing(usize::MAX)
    }

    pub fn allowing(checks: usize) -> Self {
        Self {
            checks: Cell::new(checks),
        }
    }
}

impl TimeBudget for CheckBudget {
    fn remaining(&self) -> Duration {
        let left = self.checks.get();
        if left == 0 {
            return Duration::ZERO;
        }
        self.checks.set(left - 1);
        Duration::from_secs(900)
    }
}

pub const SAFETY_MARGIN: Duration = Duration::from_secs(30);

pub fn object_key(index: usize) -> String {
    format!("logs/{index:06}.json")
}

/// Wraps bodies in the event shape the queue trigger delivers.
pub fn sqs_event<I, S>(bodies: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let records: Vec<Value> = bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| {
            let body: String = body.into();
            json!({
                "eventSource": "aws:sqs",
                "messageId": format!("msg-{index}"),
                "body": body,
            })
        })
        .collect();
    json!({ "Records": records })
}
