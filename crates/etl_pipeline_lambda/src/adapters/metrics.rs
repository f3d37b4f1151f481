use etl_pipeline_core::contract::{LINES_PROCESSED_METRIC, OBJECTS_PROCESSED_METRIC};

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub name: &'static str,
    pub value: f64,
}

impl Counter {
    /// Counters reported after one object has been written.
    pub fn for_processed_object(lines_processed: usize) -> [Counter; 2] {
        [
            Counter {
                name: OBJECTS_PROCESSED_METRIC,
                value: 1.0,
            },
            Counter {
                name: LINES_PROCESSED_METRIC,
                value: lines_processed as f64,
            },
        ]
    }
}

/// Fire-and-forget counter sink. Callers log failures and move on.
pub trait MetricsSink {
    fn put_counters(&self, counters: &[Counter]) -> Result<(), String>;
}
