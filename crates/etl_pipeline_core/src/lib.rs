//! Shared paginated ETL domain primitives.
//!
//! This crate owns the deterministic parts of the pipeline: the invocation
//! state contract, the resumable page cursor, batch planning, and the record
//! flattening transform. It intentionally excludes AWS SDK and Lambda runtime
//! concerns, which live in `etl_pipeline_lambda`.

pub mod batching;
pub mod contract;
pub mod flatten;
pub mod listing;
pub mod records;
