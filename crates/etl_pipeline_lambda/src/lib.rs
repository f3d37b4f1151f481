//! AWS-oriented adapters and handlers for the paginated ETL pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, queue
//! fan-out, S3 and CloudWatch adapters) and drives the deterministic
//! primitives from `etl_pipeline_core`. Every handler talks to the outside
//! world through the capability traits in [`adapters`], so the stages run
//! unchanged against in-memory fakes.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod orchestrator;
