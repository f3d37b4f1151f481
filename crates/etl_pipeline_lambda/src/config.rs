//! Environment configuration for the three Lambda functions.
//!
//! Each function reads only the variables it needs. Values are looked up
//! through a closure so tests never touch the process environment.

use std::time::Duration;

use etl_pipeline_core::contract::{DEFAULT_LISTING_SAFETY_MARGIN, DEFAULT_METRICS_NAMESPACE};
use thiserror::Error;

pub const SOURCE_BUCKET_ENV: &str = "SOURCE_BUCKET_NAME";
pub const DESTINATION_BUCKET_ENV: &str = "DESTINATION_BUCKET_NAME";
pub const PAGES_QUEUE_URL_ENV: &str = "PAGES_SQS_QUEUE_URL";
pub const OBJECTS_QUEUE_URL_ENV: &str = "S3_OBJECTS_SQS_QUEUE_URL";
pub const METRICS_NAMESPACE_ENV: &str = "METRICS_NAMESPACE";
pub const SAFETY_MARGIN_ENV: &str = "LISTING_SAFETY_MARGIN_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPagesConfig {
    pub source_bucket: String,
    pub pages_queue_url: String,
    pub safety_margin: Duration,
}

impl ListPagesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let safety_margin = match optional(&lookup, SAFETY_MARGIN_ENV) {
            None => DEFAULT_LISTING_SAFETY_MARGIN,
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name: SAFETY_MARGIN_ENV,
                    expected: "a whole number of seconds",
                    value,
                })?,
        };

        Ok(Self {
            source_bucket: required(&lookup, SOURCE_BUCKET_ENV)?,
            pages_queue_url: required(&lookup, PAGES_QUEUE_URL_ENV)?,
            safety_margin,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPageConfig {
    pub objects_queue_url: String,
}

impl SplitPageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            objects_queue_url: required(&lookup, OBJECTS_QUEUE_URL_ENV)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    pub source_bucket: String,
    pub destination_bucket: String,
    pub metrics_namespace: String,
}

impl TransformConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            source_bucket: required(&lookup, SOURCE_BUCKET_ENV)?,
            destination_bucket: required(&lookup, DESTINATION_BUCKET_ENV)?,
            metrics_namespace: optional(&lookup, METRICS_NAMESPACE_ENV)
                .unwrap_or_else(|| DEFAULT_METRICS_NAMESPACE.to_string()),
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}
