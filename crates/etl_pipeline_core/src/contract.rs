use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Keys per page message, matching the object store's list page size.
pub const PAGE_SIZE: usize = 1_000;
/// Entries accepted by a single queue batch-send call.
pub const SEND_BATCH_LIMIT: usize = 10;
pub const DEFAULT_LISTING_SAFETY_MARGIN: Duration = Duration::from_secs(30);
pub const DEFAULT_METRICS_NAMESPACE: &str = "custom/lambda-etl";
pub const OBJECTS_PROCESSED_METRIC: &str = "ObjectsProcessed";
pub const LINES_PROCESSED_METRIC: &str = "LinesProcessed";

const LISTED_FLAG: &str = "TRUE";
const PENDING_FLAG: &str = "FALSE";

/// Checkpoint exchanged between the orchestrator and the page lister.
///
/// Fields the lister does not know about are carried through unchanged so the
/// orchestrator can keep its own bookkeeping on the same document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingState {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_bookmark"
    )]
    pub bookmark: Option<String>,
    #[serde(default, with = "listing_flag")]
    pub all_pages_listed: bool,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

impl ListingState {
    pub fn starting_after(bookmark: impl Into<String>) -> Self {
        let bookmark = bookmark.into();
        Self {
            bookmark: (!bookmark.is_empty()).then_some(bookmark),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("page message is not a JSON array of keys: {0}")]
    MalformedPage(#[source] serde_json::Error),
    #[error("page message carries {0} keys, more than the 1000 allowed")]
    OversizedPage(usize),
    #[error("failed to encode page message: {0}")]
    PageEncoding(#[source] serde_json::Error),
}

pub fn encode_page(keys: &[String]) -> Result<String, ContractError> {
    if keys.len() > PAGE_SIZE {
        return Err(ContractError::OversizedPage(keys.len()));
    }
    serde_json::to_string(keys).map_err(ContractError::PageEncoding)
}

pub fn decode_page(body: &str) -> Result<Vec<String>, ContractError> {
    let keys: Vec<String> = serde_json::from_str(body).map_err(ContractError::MalformedPage)?;
    if keys.len() > PAGE_SIZE {
        return Err(ContractError::OversizedPage(keys.len()));
    }
    Ok(keys)
}

fn deserialize_bookmark<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let bookmark = Option::<String>::deserialize(deserializer)?;
    Ok(bookmark.filter(|value| !value.is_empty()))
}

mod listing_flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{LISTED_FLAG, PENDING_FLAG};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { LISTED_FLAG } else { PENDING_FLAG })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(value) => Ok(value),
            Flag::Text(text) => match text.trim().to_ascii_uppercase().as_str() {
                LISTED_FLAG => Ok(true),
                PENDING_FLAG => Ok(false),
                _ => Err(D::Error::custom(format!(
                    "all_pages_listed must be \"{LISTED_FLAG}\" or \"{PENDING_FLAG}\", got \"{text}\""
                ))),
            },
        }
    }
}
