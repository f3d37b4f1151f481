use serde_json::{Map, Value};

pub const DEFAULT_SEPARATOR: &str = ".";

/// Collapses nested objects into a single level keyed by dotted paths.
///
/// Only objects are recursed into; arrays and scalars are leaves. An empty
/// nested object contributes no keys. When two paths join to the same key the
/// later one in traversal order wins, keeping the position of the first.
pub fn flatten(record: &Map<String, Value>) -> Map<String, Value> {
    flatten_with_separator(record, DEFAULT_SEPARATOR)
}

pub fn flatten_with_separator(record: &Map<String, Value>, separator: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    let mut path = String::new();
    flatten_into(record, separator, &mut path, &mut flat);
    flat
}

fn flatten_into(
    record: &Map<String, Value>,
    separator: &str,
    path: &mut String,
    flat: &mut Map<String, Value>,
) {
    for (key, value) in record {
        let parent_len = path.len();
        if parent_len > 0 {
            path.push_str(separator);
        }
        path.push_str(key);

        match value {
            Value::Object(nested) => flatten_into(nested, separator, path, flat),
            leaf => {
                flat.insert(path.clone(), leaf.clone());
            }
        }

        path.truncate(parent_len);
    }
}
