use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::flatten::flatten;

/// Result of flattening every record of one source object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedObject {
    pub body: Vec<u8>,
    pub lines_processed: usize,
}

impl TransformedObject {
    pub fn sha256_hex(&self) -> String {
        format!("{:x}", Sha256::digest(&self.body))
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("object body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("line {line} is not valid JSON: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line} is a JSON {found}, expected an object")]
    NotAnObject { line: usize, found: &'static str },
    #[error("failed to serialize flattened line {line}: {source}")]
    Serialization {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Flattens a newline-delimited JSON object body.
///
/// Lines are 1-based in errors. A trailing newline does not start another
/// record and `\r\n` endings are accepted. Output lines are joined with `\n`
/// without a trailing newline, so identical input always produces identical
/// bytes.
///
/// Each line is compact JSON (`,` and `:` with no padding) and non-ASCII text
/// is written as raw UTF-8 rather than `\u` escapes. Numbers keep their source
/// text, so integers wider than 64 bits and decimal fractions pass through
/// unchanged.
pub fn transform_ndjson(body: &[u8]) -> Result<TransformedObject, RecordError> {
    let text = std::str::from_utf8(body)?;

    let mut output = Vec::with_capacity(body.len());
    let mut lines_processed = 0usize;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let record = match serde_json::from_str::<Value>(raw_line)
            .map_err(|source| RecordError::MalformedLine { line, source })?
        {
            Value::Object(record) => record,
            other => {
                return Err(RecordError::NotAnObject {
                    line,
                    found: json_kind(&other),
                })
            }
        };

        if lines_processed > 0 {
            output.push(b'\n');
        }
        serde_json::to_writer(&mut output, &flatten(&record))
            .map_err(|source| RecordError::Serialization { line, source })?;
        lines_processed += 1;
    }

    Ok(TransformedObject {
        body: output,
        lines_processed,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_each_line_independently() {
        let body = b"{\"a\":{\"b\":1}}\n{\"c\":{\"d\":{\"e\":\"x\"}},\"f\":[1]}\n";
        let transformed = transform_ndjson(body).expect("transform should pass");

        assert_eq!(transformed.lines_processed, 2);
        assert_eq!(
            String::from_utf8(transformed.body).expect("output should be utf-8"),
            "{\"a.b\":1}\n{\"c.d.e\":\"x\",\"f\":[1]}"
        );
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let transformed =
            transform_ndjson(b"{\"a\":{\"b\":1}}\r\n{\"c\":2}").expect("transform should pass");

        assert_eq!(transformed.lines_processed, 2);
        assert_eq!(transformed.body, b"{\"a.b\":1}\n{\"c\":2}".to_vec());
    }

    #[test]
    fn empty_body_yields_empty_output() {
        let transformed = transform_ndjson(b"").expect("transform should pass");
        assert_eq!(transformed.lines_processed, 0);
        assert!(transformed.body.is_empty());
    }

    #[test]
    fn same_input_produces_identical_bytes() {
        let body = b"{\"z\":{\"y\":1},\"a\":2}\n{\"k\":{\"v\":null}}";
        let first = transform_ndjson(body).expect("transform should pass");
        let second = transform_ndjson(body).expect("transform should pass");

        assert_eq!(first, second);
        assert_eq!(first.sha256_hex(), second.sha256_hex());
        assert_eq!(first.sha256_hex().len(), 64);
    }

    #[test]
    fn reports_line_number_of_malformed_record() {
        let error = transform_ndjson(b"{\"a\":1}\n{not json}\n{\"b\":2}")
            .expect_err("malformed line should fail");

        assert!(matches!(error, RecordError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn blank_line_between_records_is_malformed() {
        let error =
            transform_ndjson(b"{\"a\":1}\n\n{\"b\":2}").expect_err("blank line should fail");
        assert!(matches!(error, RecordError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn rejects_non_object_records() {
        let error = transform_ndjson(b"[1,2,3]").expect_err("array line should fail");
        assert!(matches!(
            error,
            RecordError::NotAnObject {
                line: 1,
                found: "array"
            }
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let error = transform_ndjson(&[0xff, 0xfe]).expect_err("invalid utf-8 should fail");
        assert!(matches!(error, RecordError::InvalidUtf8(_)));
    }

    #[test]
    fn wide_integers_and_decimals_keep_their_source_text() {
        let body = b"{\"a\":{\"id\":123456789012345678901234567890,\"f\":0.1},\"n\":-18446744073709551617}";

        let transformed = transform_ndjson(body).expect("transform should pass");

        assert_eq!(
            String::from_utf8(transformed.body).expect("output should be utf-8"),
            "{\"a.id\":123456789012345678901234567890,\"a.f\":0.1,\"n\":-18446744073709551617}"
        );
    }

    #[test]
    fn writes_compact_lines_with_raw_utf8() {
        let body = "{\"place\": {\"name\": \"Café Zürich\"}, \"tag\": \"☕\"}".as_bytes();

        let transformed = transform_ndjson(body).expect("transform should pass");

        assert_eq!(
            String::from_utf8(transformed.body).expect("output should be utf-8"),
            "{\"place.name\":\"Café Zürich\",\"tag\":\"☕\"}"
        );
    }
}
