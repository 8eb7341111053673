//! Wire model for the intake v2 protocol.
//!
//! One newline-delimited JSON record per line, each wrapped in an object
//! keyed by its kind. In memory the agent works with `SystemTime` and
//! `Duration`; conversion happens only here: timestamps become integer
//! microseconds since the epoch, durations become fractional milliseconds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use apm_agent::{Record, Value, ValueMap};
use serde::Serialize;

mod error;
mod metadata;
mod span;
mod transaction;

pub(crate) use error::ErrorRecord;
pub(crate) use metadata::Metadata;
pub(crate) use span::SpanRecord;
pub(crate) use transaction::TransactionRecord;

/// One ndjson line: `{"metadata": ...}`, `{"transaction": ...}`,
/// `{"span": ...}` or `{"error": ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Envelope {
    Metadata(Metadata),
    Transaction(TransactionRecord),
    Span(SpanRecord),
    Error(ErrorRecord),
}

impl From<&Record> for Envelope {
    fn from(record: &Record) -> Self {
        match record {
            Record::Transaction(txn) => Envelope::Transaction(txn.into()),
            Record::Span(span) => Envelope::Span(span.into()),
            Record::Error(event) => Envelope::Error(event.into()),
        }
    }
}

pub(crate) fn timestamp_us(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

pub(crate) fn duration_ms(duration: Option<Duration>) -> f64 {
    duration.unwrap_or_default().as_secs_f64() * 1_000.0
}

/// Convert a context bag into a JSON object; empty maps become `{}`, never
/// `[]`, to satisfy the intake schema.
pub(crate) fn map_to_json(map: &ValueMap) -> serde_json::Map<String, serde_json::Value> {
    map.iter()
        .map(|(key, value)| (key.to_string(), value_to_json(value)))
        .collect()
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(value) => (*value).into(),
        Value::I64(value) => (*value).into(),
        Value::F64(value) => (*value).into(),
        Value::String(value) => value.clone().into(),
        Value::Map(value) => serde_json::Value::Object(map_to_json(value)),
    }
}
