use apm_agent::Transaction;
use serde::Serialize;

use crate::model::span::SpanRecord;
use crate::model::{duration_ms, map_to_json, timestamp_us};

#[derive(Debug, Serialize)]
pub(crate) struct TransactionRecord {
    id: String,
    trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    transaction_type: String,
    timestamp: u64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    sampled: bool,
    context: TransactionContext,
    // spans travel as separate records; the tracer drains them before the
    // transaction reaches the sender, so this stays an empty list on the wire
    spans: Vec<SpanRecord>,
    span_count: SpanCountRecord,
}

#[derive(Debug, Serialize)]
struct TransactionContext {
    user: serde_json::Map<String, serde_json::Value>,
    custom: serde_json::Map<String, serde_json::Value>,
    tags: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct SpanCountRecord {
    started: usize,
    dropped: usize,
}

impl From<&Transaction> for TransactionRecord {
    fn from(txn: &Transaction) -> Self {
        TransactionRecord {
            id: txn.id().to_string(),
            trace_id: txn.trace_id().to_string(),
            parent_id: txn.parent_id().map(|id| id.to_string()),
            name: txn.name().to_string(),
            transaction_type: txn.transaction_type().to_string(),
            timestamp: timestamp_us(txn.start_time()),
            duration: duration_ms(txn.duration()),
            result: txn.result().map(str::to_string),
            sampled: txn.sampled(),
            context: TransactionContext {
                user: map_to_json(txn.user_context()),
                custom: map_to_json(txn.custom_context()),
                tags: map_to_json(txn.labels()),
            },
            spans: txn.spans().iter().map(SpanRecord::from).collect(),
            span_count: SpanCountRecord {
                started: txn.span_count().started,
                dropped: txn.span_count().dropped,
            },
        }
    }
}
