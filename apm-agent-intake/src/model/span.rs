use apm_agent::{Span, StackFrame};
use serde::Serialize;

use crate::model::{duration_ms, map_to_json, timestamp_us};

#[derive(Debug, Serialize)]
pub(crate) struct SpanRecord {
    id: String,
    transaction_id: String,
    parent_id: String,
    trace_id: String,
    name: String,
    #[serde(rename = "type")]
    span_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    timestamp: u64,
    duration: f64,
    context: serde_json::Map<String, serde_json::Value>,
    stacktrace: Vec<StackFrameRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StackFrameRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<String>,
    filename: String,
    lineno: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<String>,
}

impl From<&StackFrame> for StackFrameRecord {
    fn from(frame: &StackFrame) -> Self {
        StackFrameRecord {
            function: frame.function.clone(),
            filename: frame.filename.clone(),
            lineno: frame.lineno,
            module: frame.module.clone(),
        }
    }
}

impl From<&Span> for SpanRecord {
    fn from(span: &Span) -> Self {
        SpanRecord {
            id: span.id().to_string(),
            transaction_id: span.transaction_id().to_string(),
            parent_id: span.parent_id().to_string(),
            trace_id: span.trace_id().to_string(),
            name: span.name().to_string(),
            span_type: span.span_type().to_string(),
            subtype: span.subtype().map(str::to_string),
            action: span.action().map(str::to_string),
            timestamp: timestamp_us(span.start_time()),
            duration: duration_ms(span.duration()),
            context: map_to_json(span.context()),
            stacktrace: span.stacktrace().iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use apm_agent::{ApmTracer, Config, Record, SpanBuilder, Tracer};
    use apm_agent::testing::InMemorySender;

    #[test]
    fn span_record_field_shapes() {
        let mut tracer = ApmTracer::new(Config::new(), InMemorySender::new());
        let txn_id = tracer.start_transaction("GET /", "request");
        let span_id = tracer
            .start_span_with(
                SpanBuilder::new("SELECT FROM users", "db")
                    .with_subtype("postgresql")
                    .with_action("query"),
            )
            .unwrap();
        tracer.stop_span(span_id).unwrap();
        tracer.stop_transaction(Some(200));

        let records = tracer.sender().records();
        let Record::Span(span) = records[1] else {
            panic!("expected a span record");
        };
        let json = serde_json::to_value(super::SpanRecord::from(span)).unwrap();

        assert_eq!(json["id"], span_id.to_string());
        assert_eq!(json["transaction_id"], txn_id.to_string());
        assert_eq!(json["parent_id"], txn_id.to_string());
        assert_eq!(json["type"], "db");
        assert_eq!(json["subtype"], "postgresql");
        assert_eq!(json["action"], "query");
        assert!(json["duration"].as_f64().unwrap() >= 0.0);
        assert_eq!(json["context"].to_string(), "{}");
        assert_eq!(json["stacktrace"].to_string(), "[]");
    }
}
