use apm_agent::ErrorEvent;
use serde::Serialize;

use crate::model::span::StackFrameRecord;
use crate::model::{map_to_json, timestamp_us};

#[derive(Debug, Serialize)]
pub(crate) struct ErrorRecord {
    id: String,
    timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    culprit: Option<String>,
    exception: ExceptionRecord,
    context: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ExceptionRecord {
    message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    stacktrace: Vec<StackFrameRecord>,
}

impl From<&ErrorEvent> for ErrorRecord {
    fn from(event: &ErrorEvent) -> Self {
        ErrorRecord {
            id: event.id().to_string(),
            timestamp: timestamp_us(event.timestamp()),
            trace_id: event.trace_id().map(|id| id.to_string()),
            transaction_id: event.transaction_id().map(|id| id.to_string()),
            parent_id: event.parent_id().map(|id| id.to_string()),
            culprit: event.culprit().map(str::to_string),
            exception: ExceptionRecord {
                message: event.exception().message.clone(),
                kind: event.exception().kind.clone(),
                code: event.exception().code.clone(),
                stacktrace: event
                    .exception()
                    .stacktrace
                    .iter()
                    .map(Into::into)
                    .collect(),
            },
            context: map_to_json(event.context()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apm_agent::{ApmTracer, Config, Record, Tracer};
    use apm_agent::testing::InMemorySender;
    use std::io;

    #[test]
    fn error_record_field_shapes() {
        let mut tracer = ApmTracer::new(Config::new(), InMemorySender::new());
        let txn_id = tracer.start_transaction("GET /", "request");
        let failure = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        tracer.capture_error(&failure);

        let records = tracer.sender().records();
        let Record::Error(event) = records[0] else {
            panic!("expected an error record");
        };
        let json = serde_json::to_value(ErrorRecord::from(event)).unwrap();

        assert_eq!(json["id"].as_str().unwrap().len(), 32);
        assert_eq!(json["transaction_id"], txn_id.to_string());
        assert_eq!(json["parent_id"], txn_id.to_string());
        assert_eq!(json["exception"]["message"], "connection refused");
        assert!(json["exception"].get("type").is_none());
        assert_eq!(json["exception"]["stacktrace"].to_string(), "[]");
        assert_eq!(json["context"].to_string(), "{}");
    }

    #[test]
    fn unbound_errors_omit_their_trace_fields() {
        let event = ErrorEvent::from_message("lost");
        let json = serde_json::to_value(ErrorRecord::from(&event)).unwrap();
        assert!(json.get("trace_id").is_none());
        assert!(json.get("transaction_id").is_none());
        assert_eq!(json["exception"]["message"], "lost");
    }
}
