use std::fmt::Write;
use std::time::SystemTime;

use crate::model::span::StackFrame;
use crate::model::value::ValueMap;
use crate::trace_context::{ErrorId, SpanId, TraceId};

/// The failure carried inside an [`ErrorEvent`].
#[derive(Clone, Debug, Default)]
pub struct Exception {
    /// Human-readable failure message, including the source chain.
    pub message: String,
    /// Failure kind, e.g. an error type name.
    pub kind: Option<String>,
    /// Machine-readable code, e.g. a database error number.
    pub code: Option<String>,
    /// Captured stack frames, innermost first.
    pub stacktrace: Vec<StackFrame>,
}

/// A captured application failure, bound to the active transaction when one
/// exists at capture time.
///
/// Immutable after construction except for context merges.
#[derive(Clone, Debug)]
pub struct ErrorEvent {
    id: ErrorId,
    timestamp: SystemTime,
    trace_id: Option<TraceId>,
    transaction_id: Option<SpanId>,
    parent_id: Option<SpanId>,
    culprit: Option<String>,
    exception: Exception,
    context: ValueMap,
}

impl ErrorEvent {
    /// Capture an error, folding its `source()` chain into the message.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = write!(message, ": {cause}");
            source = cause.source();
        }
        ErrorEvent::new(Exception {
            message,
            kind: None,
            code: None,
            stacktrace: Vec::new(),
        })
    }

    /// Capture a plain message as an error event.
    pub fn from_message(message: impl Into<String>) -> Self {
        ErrorEvent::new(Exception {
            message: message.into(),
            kind: None,
            code: None,
            stacktrace: Vec::new(),
        })
    }

    /// Capture a fully described exception.
    pub fn from_exception(exception: Exception) -> Self {
        ErrorEvent::new(exception)
    }

    fn new(exception: Exception) -> Self {
        ErrorEvent {
            id: ErrorId::random(),
            timestamp: SystemTime::now(),
            trace_id: None,
            transaction_id: None,
            parent_id: None,
            culprit: None,
            exception,
            context: ValueMap::new(),
        }
    }

    /// The error id.
    pub fn id(&self) -> ErrorId {
        self.id
    }

    /// Wall-clock instant the failure was captured at.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Trace the failure occurred in, when captured inside a transaction.
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    /// Transaction the failure occurred in, when captured inside one.
    pub fn transaction_id(&self) -> Option<SpanId> {
        self.transaction_id
    }

    /// Innermost open span (or the transaction) at capture time.
    pub fn parent_id(&self) -> Option<SpanId> {
        self.parent_id
    }

    /// Code location blamed for the failure, if known.
    pub fn culprit(&self) -> Option<&str> {
        self.culprit.as_deref()
    }

    /// Name the code location blamed for the failure.
    pub fn set_culprit(&mut self, culprit: impl Into<String>) {
        self.culprit = Some(culprit.into());
    }

    /// The captured failure itself.
    pub fn exception(&self) -> &Exception {
        &self.exception
    }

    /// Free-form context attached to the error.
    pub fn context(&self) -> &ValueMap {
        &self.context
    }

    /// Merge entries into the error context (shallow, last write wins).
    pub fn merge_context(&mut self, context: ValueMap) {
        self.context.merge(context);
    }

    pub(crate) fn bind(&mut self, trace_id: TraceId, transaction_id: SpanId, parent_id: SpanId) {
        self.trace_id = Some(trace_id);
        self.transaction_id = Some(transaction_id);
        self.parent_id = Some(parent_id);
    }
}
