use std::time::{Duration, SystemTime};

use crate::model::value::ValueMap;
use crate::trace_context::{SpanId, TraceId};

/// A single frame of a captured stack trace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackFrame {
    /// Function name, if known.
    pub function: Option<String>,
    /// Source file the frame points into.
    pub filename: String,
    /// Line number within the file.
    pub lineno: u32,
    /// Module or crate the function lives in.
    pub module: Option<String>,
}

/// Carries the caller-supplied attributes of a span about to be started.
///
/// ```
/// use apm_agent::SpanBuilder;
///
/// let builder = SpanBuilder::new("SELECT FROM users", "db")
///     .with_subtype("postgresql")
///     .with_action("query");
/// ```
#[derive(Clone, Debug)]
pub struct SpanBuilder {
    pub(crate) name: String,
    pub(crate) span_type: String,
    pub(crate) subtype: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) parent: Option<SpanId>,
}

impl SpanBuilder {
    /// Create a builder for a span with the given name and type.
    pub fn new(name: impl Into<String>, span_type: impl Into<String>) -> Self {
        SpanBuilder {
            name: name.into(),
            span_type: span_type.into(),
            subtype: None,
            action: None,
            parent: None,
        }
    }

    /// Set the span subtype, e.g. `"postgresql"` for a `"db"` span.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Set the span action, e.g. `"query"`.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Override the parent span instead of nesting under the innermost open
    /// span.
    pub fn with_parent(mut self, parent: SpanId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A timed sub-operation within a [`Transaction`].
///
/// A span belongs to exactly one transaction, fixed at construction; its
/// duration is defined only once [`stop`] has run.
///
/// [`Transaction`]: crate::model::Transaction
/// [`stop`]: Span::stop
#[derive(Clone, Debug)]
pub struct Span {
    id: SpanId,
    transaction_id: SpanId,
    trace_id: TraceId,
    parent_id: SpanId,
    name: String,
    span_type: String,
    subtype: Option<String>,
    action: Option<String>,
    start_time: SystemTime,
    duration: Option<Duration>,
    context: ValueMap,
    stacktrace: Vec<StackFrame>,
}

impl Span {
    pub(crate) fn new(
        builder: &SpanBuilder,
        transaction_id: SpanId,
        trace_id: TraceId,
        parent_id: SpanId,
    ) -> Self {
        Span {
            id: SpanId::random(),
            transaction_id,
            trace_id,
            parent_id,
            name: builder.name.clone(),
            span_type: builder.span_type.clone(),
            subtype: builder.subtype.clone(),
            action: builder.action.clone(),
            start_time: SystemTime::now(),
            duration: None,
            context: ValueMap::new(),
            stacktrace: Vec::new(),
        }
    }

    /// The span's own id.
    pub fn id(&self) -> SpanId {
        self.id
    }

    /// Id of the transaction this span belongs to.
    pub fn transaction_id(&self) -> SpanId {
        self.transaction_id
    }

    /// Id of the trace this span participates in.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Id of the enclosing span, or of the transaction for top-level spans.
    pub fn parent_id(&self) -> SpanId {
        self.parent_id
    }

    /// The span name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The span type, e.g. `"db"` or `"external"`.
    pub fn span_type(&self) -> &str {
        &self.span_type
    }

    /// The span subtype, if set.
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// The span action, if set.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Wall-clock instant the span started at.
    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Elapsed time between start and stop; `None` while the span is open.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Free-form context attached to the span.
    pub fn context(&self) -> &ValueMap {
        &self.context
    }

    /// Merge entries into the span context (shallow, last write wins).
    pub fn merge_context(&mut self, context: ValueMap) {
        self.context.merge(context);
    }

    /// Captured stack frames, if any.
    pub fn stacktrace(&self) -> &[StackFrame] {
        &self.stacktrace
    }

    /// Attach a captured stack trace.
    pub fn set_stacktrace(&mut self, frames: Vec<StackFrame>) {
        self.stacktrace = frames;
    }

    /// Record the stop time and compute the duration.
    ///
    /// Idempotent: a second call leaves the recorded duration unchanged.
    pub fn stop(&mut self) {
        if self.duration.is_none() {
            self.duration = Some(self.start_time.elapsed().unwrap_or_default());
        }
    }
}
