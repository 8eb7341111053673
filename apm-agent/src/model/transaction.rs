use std::time::{Duration, SystemTime};

use crate::model::span::Span;
use crate::model::value::ValueMap;
use crate::trace_context::{SpanId, TraceContext, TraceId};

/// Counts of spans started within a transaction and spans dropped once the
/// per-transaction cap was reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpanCount {
    /// Spans recorded on this transaction.
    pub started: usize,
    /// Spans discarded because the transaction hit its span cap.
    pub dropped: usize,
}

/// The root record of one traced unit of work (a request, job or command).
///
/// A transaction exclusively owns the [`Span`]s recorded under it; when it is
/// stopped and handed to the sender they travel with it. The `sampled` flag
/// is decided once at creation and never changes afterwards.
#[derive(Clone, Debug)]
pub struct Transaction {
    id: SpanId,
    trace_id: TraceId,
    parent_id: Option<SpanId>,
    name: String,
    transaction_type: String,
    start_time: SystemTime,
    duration: Option<Duration>,
    result: Option<String>,
    sampled: bool,
    labels: ValueMap,
    custom_context: ValueMap,
    user_context: ValueMap,
    spans: Vec<Span>,
    span_count: SpanCount,
}

impl Transaction {
    /// Create a transaction, optionally continuing a remote trace.
    ///
    /// With a remote [`TraceContext`] the trace id and parent id are inherited
    /// from the upstream caller; otherwise a fresh trace id is drawn.
    pub fn new(
        name: impl Into<String>,
        transaction_type: impl Into<String>,
        sampled: bool,
        remote: Option<TraceContext>,
    ) -> Self {
        Transaction {
            id: SpanId::random(),
            trace_id: remote.map(|cx| cx.trace_id).unwrap_or_else(TraceId::random),
            parent_id: remote.map(|cx| cx.parent_span_id),
            name: name.into(),
            transaction_type: transaction_type.into(),
            start_time: SystemTime::now(),
            duration: None,
            result: None,
            sampled,
            labels: ValueMap::new(),
            custom_context: ValueMap::new(),
            user_context: ValueMap::new(),
            spans: Vec::new(),
            span_count: SpanCount::default(),
        }
    }

    /// The transaction id.
    pub fn id(&self) -> SpanId {
        self.id
    }

    /// Id of the trace this transaction roots or participates in.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Id of the remote parent span, when continuing a distributed trace.
    pub fn parent_id(&self) -> Option<SpanId> {
        self.parent_id
    }

    /// The transaction name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the transaction, e.g. once the route is known.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The transaction type, e.g. `"request"`, `"cli"` or `"messaging"`.
    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    /// Wall-clock instant the transaction started at.
    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Elapsed time between start and stop; `None` while still running.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Outcome label, e.g. `"HTTP 2xx"`.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Set the outcome label.
    pub fn set_result(&mut self, result: impl Into<String>) {
        self.result = Some(result.into());
    }

    /// Whether this transaction was selected for delivery.
    pub fn sampled(&self) -> bool {
        self.sampled
    }

    /// Key/value labels indexed by the collector.
    pub fn labels(&self) -> &ValueMap {
        &self.labels
    }

    /// Set a single label.
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<crate::model::Value>) {
        self.labels.set(key, value);
    }

    /// Free-form custom context.
    pub fn custom_context(&self) -> &ValueMap {
        &self.custom_context
    }

    /// Merge entries into the custom context (shallow, last write wins).
    pub fn merge_custom_context(&mut self, context: ValueMap) {
        self.custom_context.merge(context);
    }

    /// Context describing the authenticated user, if any.
    pub fn user_context(&self) -> &ValueMap {
        &self.user_context
    }

    /// Merge entries into the user context (shallow, last write wins).
    pub fn merge_user_context(&mut self, context: ValueMap) {
        self.user_context.merge(context);
    }

    /// Spans recorded under this transaction so far.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Started/dropped span counters.
    pub fn span_count(&self) -> SpanCount {
        self.span_count
    }

    /// The propagation triple identifying this transaction to downstream
    /// callees.
    pub fn trace_context(&self) -> TraceContext {
        TraceContext::new(self.trace_id, self.id, self.sampled)
    }

    /// Record the stop time and compute the duration.
    ///
    /// Idempotent: a second call leaves the recorded duration unchanged.
    pub fn stop(&mut self) {
        if self.duration.is_none() {
            self.duration = Some(self.start_time.elapsed().unwrap_or_default());
        }
    }

    pub(crate) fn add_span(&mut self, span: Span) {
        self.span_count.started += 1;
        self.spans.push(span);
    }

    pub(crate) fn note_dropped_span(&mut self) {
        self.span_count.dropped += 1;
    }

    pub(crate) fn span_mut(&mut self, id: SpanId) -> Option<&mut Span> {
        self.spans.iter_mut().find(|span| span.id() == id)
    }

    pub(crate) fn take_spans(&mut self) -> Vec<Span> {
        std::mem::take(&mut self.spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::span::SpanBuilder;

    #[test]
    fn stop_is_idempotent() {
        let mut txn = Transaction::new("GET /", "request", true, None);
        txn.stop();
        let first = txn.duration().unwrap();
        txn.stop();
        assert_eq!(txn.duration(), Some(first));
    }

    #[test]
    fn remote_context_is_inherited() {
        let remote = TraceContext::new(TraceId::random(), SpanId::random(), true);
        let txn = Transaction::new("GET /", "request", true, Some(remote));
        assert_eq!(txn.trace_id(), remote.trace_id);
        assert_eq!(txn.parent_id(), Some(remote.parent_span_id));
    }

    #[test]
    fn fresh_transaction_draws_its_own_ids() {
        let txn = Transaction::new("GET /", "request", true, None);
        assert_ne!(txn.trace_id(), TraceId::INVALID);
        assert_ne!(txn.id(), SpanId::INVALID);
        assert_eq!(txn.parent_id(), None);
    }

    #[test]
    fn owned_spans_carry_the_transaction_ids() {
        let mut txn = Transaction::new("GET /", "request", true, None);
        let span = Span::new(
            &SpanBuilder::new("SELECT", "db"),
            txn.id(),
            txn.trace_id(),
            txn.id(),
        );
        let span_id = span.id();
        txn.add_span(span);

        assert_eq!(txn.spans().len(), 1);
        assert_eq!(txn.span_count().started, 1);
        assert_eq!(txn.spans()[0].transaction_id(), txn.id());
        assert!(txn.span_mut(span_id).is_some());
    }
}
