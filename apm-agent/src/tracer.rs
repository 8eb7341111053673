//! The stateful orchestrator owning the current transaction and the stack of
//! open spans.
//!
//! A tracer instance tracks **one logical unit of work at a time**: one
//! request, one job, one message. Concurrent units of work each get their own
//! tracer (or equivalent isolation); nothing here is shared between threads.

use std::panic::{self, AssertUnwindSafe};

use rand::Rng;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AgentError, AgentResult, SendResult};
use crate::model::{ErrorEvent, SpanBuilder, Transaction};
use crate::model::Span;
use crate::propagation::{self, Injector};
use crate::sender::{Record, Sender};
use crate::trace_context::{SpanId, TraceContext};

/// The tracer contract shared by the real agent, the no-op variant and the
/// OpenTracing-flavored shim.
pub trait Tracer {
    /// Begin a unit of work with a fresh trace.
    ///
    /// Always returns a usable transaction id, even when the agent is
    /// disabled, so call sites never need to branch.
    fn start_transaction(&mut self, name: &str, transaction_type: &str) -> SpanId {
        self.start_transaction_from(name, transaction_type, None)
    }

    /// Begin a unit of work, continuing a remote trace when `remote` is set.
    ///
    /// The new transaction becomes current; a previously current transaction
    /// is no longer tracked but stays stoppable via
    /// [`stop_transaction_by_id`](Tracer::stop_transaction_by_id).
    fn start_transaction_from(
        &mut self,
        name: &str,
        transaction_type: &str,
        remote: Option<TraceContext>,
    ) -> SpanId;

    /// The current transaction, for call sites adding context.
    fn current_transaction(&mut self) -> Option<&mut Transaction>;

    /// Stop the current transaction and hand it to the sender.
    ///
    /// An optional numeric result code is mapped to a coarse outcome bucket
    /// (`"HTTP 2xx"` .. `"HTTP 5xx"`, fallback `"HTTP {code}"`).
    fn stop_transaction(&mut self, result_code: Option<u16>);

    /// Stop a specific transaction, current or not.
    ///
    /// Stopping a stale transaction never clears an unrelated current one.
    fn stop_transaction_by_id(&mut self, id: SpanId, result_code: Option<u16>) -> AgentResult<()>;

    /// Start a span under the current transaction.
    fn start_span(&mut self, name: &str, span_type: &str) -> AgentResult<SpanId> {
        self.start_span_with(SpanBuilder::new(name, span_type))
    }

    /// Start a span with explicit subtype/action/parent attributes.
    ///
    /// Fails with [`AgentError::NoActiveTransaction`] when no transaction is
    /// active; a span cannot exist outside a transaction. The span is
    /// appended to the transaction immediately, not on stop, so partially
    /// completed traces stay linkable.
    fn start_span_with(&mut self, builder: SpanBuilder) -> AgentResult<SpanId>;

    /// Stop an open span.
    ///
    /// Spans are never transmitted on their own; they travel with their
    /// owning transaction when that is stopped.
    fn stop_span(&mut self, id: SpanId) -> AgentResult<()>;

    /// Capture an error, bound to the current transaction when one exists,
    /// and hand it to the sender immediately (errors bypass batching).
    fn capture_error(&mut self, error: &(dyn std::error::Error + 'static));

    /// Capture a plain message as an error event; delivery as for
    /// [`capture_error`](Tracer::capture_error).
    fn capture_message(&mut self, message: &str);

    /// The propagation triple of the current transaction, for outbound
    /// requests to downstream callees.
    fn trace_context(&self) -> Option<TraceContext>;

    /// Write outbound `traceparent`/`tracestate` headers for the current
    /// transaction into `injector`.
    fn inject_context(&self, injector: &mut dyn Injector) {
        if let Some(cx) = self.trace_context() {
            propagation::inject(&cx, injector);
        }
    }

    /// Deliver everything buffered so far.
    fn flush(&mut self) -> SendResult;

    /// Run `work` inside a span, guaranteeing the span is stopped on every
    /// exit path: success, error or panic.
    ///
    /// An `Err` is captured as an error event and returned unchanged; a panic
    /// is captured and resumed unchanged. When no transaction is active the
    /// work still runs, untracked.
    fn capture_current_span<T, E, F>(&mut self, builder: SpanBuilder, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: std::error::Error + 'static,
    {
        let span = match self.start_span_with(builder) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "running work without a span");
                None
            }
        };

        let outcome = {
            let this = &mut *self;
            panic::catch_unwind(AssertUnwindSafe(move || work(this)))
        };

        match outcome {
            Ok(result) => {
                if let Err(err) = &result {
                    self.capture_error(err);
                }
                if let Some(id) = span {
                    let _ = self.stop_span(id);
                }
                result
            }
            Err(payload) => {
                self.capture_message(&panic_message(payload.as_ref()));
                if let Some(id) = span {
                    let _ = self.stop_span(id);
                }
                panic::resume_unwind(payload)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic".to_string()
    }
}

pub(crate) fn http_result(code: u16) -> String {
    match code {
        200..=299 => "HTTP 2xx".to_string(),
        300..=399 => "HTTP 3xx".to_string(),
        400..=499 => "HTTP 4xx".to_string(),
        500..=599 => "HTTP 5xx".to_string(),
        _ => format!("HTTP {code}"),
    }
}

/// A span currently on the open stack. Spans past the per-transaction cap are
/// tracked for nesting but not recorded.
#[derive(Clone, Copy, Debug)]
struct OpenSpan {
    id: SpanId,
    recorded: bool,
}

/// The production [`Tracer`], generic over the delivery transport.
///
/// ```
/// use apm_agent::{ApmTracer, Config, Tracer};
/// use apm_agent::testing::InMemorySender;
///
/// let mut tracer = ApmTracer::new(Config::new(), InMemorySender::new());
/// tracer.start_transaction("GET /orders", "request");
/// let span = tracer.start_span("SELECT FROM orders", "db").unwrap();
/// tracer.stop_span(span).unwrap();
/// tracer.stop_transaction(Some(200));
/// ```
#[derive(Debug)]
pub struct ApmTracer<S: Sender> {
    config: Config,
    sender: S,
    current: Option<Transaction>,
    parked: Vec<Transaction>,
    open_spans: Vec<OpenSpan>,
}

impl<S: Sender> ApmTracer<S> {
    /// Create a tracer delivering through `sender`.
    pub fn new(config: Config, sender: S) -> Self {
        ApmTracer {
            config,
            sender,
            current: None,
            parked: Vec::new(),
            open_spans: Vec::new(),
        }
    }

    /// The tracer's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Mutable access to the underlying sender.
    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    fn draw_sample(&self) -> bool {
        let rate = self.config.sample_rate();
        if rate >= 1.0 {
            true
        } else if rate <= 0.0 {
            false
        } else {
            rand::thread_rng().gen_bool(rate)
        }
    }

    fn finish(&mut self, mut txn: Transaction, result_code: Option<u16>) {
        txn.stop();
        if let Some(code) = result_code {
            txn.set_result(http_result(code));
        }
        if !txn.sampled() {
            debug!(transaction = %txn.id(), "transaction not sampled, discarding");
            return;
        }

        // Transaction first, then its spans, so a flush can never separate
        // spans from their parent.
        let spans = txn.take_spans();
        self.sender.enqueue(Record::Transaction(txn));
        for span in spans {
            self.sender.enqueue(Record::Span(span));
        }

        if self.sender.queued() >= self.config.flush_threshold() {
            if let Err(err) = self.sender.flush() {
                debug!(%err, "queue-threshold flush failed");
            }
        }
    }

    fn dispatch_error(&mut self, mut event: ErrorEvent) {
        if let Some(txn) = self.current.as_ref() {
            let parent = self
                .open_spans
                .last()
                .map(|open| open.id)
                .unwrap_or_else(|| txn.id());
            event.bind(txn.trace_id(), txn.id(), parent);
        }
        if !self.config.enabled() {
            return;
        }
        self.sender.enqueue(Record::Error(event));
        // Errors are not deferred to transaction stop; a transaction might
        // run long after the failure occurred.
        if let Err(err) = self.sender.flush() {
            debug!(%err, "error flush failed");
        }
    }
}

impl<S: Sender> Tracer for ApmTracer<S> {
    fn start_transaction_from(
        &mut self,
        name: &str,
        transaction_type: &str,
        remote: Option<TraceContext>,
    ) -> SpanId {
        let sampled = if !self.config.enabled() {
            false
        } else {
            match remote {
                Some(cx) => cx.sampled,
                None => self.draw_sample(),
            }
        };

        let txn = Transaction::new(name, transaction_type, sampled, remote);
        let id = txn.id();
        if let Some(prev) = self.current.replace(txn) {
            debug!(transaction = %prev.id(), "transaction displaced while still running");
            self.parked.push(prev);
        }
        self.open_spans.clear();
        id
    }

    fn current_transaction(&mut self) -> Option<&mut Transaction> {
        self.current.as_mut()
    }

    fn stop_transaction(&mut self, result_code: Option<u16>) {
        if let Some(txn) = self.current.take() {
            self.open_spans.clear();
            self.finish(txn, result_code);
        }
    }

    fn stop_transaction_by_id(&mut self, id: SpanId, result_code: Option<u16>) -> AgentResult<()> {
        if self.current.as_ref().map(Transaction::id) == Some(id) {
            self.stop_transaction(result_code);
            return Ok(());
        }
        match self.parked.iter().position(|txn| txn.id() == id) {
            Some(pos) => {
                let txn = self.parked.remove(pos);
                self.finish(txn, result_code);
                Ok(())
            }
            None => Err(AgentError::TransactionNotFound(id)),
        }
    }

    fn start_span_with(&mut self, builder: SpanBuilder) -> AgentResult<SpanId> {
        let stack_parent = self.open_spans.last().map(|open| open.id);
        let max_spans = self.config.transaction_max_spans();
        let txn = self
            .current
            .as_mut()
            .ok_or(AgentError::NoActiveTransaction)?;

        let parent = builder
            .parent
            .or(stack_parent)
            .unwrap_or_else(|| txn.id());
        let span = Span::new(&builder, txn.id(), txn.trace_id(), parent);
        let id = span.id();

        let recorded = txn.span_count().started < max_spans;
        if recorded {
            txn.add_span(span);
        } else {
            txn.note_dropped_span();
        }
        self.open_spans.push(OpenSpan { id, recorded });
        Ok(id)
    }

    fn stop_span(&mut self, id: SpanId) -> AgentResult<()> {
        if let Some(pos) = self.open_spans.iter().rposition(|open| open.id == id) {
            let open = self.open_spans.remove(pos);
            if open.recorded {
                if let Some(span) = self.current.as_mut().and_then(|txn| txn.span_mut(id)) {
                    span.stop();
                }
            }
            return Ok(());
        }
        // Not on the stack: tolerate a second stop of a span the transaction
        // still knows about.
        if let Some(span) = self.current.as_mut().and_then(|txn| txn.span_mut(id)) {
            span.stop();
            return Ok(());
        }
        Err(AgentError::SpanNotFound(id))
    }

    fn capture_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.dispatch_error(ErrorEvent::from_error(error));
    }

    fn capture_message(&mut self, message: &str) {
        self.dispatch_error(ErrorEvent::from_message(message));
    }

    fn trace_context(&self) -> Option<TraceContext> {
        self.current.as_ref().map(Transaction::trace_context)
    }

    fn flush(&mut self) -> SendResult {
        self.sender.flush()
    }
}

impl<S: Sender> Drop for ApmTracer<S> {
    fn drop(&mut self) {
        if let Err(err) = self.sender.flush() {
            debug!(%err, "flush at shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::testing::InMemorySender;
    use std::collections::HashMap;
    use std::io;

    fn tracer() -> ApmTracer<InMemorySender> {
        ApmTracer::new(Config::new(), InMemorySender::new())
    }

    fn tracer_with(config: Config) -> ApmTracer<InMemorySender> {
        ApmTracer::new(config, InMemorySender::new())
    }

    #[test]
    fn sample_rate_one_enqueues_every_transaction() {
        let mut tracer = tracer_with(Config::new().with_sample_rate(1.0));
        for n in 0..1000 {
            tracer.start_transaction(&format!("job {n}"), "cli");
            tracer.stop_transaction(None);
        }
        assert_eq!(tracer.sender().transaction_count(), 1000);
    }

    #[test]
    fn sample_rate_zero_enqueues_nothing() {
        let mut tracer = tracer_with(Config::new().with_sample_rate(0.0));
        for n in 0..1000 {
            tracer.start_transaction(&format!("job {n}"), "cli");
            tracer.stop_transaction(None);
        }
        assert_eq!(tracer.sender().transaction_count(), 0);
        assert_eq!(tracer.sender().span_count(), 0);
    }

    #[test]
    fn spans_link_to_their_transaction() {
        let mut tracer = tracer();
        let txn_id = tracer.start_transaction("GET /orders", "request");

        for name in ["one", "two", "three"] {
            let span = tracer.start_span(name, "db").unwrap();
            tracer.stop_span(span).unwrap();
        }

        assert_eq!(tracer.current_transaction().unwrap().spans().len(), 3);
        tracer.stop_transaction(Some(200));

        assert_eq!(tracer.sender().transaction_count(), 1);
        assert_eq!(tracer.sender().span_count(), 3);
        for record in tracer.sender().records() {
            if let Record::Span(span) = record {
                assert_eq!(span.transaction_id(), txn_id);
            }
        }
    }

    #[test]
    fn span_without_transaction_is_an_invalid_state() {
        let mut tracer = tracer();
        assert_eq!(
            tracer.start_span("orphan", "db"),
            Err(AgentError::NoActiveTransaction)
        );
    }

    #[test]
    fn nested_spans_chain_their_parents() {
        let mut tracer = tracer();
        let txn_id = tracer.start_transaction("GET /", "request");
        let outer = tracer.start_span("handler", "app").unwrap();
        let inner = tracer.start_span("SELECT", "db").unwrap();

        let txn = tracer.current_transaction().unwrap();
        let spans = txn.spans();
        assert_eq!(spans[0].parent_id(), txn_id);
        assert_eq!(spans[1].parent_id(), outer);

        tracer.stop_span(inner).unwrap();
        // with the inner span closed, new spans nest under the outer one again
        let sibling = tracer.start_span("UPDATE", "db").unwrap();
        assert_eq!(
            tracer.current_transaction().unwrap().spans()[2].parent_id(),
            outer
        );
        tracer.stop_span(sibling).unwrap();
        tracer.stop_span(outer).unwrap();
    }

    #[test]
    fn remote_trace_context_is_adopted() {
        let mut carrier: HashMap<String, String> = HashMap::new();
        carrier.insert(
            "traceparent".to_string(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01".to_string(),
        );

        let remote = crate::propagation::extract(&carrier);
        let mut tracer = tracer();
        tracer.start_transaction_from("GET /", "request", remote);

        let txn = tracer.current_transaction().unwrap();
        assert_eq!(
            txn.trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
        assert_eq!(txn.parent_id().unwrap().to_string(), "00f067aa0ba902b7");
        assert!(txn.sampled());
    }

    #[test]
    fn outbound_headers_carry_the_transaction_ids() {
        let mut tracer = tracer();
        let txn_id = tracer.start_transaction("GET /", "request");
        let trace_id = tracer.trace_context().unwrap().trace_id;

        let mut carrier: HashMap<String, String> = HashMap::new();
        tracer.inject_context(&mut carrier);

        assert_eq!(
            carrier.get("traceparent"),
            Some(&format!("00-{trace_id}-{txn_id}-01"))
        );
        assert_eq!(carrier.get("tracestate"), Some(&String::new()));
    }

    #[test]
    fn atomic_delivery_of_transaction_and_spans() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");
        let a = tracer.start_span("a", "db").unwrap();
        let b = tracer.start_span("b", "db").unwrap();
        tracer.stop_span(b).unwrap();
        tracer.stop_span(a).unwrap();
        tracer.stop_transaction(Some(200));

        let queue = tracer.sender().queue();
        assert_eq!(queue.len(), 3);
        assert!(matches!(queue[0], Record::Transaction(_)));
        assert!(matches!(queue[1], Record::Span(_)));
        assert!(matches!(queue[2], Record::Span(_)));
    }

    #[test]
    fn queue_threshold_triggers_auto_flush() {
        let mut tracer = tracer_with(Config::new().with_flush_threshold(3));
        tracer.start_transaction("a", "cli");
        tracer.stop_transaction(None);
        assert_eq!(tracer.sender().flush_count(), 0);

        tracer.start_transaction("b", "cli");
        tracer.stop_transaction(None);
        // still below the threshold of 3 queued records
        assert_eq!(tracer.sender().flush_count(), 0);

        tracer.start_transaction("c", "cli");
        tracer.stop_transaction(None);
        assert_eq!(tracer.sender().flush_count(), 1);
        assert_eq!(tracer.sender().queued(), 0);
    }

    #[test]
    fn stopping_a_stale_transaction_keeps_the_current_one() {
        let mut tracer = tracer();
        let first = tracer.start_transaction("first", "request");
        let second = tracer.start_transaction("second", "request");

        tracer.stop_transaction_by_id(first, Some(503)).unwrap();
        assert_eq!(tracer.current_transaction().unwrap().id(), second);

        let records = tracer.sender().records();
        let Record::Transaction(txn) = records[0] else {
            panic!("expected a transaction record");
        };
        assert_eq!(txn.id(), first);
        assert_eq!(txn.result(), Some("HTTP 5xx"));
    }

    #[test]
    fn stopping_an_unknown_transaction_fails() {
        let mut tracer = tracer();
        tracer.start_transaction("only", "request");
        let unknown = SpanId::random();
        assert_eq!(
            tracer.stop_transaction_by_id(unknown, None),
            Err(AgentError::TransactionNotFound(unknown))
        );
        assert!(tracer.current_transaction().is_some());
    }

    #[test]
    fn result_codes_map_to_coarse_buckets() {
        assert_eq!(http_result(204), "HTTP 2xx");
        assert_eq!(http_result(301), "HTTP 3xx");
        assert_eq!(http_result(404), "HTTP 4xx");
        assert_eq!(http_result(503), "HTTP 5xx");
        assert_eq!(http_result(600), "HTTP 600");
    }

    #[test]
    fn errors_bypass_the_batching_threshold() {
        let mut tracer = tracer();
        let txn_id = tracer.start_transaction("GET /", "request");
        let span = tracer.start_span("SELECT", "db").unwrap();

        let failure = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        tracer.capture_error(&failure);

        // nowhere near the threshold of 100, yet a send attempt happened
        assert_eq!(tracer.sender().flush_count(), 1);
        assert_eq!(tracer.sender().error_count(), 1);

        let records = tracer.sender().records();
        let Record::Error(event) = records[0] else {
            panic!("expected an error record");
        };
        assert_eq!(event.transaction_id(), Some(txn_id));
        assert_eq!(event.parent_id(), Some(span));

        tracer.stop_span(span).unwrap();
        tracer.stop_transaction(Some(500));
    }

    #[test]
    fn errors_without_a_transaction_are_unbound() {
        let mut tracer = tracer();
        tracer.capture_message("lost in space");
        let records = tracer.sender().records();
        let Record::Error(event) = records[0] else {
            panic!("expected an error record");
        };
        assert_eq!(event.trace_id(), None);
        assert_eq!(event.transaction_id(), None);
    }

    #[test]
    fn capture_current_span_stops_the_span_on_success() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");

        let value: Result<i32, io::Error> =
            tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| Ok(42));
        assert_eq!(value.unwrap(), 42);

        let txn = tracer.current_transaction().unwrap();
        assert_eq!(txn.spans().len(), 1);
        assert!(txn.spans()[0].duration().is_some());
    }

    #[test]
    fn capture_current_span_captures_and_rethrows_errors() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");

        let result: Result<(), io::Error> =
            tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| {
                Err(io::Error::new(io::ErrorKind::Other, "boom"))
            });

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(tracer.sender().error_count(), 1);
        // the error was captured while the span was still open
        let span_id = tracer.current_transaction().unwrap().spans()[0].id();
        let records = tracer.sender().records();
        let Record::Error(event) = records[0] else {
            panic!("expected an error record");
        };
        assert_eq!(event.parent_id(), Some(span_id));
        assert!(tracer.current_transaction().unwrap().spans()[0]
            .duration()
            .is_some());
    }

    #[test]
    fn capture_current_span_closes_the_span_on_panic() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");

        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), io::Error> =
                tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| {
                    panic!("kaboom")
                });
        }));
        assert!(caught.is_err());

        assert_eq!(tracer.sender().error_count(), 1);
        let txn = tracer.current_transaction().unwrap();
        assert!(txn.spans()[0].duration().is_some());
    }

    #[test]
    fn capture_current_span_nests_through_the_tracer_argument() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");

        let _: Result<(), io::Error> =
            tracer.capture_current_span(SpanBuilder::new("outer", "app"), |t| {
                let inner = t.start_span("inner", "db").unwrap();
                t.stop_span(inner).unwrap();
                Ok(())
            });

        let txn = tracer.current_transaction().unwrap();
        assert_eq!(txn.spans().len(), 2);
        assert_eq!(txn.spans()[1].parent_id(), txn.spans()[0].id());
    }

    #[test]
    fn span_cap_counts_dropped_spans() {
        let mut tracer = tracer_with(Config::new().with_transaction_max_spans(2));
        tracer.start_transaction("GET /", "request");
        for name in ["a", "b", "c", "d"] {
            let span = tracer.start_span(name, "db").unwrap();
            tracer.stop_span(span).unwrap();
        }

        let txn = tracer.current_transaction().unwrap();
        assert_eq!(txn.spans().len(), 2);
        assert_eq!(txn.span_count().started, 2);
        assert_eq!(txn.span_count().dropped, 2);
    }

    #[test]
    fn unsampled_transactions_still_run_their_spans() {
        let mut tracer = tracer_with(Config::new().with_sample_rate(0.0));
        tracer.start_transaction("GET /", "request");
        let span = tracer.start_span("SELECT", "db").unwrap();
        tracer.stop_span(span).unwrap();
        tracer.stop_transaction(Some(200));
        assert!(tracer.sender().records().is_empty());
    }

    #[test]
    fn disabled_agent_is_a_pass_through() {
        let mut tracer = tracer_with(Config::new().with_enabled(false));
        tracer.start_transaction("GET /", "request");
        tracer
            .current_transaction()
            .unwrap()
            .set_label("key", Value::from("value"));

        let span = tracer.start_span("SELECT", "db").unwrap();
        tracer.stop_span(span).unwrap();

        let value: Result<i32, io::Error> =
            tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| Ok(7));
        assert_eq!(value.unwrap(), 7);

        let failure = io::Error::new(io::ErrorKind::Other, "ignored");
        tracer.capture_error(&failure);
        tracer.stop_transaction(Some(200));

        assert!(tracer.sender().records().is_empty());
        assert_eq!(tracer.sender().flush_count(), 0);
    }

    #[test]
    fn double_stop_span_is_tolerated() {
        let mut tracer = tracer();
        tracer.start_transaction("GET /", "request");
        let span = tracer.start_span("SELECT", "db").unwrap();
        tracer.stop_span(span).unwrap();
        tracer.stop_span(span).unwrap();

        let unknown = SpanId::random();
        assert_eq!(
            tracer.stop_span(unknown).unwrap_err(),
            AgentError::SpanNotFound(unknown)
        );
    }
}
