//! OpenTracing-flavored tracer.
//!
//! A thin adapter over the regular tracer for code bases instrumented with
//! OpenTracing vocabulary: one kind of span, `start_span`/`finish`, tags.
//! The first span started becomes the transaction for the unit of work;
//! nested spans become child spans. Wire-level interoperability only; this
//! is not the OpenTracing API.

use crate::config::Config;
use crate::error::{AgentResult, SendResult};
use crate::model::{SpanBuilder, Transaction, Value};
use crate::propagation::{Extractor, Injector};
use crate::sender::Sender;
use crate::trace_context::{SpanId, TraceContext};
use crate::tracer::{ApmTracer, Tracer};

const OPENTRACING_TRANSACTION_TYPE: &str = "custom";
const OPENTRACING_SPAN_TYPE: &str = "custom";

/// Handle for a span started through the [`OpenTracingTracer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtSpan {
    /// The root span of the unit of work, backed by a transaction.
    Root(SpanId),
    /// A nested span, backed by a regular span.
    Child(SpanId),
}

/// [`Tracer`] variant speaking OpenTracing vocabulary.
#[derive(Debug)]
pub struct OpenTracingTracer<S: Sender> {
    inner: ApmTracer<S>,
}

impl<S: Sender> OpenTracingTracer<S> {
    /// Create an OpenTracing-flavored tracer delivering through `sender`.
    pub fn new(config: Config, sender: S) -> Self {
        OpenTracingTracer {
            inner: ApmTracer::new(config, sender),
        }
    }

    /// The underlying sender.
    pub fn sender(&self) -> &S {
        self.inner.sender()
    }

    /// Start a span named after an OpenTracing operation.
    ///
    /// Without an active unit of work this starts the root span (a
    /// transaction); afterwards it starts nested spans under it.
    pub fn start_ot_span(&mut self, operation_name: &str) -> OtSpan {
        self.start_ot_span_from(operation_name, None)
    }

    /// Start a root span continuing a remote trace context, as extracted by
    /// [`extract_ot`](OpenTracingTracer::extract_ot).
    pub fn start_ot_span_from(
        &mut self,
        operation_name: &str,
        remote: Option<TraceContext>,
    ) -> OtSpan {
        if self.inner.current_transaction().is_none() {
            let id =
                self.inner
                    .start_transaction_from(operation_name, OPENTRACING_TRANSACTION_TYPE, remote);
            OtSpan::Root(id)
        } else {
            match self
                .inner
                .start_span_with(SpanBuilder::new(operation_name, OPENTRACING_SPAN_TYPE))
            {
                Ok(id) => OtSpan::Child(id),
                // unreachable in practice: a transaction is active here
                Err(_) => OtSpan::Root(self.inner.start_transaction(
                    operation_name,
                    OPENTRACING_TRANSACTION_TYPE,
                )),
            }
        }
    }

    /// Attach an OpenTracing tag.
    ///
    /// Tags on the root span become transaction labels; tags on child spans
    /// land in the span context.
    pub fn set_tag(&mut self, span: OtSpan, key: &str, value: impl Into<Value>) {
        match span {
            OtSpan::Root(_) => {
                if let Some(txn) = self.inner.current_transaction() {
                    txn.set_label(key, value);
                }
            }
            OtSpan::Child(id) => {
                if let Some(span) = self
                    .inner
                    .current_transaction()
                    .and_then(|txn| txn.span_mut(id))
                {
                    let mut context = crate::model::ValueMap::new();
                    context.set(key, value);
                    span.merge_context(context);
                }
            }
        }
    }

    /// Finish a span; finishing the root span stops the transaction and
    /// hands the unit of work to the sender.
    pub fn finish(&mut self, span: OtSpan) -> AgentResult<()> {
        match span {
            OtSpan::Root(id) => self.inner.stop_transaction_by_id(id, None),
            OtSpan::Child(id) => self.inner.stop_span(id),
        }
    }

    /// OpenTracing-style inject: write the active context into a carrier.
    pub fn inject_ot(&self, carrier: &mut dyn Injector) {
        self.inner.inject_context(carrier);
    }

    /// OpenTracing-style extract: read a remote context from a carrier.
    pub fn extract_ot(&self, carrier: &dyn Extractor) -> Option<TraceContext> {
        crate::propagation::extract(carrier)
    }
}

impl<S: Sender> Tracer for OpenTracingTracer<S> {
    fn start_transaction_from(
        &mut self,
        name: &str,
        transaction_type: &str,
        remote: Option<TraceContext>,
    ) -> SpanId {
        self.inner.start_transaction_from(name, transaction_type, remote)
    }

    fn current_transaction(&mut self) -> Option<&mut Transaction> {
        self.inner.current_transaction()
    }

    fn stop_transaction(&mut self, result_code: Option<u16>) {
        self.inner.stop_transaction(result_code)
    }

    fn stop_transaction_by_id(&mut self, id: SpanId, result_code: Option<u16>) -> AgentResult<()> {
        self.inner.stop_transaction_by_id(id, result_code)
    }

    fn start_span_with(&mut self, builder: SpanBuilder) -> AgentResult<SpanId> {
        self.inner.start_span_with(builder)
    }

    fn stop_span(&mut self, id: SpanId) -> AgentResult<()> {
        self.inner.stop_span(id)
    }

    fn capture_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.inner.capture_error(error)
    }

    fn capture_message(&mut self, message: &str) {
        self.inner.capture_message(message)
    }

    fn trace_context(&self) -> Option<TraceContext> {
        self.inner.trace_context()
    }

    fn flush(&mut self) -> SendResult {
        self.inner.flush()
    }
}
