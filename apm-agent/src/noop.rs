//! No-op tracer impl
//!
//! Returned when tracing is switched off entirely. It is intended to have
//! minimal resource utilization and runtime impact, while keeping
//! instrumented code paths behaving exactly as with a real tracer.

use crate::error::{AgentResult, SendResult};
use crate::model::{SpanBuilder, Transaction};
use crate::trace_context::{SpanId, TraceContext};
use crate::tracer::Tracer;

/// A [`Tracer`] that tracks nothing and ships nothing.
///
/// Span and transaction ids handed out are the invalid all-zero ids; work
/// passed to [`capture_current_span`] still runs and its result is returned
/// untouched.
///
/// [`capture_current_span`]: Tracer::capture_current_span
#[derive(Clone, Debug, Default)]
pub struct NoopTracer {
    _private: (),
}

impl NoopTracer {
    /// Create a new no-op tracer.
    pub fn new() -> Self {
        NoopTracer { _private: () }
    }
}

impl Tracer for NoopTracer {
    fn start_transaction_from(
        &mut self,
        _name: &str,
        _transaction_type: &str,
        _remote: Option<TraceContext>,
    ) -> SpanId {
        SpanId::INVALID
    }

    fn current_transaction(&mut self) -> Option<&mut Transaction> {
        None
    }

    fn stop_transaction(&mut self, _result_code: Option<u16>) {
        // Ignored
    }

    fn stop_transaction_by_id(
        &mut self,
        _id: SpanId,
        _result_code: Option<u16>,
    ) -> AgentResult<()> {
        Ok(())
    }

    fn start_span_with(&mut self, _builder: SpanBuilder) -> AgentResult<SpanId> {
        Ok(SpanId::INVALID)
    }

    fn stop_span(&mut self, _id: SpanId) -> AgentResult<()> {
        Ok(())
    }

    fn capture_error(&mut self, _error: &(dyn std::error::Error + 'static)) {
        // Ignored
    }

    fn capture_message(&mut self, _message: &str) {
        // Ignored
    }

    fn trace_context(&self) -> Option<TraceContext> {
        None
    }

    fn flush(&mut self) -> SendResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::Extractor;
    use std::collections::HashMap;
    use std::io;

    #[test]
    fn every_operation_is_a_cheap_no_op() {
        let mut tracer = NoopTracer::new();
        assert_eq!(tracer.start_transaction("GET /", "request"), SpanId::INVALID);
        assert!(tracer.current_transaction().is_none());
        assert_eq!(tracer.start_span("SELECT", "db"), Ok(SpanId::INVALID));
        assert_eq!(tracer.stop_span(SpanId::INVALID), Ok(()));
        tracer.stop_transaction(Some(200));
        assert!(tracer.flush().is_ok());
    }

    #[test]
    fn work_still_runs_and_errors_pass_through() {
        let mut tracer = NoopTracer::new();
        let ok: Result<i32, io::Error> =
            tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| Ok(5));
        assert_eq!(ok.unwrap(), 5);

        let err: Result<(), io::Error> =
            tracer.capture_current_span(SpanBuilder::new("work", "app"), |_| {
                Err(io::Error::new(io::ErrorKind::Other, "untouched"))
            });
        assert_eq!(err.unwrap_err().to_string(), "untouched");
    }

    #[test]
    fn no_headers_are_written() {
        let tracer = NoopTracer::new();
        let mut carrier: HashMap<String, String> = HashMap::new();
        tracer.inject_context(&mut carrier);
        assert!(Extractor::keys(&carrier).is_empty());
    }
}
