use thiserror::Error;

use crate::trace_context::SpanId;

/// A specialized `Result` type for tracer operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Usage errors raised by the tracer.
///
/// These signal instrumentation mistakes at the call site, not runtime
/// conditions; transport failures never surface through this type.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentError {
    /// A span can only exist inside a transaction.
    #[error("no active transaction; start a transaction before starting spans")]
    NoActiveTransaction,

    /// The span id does not belong to the active transaction.
    #[error("span {0} is not part of the active transaction")]
    SpanNotFound(SpanId),

    /// The transaction id is not tracked by this tracer.
    #[error("transaction {0} is not tracked by this tracer")]
    TransactionNotFound(SpanId),
}

/// A specialized `Result` type for send operations.
pub type SendResult = Result<(), SendError>;

/// Failures while delivering a batch to the collector.
///
/// These are recorded locally (logged, circuit-breaker counter incremented)
/// and never interrupt the monitored application.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SendError {
    /// The collector answered with a non-success status.
    #[error("collector returned HTTP status {status}")]
    Http {
        /// The response status code.
        status: u16,
    },

    /// The request never completed, e.g. timeout or connection refused.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(String),
}
