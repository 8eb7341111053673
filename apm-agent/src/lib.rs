//! In-process APM agent core: records execution spans of a running program,
//! assembles them into traces, decides which traces to keep, and hands them
//! to a delivery transport, without blocking or crashing the host program.
//!
//! The crate provides the tracing data model ([`Transaction`], [`Span`],
//! [`ErrorEvent`]), distributed trace-context propagation across the W3C,
//! Jaeger and B3 header formats, the [`Tracer`] state machine with its
//! sampling policy, and the [`Sender`] seam a transport implements (see the
//! `apm-agent-intake` crate for the HTTP one).
//!
//! ## Getting started
//!
//! ```
//! use apm_agent::{ApmTracer, Config, Tracer};
//! use apm_agent::testing::InMemorySender;
//!
//! // one tracer per unit of work; swap InMemorySender for a real transport
//! let mut tracer = ApmTracer::new(Config::from_env(), InMemorySender::new());
//!
//! tracer.start_transaction("GET /orders", "request");
//! let span = tracer.start_span("SELECT FROM orders", "db")?;
//! // ... do the work ...
//! tracer.stop_span(span)?;
//! tracer.stop_transaction(Some(200));
//! # Ok::<(), apm_agent::AgentError>(())
//! ```
//!
//! ## Concurrency model
//!
//! A tracer instance tracks one logical unit of work at a time. Concurrent
//! requests, jobs or messages each construct their own tracer; only the
//! delivery layer's circuit-breaker state is shared process-wide.

pub mod config;
pub mod error;
pub mod model;
mod noop;
pub mod opentracing;
pub mod propagation;
pub mod sender;
pub mod testing;
mod trace_context;
mod tracer;

pub use config::Config;
pub use error::{AgentError, AgentResult, SendError, SendResult};
pub use model::{ErrorEvent, Exception, Span, SpanBuilder, SpanCount, StackFrame, Transaction, Value, ValueMap};
pub use noop::NoopTracer;
pub use sender::{Record, Sender};
pub use trace_context::{ErrorId, SpanId, TraceContext, TraceId};
pub use tracer::{ApmTracer, Tracer};
