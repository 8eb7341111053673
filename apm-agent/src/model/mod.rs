//! Trace entities: transactions, spans, captured errors and the free-form
//! context values attached to them.

mod error;
mod span;
mod transaction;
mod value;

pub use error::{ErrorEvent, Exception};
pub use span::{Span, SpanBuilder, StackFrame};
pub use transaction::{SpanCount, Transaction};
pub use value::{Value, ValueMap};
