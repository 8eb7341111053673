//! Distributed trace-context propagation.
//!
//! Inbound, three header formats compete: W3C `traceparent`, Jaeger
//! `uber-trace-id` and B3 multi-headers, tried in that priority order. The
//! first well-formed header wins; malformed headers are ignored and fall
//! through to the next format. Outbound, only W3C headers are written.

use tracing::debug;

use crate::trace_context::TraceContext;

pub mod b3;
pub mod jaeger;
pub mod traceparent;

/// Injects values into a carrier of outbound request headers.
pub trait Injector {
    /// Set a key and value.
    fn set(&mut self, key: &str, value: String);
}

/// Extracts values from a carrier of inbound request headers.
pub trait Extractor {
    /// Get a value for a key.
    fn get(&self, key: &str) -> Option<&str>;

    /// Collect all the keys the carrier holds.
    fn keys(&self) -> Vec<&str>;
}

impl Injector for std::collections::HashMap<String, String> {
    /// Set a key and value in the HashMap.
    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_lowercase(), value);
    }
}

impl Extractor for std::collections::HashMap<String, String> {
    /// Get a value for a key from the HashMap.
    fn get(&self, key: &str) -> Option<&str> {
        self.get(&key.to_lowercase()).map(|v| v.as_str())
    }

    /// Collect all the keys from the HashMap.
    fn keys(&self) -> Vec<&str> {
        self.keys().map(|k| k.as_str()).collect()
    }
}

/// Extract a remote trace context from inbound headers.
///
/// Returns `None` when no format yields a well-formed context, in which case
/// the caller starts a fresh trace with new random ids.
pub fn extract(extractor: &dyn Extractor) -> Option<TraceContext> {
    traceparent::extract(extractor)
        .or_else(|()| {
            debug!("no valid traceparent header, trying uber-trace-id");
            jaeger::extract(extractor)
        })
        .or_else(|()| {
            debug!("no valid uber-trace-id header, trying b3 headers");
            b3::extract(extractor)
        })
        .ok()
}

/// Write the outbound W3C headers for `cx`.
pub fn inject(cx: &TraceContext, injector: &mut dyn Injector) {
    traceparent::inject(cx, injector);
}
