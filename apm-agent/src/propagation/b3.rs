//! # B3 propagation headers
//!
//! Multiple-header B3 encoding:
//!
//! ```text
//! X-B3-TraceId: {trace_id}
//! X-B3-SpanId: {span_id}
//! X-B3-Sampled: {sampling_state}
//! ```
//!
//! Only lower case hex is accepted; 16-char trace ids are left-zero-padded to
//! the canonical 32 chars. A missing sampled header means sampled.

use crate::propagation::Extractor;
use crate::trace_context::{SpanId, TraceContext, TraceId};

pub(crate) const B3_TRACE_ID_HEADER: &str = "x-b3-traceid";
pub(crate) const B3_SPAN_ID_HEADER: &str = "x-b3-spanid";
pub(crate) const B3_SAMPLED_HEADER: &str = "x-b3-sampled";

/// Extract a trace context from B3 multi-headers.
pub fn extract(extractor: &dyn Extractor) -> Result<TraceContext, ()> {
    let trace_id = extract_trace_id(extractor.get(B3_TRACE_ID_HEADER).unwrap_or(""))?;
    let span_id = extract_span_id(extractor.get(B3_SPAN_ID_HEADER).unwrap_or(""))?;
    let sampled = match extractor.get(B3_SAMPLED_HEADER) {
        Some(state) => extract_sampled_state(state)?,
        None => true,
    };

    let cx = TraceContext::new(trace_id, span_id, sampled);
    if !cx.is_valid() {
        return Err(());
    }

    Ok(cx)
}

/// Extract trace id from a hex encoded &str value.
fn extract_trace_id(trace_id: &str) -> Result<TraceId, ()> {
    // Only allow lower case hex string
    if trace_id.to_lowercase() != trace_id || (trace_id.len() != 16 && trace_id.len() != 32) {
        Err(())
    } else {
        TraceId::from_hex(trace_id).map_err(|_| ())
    }
}

/// Extract span id from a hex encoded &str value.
fn extract_span_id(span_id: &str) -> Result<SpanId, ()> {
    // Only allow lower case hex string
    if span_id.to_lowercase() != span_id || span_id.len() != 16 {
        Err(())
    } else {
        SpanId::from_hex(span_id).map_err(|_| ())
    }
}

/// Extract the sampled decision from an encoded &str value.
///
/// For legacy support and being lenient to other tracing implementations we
/// allow "true" and "false" as inputs for interop purposes; "d" marks a debug
/// trace, which is always sampled.
fn extract_sampled_state(sampled: &str) -> Result<bool, ()> {
    match sampled {
        "0" | "false" => Ok(false),
        "1" | "true" | "d" => Ok(true),
        _ => Err(()),
    }
}
