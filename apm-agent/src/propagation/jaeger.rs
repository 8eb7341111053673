//! # Jaeger propagation headers
//!
//! `uber-trace-id: {trace-id}:{span-id}:{parent-span-id}:{flags}`
//!
//! Ids shorter than their canonical width are left-zero-padded; the
//! parent-span-id field is deprecated and ignored.

use std::borrow::Cow;

use crate::propagation::Extractor;
use crate::trace_context::{SpanId, TraceContext, TraceId};

pub(crate) const JAEGER_HEADER: &str = "uber-trace-id";

const SAMPLED_FLAG: u8 = 0x01;

/// Extract a trace context from a Jaeger `uber-trace-id` header.
pub fn extract(extractor: &dyn Extractor) -> Result<TraceContext, ()> {
    let mut header_value = Cow::from(extractor.get(JAEGER_HEADER).unwrap_or(""));
    // if there is no :, it means header_value could be url encoded, try decode first
    if !header_value.contains(':') {
        header_value = Cow::from(header_value.replace("%3A", ":"));
    }

    let parts = header_value.split_terminator(':').collect::<Vec<&str>>();
    if parts.len() != 4 {
        return Err(());
    }

    // Ignore parts[2], the deprecated parent span id.
    let trace_id = extract_trace_id(parts[0])?;
    let span_id = extract_span_id(parts[1])?;
    let sampled = extract_sampled(parts[3])?;

    let cx = TraceContext::new(trace_id, span_id, sampled);
    if !cx.is_valid() {
        return Err(());
    }

    Ok(cx)
}

/// Extract trace id from the header, left-padding to the canonical 32 chars.
fn extract_trace_id(trace_id: &str) -> Result<TraceId, ()> {
    if trace_id.is_empty() || trace_id.len() > 32 {
        return Err(());
    }

    TraceId::from_hex(trace_id).map_err(|_| ())
}

/// Extract span id from the header, left-padding to the canonical 16 chars.
fn extract_span_id(span_id: &str) -> Result<SpanId, ()> {
    if span_id.is_empty() || span_id.len() > 16 {
        return Err(());
    }

    SpanId::from_hex(span_id).map_err(|_| ())
}

/// Extract the sampled decision from the flags field.
///
/// The first bit controls sampling, the second marks a debug trace; the
/// remaining bits are not relevant here.
fn extract_sampled(flag: &str) -> Result<bool, ()> {
    if flag.is_empty() || flag.len() > 2 {
        return Err(());
    }
    let flag = u8::from_str_radix(flag, 16).map_err(|_| ())?;
    Ok(flag & SAMPLED_FLAG == SAMPLED_FLAG)
}
