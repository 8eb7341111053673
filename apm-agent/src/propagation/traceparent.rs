//! # W3C Trace Context headers
//!
//! `traceparent: 00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`
//!
//! Four `-`-separated fields: version, trace-id, parent-id and trace-flags.
//! See the [W3C specification] for details.
//!
//! [W3C specification]: https://www.w3.org/TR/trace-context/

use crate::propagation::{Extractor, Injector};
use crate::trace_context::{SpanId, TraceContext, TraceId};

const SUPPORTED_VERSION: u8 = 0;
const MAX_VERSION: u8 = 254;
const SAMPLED_FLAG: u8 = 0x01;

pub(crate) const TRACEPARENT_HEADER: &str = "traceparent";
pub(crate) const TRACESTATE_HEADER: &str = "tracestate";

fn lowercase_hex(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Extract a trace context from a W3C `traceparent` header.
pub fn extract(extractor: &dyn Extractor) -> Result<TraceContext, ()> {
    let header_value = extractor.get(TRACEPARENT_HEADER).unwrap_or("").trim();
    let parts = header_value.split_terminator('-').collect::<Vec<&str>>();
    // Ensure parts are not out of range.
    if parts.len() < 4 {
        return Err(());
    }

    // Ensure version is a two digit hex field within range; for version 0
    // there must be exactly 4 parts.
    if parts[0].len() != 2 || !lowercase_hex(parts[0]) {
        return Err(());
    }
    let version = u8::from_str_radix(parts[0], 16).map_err(|_| ())?;
    if version > MAX_VERSION || version == SUPPORTED_VERSION && parts.len() != 4 {
        return Err(());
    }

    // Parse trace id section, which must be exactly 32 lowercase hex chars.
    if parts[1].len() != 32 || !lowercase_hex(parts[1]) {
        return Err(());
    }
    let trace_id = TraceId::from_hex(parts[1]).map_err(|_| ())?;

    // Parse parent id section, which must be exactly 16 lowercase hex chars.
    if parts[2].len() != 16 || !lowercase_hex(parts[2]) {
        return Err(());
    }
    let span_id = SpanId::from_hex(parts[2]).map_err(|_| ())?;

    // Parse trace flags section.
    if parts[3].len() != 2 || !lowercase_hex(parts[3]) {
        return Err(());
    }
    let flags = u8::from_str_radix(parts[3], 16).map_err(|_| ())?;

    let cx = TraceContext::new(trace_id, span_id, flags & SAMPLED_FLAG == SAMPLED_FLAG);
    // All-zero ids are invalid per the W3C spec.
    if !cx.is_valid() {
        return Err(());
    }

    Ok(cx)
}

/// Write `traceparent` (and an always-empty `tracestate`) for `cx`.
pub fn inject(cx: &TraceContext, injector: &mut dyn Injector) {
    if !cx.is_valid() {
        return;
    }
    let flags: u8 = if cx.sampled { SAMPLED_FLAG } else { 0 };
    injector.set(
        TRACEPARENT_HEADER,
        format!(
            "{:02x}-{}-{}-{:02x}",
            SUPPORTED_VERSION, cx.trace_id, cx.parent_span_id, flags
        ),
    );
    injector.set(TRACESTATE_HEADER, String::new());
}
