use std::cell::RefCell;
use std::fmt;
use std::num::ParseIntError;

use rand::{rngs, Rng, SeedableRng};

thread_local! {
    /// Store random number generator for each thread
    static CURRENT_RNG: RefCell<rngs::StdRng> = RefCell::new(rngs::StdRng::from_entropy());
}

/// A 16-byte value which identifies a given trace.
///
/// The id is valid if it contains at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Invalid trace id
    pub const INVALID: TraceId = TraceId(0);

    /// Generate a new trace id from the thread-local random number generator.
    pub fn random() -> Self {
        CURRENT_RNG.with(|rng| TraceId(rng.borrow_mut().gen::<u128>()))
    }

    /// Create a trace id from its representation as a byte array.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    /// Return the representation of this trace id as a byte array.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Converts a string in base 16 to a trace id.
    ///
    /// # Examples
    ///
    /// ```
    /// use apm_agent::TraceId;
    ///
    /// assert!(TraceId::from_hex("58406520a006649127e371903a2de979").is_ok());
    /// assert!(TraceId::from_hex("not_hex").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u128::from_str_radix(hex, 16).map(TraceId)
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::LowerHex for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// An 8-byte value which identifies a given span or transaction.
///
/// The id is valid if it contains at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Invalid span id
    pub const INVALID: SpanId = SpanId(0);

    /// Generate a new span id from the thread-local random number generator.
    pub fn random() -> Self {
        CURRENT_RNG.with(|rng| SpanId(rng.borrow_mut().gen::<u64>()))
    }

    /// Create a span id from its representation as a byte array.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// Return the representation of this span id as a byte array.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Converts a string in base 16 to a span id.
    ///
    /// # Examples
    ///
    /// ```
    /// use apm_agent::SpanId;
    ///
    /// assert!(SpanId::from_hex("58406520a0066491").is_ok());
    /// assert!(SpanId::from_hex("not_hex").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u64::from_str_radix(hex, 16).map(SpanId)
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::LowerHex for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A 16-byte value which identifies a captured error event.
///
/// Error records use the wide id form on the wire, like trace ids.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct ErrorId(u128);

impl ErrorId {
    /// Generate a new error id from the thread-local random number generator.
    pub fn random() -> Self {
        CURRENT_RNG.with(|rng| ErrorId(rng.borrow_mut().gen::<u128>()))
    }

    /// Create an error id from its representation as a byte array.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        ErrorId(u128::from_be_bytes(bytes))
    }
}

impl From<u128> for ErrorId {
    fn from(value: u128) -> Self {
        ErrorId(value)
    }
}

impl fmt::Debug for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

/// The canonical distributed-tracing triple carried between processes.
///
/// Whatever header format a remote context arrived in, ids are normalized to
/// their fixed hex widths (32 chars for trace ids, 16 for span ids) before a
/// `TraceContext` is produced.
#[derive(Clone, Debug, PartialEq, Eq, Copy, Hash)]
pub struct TraceContext {
    /// Id of the trace this process is participating in.
    pub trace_id: TraceId,
    /// Id of the remote span (or transaction) that caused this unit of work.
    pub parent_span_id: SpanId,
    /// Whether the remote side decided to sample this trace.
    pub sampled: bool,
}

impl TraceContext {
    /// Construct a new `TraceContext`.
    pub fn new(trace_id: TraceId, parent_span_id: SpanId, sampled: bool) -> Self {
        TraceContext {
            trace_id,
            parent_span_id,
            sampled,
        }
    }

    /// Returns `true` if both ids contain at least one non-zero byte.
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.parent_span_id != SpanId::INVALID
    }
}
