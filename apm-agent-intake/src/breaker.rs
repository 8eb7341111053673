//! Circuit breaker protecting the monitored application from a down
//! collector.
//!
//! After three consecutive send failures all sends are suppressed for a
//! fixed 60 second cool-down; once the cool-down elapses the counter resets
//! and sending resumes. The state lives behind a shared handle so that every
//! sender in the process pays the timeout cost at most once per cool-down,
//! no matter how many units of work are in flight.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

const FAILURE_THRESHOLD: u32 = 3;
const COOLDOWN: Duration = Duration::from_secs(60);

static GLOBAL: Lazy<CircuitBreaker> = Lazy::new(CircuitBreaker::new);

#[derive(Debug, Default)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
}

/// Shared failure state for collector sends.
///
/// Cloning the handle shares the underlying state; checks and updates are
/// atomic increment-and-check operations, so two threads cannot both decide
/// to retry right after the cool-down expires.
#[derive(Clone, Debug)]
pub struct CircuitBreaker {
    cooldown: Duration,
    state: Arc<Mutex<BreakerState>>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        CircuitBreaker::new()
    }
}

impl CircuitBreaker {
    /// A fresh breaker with the standard 60 second cool-down.
    pub fn new() -> Self {
        CircuitBreaker::with_cooldown(COOLDOWN)
    }

    /// A fresh breaker with a custom cool-down.
    pub fn with_cooldown(cooldown: Duration) -> Self {
        CircuitBreaker {
            cooldown,
            state: Arc::new(Mutex::new(BreakerState::default())),
        }
    }

    /// The process-wide default handle.
    ///
    /// Senders built without an explicit breaker share this one, so
    /// independent tracer/sender pairs in the same process back off together.
    pub fn global() -> CircuitBreaker {
        GLOBAL.clone()
    }

    /// Whether sends are currently suppressed.
    ///
    /// Checking after the cool-down has elapsed resets the failure counter.
    pub fn is_open(&self) -> bool {
        self.is_open_at(Instant::now())
    }

    pub(crate) fn is_open_at(&self, now: Instant) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if state.failures < FAILURE_THRESHOLD {
            return false;
        }
        match state.last_failure {
            Some(at) if now.saturating_duration_since(at) >= self.cooldown => {
                state.failures = 0;
                state.last_failure = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Record a failed send.
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub(crate) fn record_failure_at(&self, now: Instant) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.failures += 1;
        state.last_failure = Some(now);
    }

    /// Record a successful send, closing the breaker.
    pub fn record_success(&self) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.failures = 0;
        state.last_failure = None;
    }

    /// Consecutive failures recorded so far.
    pub fn failures(&self) -> u32 {
        match self.state.lock() {
            Ok(state) => state.failures,
            Err(poisoned) => poisoned.into_inner().failures,
        }
    }
}
