//! Adapter-emitted events, implementing [`visibility_core::CoreEvent`].

use std::time::Instant;
use visibility_core::CoreEvent;

/// Events emitted by an [`crate::runtime::AdapterRuntime`] over the course
/// of a `query()` call.
#[derive(Debug, Clone)]
pub enum AdapterEvent {
    /// The rate-limit window rejected the call before the leaf ran.
    RateLimited {
        surface_id: String,
        timestamp: Instant,
        retry_delay_ms: u64,
    },
    /// The circuit was open; the call was rejected without invoking the leaf.
    CircuitOpen {
        surface_id: String,
        timestamp: Instant,
        consecutive_failures: u32,
    },
    /// One retry attempt is about to sleep before trying again.
    RetryAttempt {
        surface_id: String,
        timestamp: Instant,
        attempt: u32,
        delay_ms: u64,
    },
    /// The call succeeded.
    QuerySucceeded {
        surface_id: String,
        timestamp: Instant,
        latency_ms: u64,
    },
    /// The call failed permanently (no more retries left, or not retryable).
    QueryFailed {
        surface_id: String,
        timestamp: Instant,
        code: &'static str,
    },
}

impl AdapterEvent {
    fn surface(&self) -> &str {
        match self {
            AdapterEvent::RateLimited { surface_id, .. }
            | AdapterEvent::CircuitOpen { surface_id, .. }
            | AdapterEvent::RetryAttempt { surface_id, .. }
            | AdapterEvent::QuerySucceeded { surface_id, .. }
            | AdapterEvent::QueryFailed { surface_id, .. } => surface_id,
        }
    }
}

impl CoreEvent for AdapterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AdapterEvent::RateLimited { .. } => "rate_limited",
            AdapterEvent::CircuitOpen { .. } => "circuit_open",
            AdapterEvent::RetryAttempt { .. } => "retry_attempt",
            AdapterEvent::QuerySucceeded { .. } => "query_succeeded",
            AdapterEvent::QueryFailed { .. } => "query_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            AdapterEvent::RateLimited { timestamp, .. }
            | AdapterEvent::CircuitOpen { timestamp, .. }
            | AdapterEvent::RetryAttempt { timestamp, .. }
            | AdapterEvent::QuerySucceeded { timestamp, .. }
            | AdapterEvent::QueryFailed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        self.surface()
    }
}
