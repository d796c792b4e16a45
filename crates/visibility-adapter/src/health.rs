//! Health tracking and the circuit breaker from `spec.md` §4.1.
//!
//! Two candidate circuit-breaker policies were possible here —
//! 5-consecutive-failures, or success-rate-below-0.7 over a sliding
//! window — and the simpler one won: consecutive failures >= 5 opens the
//! circuit, any success closes it. There is no sliding-window
//! failure-rate tracking and no half-open probe budget; a fresh
//! `query()` call after the threshold is itself the probe, and its
//! success is what resets the tally (`spec.md` §4.1 step 2 and §4.1
//! "Health / circuit breaker").

use std::time::Instant;

/// Consecutive-failure threshold at which the circuit opens
/// (`spec.md` §4.1 step 2, §9).
pub const CONSECUTIVE_FAILURE_THRESHOLD: u32 = 5;

/// The three states a circuit can be in, per `spec.md` §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Default state: calls are permitted.
    Healthy,
    /// `consecutive_failures >= 5`: calls are fast-rejected without
    /// invoking the leaf.
    Unhealthy,
}

/// Per-adapter health/circuit-breaker state.
#[derive(Debug, Clone)]
pub struct HealthState {
    healthy: bool,
    consecutive_failures: u32,
    last_success_at: Option<Instant>,
    last_error: Option<String>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            healthy: true,
            consecutive_failures: 0,
            last_success_at: None,
            last_error: None,
        }
    }
}

impl HealthState {
    /// Creates a fresh, healthy tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current circuit state.
    pub fn state(&self) -> CircuitState {
        if self.consecutive_failures >= CONSECUTIVE_FAILURE_THRESHOLD {
            CircuitState::Unhealthy
        } else {
            CircuitState::Healthy
        }
    }

    /// Whether `query()` should fast-fail without invoking the leaf
    /// (`spec.md` §4.1 step 2).
    pub fn is_circuit_open(&self) -> bool {
        self.consecutive_failures >= CONSECUTIVE_FAILURE_THRESHOLD
    }

    /// Number of consecutive failures recorded since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// The most recent error message recorded, if any failure has occurred.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Records a successful call: resets the circuit to healthy
    /// (`spec.md` §4.1 step 3.b, "Health / circuit breaker": "On any
    /// success, reset to healthy").
    pub fn record_success(&mut self, now: Instant) {
        let was_open = self.is_circuit_open();
        self.healthy = true;
        self.consecutive_failures = 0;
        self.last_success_at = Some(now);
        self.last_error = None;
        let _ = was_open;
    }

    /// Records a surface-wide failure, incrementing the consecutive
    /// failure tally (`spec.md` §4.1 step 3.c: "if classification is
    /// surface-wide, increment consecutiveFailures and store last-error").
    pub fn record_surface_wide_failure(&mut self, message: impl Into<String>) {
        self.consecutive_failures += 1;
        self.last_error = Some(message.into());
        if self.is_circuit_open() {
            self.healthy = false;
        }
    }

    /// Timestamp of the last successful call, if any.
    pub fn last_success_at(&self) -> Option<Instant> {
        self.last_success_at
    }
}
