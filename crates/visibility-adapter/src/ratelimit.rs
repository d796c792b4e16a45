//! A simple windowed rate-limit counter: increment on every call, flip
//! `limited` once `max` is reached within the window, and clear on read
//! once `now >= reset_at`.

use std::time::{Duration, Instant};

const RESET_WINDOW: Duration = Duration::from_secs(60);

/// Per-adapter rate-limit tracking state.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    current_count: u32,
    max_count: u32,
    reset_at: Option<Instant>,
    limited: bool,
}

impl RateLimitState {
    /// Creates a tracker for a surface with the given requests-per-minute
    /// limit.
    pub fn new(max_count: u32) -> Self {
        Self {
            current_count: 0,
            max_count,
            reset_at: None,
            limited: false,
        }
    }

    /// Clears the window once its reset time has passed. Called before any
    /// read or mutation so callers always see fresh state.
    fn refresh(&mut self, now: Instant) {
        if let Some(reset_at) = self.reset_at {
            if now >= reset_at {
                self.current_count = 0;
                self.reset_at = None;
                self.limited = false;
            }
        }
    }

    /// Returns `Some(retry_delay)` if the window is currently exhausted,
    /// refreshing it first if its reset time has passed.
    pub fn check(&mut self, now: Instant) -> Option<Duration> {
        self.refresh(now);
        if self.limited {
            let reset_at = self.reset_at.unwrap_or(now);
            Some(reset_at.saturating_duration_since(now))
        } else {
            None
        }
    }

    /// Records one successful request, flipping to limited once the count
    /// reaches `max_count`.
    pub fn record_success(&mut self, now: Instant) {
        self.refresh(now);
        self.current_count += 1;
        if self.current_count >= self.max_count {
            self.limited = true;
            self.reset_at = Some(now + RESET_WINDOW);
        }
    }

    /// Current request count within the window, for observability.
    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    /// Whether the window is currently reporting as limited.
    pub fn is_limited(&self) -> bool {
        self.limited
    }
}
