//! Running adapter statistics (`spec.md` §3, `AdapterState.stats`).

use crate::classifier::ErrorCode;
use std::collections::HashMap;

/// Total/success/fail counts, running mean latency, tokens, cost and
/// per-error-code tally for one adapter instance.
#[derive(Debug, Clone, Default)]
pub struct AdapterStats {
    total_queries: u64,
    successful_queries: u64,
    failed_queries: u64,
    mean_latency_ms: f64,
    total_input_tokens: u64,
    total_output_tokens: u64,
    total_cost_usd: f64,
    error_tally: HashMap<ErrorCode, u64>,
}

impl AdapterStats {
    /// Creates a zeroed stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the running mean latency and success counters for one
    /// successful call.
    pub fn record_success(&mut self, latency_ms: u64, input_tokens: u64, output_tokens: u64, cost_usd: f64) {
        self.total_queries += 1;
        self.successful_queries += 1;
        self.update_mean_latency(latency_ms);
        self.total_input_tokens += input_tokens;
        self.total_output_tokens += output_tokens;
        self.total_cost_usd += cost_usd;
    }

    /// Updates the running mean latency and failure counters for one
    /// failed call, tallying its error code.
    pub fn record_failure(&mut self, latency_ms: u64, code: ErrorCode) {
        self.total_queries += 1;
        self.failed_queries += 1;
        self.update_mean_latency(latency_ms);
        *self.error_tally.entry(code).or_insert(0) += 1;
    }

    fn update_mean_latency(&mut self, latency_ms: u64) {
        // Incremental mean: avoids re-summing the whole history on every
        // call (`spec.md` §3: "running mean latency").
        let n = self.total_queries as f64;
        self.mean_latency_ms += (latency_ms as f64 - self.mean_latency_ms) / n;
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }

    pub fn successful_queries(&self) -> u64 {
        self.successful_queries
    }

    pub fn failed_queries(&self) -> u64 {
        self.failed_queries
    }

    pub fn mean_latency_ms(&self) -> f64 {
        self.mean_latency_ms
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    pub fn total_cost_usd(&self) -> f64 {
        self.total_cost_usd
    }

    /// The number of failures recorded under a given error code.
    pub fn error_count(&self, code: ErrorCode) -> u64 {
        self.error_tally.get(&code).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_calls_update_counts_and_mean_latency() {
        let mut stats = AdapterStats::new();
        stats.record_success(100, 10, 20, 0.01);
        stats.record_success(200, 10, 20, 0.01);
        assert_eq!(stats.total_queries(), 2);
        assert_eq!(stats.successful_queries(), 2);
        assert_eq!(stats.mean_latency_ms(), 150.0);
        assert_eq!(stats.total_tokens(), 60);
    }

    #[test]
    fn failures_are_tallied_by_error_code() {
        let mut stats = AdapterStats::new();
        stats.record_failure(50, ErrorCode::RateLimited);
        stats.record_failure(50, ErrorCode::RateLimited);
        stats.record_failure(50, ErrorCode::Timeout);
        assert_eq!(stats.failed_queries(), 3);
        assert_eq!(stats.error_count(ErrorCode::RateLimited), 2);
        assert_eq!(stats.error_count(ErrorCode::Timeout), 1);
        assert_eq!(stats.error_count(ErrorCode::AuthFailed), 0);
    }

    #[test]
    fn invariant_after_n_successes_total_is_at_least_n() {
        let mut stats = AdapterStats::new();
        for _ in 0..10 {
            stats.record_success(10, 1, 1, 0.0);
        }
        assert_eq!(stats.successful_queries(), 10);
        assert!(stats.total_queries() >= 10);
    }
}
