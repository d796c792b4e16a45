//! The shared adapter runtime: the retry wrapper algorithm from
//! `spec.md` §4.1, applied uniformly around any [`SurfaceAdapterLeaf`].

use crate::classifier::{classify, Classification, ErrorCode};
use crate::events::AdapterEvent;
use crate::health::HealthState;
use crate::leaf::{SurfaceAdapterLeaf, SurfaceMetadata};
use crate::ratelimit::RateLimitState;
use crate::request::{AdapterError, AdapterRequest, AdapterResponse, Timing, TokenUsage};
use crate::stats::AdapterStats;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use visibility_core::EventListeners;

/// Configuration for one adapter runtime instance.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Number of retries attempted after the initial try (`spec.md` §4.1
    /// step 3: "For attempt = 0 ... maxRetries").
    pub max_retries: u32,
    /// Effective timeout used when a request doesn't override it.
    pub default_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            default_timeout: Duration::from_secs(30),
        }
    }
}

/// Mutable per-adapter state, guarded by a single lock so concurrent
/// worker calls stay consistent (`spec.md` §5: "internal counters (stats,
/// rate-limit, health) are mutated under a per-adapter lock").
struct AdapterState {
    stats: AdapterStats,
    rate_limit: RateLimitState,
    health: HealthState,
}

/// Wraps any [`SurfaceAdapterLeaf`] with rate-limit enforcement, circuit
/// breaking, timeout and retry (`spec.md` §4.1). This is the "shared,
/// non-inherited adapter runtime value" called for in `spec.md` §9 in
/// place of a virtual-method base class.
pub struct AdapterRuntime<L: SurfaceAdapterLeaf> {
    leaf: L,
    config: RuntimeConfig,
    state: Mutex<AdapterState>,
    events: EventListeners<AdapterEvent>,
}

impl<L: SurfaceAdapterLeaf> AdapterRuntime<L> {
    /// Wraps a leaf with the given runtime configuration.
    pub fn new(leaf: L, config: RuntimeConfig) -> Self {
        let requests_per_minute = leaf.metadata().requests_per_minute;
        Self {
            leaf,
            config,
            state: Mutex::new(AdapterState {
                stats: AdapterStats::new(),
                rate_limit: RateLimitState::new(requests_per_minute),
                health: HealthState::new(),
            }),
            events: EventListeners::new(),
        }
    }

    /// Registers an event listener.
    pub fn on_event<E>(&mut self, listener: E)
    where
        E: visibility_core::EventListener<AdapterEvent> + 'static,
    {
        self.events.add(listener);
    }

    /// Static metadata for the wrapped leaf.
    pub fn metadata(&self) -> &SurfaceMetadata {
        self.leaf.metadata()
    }

    /// A read-only snapshot of the running statistics.
    pub fn stats(&self) -> AdapterStats {
        self.state.lock().expect("adapter state poisoned").stats.clone()
    }

    /// Whether the circuit is presently open.
    pub fn is_circuit_open(&self) -> bool {
        self.state.lock().expect("adapter state poisoned").health.is_circuit_open()
    }

    /// Runs the retry wrapper algorithm around one query (`spec.md` §4.1).
    pub async fn query(&self, request: AdapterRequest) -> AdapterResponse {
        let surface_id = self.leaf.metadata().id.clone();
        let call_start = Instant::now();

        // Step 1: rate-limit gate.
        if let Some(retry_delay) = {
            let mut state = self.state.lock().expect("adapter state poisoned");
            state.rate_limit.check(Instant::now())
        } {
            self.events.emit(&AdapterEvent::RateLimited {
                surface_id: surface_id.clone(),
                timestamp: Instant::now(),
                retry_delay_ms: retry_delay.as_millis() as u64,
            });
            #[cfg(feature = "tracing")]
            tracing::debug!(surface = %surface_id, "rate limited, rejecting before leaf dispatch");
            return synthetic_error(
                ErrorCode::RateLimited,
                "rate limit window exhausted",
                true,
                retry_delay.as_millis() as u64,
                call_start,
            );
        }

        // Step 2: circuit breaker gate.
        let (circuit_open, consecutive_failures) = {
            let state = self.state.lock().expect("adapter state poisoned");
            (state.health.is_circuit_open(), state.health.consecutive_failures())
        };
        if circuit_open {
            self.events.emit(&AdapterEvent::CircuitOpen {
                surface_id: surface_id.clone(),
                timestamp: Instant::now(),
                consecutive_failures,
            });
            #[cfg(feature = "tracing")]
            tracing::debug!(surface = %surface_id, consecutive_failures, "circuit open, rejecting before leaf dispatch");
            return synthetic_error(
                ErrorCode::ServiceUnavailable,
                "circuit open: too many consecutive surface-wide failures",
                true,
                self.config.default_timeout.as_millis() as u64,
                call_start,
            );
        }

        let effective_timeout = request.effective_timeout(self.config.default_timeout);
        let mut last_classification: Option<Classification> = None;
        let mut last_message = String::new();

        // Step 3: attempt loop.
        for attempt in 0..=self.config.max_retries {
            let attempt_start = Instant::now();
            let outcome = tokio::time::timeout(effective_timeout, self.leaf.execute_query(&request)).await;

            let result = match outcome {
                Ok(inner) => inner,
                Err(_) => Err("timeout: leaf did not respond within the configured deadline".to_string()),
            };

            match result {
                Ok(mut response) => {
                    let latency_ms = attempt_start.elapsed().as_millis() as u64;
                    self.record_success(latency_ms, &response);
                    self.events.emit(&AdapterEvent::QuerySucceeded {
                        surface_id: surface_id.clone(),
                        timestamp: Instant::now(),
                        latency_ms,
                    });
                    #[cfg(feature = "tracing")]
                    tracing::info!(surface = %surface_id, attempt, latency_ms, "query succeeded");
                    response.timing.total_ms = call_start.elapsed().as_millis() as u64;
                    return response;
                }
                Err(message) => {
                    let classification = classify(&message);
                    let latency_ms = attempt_start.elapsed().as_millis() as u64;
                    self.record_failure(latency_ms, classification, &message);

                    let is_last_attempt = attempt == self.config.max_retries;
                    if !classification.retryable || is_last_attempt {
                        last_classification = Some(classification);
                        last_message = message;
                        break;
                    }

                    let delay = classification.retry_delay * 2u32.pow(attempt);
                    self.events.emit(&AdapterEvent::RetryAttempt {
                        surface_id: surface_id.clone(),
                        timestamp: Instant::now(),
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    });
                    #[cfg(feature = "tracing")]
                    tracing::warn!(surface = %surface_id, attempt, code = classification.code.as_str(), delay_ms = delay.as_millis() as u64, "query failed, retrying");
                    tokio::time::sleep(delay).await;
                    last_classification = Some(classification);
                    last_message = message;
                }
            }
        }

        // Step 4: return the terminal error response.
        let classification = last_classification.unwrap_or(crate::classifier::classify(""));
        self.events.emit(&AdapterEvent::QueryFailed {
            surface_id: surface_id.clone(),
            timestamp: Instant::now(),
            code: classification.code.as_str(),
        });
        let timing = Timing {
            total_ms: call_start.elapsed().as_millis() as u64,
            response_ms: 0,
            ttfb_ms: None,
        };
        AdapterResponse::failure(
            AdapterError {
                code: classification.code,
                message: last_message,
                retryable: classification.retryable,
                retry_delay_ms: classification.retry_delay.as_millis() as u64,
            },
            timing,
        )
    }

    /// Runs the leaf's health check through the same gating (but without
    /// retry), returning the raw success/failure.
    pub async fn health_check(&self) -> AdapterResponse {
        match self.leaf.execute_health_check().await {
            Ok(response) => response,
            Err(message) => {
                let classification = classify(&message);
                AdapterResponse::failure(
                    AdapterError {
                        code: classification.code,
                        message,
                        retryable: classification.retryable,
                        retry_delay_ms: classification.retry_delay.as_millis() as u64,
                    },
                    Timing {
                        total_ms: 0,
                        response_ms: 0,
                        ttfb_ms: None,
                    },
                )
            }
        }
    }

    fn record_success(&self, latency_ms: u64, response: &AdapterResponse) {
        let mut state = self.state.lock().expect("adapter state poisoned");
        let TokenUsage { input, output, .. } = response.token_usage.unwrap_or(TokenUsage {
            input: 0,
            output: 0,
            total: 0,
            estimated_cost_usd: 0.0,
        });
        let cost = response.token_usage.map(|u| u.estimated_cost_usd).unwrap_or(0.0);
        state.stats.record_success(latency_ms, input, output, cost);
        state.rate_limit.record_success(Instant::now());
        state.health.record_success(Instant::now());
    }

    fn record_failure(&self, latency_ms: u64, classification: Classification, message: &str) {
        let mut state = self.state.lock().expect("adapter state poisoned");
        state.stats.record_failure(latency_ms, classification.code);
        if classification.surface_wide {
            state.health.record_surface_wide_failure(message);
        }
    }
}

fn synthetic_error(
    code: ErrorCode,
    message: &str,
    retryable: bool,
    retry_delay_ms: u64,
    call_start: Instant,
) -> AdapterResponse {
    AdapterResponse::failure(
        AdapterError {
            code,
            message: message.to_string(),
            retryable,
            retry_delay_ms,
        },
        Timing {
            total_ms: call_start.elapsed().as_millis() as u64,
            response_ms: 0,
            ttfb_ms: None,
        },
    )
}
