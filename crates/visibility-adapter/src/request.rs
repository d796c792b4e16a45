//! The uniform `query(request) -> response` contract every surface adapter
//! implements (`spec.md` §4.1).

use std::time::Duration;

/// One role-tagged turn in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// `"system"`, `"user"` or `"assistant"`, surface-interpreted.
    pub role: String,
    /// The turn's content.
    pub content: String,
}

/// A request to query a surface.
#[derive(Debug, Clone)]
pub struct AdapterRequest {
    /// The query text to send.
    pub query_text: String,
    /// An optional system prompt, honored by surfaces that support one.
    pub system_prompt: Option<String>,
    /// Prior conversation turns, honored by surfaces that support history.
    pub conversation_history: Vec<ConversationTurn>,
    /// Surface-specific model identifier override.
    pub model: Option<String>,
    /// Sampling temperature, where applicable.
    pub temperature: Option<f32>,
    /// Maximum output tokens, where applicable.
    pub max_tokens: Option<u32>,
    /// Per-request timeout override; falls back to the adapter's configured
    /// default when unset.
    pub timeout_ms: Option<u64>,
}

impl AdapterRequest {
    /// Builds a minimal request with just query text.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            system_prompt: None,
            conversation_history: Vec::new(),
            model: None,
            temperature: None,
            max_tokens: None,
            timeout_ms: None,
        }
    }

    /// Returns the effective timeout, given the adapter's configured default.
    pub fn effective_timeout(&self, configured_default: Duration) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(configured_default)
    }
}

/// Token accounting and estimated cost for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenUsage {
    /// Input/prompt tokens consumed.
    pub input: u64,
    /// Output/completion tokens produced.
    pub output: u64,
    /// `input + output`.
    pub total: u64,
    /// Estimated cost in US dollars, from the adapter's price table.
    pub estimated_cost_usd: f64,
}

impl TokenUsage {
    /// Builds a usage record from input/output token counts and a price
    /// table expressed in USD per 1,000 tokens.
    pub fn new(input: u64, output: u64, price_per_1k_input: f64, price_per_1k_output: f64) -> Self {
        let estimated_cost_usd = (input as f64 / 1000.0) * price_per_1k_input
            + (output as f64 / 1000.0) * price_per_1k_output;
        Self {
            input,
            output,
            total: input + output,
            estimated_cost_usd,
        }
    }
}

/// Latency breakdown for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Total wall-clock time for the call, including retries inside the
    /// leaf (not including the retry wrapper's backoff sleeps).
    pub total_ms: u64,
    /// Time spent waiting on the response itself.
    pub response_ms: u64,
    /// Time to first byte/token, for streaming-capable surfaces.
    pub ttfb_ms: Option<u64>,
}

/// A structured error returned as a value, never raised (`spec.md` §4.1,
/// §7: "Adapter errors do not raise; they become typed values").
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterError {
    /// The classified error code.
    pub code: crate::classifier::ErrorCode,
    /// A human-readable message, typically the upstream error text.
    pub message: String,
    /// Whether the caller (the retry wrapper, then the Job Executor) should
    /// retry this error.
    pub retryable: bool,
    /// Suggested wait before retrying.
    pub retry_delay_ms: u64,
}

/// The uniform response returned by `query()`.
#[derive(Debug, Clone)]
pub struct AdapterResponse {
    /// Whether the query succeeded.
    pub success: bool,
    /// The surface's response text, when successful.
    pub response_text: Option<String>,
    /// Token usage, when the surface reports it.
    pub token_usage: Option<TokenUsage>,
    /// Latency breakdown.
    pub timing: Timing,
    /// Surface-specific structured payload (e.g. search results, citations).
    pub structured: Option<serde_json::Value>,
    /// The classified error, when `success` is false.
    pub error: Option<AdapterError>,
}

impl AdapterResponse {
    /// Builds a successful response.
    pub fn success(response_text: impl Into<String>, timing: Timing) -> Self {
        Self {
            success: true,
            response_text: Some(response_text.into()),
            token_usage: None,
            timing,
            structured: None,
            error: None,
        }
    }

    /// Builds a failure response from a classified error.
    pub fn failure(error: AdapterError, timing: Timing) -> Self {
        Self {
            success: false,
            response_text: None,
            token_usage: None,
            timing,
            structured: None,
            error: Some(error),
        }
    }
}
