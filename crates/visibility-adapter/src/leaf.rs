//! The capability interface every surface-specific leaf implements
//! (`spec.md` §4.2, §9).
//!
//! `spec.md` §9 flags "base class with virtual `executeQuery`" for
//! re-architecture, replaced by "a capability interface
//! `{executeQuery, executeHealthCheck}` and a shared, non-inherited
//! 'adapter runtime' value that wraps any capability value and applies
//! retry/rate-limit/circuit policy. Avoids inheritance chains." This
//! module is that interface; [`crate::runtime::AdapterRuntime`] is the
//! shared wrapper.

use crate::request::{AdapterRequest, AdapterResponse};
use async_trait::async_trait;

/// A surface's category, used for routing and validation policy
/// (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCategory {
    LlmApi,
    WebChatbot,
    SearchEngine,
    ECommerce,
}

/// Whether a surface needs credentials, and what kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    None,
    ApiKey,
    CapturedSession,
}

/// The capabilities a surface declares (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub streaming: bool,
    pub conversation_history: bool,
    pub system_prompt: bool,
    pub max_input_tokens: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

/// Static metadata a leaf declares about itself (`spec.md` §4.2: "All
/// leaves declare `metadata` describing capabilities, pricing, rate
/// limits, and auth requirement; the Executor reads this to decide routing
/// and validation").
#[derive(Debug, Clone)]
pub struct SurfaceMetadata {
    pub id: String,
    pub category: SurfaceCategory,
    pub auth_requirement: AuthRequirement,
    pub capabilities: Capabilities,
    pub requests_per_minute: u32,
    pub price_per_1k_input_usd: f64,
    pub price_per_1k_output_usd: f64,
}

/// The capability interface a surface-specific leaf implements.
///
/// Leaves never apply retry, rate-limit or circuit policy themselves —
/// that's [`crate::runtime::AdapterRuntime`]'s job. A leaf only knows how
/// to speak its surface's protocol.
#[async_trait]
pub trait SurfaceAdapterLeaf: Send + Sync {
    /// Static metadata describing this surface.
    fn metadata(&self) -> &SurfaceMetadata;

    /// Executes one query against the surface, returning a typed error on
    /// failure rather than raising (the retry wrapper classifies the error
    /// text itself).
    async fn execute_query(&self, request: &AdapterRequest) -> Result<AdapterResponse, String>;

    /// A lightweight health probe. The default implementation sends a
    /// trivial low-token-cap query, matching `spec.md` §4.2: "All leaves
    /// share health-check hooks (`executeHealthCheck` defaults to a
    /// trivial 'say OK' query with low token cap)".
    async fn execute_health_check(&self) -> Result<AdapterResponse, String> {
        let probe = AdapterRequest {
            max_tokens: Some(8),
            ..AdapterRequest::new("Reply with the single word OK.")
        };
        self.execute_query(&probe).await
    }
}
