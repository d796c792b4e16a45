//! A generic LLM-API leaf, parameterized by a provider profile
//! (`spec.md` §4.2: "build a JSON POST body containing a sequence of
//! `{role, content}` messages ... send with bearer-token auth; parse
//! provider-specific response shape into the canonical response").
//!
//! One [`LlmProviderLeaf`] instance covers any of OpenAI, Anthropic,
//! Google AI, Perplexity, xAI or Together — the differences between them
//! live entirely in the [`LlmProfile`] (endpoint, auth header shape, and
//! how to build the request body / read the response body), not in
//! separate leaf types.

use crate::leaf::{SurfaceAdapterLeaf, SurfaceMetadata};
use crate::request::{AdapterRequest, AdapterResponse, Timing, TokenUsage};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;

/// Provider-specific request/response shape. Implementations do not touch
/// the network themselves; [`LlmProviderLeaf`] owns the `reqwest::Client`
/// and calls into the profile only to build the body and parse the reply.
pub trait LlmProfile: Send + Sync {
    /// The endpoint to POST the chat completion request to.
    fn endpoint(&self) -> &str;

    /// Sets provider-specific auth on the outgoing request (bearer token,
    /// `x-api-key` header, query parameter, etc).
    fn authenticate(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder;

    /// Builds the JSON request body from a canonical request. `system`,
    /// when present, has already been resolved from `request.system_prompt`
    /// gated by whether this provider accepts a system role.
    fn build_body(&self, request: &AdapterRequest) -> Value;

    /// Extracts the assistant's reply text from the raw JSON response.
    fn extract_text(&self, body: &Value) -> Result<String, String>;

    /// Extracts `(input_tokens, output_tokens)` from the raw JSON response,
    /// when the provider reports usage.
    fn extract_usage(&self, body: &Value) -> Option<(u64, u64)>;

    /// Whether this provider accepts a separate `system` role message.
    fn supports_system_role(&self) -> bool {
        true
    }
}

/// A leaf that speaks any LLM API matching [`LlmProfile`].
pub struct LlmProviderLeaf<P: LlmProfile> {
    client: reqwest::Client,
    profile: P,
    metadata: SurfaceMetadata,
}

impl<P: LlmProfile> LlmProviderLeaf<P> {
    /// Builds a leaf from a provider profile and its declared metadata.
    pub fn new(client: reqwest::Client, profile: P, metadata: SurfaceMetadata) -> Self {
        Self {
            client,
            profile,
            metadata,
        }
    }

    fn build_messages(&self, request: &AdapterRequest) -> Vec<Value> {
        let mut messages = Vec::with_capacity(request.conversation_history.len() + 2);
        if self.profile.supports_system_role() {
            if let Some(system_prompt) = &request.system_prompt {
                messages.push(json!({"role": "system", "content": system_prompt}));
            }
        }
        for turn in &request.conversation_history {
            messages.push(json!({"role": turn.role, "content": turn.content}));
        }
        messages.push(json!({"role": "user", "content": request.query_text}));
        messages
    }
}

#[async_trait]
impl<P: LlmProfile> SurfaceAdapterLeaf for LlmProviderLeaf<P> {
    fn metadata(&self) -> &SurfaceMetadata {
        &self.metadata
    }

    async fn execute_query(&self, request: &AdapterRequest) -> Result<AdapterResponse, String> {
        let started = Instant::now();
        let mut body = self.profile.build_body(request);
        if let Some(map) = body.as_object_mut() {
            map.insert("messages".to_string(), Value::Array(self.build_messages(request)));
        }

        let builder = self.client.post(self.profile.endpoint()).json(&body);
        let builder = self.profile.authenticate(builder);

        let raw = builder
            .send()
            .await
            .map_err(|e| format!("network error contacting {}: {e}", self.metadata.id))?;

        let status = raw.status();
        let response_ms = started.elapsed().as_millis() as u64;
        let payload: Value = raw
            .json()
            .await
            .map_err(|e| format!("invalid response from {}: {e}", self.metadata.id))?;

        if !status.is_success() {
            return Err(format!("{} returned HTTP {}: {}", self.metadata.id, status, payload));
        }

        let text = self.profile.extract_text(&payload)?;
        let token_usage = self.profile.extract_usage(&payload).map(|(input, output)| {
            TokenUsage::new(
                input,
                output,
                self.metadata.price_per_1k_input_usd,
                self.metadata.price_per_1k_output_usd,
            )
        });

        let mut response = AdapterResponse::success(
            text,
            Timing {
                total_ms: started.elapsed().as_millis() as u64,
                response_ms,
                ttfb_ms: None,
            },
        );
        response.token_usage = token_usage;
        Ok(response)
    }
}
