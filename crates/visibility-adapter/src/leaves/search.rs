//! Search engine leaf (`spec.md` §4.2: "submit a search URL, scrape
//! organic results and — for Google — any AI-overview panel").

use crate::leaf::{SurfaceAdapterLeaf, SurfaceMetadata};
use crate::request::{AdapterRequest, AdapterResponse, Timing};
use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;

/// One organic result row.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub rank: u32,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// The scraped contents of a search results page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultSet {
    pub organic: Vec<SearchResult>,
    /// Google's AI-overview panel text, when present.
    pub ai_overview: Option<String>,
}

/// The search-page capability a search leaf drives. A real implementation
/// issues an HTTP GET against the engine's search URL and parses the
/// returned HTML; a test double can return canned results.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Submits `query` to the engine and returns the scraped result set.
    async fn search(&self, query: &str) -> Result<SearchResultSet, String>;
}

/// Per-engine configuration for a search leaf.
pub struct SearchProfile {
    pub supports_ai_overview: bool,
}

/// A leaf that drives a search engine through a [`SearchClient`].
pub struct SearchSurfaceLeaf<C: SearchClient> {
    client: C,
    profile: SearchProfile,
    metadata: SurfaceMetadata,
}

impl<C: SearchClient> SearchSurfaceLeaf<C> {
    pub fn new(client: C, profile: SearchProfile, metadata: SurfaceMetadata) -> Self {
        Self {
            client,
            profile,
            metadata,
        }
    }
}

#[async_trait]
impl<C: SearchClient> SurfaceAdapterLeaf for SearchSurfaceLeaf<C> {
    fn metadata(&self) -> &SurfaceMetadata {
        &self.metadata
    }

    async fn execute_query(&self, request: &AdapterRequest) -> Result<AdapterResponse, String> {
        let started = Instant::now();
        let mut results = self.client.search(&request.query_text).await?;
        if !self.profile.supports_ai_overview {
            results.ai_overview = None;
        }

        let response_text = results
            .ai_overview
            .clone()
            .unwrap_or_else(|| summarize_organic(&results.organic));

        let structured = json!({
            "organic": results.organic.iter().map(|r| json!({
                "rank": r.rank,
                "title": r.title,
                "url": r.url,
                "snippet": r.snippet,
            })).collect::<Vec<_>>(),
            "ai_overview": results.ai_overview,
        });

        let mut response = AdapterResponse::success(
            response_text,
            Timing {
                total_ms: started.elapsed().as_millis() as u64,
                response_ms: started.elapsed().as_millis() as u64,
                ttfb_ms: None,
            },
        );
        response.structured = Some(structured);
        Ok(response)
    }
}

fn summarize_organic(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}. {} — {}", r.rank, r.title, r.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{AuthRequirement, Capabilities, SurfaceCategory};

    struct FakeSearchClient {
        result_set: SearchResultSet,
    }

    #[async_trait]
    impl SearchClient for FakeSearchClient {
        async fn search(&self, _query: &str) -> Result<SearchResultSet, String> {
            Ok(self.result_set.clone())
        }
    }

    fn test_metadata(id: &str) -> SurfaceMetadata {
        SurfaceMetadata {
            id: id.to_string(),
            category: SurfaceCategory::SearchEngine,
            auth_requirement: AuthRequirement::None,
            capabilities: Capabilities::default(),
            requests_per_minute: 60,
            price_per_1k_input_usd: 0.0,
            price_per_1k_output_usd: 0.0,
        }
    }

    #[tokio::test]
    async fn google_leaf_prefers_the_ai_overview_as_response_text() {
        let result_set = SearchResultSet {
            organic: vec![SearchResult {
                rank: 1,
                title: "Rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                snippet: "a systems language".to_string(),
            }],
            ai_overview: Some("Rust is a systems programming language.".to_string()),
        };
        let leaf = SearchSurfaceLeaf::new(
            FakeSearchClient { result_set },
            SearchProfile {
                supports_ai_overview: true,
            },
            test_metadata("google-search"),
        );
        let response = leaf.execute_query(&AdapterRequest::new("what is rust")).await.unwrap();
        assert_eq!(
            response.response_text.as_deref(),
            Some("Rust is a systems programming language.")
        );
    }

    #[tokio::test]
    async fn bing_leaf_has_no_ai_overview_and_falls_back_to_organic_summary() {
        let result_set = SearchResultSet {
            organic: vec![SearchResult {
                rank: 1,
                title: "Rust Programming Language".to_string(),
                url: "https://rust-lang.org".to_string(),
                snippet: "a systems language".to_string(),
            }],
            ai_overview: Some("should be dropped".to_string()),
        };
        let leaf = SearchSurfaceLeaf::new(
            FakeSearchClient { result_set },
            SearchProfile {
                supports_ai_overview: false,
            },
            test_metadata("bing-search"),
        );
        let response = leaf.execute_query(&AdapterRequest::new("what is rust")).await.unwrap();
        assert_eq!(
            response.response_text.as_deref(),
            Some("1. Rust Programming Language — a systems language")
        );
        assert_eq!(response.structured.unwrap()["ai_overview"], serde_json::Value::Null);
    }
}
