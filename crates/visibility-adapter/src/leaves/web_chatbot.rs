//! Browser-driven web chatbot leaf (`spec.md` §4.2: ChatGPT-web,
//! Perplexity-web, Meta-AI-web, Copilot-web, X-Grok-web).
//!
//! A global browser singleton would make concurrent isolated sessions and
//! test doubles awkward, so the browser itself is an injected
//! [`BrowserProvider`] capability instead: a test double can stand in
//! without a real browser process, and multiple surfaces can run isolated
//! sessions concurrently (`spec.md` §5's `sessionIsolation`).

use crate::leaf::{SurfaceAdapterLeaf, SurfaceMetadata};
use crate::request::{AdapterRequest, AdapterResponse, Timing};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// A captured browser session: cookies, storage and user-agent captured
/// ahead of time for a surface that requires an authenticated session
/// (`spec.md` §4.2, §6: `AuthRequirement::CapturedSession`).
#[derive(Debug, Clone)]
pub struct CapturedSession {
    pub cookies: String,
    pub storage: String,
    pub user_agent: String,
}

/// The browser capability a web chatbot leaf drives. One implementation
/// wraps a real headless-browser driver; a test double can fake every
/// step without spawning a process.
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    /// Navigates a session-scoped context to `url`.
    async fn navigate(&self, session: &CapturedSession, url: &str) -> Result<(), String>;

    /// Tries each selector in order, returning the first one that's
    /// visible, or an error if none are (`spec.md` §4.2: "trying an
    /// ordered list of CSS selectors until one is visible").
    async fn find_first_visible(&self, selectors: &[&str]) -> Result<String, String>;

    /// Types text into the element matching `selector`.
    async fn fill(&self, selector: &str, text: &str) -> Result<(), String>;

    /// Activates the element matching `selector` (click/submit).
    async fn submit(&self, selector: &str) -> Result<(), String>;

    /// Waits until the response region matching `selector` stops producing
    /// new streamed tokens for `settle_duration` (`spec.md` §4.2: "wait for
    /// the response to stabilize").
    async fn wait_for_settled(&self, selector: &str, settle_duration: Duration) -> Result<(), String>;

    /// Reads the final response text from the element matching `selector`.
    async fn scrape_text(&self, selector: &str) -> Result<String, String>;

    /// Triggers the site's "start a new conversation" action, when one
    /// exists, so each query runs in a clean thread.
    async fn start_new_conversation(&self, selector: Option<&str>) -> Result<(), String>;
}

/// Per-site locators and timing for a web chatbot leaf.
pub struct WebChatbotProfile {
    pub site_url: String,
    pub input_selectors: Vec<&'static str>,
    pub submit_selectors: Vec<&'static str>,
    pub response_selectors: Vec<&'static str>,
    pub new_conversation_selector: Option<&'static str>,
    pub settle_duration: Duration,
    pub session: CapturedSession,
}

/// A leaf that drives a web chatbot through a [`BrowserProvider`].
pub struct WebChatbotLeaf<B: BrowserProvider> {
    browser: B,
    profile: WebChatbotProfile,
    metadata: SurfaceMetadata,
}

impl<B: BrowserProvider> WebChatbotLeaf<B> {
    pub fn new(browser: B, profile: WebChatbotProfile, metadata: SurfaceMetadata) -> Self {
        Self {
            browser,
            profile,
            metadata,
        }
    }
}

#[async_trait]
impl<B: BrowserProvider> SurfaceAdapterLeaf for WebChatbotLeaf<B> {
    fn metadata(&self) -> &SurfaceMetadata {
        &self.metadata
    }

    async fn execute_query(&self, request: &AdapterRequest) -> Result<AdapterResponse, String> {
        let started = Instant::now();

        self.browser
            .navigate(&self.profile.session, &self.profile.site_url)
            .await?;
        self.browser
            .start_new_conversation(self.profile.new_conversation_selector)
            .await?;

        let input_selector = self.browser.find_first_visible(&self.profile.input_selectors).await?;
        self.browser.fill(&input_selector, &request.query_text).await?;

        let submit_selector = self.browser.find_first_visible(&self.profile.submit_selectors).await?;
        self.browser.submit(&submit_selector).await?;

        let response_selector = self
            .browser
            .find_first_visible(&self.profile.response_selectors)
            .await?;
        self.browser
            .wait_for_settled(&response_selector, self.profile.settle_duration)
            .await?;
        let text = self.browser.scrape_text(&response_selector).await?;

        Ok(AdapterResponse::success(
            text,
            Timing {
                total_ms: started.elapsed().as_millis() as u64,
                response_ms: started.elapsed().as_millis() as u64,
                ttfb_ms: None,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{AuthRequirement, Capabilities, SurfaceCategory};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeBrowser {
        /// Only selectors in this set resolve as visible; everything else
        /// is treated as absent from the page, exercising the ordered
        /// selector-list fallback the same way a real DOM would.
        visible_selectors: Vec<&'static str>,
        response_text: String,
        calls: Mutex<Vec<&'static str>>,
        new_conversation_calls: AtomicUsize,
    }

    #[async_trait]
    impl BrowserProvider for FakeBrowser {
        async fn navigate(&self, _session: &CapturedSession, _url: &str) -> Result<(), String> {
            self.calls.lock().unwrap().push("navigate");
            Ok(())
        }

        async fn find_first_visible(&self, selectors: &[&str]) -> Result<String, String> {
            selectors
                .iter()
                .find(|s| self.visible_selectors.contains(s))
                .map(|s| s.to_string())
                .ok_or_else(|| "no selector visible".to_string())
        }

        async fn fill(&self, _selector: &str, _text: &str) -> Result<(), String> {
            self.calls.lock().unwrap().push("fill");
            Ok(())
        }

        async fn submit(&self, _selector: &str) -> Result<(), String> {
            self.calls.lock().unwrap().push("submit");
            Ok(())
        }

        async fn wait_for_settled(&self, _selector: &str, _settle_duration: Duration) -> Result<(), String> {
            self.calls.lock().unwrap().push("settle");
            Ok(())
        }

        async fn scrape_text(&self, _selector: &str) -> Result<String, String> {
            Ok(self.response_text.clone())
        }

        async fn start_new_conversation(&self, _selector: Option<&str>) -> Result<(), String> {
            self.new_conversation_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_metadata() -> SurfaceMetadata {
        SurfaceMetadata {
            id: "chatgpt-web".to_string(),
            category: SurfaceCategory::WebChatbot,
            auth_requirement: AuthRequirement::CapturedSession,
            capabilities: Capabilities::default(),
            requests_per_minute: 20,
            price_per_1k_input_usd: 0.0,
            price_per_1k_output_usd: 0.0,
        }
    }

    fn test_profile() -> WebChatbotProfile {
        WebChatbotProfile {
            site_url: "https://chat.example.com".to_string(),
            input_selectors: vec!["#prompt-textarea", "textarea[data-id='root']"],
            submit_selectors: vec!["button[data-testid='send-button']"],
            response_selectors: vec!["[data-message-author-role='assistant']"],
            new_conversation_selector: Some("a[href='/new']"),
            settle_duration: Duration::from_millis(500),
            session: CapturedSession {
                cookies: "session=abc".to_string(),
                storage: "{}".to_string(),
                user_agent: "test-agent".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn runs_the_full_fill_submit_settle_scrape_sequence() {
        let browser = FakeBrowser {
            visible_selectors: vec![
                "#prompt-textarea",
                "button[data-testid='send-button']",
                "[data-message-author-role='assistant']",
            ],
            response_text: "scraped reply".to_string(),
            calls: Mutex::new(Vec::new()),
            new_conversation_calls: AtomicUsize::new(0),
        };
        let leaf = WebChatbotLeaf::new(browser, test_profile(), test_metadata());
        let response = leaf.execute_query(&AdapterRequest::new("hello")).await.unwrap();

        assert!(response.success);
        assert_eq!(response.response_text.as_deref(), Some("scraped reply"));
        assert_eq!(leaf.browser.new_conversation_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *leaf.browser.calls.lock().unwrap(),
            vec!["navigate", "fill", "submit", "settle"]
        );
    }

    #[tokio::test]
    async fn falls_back_through_the_selector_list_until_one_matches() {
        let browser = FakeBrowser {
            visible_selectors: vec!["textarea[data-id='root']"],
            response_text: "reply".to_string(),
            calls: Mutex::new(Vec::new()),
            new_conversation_calls: AtomicUsize::new(0),
        };
        let found = browser
            .find_first_visible(&["#prompt-textarea", "textarea[data-id='root']"])
            .await
            .unwrap();
        assert_eq!(found, "textarea[data-id='root']");
    }

    #[tokio::test]
    async fn fails_when_no_input_selector_is_visible() {
        let browser = FakeBrowser {
            visible_selectors: vec![],
            response_text: "unreachable".to_string(),
            calls: Mutex::new(Vec::new()),
            new_conversation_calls: AtomicUsize::new(0),
        };
        let leaf = WebChatbotLeaf::new(browser, test_profile(), test_metadata());
        let err = leaf.execute_query(&AdapterRequest::new("hello")).await.unwrap_err();
        assert!(err.contains("no selector visible"));
    }
}
