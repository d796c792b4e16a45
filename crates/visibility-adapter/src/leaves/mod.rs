//! Built-in surface leaves, grouped by category (`spec.md` §4.2).

pub mod llm;
pub mod search;
pub mod web_chatbot;

pub use llm::{LlmProfile, LlmProviderLeaf};
pub use search::{SearchClient, SearchProfile, SearchResult, SearchResultSet, SearchSurfaceLeaf};
pub use web_chatbot::{BrowserProvider, WebChatbotLeaf, WebChatbotProfile};
