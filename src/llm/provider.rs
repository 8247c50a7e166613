use anyhow::Result;
use async_trait::async_trait;

/// A question for the search agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Sent to the model verbatim as the user message
    pub prompt: String,
    /// Let the agent read generated GitHub wikis
    pub with_github_wikis: bool,
    /// Spend more reasoning effort
    pub slow_mode: bool,
}

/// Outcome of a search that reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchReply {
    /// The agent's final text
    Answer(String),
    /// The provider accepted the request but reported an error for it
    Failed(String),
}

/// Trait for search agent backends
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchReply>;

    /// Get the provider name
    fn name(&self) -> &str;
}
