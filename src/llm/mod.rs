mod openai;
mod provider;
mod retry;

pub use openai::{DEEPWIKI_MCP_URL, OpenAiResponses};
pub use provider::{SearchProvider, SearchReply, SearchRequest};
pub use retry::{
    RetryConfig, is_retryable_error, is_retryable_http_error, is_retryable_status, retry_with_backoff,
};
