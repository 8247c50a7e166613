use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::ReasoningEffort;
use async_openai::types::responses::{
    AllowedTools, Content, CreateResponse, CreateResponseArgs, Input, Location, Mcp,
    OutputContent, ReasoningConfig, ReasoningSummary, RequireApproval, RequireApprovalPolicy,
    Response, ToolDefinition, WebSearchContextSize, WebSearchPreview,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, info};

use super::retry::{RetryConfig, is_retryable_http_error, retry_with_backoff};
use super::{SearchProvider, SearchReply, SearchRequest};
use crate::config::SearchSettings;
use crate::error::FamiliarError;

/// Remote MCP server the agent may use to read generated GitHub wikis
pub const DEEPWIKI_MCP_URL: &str = "https://mcp.deepwiki.com/mcp";

const DEEPWIKI_TOOLS: [&str; 3] = ["read_wiki_structure", "read_wiki_contents", "ask_question"];

/// Search agent backed by the OpenAI Responses API with web search enabled
pub struct OpenAiResponses {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryConfig,
}

impl OpenAiResponses {
    pub fn new(api_key: impl Into<String>, settings: &SearchSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(settings.base_url.trim_end_matches('/'));

        // retries are driven by `retry_with_backoff`, so the client gives up at once
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http)
                .with_backoff(backoff),
            model: settings.model.clone(),
            retry: RetryConfig {
                max_retries: settings.max_retries,
                ..RetryConfig::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, request: &CreateResponse) -> Result<Response> {
        self.client
            .responses()
            .create(request.clone())
            .await
            .map_err(|e| anyhow::Error::from(classify(e)))
    }
}

#[async_trait]
impl SearchProvider for OpenAiResponses {
    fn name(&self) -> &str {
        "openai"
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchReply> {
        let body = build_request(&self.model, request)?;
        let body = &body;

        info!(
            model = %self.model,
            wikis = request.with_github_wikis,
            slow = request.slow_mode,
            "sending search prompt"
        );

        let response =
            retry_with_backoff(&self.retry, "openai_responses", move || self.send(body)).await?;

        if let Some(error) = response.error {
            return Ok(SearchReply::Failed(error.message));
        }

        let text = output_text(&response);
        debug!(chars = text.len(), "search agent answered");
        Ok(SearchReply::Answer(text))
    }
}

/// Request for `POST /responses`
pub(crate) fn build_request(model: &str, request: &SearchRequest) -> Result<CreateResponse> {
    let mut tools = vec![ToolDefinition::WebSearchPreview(WebSearchPreview {
        user_location: Some(Location {
            kind: "approximate".to_string(),
            country: Some("US".to_string()),
            ..Default::default()
        }),
        search_context_size: Some(WebSearchContextSize::High),
        ..Default::default()
    })];

    if request.with_github_wikis {
        tools.push(ToolDefinition::Mcp(Mcp {
            server_label: "deepwiki".to_string(),
            server_url: DEEPWIKI_MCP_URL.to_string(),
            allowed_tools: Some(AllowedTools::List(
                DEEPWIKI_TOOLS.iter().map(|t| t.to_string()).collect(),
            )),
            require_approval: Some(RequireApproval::Policy(RequireApprovalPolicy::Never)),
            ..Default::default()
        }));
    }

    let effort = if request.slow_mode {
        ReasoningEffort::High
    } else {
        ReasoningEffort::Medium
    };

    CreateResponseArgs::default()
        .model(model)
        .input(Input::Text(request.prompt.clone()))
        .reasoning(ReasoningConfig {
            effort: Some(effort),
            summary: Some(ReasoningSummary::Auto),
            ..Default::default()
        })
        .tools(tools)
        .parallel_tool_calls(true)
        .store(true)
        .build()
        .context("failed to build search request")
}

/// Every `output_text` part of every message, in order
fn output_text(response: &Response) -> String {
    response
        .output
        .iter()
        .filter_map(|item| match item {
            OutputContent::Message(message) => Some(message),
            _ => None,
        })
        .flat_map(|message| message.content.iter())
        .filter_map(|part| match part {
            Content::OutputText(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}

fn classify(error: OpenAIError) -> FamiliarError {
    let retryable = match &error {
        OpenAIError::Reqwest(e) => is_retryable_http_error(e),
        OpenAIError::ApiError(e) => is_transient_api_error(e),
        _ => false,
    };
    FamiliarError::SearchAgent {
        message: error.to_string(),
        retryable,
    }
}

/// Server errors reach us with neither a type nor a code; their bodies are not JSON
fn is_transient_api_error(error: &ApiError) -> bool {
    match (error.r#type.as_deref(), error.code.as_deref()) {
        (None, None) => true,
        (Some("server_error"), _) => true,
        (_, Some("rate_limit_exceeded")) => true,
        _ => false,
    }
}
