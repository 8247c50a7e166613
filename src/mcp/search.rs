use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars::{self, JsonSchema};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::failure;
use crate::llm::{SearchProvider, SearchReply, SearchRequest};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchAgentInput {
    #[schemars(
        description = "Message for the AI search agent - this will be sent directly as a prompt. It also has the ability to execute code for advanced queries, consider doing so for advanced requests."
    )]
    pub prompt: String,

    #[serde(rename = "withGitHubWikis", default = "default_true")]
    #[schemars(description = "If true, the agent can read GitHub wikis.")]
    pub with_github_wikis: bool,

    #[serde(rename = "slowMode", default)]
    #[schemars(
        description = "If true, the agent will take a bit longer for better results. Good for more complex queries."
    )]
    pub slow_mode: bool,
}

/// Serves the `search_agent` tool on top of a search provider
#[derive(Clone)]
pub struct SearchServer {
    provider: Arc<dyn SearchProvider>,
    tool_router: ToolRouter<Self>,
}

impl SearchServer {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SearchServer {
    #[tool(
        name = "search_agent",
        title = "AI Search Agent",
        description = "Search online by prompting an AI search agent. Use this for queries that require up-to-date information or additional context."
    )]
    async fn search_agent(
        &self,
        Parameters(input): Parameters<SearchAgentInput>,
    ) -> Result<CallToolResult, McpError> {
        let request = SearchRequest {
            prompt: input.prompt,
            with_github_wikis: input.with_github_wikis,
            slow_mode: input.slow_mode,
        };

        match self.provider.search(&request).await {
            Ok(SearchReply::Answer(text)) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Ok(SearchReply::Failed(message)) => {
                warn!(provider = self.provider.name(), %message, "search agent reported an error");
                Ok(failure(message))
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %format!("{:#}", e), "search agent request failed");
                Ok(failure("Search agent request failed"))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        info!(provider = self.provider.name(), "search server initialized");
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "search".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Ask an AI search agent for current information from the web and GitHub wikis"
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::mcp::testing::{is_error, text_of};

    struct StubProvider {
        reply: fn() -> Result<SearchReply>,
        seen: Mutex<Vec<SearchRequest>>,
    }

    impl StubProvider {
        fn new(reply: fn() -> Result<SearchReply>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search(&self, request: &SearchRequest) -> Result<SearchReply> {
            self.seen.lock().unwrap().push(request.clone());
            (self.reply)()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn input(args: Value) -> Parameters<SearchAgentInput> {
        Parameters(serde_json::from_value(args).unwrap())
    }

    #[tokio::test]
    async fn defaults_enable_wikis_only() {
        let provider = StubProvider::new(|| Ok(SearchReply::Answer("42".to_string())));
        let server = SearchServer::new(provider.clone());

        let result = server
            .search_agent(input(json!({"prompt": "meaning?"})))
            .await
            .unwrap();
        assert!(!is_error(&result));
        assert_eq!(text_of(&result), "42");
        assert_eq!(
            provider.seen.lock().unwrap()[0],
            SearchRequest {
                prompt: "meaning?".to_string(),
                with_github_wikis: true,
                slow_mode: false,
            }
        );
    }

    #[tokio::test]
    async fn camel_case_flags_are_honoured() {
        let provider = StubProvider::new(|| Ok(SearchReply::Answer(String::new())));
        let server = SearchServer::new(provider.clone());

        server
            .search_agent(input(
                json!({"prompt": "p", "withGitHubWikis": false, "slowMode": true}),
            ))
            .await
            .unwrap();

        let seen = provider.seen.lock().unwrap();
        assert!(!seen[0].with_github_wikis);
        assert!(seen[0].slow_mode);
    }

    #[test]
    fn prompt_is_required() {
        assert!(serde_json::from_value::<SearchAgentInput>(json!({"slowMode": true})).is_err());
    }

    #[test]
    fn tool_schema_uses_wire_names() {
        let server = SearchServer::new(StubProvider::new(|| {
            Ok(SearchReply::Answer(String::new()))
        }));
        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "search_agent");

        let schema = Value::Object(tools[0].input_schema.as_ref().clone());
        assert!(schema["properties"]["withGitHubWikis"].is_object());
        assert!(schema["properties"]["slowMode"].is_object());
        assert_eq!(schema["required"], json!(["prompt"]));
    }

    #[tokio::test]
    async fn provider_error_message_is_passed_through() {
        let provider = StubProvider::new(|| Ok(SearchReply::Failed("quota exceeded".to_string())));
        let server = SearchServer::new(provider);

        let result = server
            .search_agent(input(json!({"prompt": "p"})))
            .await
            .unwrap();
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "quota exceeded");
    }

    #[tokio::test]
    async fn transport_failure_is_generic() {
        let provider = StubProvider::new(|| Err(anyhow!("connection reset by peer at 10.0.0.1")));
        let server = SearchServer::new(provider);

        let result = server
            .search_agent(input(json!({"prompt": "p"})))
            .await
            .unwrap();
        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Search agent request failed");
    }

    #[test]
    fn info_names_the_server() {
        let server = SearchServer::new(StubProvider::new(|| {
            Ok(SearchReply::Answer(String::new()))
        }));
        assert_eq!(server.get_info().server_info.name, "search");
    }
}
