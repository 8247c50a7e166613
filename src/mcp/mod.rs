//! MCP tool servers.
//!
//! Each server is an `rmcp` handler served over stdio. Tool failures come
//! back as `isError` results with a generic message; the detail is only
//! logged, and logs go to stderr because stdout carries the protocol.

mod notebook;
mod search;

pub use notebook::NotebookServer;
pub use search::SearchServer;

use anyhow::{Context, Result};
use rmcp::model::{CallToolResult, Content};
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use rmcp::{ErrorData as McpError, ServerHandler};
use serde::Serialize;
use tracing::info;

/// Serve `handler` on stdin and stdout until the client disconnects
pub async fn serve_stdio<S: ServerHandler>(handler: S) -> Result<()> {
    info!("serving MCP on stdio");

    let service = handler
        .serve(stdio())
        .await
        .context("failed to start MCP service")?;

    let reason = service.waiting().await.context("MCP service task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}

/// An error-flagged tool result
pub(crate) fn failure(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// A tool result whose single text block is `value` as JSON
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text =
        serde_json::to_string(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
