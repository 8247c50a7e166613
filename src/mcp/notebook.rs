use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars::{self, JsonSchema};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;
use tracing::{error, info};

use super::{failure, json_result};
use crate::notebook::{NewNote, Notebook, SearchQuery};

/// Note ids arrive as strings, but agents sometimes send bare numbers
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NoteId {
    Text(String),
    Number(u64),
}

impl NoteId {
    fn into_string(self) -> String {
        match self {
            NoteId::Text(s) => s.trim().to_string(),
            NoteId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShowInput {
    #[schemars(description = "The ID of the note to read")]
    pub id: NoteId,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddNoteInput {
    #[schemars(description = "The title for the new note")]
    pub title: String,

    #[schemars(description = "The content for the new note (markdown format)")]
    pub content: String,

    #[serde(default)]
    #[schemars(description = "Add tags to the new note")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchInput {
    #[schemars(description = "The query to search for")]
    pub query: String,

    #[serde(default)]
    #[schemars(description = "Include items matching this term")]
    pub and: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Add an OR query for items to include")]
    pub or: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Add a NOT query for items to exclude")]
    pub not: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Include notes matching specific tags")]
    pub tags: Vec<String>,
}

/// Serves one notebook's read, add and search tools
#[derive(Clone)]
pub struct NotebookServer {
    notebook: Arc<Notebook>,
    tool_router: ToolRouter<Self>,
}

impl NotebookServer {
    pub fn new(notebook: Arc<Notebook>) -> Self {
        Self {
            notebook,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl NotebookServer {
    #[tool(name = "notebook_note_show", description = "Read a note from your notebook")]
    async fn note_show(
        &self,
        Parameters(input): Parameters<ShowInput>,
    ) -> Result<CallToolResult, McpError> {
        let id = input.id.into_string();
        if id.is_empty() {
            return Ok(failure("id must not be empty"));
        }

        match self.notebook.show(&id).await {
            Ok(note) => json_result(&note),
            Err(e) => {
                error!(id = %id, error = %format!("{:#}", e), "failed to show note");
                Ok(failure("Failed to show note"))
            }
        }
    }

    #[tool(name = "notebook_notes_list", description = "List all notes in your notebook")]
    async fn notes_list(&self) -> Result<CallToolResult, McpError> {
        match self.notebook.list().await {
            Ok(items) => json_result(&items),
            Err(e) => {
                error!(error = %format!("{:#}", e), "failed to list notes");
                Ok(failure("Failed to list notes"))
            }
        }
    }

    #[tool(name = "notebook_add_note", description = "Add a new note to your notebook")]
    async fn add_note(
        &self,
        Parameters(input): Parameters<AddNoteInput>,
    ) -> Result<CallToolResult, McpError> {
        if input.title.trim().is_empty() {
            return Ok(failure("title must not be empty"));
        }

        let note = NewNote {
            title: input.title,
            content: input.content,
            tags: input.tags,
        };
        match self.notebook.add(&note).await {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(
                "Note added successfully",
            )])),
            Err(e) => {
                error!(title = %note.title, error = %format!("{:#}", e), "failed to add note");
                Ok(failure("Failed to add note"))
            }
        }
    }

    #[tool(name = "notebook_search", description = "Perform a full-text search of your notes.")]
    async fn search(
        &self,
        Parameters(input): Parameters<SearchInput>,
    ) -> Result<CallToolResult, McpError> {
        let query = SearchQuery {
            query: input.query,
            and: input.and,
            or: input.or,
            not: input.not,
            tags: input.tags,
        };
        match self.notebook.search(&query).await {
            Ok(items) => json_result(&items),
            Err(e) => {
                error!(query = %query.query, error = %format!("{:#}", e), "failed to search notes");
                Ok(failure("Failed to search notes"))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for NotebookServer {
    fn get_info(&self) -> ServerInfo {
        info!(notebook = %self.notebook.name(), "notebook server initialized");
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "notebook".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "Tools for reading, adding and searching notes in the '{}' notebook",
                self.notebook.name()
            )),
            ..Default::default()
        }
    }
}
