use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use super::parse::{self, ListingFormat};
use super::{NewNote, Note, NotebookItem, SearchQuery};
use crate::error::FamiliarError;
use crate::runtime::{CommandRunner, Invocation, ProcessOutput};

/// A named notebook driven through the `nb` command line
pub struct Notebook {
    runner: Arc<dyn CommandRunner>,
    program: String,
    name: String,
}

impl Notebook {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch a note's metadata, last-updated time and content.
    ///
    /// The three reads are independent `nb` calls, so a note edited while
    /// they run may come back mixing two revisions.
    pub async fn show(&self, id: &str) -> Result<Note> {
        let info = self.invoke(["show", "--print", "--info", "--no-color", id]);
        let updated = self.invoke(["show", "--print", "--updated", id]);
        let content = self.invoke(["show", "--print", id]);

        let (info, updated, content) = tokio::try_join!(info, updated, content)?;

        let (filename, title) =
            parse::parse_info(&info.stdout).ok_or_else(|| FamiliarError::Parse {
                what: "nb show --info",
                output: info.stdout.clone(),
            })?;

        debug!(notebook = %self.name, id, %filename, "note loaded");

        Ok(Note {
            id: id.to_string(),
            filename,
            title,
            content: content.stdout,
            updated: updated.stdout.trim().to_string(),
        })
    }

    /// All notes in the notebook, in the order `nb` prints them
    pub async fn list(&self) -> Result<Vec<NotebookItem>> {
        let output = self.invoke(["list"]).await?;
        let items = parse::parse_listing(&output.stdout, ListingFormat::Local);
        debug!(notebook = %self.name, count = items.len(), "notes listed");
        Ok(items)
    }

    /// Create a note. Nothing about the new note is returned.
    pub async fn add(&self, note: &NewNote) -> Result<()> {
        if note.title.trim().is_empty() {
            return Err(FamiliarError::InvalidParams {
                tool: "add".to_string(),
                message: "title must not be empty".to_string(),
            }
            .into());
        }

        self.invoke(add_args(note)).await?;
        info!(notebook = %self.name, title = %note.title, tags = note.tags.len(), "note added");
        Ok(())
    }

    /// Full-text search; results may span several notebooks
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<NotebookItem>> {
        let output = self.invoke(search_args(query)).await?;
        let items = parse::parse_listing(&output.stdout, ListingFormat::CrossNotebook);
        debug!(query = %query.query, count = items.len(), "search finished");
        Ok(items)
    }

    /// Run `<nb> <notebook>:<subcommand> [args]` and require a zero exit
    async fn invoke<I, S>(&self, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let subcommand = args.next().unwrap_or_default();
        let invocation = Invocation::new(&self.program)
            .arg(format!("{}:{}", self.name, subcommand))
            .args(args);

        self.runner
            .run(&invocation)
            .await?
            .ensure_success(&self.program)
    }
}

fn add_args(note: &NewNote) -> Vec<String> {
    let mut args = vec!["add".to_string()];
    for tag in &note.tags {
        args.push("--tag".to_string());
        args.push(tag.clone());
    }
    args.extend([
        "--title".to_string(),
        note.title.clone(),
        "--content".to_string(),
        note.content.clone(),
    ]);
    args
}

fn search_args(query: &SearchQuery) -> Vec<String> {
    let mut args = vec!["search".to_string(), "-l".to_string(), query.query.clone()];
    for (flag, terms) in [("--and", &query.and), ("--or", &query.or), ("--not", &query.not)] {
        for term in terms {
            args.push(flag.to_string());
            args.push(term.clone());
        }
    }
    if !query.tags.is_empty() {
        args.push("--tags".to_string());
        args.push(query.tags.join(","));
    }
    args
}
