//! Access to an `nb` notebook through its command-line interface.
//!
//! The notebook program owns all storage; this module only builds argument
//! vectors for it and parses what it prints.

mod client;
pub mod parse;

pub use client::Notebook;
pub use parse::ListingFormat;

use serde::{Deserialize, Serialize};

/// One entry of a list or search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookItem {
    /// Index assigned by the notebook program, unique within its notebook
    pub id: u64,
    pub filename: String,
    pub title: String,
}

/// A single note with its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Selector the note was requested with
    pub id: String,
    pub filename: String,
    pub title: String,
    pub content: String,
    pub updated: String,
}

/// Input for creating a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    /// Markdown body
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full-text search with optional term filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Every one of these terms must also match
    #[serde(default)]
    pub and: Vec<String>,
    /// Any of these terms may match instead
    #[serde(default)]
    pub or: Vec<String>,
    /// None of these terms may match
    #[serde(default)]
    pub not: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
