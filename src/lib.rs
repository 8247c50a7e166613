pub mod config;
pub mod error;
pub mod installer;
pub mod llm;
pub mod mcp;
pub mod notebook;
pub mod runtime;

pub use config::Config;
pub use error::FamiliarError;
pub use installer::{InstallOptions, InstallReport, Installer, default_catalog};
pub use llm::{OpenAiResponses, SearchProvider};
pub use mcp::{NotebookServer, SearchServer, serve_stdio};
pub use notebook::Notebook;
pub use runtime::{CommandRunner, SystemRunner};
