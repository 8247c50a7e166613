//! Registers a fixed catalog of MCP servers with the host assistant CLI.

mod catalog;
mod install;

pub use catalog::{CatalogEntry, McpServerConfig, default_catalog};
pub use install::{INSTALLED_MARKER, InstallOptions, InstallReport, Installer};
