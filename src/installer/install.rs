use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::CatalogEntry;
use crate::error::FamiliarError;
use crate::runtime::{CommandRunner, Invocation};

/// Text `<host> mcp get` prints for a connected server
pub const INSTALLED_MARKER: &str = "Status: ✓";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Re-register every entry without checking its status first
    pub force: bool,
    /// Re-check status after registering and fail if still absent
    pub check: bool,
}

/// What an install run did, by entry name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Drives the host assistant CLI's `mcp` subcommands
pub struct Installer {
    runner: Arc<dyn CommandRunner>,
    host: String,
    claude_dir: PathBuf,
}

impl Installer {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        host: impl Into<String>,
        claude_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            host: host.into(),
            claude_dir: claude_dir.into(),
        }
    }

    /// Whether the host reports `name` as installed.
    ///
    /// Any failure to ask counts as "not installed".
    pub async fn is_installed(&self, name: &str) -> bool {
        // `mcp get` has no --scope flag; run it from the user config dir
        let invocation = Invocation::new(&self.host)
            .args(["mcp", "get", name])
            .current_dir(&self.claude_dir);

        match self.runner.run(&invocation).await {
            Ok(output) => output.success() && output.stdout.contains(INSTALLED_MARKER),
            Err(e) => {
                warn!(server = name, error = %e, "status check failed, assuming not installed");
                false
            }
        }
    }

    /// Make sure every catalog entry is registered.
    ///
    /// Status checks run concurrently; registrations run one at a time in
    /// catalog order. With `check`, the first entry still missing after
    /// registration aborts the run.
    pub async fn install(
        &self,
        catalog: &[CatalogEntry],
        options: InstallOptions,
    ) -> Result<InstallReport> {
        let mut report = InstallReport::default();

        let pending: Vec<&CatalogEntry> = if options.force {
            catalog.iter().collect()
        } else {
            let statuses =
                join_all(catalog.iter().map(|entry| self.is_installed(&entry.name))).await;

            catalog
                .iter()
                .zip(statuses)
                .filter_map(|(entry, installed)| {
                    if installed {
                        debug!(server = %entry.name, "already installed");
                        report.skipped.push(entry.name.clone());
                        None
                    } else {
                        Some(entry)
                    }
                })
                .collect()
        };

        for entry in pending {
            info!(server = %entry.name, "adding MCP server");
            self.register(entry).await?;

            if options.check && !self.is_installed(&entry.name).await {
                return Err(FamiliarError::NotInstalled(entry.name.clone()).into());
            }
            report.installed.push(entry.name.clone());
        }

        Ok(report)
    }

    async fn register(&self, entry: &CatalogEntry) -> Result<()> {
        let remove = Invocation::new(&self.host).args([
            "mcp",
            "remove",
            "--scope",
            "user",
            entry.name.as_str(),
        ]);
        match self.runner.run(&remove).await {
            Ok(output) if !output.success() => {
                debug!(server = %entry.name, "nothing to remove");
            }
            Ok(_) => debug!(server = %entry.name, "removed previous registration"),
            Err(e) => debug!(server = %entry.name, error = %e, "remove failed, ignoring"),
        }

        let payload = serde_json::to_string(&entry.config)
            .with_context(|| format!("failed to encode config for {}", entry.name))?;
        let add = Invocation::new(&self.host).args([
            "mcp",
            "add-json",
            "--scope",
            "user",
            entry.name.as_str(),
            payload.as_str(),
        ]);

        self.runner
            .run(&add)
            .await
            .with_context(|| format!("failed to register {}", entry.name))?
            .ensure_success(&self.host)
            .with_context(|| format!("failed to register {}", entry.name))?;
        Ok(())
    }
}
