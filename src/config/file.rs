use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::FamiliarError;

/// Settings read from `familiar.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Notebook the notebook tools operate on
    #[serde(default)]
    pub notebook: Option<String>,

    /// Directory of the host assistant's user configuration
    #[serde(default)]
    pub claude_dir: Option<PathBuf>,

    /// Notebook CLI program (default: `nb`)
    #[serde(default)]
    pub nb_program: Option<String>,

    /// Host assistant CLI program (default: `claude`)
    #[serde(default)]
    pub host_program: Option<String>,

    /// Upper bound on any single external command
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,

    /// Search agent backend
    #[serde(default)]
    pub search: SearchFileConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchFileConfig {
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub max_retries: Option<u32>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parse a config file from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Read a config file if it exists, otherwise fall back to defaults
    pub fn read_optional(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::read(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FamiliarError::Config(e.to_string()).into())
    }
}
