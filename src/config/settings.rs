use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use super::FileConfig;
use crate::error::FamiliarError;

pub const CONFIG_FILE_NAME: &str = "familiar.toml";

const DEFAULT_NOTEBOOK: &str = "familiar";
const DEFAULT_NB_PROGRAM: &str = "nb";
const DEFAULT_HOST_PROGRAM: &str = "claude";
const DEFAULT_SEARCH_MODEL: &str = "o3";
const DEFAULT_SEARCH_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_SEARCH_RETRIES: u32 = 2;
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 600;

/// Process-wide configuration, built once at startup and handed to each component
#[derive(Debug, Clone)]
pub struct Config {
    /// Notebook the notebook tools operate on
    pub notebook: String,
    /// Host assistant's user configuration directory
    pub claude_dir: PathBuf,
    pub nb_program: String,
    pub host_program: String,
    /// Upper bound on a single external command; `None` waits forever
    pub command_timeout: Option<Duration>,
    pub openai_api_key: Option<String>,
    pub github_token: Option<String>,
    /// Path of the running binary, registered as the `search` MCP server
    pub executable: PathBuf,
    pub search: SearchSettings,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub model: String,
    pub base_url: String,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment and an optional TOML file.
    ///
    /// An explicit `config_path` must exist; otherwise `<claude_dir>/familiar.toml`
    /// is read when present.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let executable =
            std::env::current_exe().context("could not locate the running executable")?;
        Self::load_with(config_path, &home, executable, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with the environment supplied by the caller
    pub fn load_with<F>(
        config_path: Option<&Path>,
        home: &Path,
        executable: PathBuf,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_path {
            Some(path) => FileConfig::read(path)?,
            None => {
                let dir = non_empty(env("CLAUDE_DIR"))
                    .map(PathBuf::from)
                    .unwrap_or_else(|| home.join(".claude"));
                FileConfig::read_optional(&dir.join(CONFIG_FILE_NAME))?
            }
        };
        Ok(Self::resolve(file, home, executable, env))
    }

    /// Merge defaults, file values and environment values (highest precedence)
    pub fn resolve<F>(file: FileConfig, home: &Path, executable: PathBuf, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| non_empty(env(key));

        let notebook = env("NOTEBOOK_NAME")
            .or(file.notebook)
            .unwrap_or_else(|| DEFAULT_NOTEBOOK.to_string());
        let claude_dir = env("CLAUDE_DIR")
            .map(PathBuf::from)
            .or(file.claude_dir)
            .unwrap_or_else(|| home.join(".claude"));

        let config = Self {
            notebook,
            claude_dir,
            nb_program: file
                .nb_program
                .unwrap_or_else(|| DEFAULT_NB_PROGRAM.to_string()),
            host_program: file
                .host_program
                .unwrap_or_else(|| DEFAULT_HOST_PROGRAM.to_string()),
            command_timeout: file.command_timeout_secs.map(Duration::from_secs),
            openai_api_key: env("OPENAI_API_KEY"),
            github_token: env("GITHUB_PERSONAL_ACCESS_TOKEN"),
            executable,
            search: SearchSettings {
                model: file
                    .search
                    .model
                    .unwrap_or_else(|| DEFAULT_SEARCH_MODEL.to_string()),
                base_url: file
                    .search
                    .base_url
                    .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
                max_retries: file.search.max_retries.unwrap_or(DEFAULT_SEARCH_RETRIES),
                request_timeout: Duration::from_secs(
                    file.search
                        .request_timeout_secs
                        .unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS),
                ),
            },
        };

        debug!(
            notebook = %config.notebook,
            claude_dir = %config.claude_dir.display(),
            openai = config.openai_api_key.is_some(),
            github = config.github_token.is_some(),
            "configuration resolved"
        );
        config
    }

    /// The OpenAI key, or a missing-credential error for components that cannot run without it
    pub fn require_openai_key(&self) -> Result<&str, FamiliarError> {
        self.openai_api_key
            .as_deref()
            .ok_or(FamiliarError::MissingCredential("OPENAI_API_KEY"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
