use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// How the host should launch or reach an MCP server.
///
/// Serialized as the JSON payload of `mcp add-json`, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpServerConfig {
    Stdio {
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    Sse {
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
}

impl McpServerConfig {
    pub fn stdio<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Stdio {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            headers: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn sse(url: impl Into<String>) -> Self {
        Self::Sse {
            url: url.into(),
            headers: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Stdio { env, .. } | Self::Http { env, .. } | Self::Sse { env, .. } => {
                env.insert(key.into(), value.into());
            }
        }
        self
    }

    /// Add a request header. Stdio servers have no headers, so this is a no-op for them.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Http { headers, .. } | Self::Sse { headers, .. } => {
                headers.insert(key.into(), value.into());
            }
            Self::Stdio { .. } => {}
        }
        self
    }
}

/// A named server the installer keeps registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub config: McpServerConfig,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, config: McpServerConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// The servers to register, given which credentials are configured
pub fn default_catalog(config: &Config) -> Vec<CatalogEntry> {
    let mut entries = vec![
        CatalogEntry::new(
            "deepwiki",
            McpServerConfig::http("https://mcp.deepwiki.com/mcp"),
        ),
        CatalogEntry::new(
            "context7",
            McpServerConfig::stdio("bunx", ["-y", "@upstash/context7-mcp"]),
        ),
        CatalogEntry::new(
            "cloudflare-docs",
            McpServerConfig::sse("https://docs.mcp.cloudflare.com/sse"),
        ),
    ];

    if let Some(key) = &config.openai_api_key {
        entries.push(CatalogEntry::new(
            "search",
            McpServerConfig::stdio(config.executable.to_string_lossy(), ["search"])
                .with_env("OPENAI_API_KEY", key.as_str()),
        ));
    }

    if let Some(token) = &config.github_token {
        entries.push(CatalogEntry::new(
            "github",
            McpServerConfig::stdio(
                "docker",
                [
                    "run",
                    "-i",
                    "--rm",
                    "-e",
                    "GITHUB_PERSONAL_ACCESS_TOKEN",
                    "ghcr.io/github/github-mcp-server",
                ],
            )
            .with_env("GITHUB_PERSONAL_ACCESS_TOKEN", token.as_str()),
        ));
    }

    entries
}
