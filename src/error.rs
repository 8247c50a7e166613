#[derive(Debug, thiserror::Error)]
pub enum FamiliarError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("invalid arguments for {tool}: {message}")]
    InvalidParams { tool: String, message: String },

    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    Process {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("could not parse {what} output: {output:?}")]
    Parse { what: &'static str, output: String },

    #[error("{0} not installed")]
    NotInstalled(String),

    /// `retryable` marks rate limits, server errors and dropped connections
    #[error("search agent error: {message}")]
    SearchAgent { message: String, retryable: bool },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
