//! Runner error types.

use thiserror::Error;

/// Errors that can occur while running linters.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The project root is not a git repository.
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// A git invocation failed.
    #[error("git failed: {0}")]
    Git(String),

    /// A configured linter binary is missing.
    #[error("{tool} is not installed ({command}){hint}")]
    ToolMissing {
        tool: String,
        command: String,
        hint: String,
    },

    /// A linter could not be spawned or its output read.
    #[error("Failed to run {tool}: {message}")]
    Tool { tool: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a git error.
    pub fn git(message: impl Into<String>) -> Self {
        Self::Git(message.into())
    }

    /// Creates a tool execution error.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-binary error, formatting the install hint if any.
    pub fn tool_missing(tool: impl Into<String>, command: impl Into<String>, hint: Option<&str>) -> Self {
        Self::ToolMissing {
            tool: tool.into(),
            command: command.into(),
            hint: hint.map(|h| format!(". Run: {h}")).unwrap_or_default(),
        }
    }
}
