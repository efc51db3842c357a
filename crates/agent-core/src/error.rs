//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Two tools registered under the same name
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Supplied arguments violate the declared parameter schema
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// Tool handler failed during execution
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Model service unreachable, errored, or rate-limited
    #[error("Transport error: {message}")]
    Transport { message: String, retryable: bool },

    /// Maximum model turns reached without a terminal answer
    #[error("Maximum turns ({0}) exceeded")]
    MaxTurnsExceeded(usize),

    /// Parse error (e.g. malformed model response)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::Transport { retryable: true, .. } | AgentError::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::DuplicateTool(name) => {
                format!("A tool named '{}' is already registered.", name)
            }
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::SchemaValidation(msg) => format!("Invalid tool input: {}", msg),
            AgentError::ToolExecution(msg) => format!("Tool error: {}", msg),
            AgentError::Transport { retryable: true, .. } => {
                "The model service is busy or unavailable. Please try again.".into()
            }
            AgentError::Transport { message, .. } => {
                format!("The model service encountered an error: {}", message)
            }
            AgentError::MaxTurnsExceeded(_) => {
                "The request took too many tool-use rounds to resolve. Please try a simpler query."
                    .into()
            }
            AgentError::Config(msg) => format!("Configuration error: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
