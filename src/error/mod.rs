//! Error types for Aurora.

use thiserror::Error;

/// Primary error type for all Aurora operations.
#[derive(Error, Debug)]
pub enum AuroraError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Conversation is already being processed: {0}")]
    ConversationBusy(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Tool invocation error: {tool_name}: {message}")]
    ToolInvocation { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AuroraError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool invocation error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolInvocation {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error is guard contention on an in-flight conversation.
    ///
    /// Busy is the one condition the orchestrator surfaces as a hard error
    /// instead of an error-shaped turn result, so transports can tell
    /// "already running" apart from "failed".
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::ConversationBusy(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuroraError>;
