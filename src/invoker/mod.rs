//! Model invoker trait and implementations.

pub mod http;
pub mod openai;

pub use openai::OpenAiInvoker;

use async_trait::async_trait;

use crate::error::AuroraError;
use crate::types::{AgentToolCall, ModelMessage};

/// A request sent to the language model.
#[derive(Debug, Clone)]
pub struct InvokerRequest {
    /// Ordered role-tagged messages: system, prior history, current turn.
    pub messages: Vec<ModelMessage>,
    /// Tool schemas offered to the model, if any.
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from the language model: generated text plus zero or more
/// requested tool calls. Tool execution is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct InvokerResponse {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
}

/// Stateless call into a language model.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(&self, request: &InvokerRequest) -> Result<InvokerResponse, AuroraError>;
}
