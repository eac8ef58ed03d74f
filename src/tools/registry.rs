//! Tool registry: the fixed catalog of tools offered to the model, plus
//! validated, total dispatch.

use std::sync::Arc;

use tracing::warn;

use super::arguments::ToolArguments;
use super::builtin::aurora_tools;
use super::tool::Tool;
use super::validation::validate_arguments;
use crate::error::AuroraError;
use crate::invoker::ToolDefinition;
use crate::storage::ConversationStore;
use crate::types::AgentToolCall;

/// A fixed, named set of tools.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// The standard Aurora toolkit wired to a store.
    pub fn aurora(store: Arc<dyn ConversationStore>) -> Self {
        Self::new(aurora_tools(store))
    }

    /// Tool schemas for the model invoker, or `None` when the registry is
    /// empty.
    pub fn definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(
            self.tools
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters().schema.clone(),
                })
                .collect(),
        )
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one tool call and always produce result text.
    ///
    /// Unknown tools, schema violations, and handler errors all become
    /// descriptive strings; nothing escapes into the agent loop.
    pub async fn dispatch(&self, call: &AgentToolCall) -> String {
        match self.try_dispatch(call).await {
            Ok(text) => text,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool invocation failed");
                format!("Error: {e}")
            }
        }
    }

    async fn try_dispatch(&self, call: &AgentToolCall) -> Result<String, AuroraError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AuroraError::tool(&call.name, "tool not found"))?;

        validate_arguments(&call.arguments, &tool.parameters().schema)
            .map_err(|message| AuroraError::tool(&call.name, message))?;

        let args = ToolArguments::new(call.arguments.clone());
        tool.execute(&args).await
    }
}
