//! Commonly used re-exports.

pub use crate::agent_loop::AgentLoop;
pub use crate::config::AuroraConfig;
pub use crate::error::{AuroraError, Result};
pub use crate::guard::TurnGuard;
pub use crate::invoker::{InvokerRequest, InvokerResponse, ModelInvoker, OpenAiInvoker};
pub use crate::orchestrator::TurnOrchestrator;
pub use crate::storage::{ConversationStore, MemoryStore};
pub use crate::tools::{Tool, ToolRegistry};
pub use crate::types::{
    AgentToolCall, Conversation, HistoryEntry, ImageContent, Message, ModelMessage, Role,
    TurnRequest, TurnResult,
};
