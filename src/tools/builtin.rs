//! The Aurora toolkit: the five tools the assistant can call mid-turn.
//!
//! Each tool is constructed via [`AgentTool::new`] and returned as
//! `Arc<dyn Tool>`. Handlers that touch storage absorb their own failures
//! into descriptive result text, so a broken store never aborts a turn.

use std::sync::Arc;

use tracing::debug;

use crate::storage::ConversationStore;
use crate::tools::calculator;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::AgentToolParameters;
use crate::types::Metadata;

/// How many matches `search_conversations` reports at most.
const SEARCH_RESULT_LIMIT: usize = 5;

/// Create the `change_system_prompt` tool — overwrites a device's persona.
pub fn change_system_prompt_tool(store: Arc<dyn ConversationStore>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "change_system_prompt",
        "Updates your personality and behavior when users request it. ALWAYS use this tool when \
         users ask you to act differently, change your style, take on a role, or modify your \
         behavior. Examples: 'be more creative', 'act like a teacher', 'be more formal', 'write \
         rap lyrics', 'be more technical', etc.",
        AgentToolParameters::object()
            .string("deviceId", "The device ID to update the system prompt for", true)
            .string(
                "newPrompt",
                "The new system prompt that incorporates the user's requested behavior changes. \
                 Build upon your existing personality while adding the new requested traits. Be \
                 specific about how to behave in the new role/style.",
                true,
            )
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let device_id = args.get_str("deviceId")?.to_string();
                let new_prompt = args.get_str("newPrompt")?.to_string();
                debug!(device_id = %device_id, "tool change_system_prompt");

                match store.update_system_prompt(&device_id, &new_prompt).await {
                    Ok(_) => Ok(format!(
                        "System prompt successfully changed to: \"{new_prompt}\""
                    )),
                    Err(e) => Ok(format!("Error changing system prompt: {e}")),
                }
            }
        },
    ))
}

/// Create the `search_conversations` tool — case-insensitive substring search
/// over every message of a device's conversations.
pub fn search_conversations_tool(store: Arc<dyn ConversationStore>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "search_conversations",
        "Searches through past conversations for a specific device. Useful for remembering \
         previous interactions or finding specific information.",
        AgentToolParameters::object()
            .string("deviceId", "The device ID to search conversations for", true)
            .string("query", "What to search for in the conversations", true)
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let device_id = args.get_str("deviceId")?.to_string();
                let query = args.get_str("query")?.to_string();
                debug!(device_id = %device_id, query = %query, "tool search_conversations");

                let result = search_messages(store.as_ref(), &device_id, &query).await;
                match result {
                    Ok(text) => Ok(text),
                    Err(e) => Ok(format!("Error searching conversations: {e}")),
                }
            }
        },
    ))
}

async fn search_messages(
    store: &dyn ConversationStore,
    device_id: &str,
    query: &str,
) -> crate::error::Result<String> {
    let needle = query.to_lowercase();
    let conversations = store.get_conversations_by_device(device_id).await?;

    let mut found = Vec::new();
    for conversation in &conversations {
        let messages = store.get_messages(&conversation.id).await?;
        found.extend(
            messages
                .iter()
                .filter(|m| m.content.to_lowercase().contains(&needle))
                .map(|m| format!("[{}]: {}", m.role, m.content)),
        );
    }

    if found.is_empty() {
        return Ok(format!("No messages found matching \"{query}\""));
    }
    Ok(format!(
        "Found {} matching messages:\n{}",
        found.len(),
        found
            .iter()
            .take(SEARCH_RESULT_LIMIT)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Create the `update_conversation_metadata` tool — shallow-merges one key
/// into the conversation's metadata.
pub fn update_conversation_metadata_tool(store: Arc<dyn ConversationStore>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "update_conversation_metadata",
        "Updates metadata for the current conversation. Useful for storing context, preferences, \
         or state.",
        AgentToolParameters::object()
            .string("conversationId", "The conversation ID to update", true)
            .string("key", "The metadata key to set", true)
            .string("value", "The value to store", true)
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let conversation_id = args.get_str("conversationId")?.to_string();
                let key = args.get_str("key")?.to_string();
                let value = args.get_str("value")?.to_string();
                debug!(conversation_id = %conversation_id, key = %key, "tool update_conversation_metadata");

                let result = merge_metadata(store.as_ref(), &conversation_id, &key, &value).await;
                match result {
                    Ok(()) => Ok(format!(
                        "Successfully set {key} to \"{value}\" in conversation metadata"
                    )),
                    Err(e) => Ok(format!("Error updating metadata: {e}")),
                }
            }
        },
    ))
}

async fn merge_metadata(
    store: &dyn ConversationStore,
    conversation_id: &str,
    key: &str,
    value: &str,
) -> crate::error::Result<()> {
    // Read-merge-write: the store replaces metadata verbatim, so the merge
    // (new key overwrites, other keys preserved) happens here.
    let conversation = store.get_conversation(conversation_id).await?;
    let mut metadata: Metadata = conversation.metadata;
    metadata.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    store
        .update_conversation_metadata(conversation_id, metadata)
        .await?;
    Ok(())
}

/// Create the `get_conversation_context` tool — structured snapshot of the
/// conversation as pretty-printed JSON text.
pub fn get_conversation_context_tool(store: Arc<dyn ConversationStore>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "get_conversation_context",
        "Retrieves metadata and context information about the current conversation.",
        AgentToolParameters::object()
            .string("conversationId", "The conversation ID to get context for", true)
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let conversation_id = args.get_str("conversationId")?.to_string();
                debug!(conversation_id = %conversation_id, "tool get_conversation_context");

                let result = conversation_context(store.as_ref(), &conversation_id).await;
                match result {
                    Ok(text) => Ok(text),
                    Err(e) => Ok(format!("Error getting context: {e}")),
                }
            }
        },
    ))
}

async fn conversation_context(
    store: &dyn ConversationStore,
    conversation_id: &str,
) -> crate::error::Result<String> {
    let conversation = store.get_conversation(conversation_id).await?;
    let messages = store.get_messages(conversation_id).await?;

    let context = serde_json::json!({
        "id": conversation.id,
        "device_id": conversation.device_id,
        "created_at": conversation.created_at,
        "message_count": messages.len(),
        "metadata": conversation.metadata,
    });
    Ok(format!(
        "Conversation Context:\n{}",
        serde_json::to_string_pretty(&context)?
    ))
}

/// Create the `calculator` tool — restricted arithmetic evaluation.
pub fn calculator_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "calculator",
        "Performs basic mathematical calculations. Use this when the user asks you to calculate \
         something.",
        AgentToolParameters::object()
            .string(
                "expression",
                "The mathematical expression to evaluate (e.g., '2 + 2', '10 * 5')",
                true,
            )
            .build(),
        move |args| async move {
            let expression = args.get_str("expression")?.to_string();
            debug!(expression = %expression, "tool calculator");

            match calculator::evaluate(&expression) {
                Ok(value) => Ok(format!(
                    "The result of {expression} is {}",
                    calculator::format_number(value)
                )),
                Err(_) => Ok(format!(
                    "Error calculating \"{expression}\": Invalid expression"
                )),
            }
        },
    ))
}

/// All five Aurora tools wired to the given store.
pub fn aurora_tools(store: Arc<dyn ConversationStore>) -> Vec<Arc<dyn Tool>> {
    vec![
        change_system_prompt_tool(store.clone()),
        search_conversations_tool(store.clone()),
        update_conversation_metadata_tool(store.clone()),
        get_conversation_context_tool(store),
        calculator_tool(),
    ]
}
