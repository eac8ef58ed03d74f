//! The History Store contract: durable conversations, messages, and
//! per-device settings.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Conversation, HistoryEntry, Message, Metadata, Role};

/// Default system prompt created lazily for a device on first settings read.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Aurora, a helpful AI assistant responding in \
    short sentences for voice conversations (1 or 2 sentences). You are friendly, helpful, and \
    maintain context across the conversation.";

/// Durable append-only conversation storage.
///
/// Every method is a suspension point; implementations must not require the
/// caller to hold any lock across calls. Message order within a conversation
/// is creation-time ascending, and every message append or metadata update
/// bumps the conversation's `updated_at`.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a conversation by id, or `ConversationNotFound`.
    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// Create a new conversation for a device.
    async fn create_conversation(
        &self,
        device_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Conversation>;

    /// The device's most-recently-updated conversation, creating one if the
    /// device has none.
    async fn get_or_create_conversation(&self, device_id: &str) -> Result<Conversation>;

    /// All conversations for a device, most recently updated first.
    async fn get_conversations_by_device(&self, device_id: &str) -> Result<Vec<Conversation>>;

    /// Append a message and bump the conversation's `updated_at`.
    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        image: Option<String>,
        metadata: Option<Metadata>,
    ) -> Result<Message>;

    /// All messages for a conversation, creation-time ascending.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// Role/content/image projection for model context, ascending, optionally
    /// capped to the most recent `limit` messages.
    async fn get_conversation_history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>>;

    /// Replace a conversation's metadata as supplied (callers own merge
    /// semantics) and bump `updated_at`.
    async fn update_conversation_metadata(
        &self,
        conversation_id: &str,
        metadata: Metadata,
    ) -> Result<Conversation>;

    /// The device's system prompt, creating default settings on first read.
    async fn get_system_prompt(&self, device_id: &str) -> Result<String>;

    /// Overwrite the device's system prompt, returning the stored value.
    async fn update_system_prompt(&self, device_id: &str, system_prompt: &str) -> Result<String>;
}
