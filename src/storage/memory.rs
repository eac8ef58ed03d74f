//! Mutex-guarded in-memory implementation of [`ConversationStore`].
//!
//! Backs the test suites and single-process deployments that do not need a
//! database. Identifiers are uuid v4; ordering relies on insertion order plus
//! `created_at`/`updated_at` timestamps.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ConversationStore, DEFAULT_SYSTEM_PROMPT};
use crate::error::{AuroraError, Result};
use crate::types::{Conversation, DeviceSettings, HistoryEntry, Message, Metadata, Role};

#[derive(Default)]
struct Inner {
    conversations: HashMap<String, Conversation>,
    /// Messages per conversation, in append order.
    messages: HashMap<String, Vec<Message>>,
    settings: HashMap<String, DeviceSettings>,
}

/// In-memory conversation store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner
            .conversations
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| AuroraError::ConversationNotFound(conversation_id.to_string()))
    }

    async fn create_conversation(
        &self,
        device_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            device_id: device_id.to_string(),
            created_at: now,
            updated_at: now,
            metadata: metadata.unwrap_or_default(),
        };
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        inner.messages.insert(conversation.id.clone(), Vec::new());
        Ok(conversation)
    }

    async fn get_or_create_conversation(&self, device_id: &str) -> Result<Conversation> {
        let latest = {
            let inner = self.inner.lock().expect("store lock poisoned");
            inner
                .conversations
                .values()
                .filter(|c| c.device_id == device_id)
                .max_by_key(|c| c.updated_at)
                .cloned()
        };
        match latest {
            Some(conversation) => Ok(conversation),
            None => self.create_conversation(device_id, None).await,
        }
    }

    async fn get_conversations_by_device(&self, device_id: &str) -> Result<Vec<Conversation>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut conversations: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.device_id == device_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        image: Option<String>,
        metadata: Option<Metadata>,
    ) -> Result<Message> {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let conversation = inner
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| AuroraError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            image,
            created_at: now,
            metadata: metadata.unwrap_or_default(),
        };
        inner
            .messages
            .entry(conversation_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        if !inner.conversations.contains_key(conversation_id) {
            return Err(AuroraError::ConversationNotFound(
                conversation_id.to_string(),
            ));
        }
        Ok(inner
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_conversation_history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>> {
        let messages = self.get_messages(conversation_id).await?;
        // Most recent N, still in ascending creation order.
        let start = limit
            .map(|n| messages.len().saturating_sub(n))
            .unwrap_or(0);
        Ok(messages[start..]
            .iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
                image: m.image.clone(),
            })
            .collect())
    }

    async fn update_conversation_metadata(
        &self,
        conversation_id: &str,
        metadata: Metadata,
    ) -> Result<Conversation> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let conversation = inner
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| AuroraError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.metadata = metadata;
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    async fn get_system_prompt(&self, device_id: &str) -> Result<String> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let settings = settings_entry(&mut inner, device_id);
        Ok(settings.system_prompt.clone())
    }

    async fn update_system_prompt(&self, device_id: &str, system_prompt: &str) -> Result<String> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let settings = settings_entry(&mut inner, device_id);
        settings.system_prompt = system_prompt.to_string();
        settings.updated_at = Utc::now();
        Ok(settings.system_prompt.clone())
    }
}

/// Get the device's settings row, creating defaults on first access.
fn settings_entry<'a>(inner: &'a mut Inner, device_id: &str) -> &'a mut DeviceSettings {
    inner
        .settings
        .entry(device_id.to_string())
        .or_insert_with(|| {
            let now = Utc::now();
            DeviceSettings {
                id: Uuid::new_v4().to_string(),
                device_id: device_id.to_string(),
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
                created_at: now,
                updated_at: now,
            }
        })
}
