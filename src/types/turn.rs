//! Transient turn request/result types exchanged with the transport layer.

use serde::{Deserialize, Serialize};

use crate::error::AuroraError;

/// One inbound turn: a device's prompt, optionally pinned to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub prompt: String,
    /// Base64 JPEG captured alongside the utterance, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TurnRequest {
    pub fn new(device_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            conversation_id: None,
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// The outcome of one turn: the assistant's reply and where it was persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnResult {
    pub text: String,
    pub conversation_id: String,
    pub message_id: String,
}

impl TurnResult {
    /// Error-shaped result: explanatory text, empty identifiers. Callers
    /// always get a structurally valid result even when a turn fails.
    pub fn from_error(error: &AuroraError) -> Self {
        Self {
            text: format!("Error: {error}"),
            conversation_id: String::new(),
            message_id: String::new(),
        }
    }

    /// Whether this result carries empty identifiers, i.e. came from
    /// [`TurnResult::from_error`].
    pub fn is_error(&self) -> bool {
        self.conversation_id.is_empty() && self.message_id.is_empty()
    }
}
