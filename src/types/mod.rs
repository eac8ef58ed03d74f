//! Core types shared across the crate.

pub mod conversation;
pub mod message;
pub mod turn;

pub use conversation::{Conversation, DeviceSettings, HistoryEntry, Message, Metadata};
pub use message::{AgentToolCall, ImageContent, ModelMessage, Role};
pub use turn::{TurnRequest, TurnResult};
