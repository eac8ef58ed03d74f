//! The turn orchestrator: entry point for one user prompt → one reply.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent_loop::AgentLoop;
use crate::config::AuroraConfig;
use crate::error::{AuroraError, Result};
use crate::guard::TurnGuard;
use crate::invoker::ModelInvoker;
use crate::storage::ConversationStore;
use crate::tools::ToolRegistry;
use crate::types::{Conversation, ImageContent, Role, TurnRequest, TurnResult};

/// Coordinates one turn end to end: conversation resolution, the busy guard,
/// durable history, the agent loop, and persistence of both new messages.
pub struct TurnOrchestrator {
    store: Arc<dyn ConversationStore>,
    guard: Arc<TurnGuard>,
    registry: ToolRegistry,
    agent_loop: AgentLoop,
    history_limit: usize,
}

impl TurnOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        invoker: Arc<dyn ModelInvoker>,
        guard: Arc<TurnGuard>,
        config: &AuroraConfig,
    ) -> Self {
        Self {
            registry: ToolRegistry::aurora(store.clone()),
            agent_loop: AgentLoop::new(invoker, config.max_iterations),
            store,
            guard,
            history_limit: config.history_limit,
        }
    }

    /// Run one turn.
    ///
    /// Returns `Err` only for [`AuroraError::ConversationBusy`], which callers
    /// must be able to tell apart from a failed turn. Every other failure
    /// degrades to an error-shaped [`TurnResult`], and the guard is released
    /// strictly after persistence on success and failure paths alike.
    pub async fn run_turn(&self, request: TurnRequest) -> Result<TurnResult> {
        info!(
            device_id = %request.device_id,
            prompt_len = request.prompt.len(),
            has_image = request.image.is_some(),
            "turn start"
        );

        let conversation = match self.resolve_conversation(&request).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!(error = %e, "failed to resolve conversation");
                return Ok(TurnResult::from_error(&e));
            }
        };

        if !self.guard.try_acquire(&conversation.id) {
            info!(conversation_id = %conversation.id, "turn rejected, conversation busy");
            return Err(AuroraError::ConversationBusy(conversation.id));
        }

        let outcome = self.run_locked(&conversation, &request).await;
        self.guard.release(&conversation.id);

        match outcome {
            Ok(result) => {
                info!(
                    conversation_id = %result.conversation_id,
                    message_id = %result.message_id,
                    "turn complete"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(conversation_id = %conversation.id, error = %e, "turn failed");
                Ok(TurnResult::from_error(&e))
            }
        }
    }

    /// If a conversation id was supplied, it must exist; otherwise use the
    /// device's most-recently-updated conversation, creating one if needed.
    async fn resolve_conversation(&self, request: &TurnRequest) -> Result<Conversation> {
        match &request.conversation_id {
            Some(id) => self.store.get_conversation(id).await,
            None => self.store.get_or_create_conversation(&request.device_id).await,
        }
    }

    /// The guarded section: everything between acquire and release.
    async fn run_locked(
        &self,
        conversation: &Conversation,
        request: &TurnRequest,
    ) -> Result<TurnResult> {
        // Persist the user's input before invoking the model, so a crash
        // mid-turn still leaves it durable.
        self.store
            .add_message(
                &conversation.id,
                Role::User,
                &request.prompt,
                request.image.clone(),
                None,
            )
            .await?;

        let history = self
            .store
            .get_conversation_history(&conversation.id, Some(self.history_limit))
            .await?;
        // The just-appended user message is handed to the loop as the current
        // prompt, not as part of prior history.
        let prior = &history[..history.len().saturating_sub(1)];

        let system_prompt = self.store.get_system_prompt(&conversation.device_id).await?;
        let image = request.image.clone().map(ImageContent::jpeg);

        let text = self
            .agent_loop
            .run(&self.registry, &request.prompt, prior, &system_prompt, image)
            .await?;

        let assistant = self
            .store
            .add_message(&conversation.id, Role::Assistant, &text, None, None)
            .await?;

        Ok(TurnResult {
            text,
            conversation_id: conversation.id.clone(),
            message_id: assistant.id,
        })
    }
}
