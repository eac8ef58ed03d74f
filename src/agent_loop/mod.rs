//! The bounded model/tool iteration loop that produces one assistant reply.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::invoker::{InvokerRequest, ModelInvoker};
use crate::tools::ToolRegistry;
use crate::types::{HistoryEntry, ImageContent, ModelMessage};

/// Returned when the iteration budget runs out before the model produces any
/// usable text.
pub const EXHAUSTED_FALLBACK: &str =
    "I tried to help but encountered complexity. Could you rephrase your request?";

/// Drives repeated model calls, feeding tool results back into a transient
/// working history, until the model answers without tool calls or the
/// iteration budget is exhausted.
pub struct AgentLoop {
    invoker: Arc<dyn ModelInvoker>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(invoker: Arc<dyn ModelInvoker>, max_iterations: usize) -> Self {
        Self {
            invoker,
            max_iterations,
        }
    }

    /// Run the loop for one turn and return the final assistant text.
    ///
    /// `prior_history` is the durable context loaded before this turn; the
    /// current `prompt` (and `image`, first iteration only) rides separately
    /// and is never duplicated into it. Tool failures never surface here;
    /// only a failed model invocation aborts the loop.
    pub async fn run(
        &self,
        registry: &ToolRegistry,
        prompt: &str,
        prior_history: &[HistoryEntry],
        system_prompt: &str,
        image: Option<ImageContent>,
    ) -> Result<String> {
        debug!(
            max_iterations = self.max_iterations,
            history = prior_history.len(),
            has_image = image.is_some(),
            "agent loop start"
        );

        let tools = registry.definitions();
        let mut working: Vec<ModelMessage> = prior_history
            .iter()
            .map(|entry| ModelMessage {
                role: entry.role,
                content: entry.content.clone(),
                image: None,
            })
            .collect();
        let mut last_text = String::new();

        for iteration in 1..=self.max_iterations {
            // The image rides on the first model call only.
            let current_image = if iteration == 1 { image.clone() } else { None };
            let request = InvokerRequest {
                messages: build_prompt(prompt, &working, system_prompt, current_image),
                tools: tools.clone(),
            };

            let response = self.invoker.generate(&request).await?;
            debug!(
                iteration,
                tool_calls = response.tool_calls.len(),
                text_len = response.text.len(),
                "agent loop iteration"
            );

            if response.tool_calls.is_empty() {
                return Ok(response.text);
            }

            if !response.text.is_empty() {
                last_text = response.text.clone();
                working.push(ModelMessage::assistant(&response.text));
            }

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                let result = registry.dispatch(call).await;
                results.push(format!("Result from {}: {}", call.name, result));
            }
            working.push(ModelMessage::user(format!(
                "Here are the results from the tools you just used:\n\n{}\n\nPlease provide a \
                 natural response to my original question based on these results. Do not call \
                 any more tools.",
                results.join("\n")
            )));
        }

        warn!(
            max_iterations = self.max_iterations,
            "agent loop exhausted iteration budget"
        );
        Ok(if last_text.is_empty() {
            EXHAUSTED_FALLBACK.to_string()
        } else {
            last_text
        })
    }
}

/// Assemble the structured prompt: system message, working history in order,
/// then the current turn as a separate trailing user message.
fn build_prompt(
    prompt: &str,
    working_history: &[ModelMessage],
    system_prompt: &str,
    image: Option<ImageContent>,
) -> Vec<ModelMessage> {
    let mut messages = Vec::with_capacity(working_history.len() + 2);
    messages.push(ModelMessage::system(system_prompt));
    messages.extend_from_slice(working_history);
    messages.push(match image {
        Some(image) => ModelMessage::user_with_image(prompt, image),
        None => ModelMessage::user(prompt),
    });
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn prompt_orders_system_history_then_current_turn() {
        let history = vec![
            ModelMessage::user("earlier question"),
            ModelMessage::assistant("earlier answer"),
        ];
        let messages = build_prompt("now", &history, "be brief", None);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be brief");
        assert_eq!(messages[1].content, "earlier question");
        assert_eq!(messages[2].content, "earlier answer");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "now");
    }

    #[test]
    fn prompt_attaches_image_to_current_turn_only() {
        let history = vec![ModelMessage::user("earlier")];
        let messages = build_prompt("look at this", &history, "sys", Some(ImageContent::jpeg("QUJD")));

        assert!(messages[1].image.is_none());
        let current = messages.last().unwrap();
        assert_eq!(current.image.as_ref().unwrap().data, "QUJD");
    }
}
