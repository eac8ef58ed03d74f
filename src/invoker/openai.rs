//! OpenAI Chat Completions implementation of [`ModelInvoker`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::AuroraConfig;
use crate::error::{AuroraError, Result};
use crate::types::{AgentToolCall, ModelMessage, Role};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{InvokerRequest, InvokerResponse, ModelInvoker};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiInvoker {
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiInvoker {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Build an invoker from config; errors when no API key is set.
    pub fn from_config(config: &AuroraConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AuroraError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(
            config.model.clone(),
            api_key,
            config.base_url.clone(),
        ))
    }

    fn build_request_body(&self, request: &InvokerRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                body.as_object_mut()
                    .expect("body is an object")
                    .insert("tools".into(), tool_defs.into());
            }
        }

        body
    }
}

#[async_trait]
impl ModelInvoker for OpenAiInvoker {
    async fn generate(&self, request: &InvokerRequest) -> Result<InvokerResponse> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "OpenAI generate");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AuroraError::api(200, "No choices in OpenAI response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        Ok(InvokerResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

/// Map a [`ModelMessage`] to the Chat Completions wire shape. Messages with
/// an image become multi-part content with a `data:` image URL.
fn message_to_openai(message: &ModelMessage) -> serde_json::Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    match &message.image {
        Some(image) => serde_json::json!({
            "role": role,
            "content": [
                { "type": "text", "text": message.content },
                { "type": "image_url", "image_url": { "url": image.to_data_url() } },
            ],
        }),
        None => serde_json::json!({
            "role": role,
            "content": message.content,
        }),
    }
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunctionCall,
}

#[derive(Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}
