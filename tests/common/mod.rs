//! Shared test doubles for the integration suites.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use aurora::error::AuroraError;
use aurora::invoker::{InvokerRequest, InvokerResponse, ModelInvoker};
use aurora::types::AgentToolCall;

/// Test invoker that captures requests and replays queued responses.
///
/// Responses are consumed in queue order; once the script runs dry it falls
/// back to a plain text answer so tests assert on call counts rather than
/// hanging.
pub struct ScriptedInvoker {
    responses: Mutex<VecDeque<Result<InvokerResponse, String>>>,
    requests: Mutex<Vec<InvokerRequest>>,
    delay: Option<Duration>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Hold each `generate` call open for `delay`, to widen race windows in
    /// concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a final-text response (no tool calls).
    pub fn queue_text(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(InvokerResponse {
            text: text.to_string(),
            tool_calls: Vec::new(),
        }));
    }

    /// Queue a response requesting one tool call, with optional accompanying
    /// text.
    pub fn queue_tool_call(&self, text: &str, name: &str, arguments: serde_json::Value) {
        let call_number = self.responses.lock().unwrap().len() + 1;
        self.responses.lock().unwrap().push_back(Ok(InvokerResponse {
            text: text.to_string(),
            tool_calls: vec![AgentToolCall {
                id: format!("call-{call_number}"),
                name: name.to_string(),
                arguments,
            }],
        }));
    }

    /// Queue a model invocation failure.
    pub fn queue_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<InvokerRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn generate(&self, request: &InvokerRequest) -> Result<InvokerResponse, AuroraError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(AuroraError::api(500, message)),
            None => Ok(InvokerResponse {
                text: "unscripted response".to_string(),
                tool_calls: Vec::new(),
            }),
        }
    }
}
