//! End-to-end tests for the turn orchestrator.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::ScriptedInvoker;
use pretty_assertions::assert_eq;

use aurora::config::AuroraConfig;
use aurora::guard::TurnGuard;
use aurora::orchestrator::TurnOrchestrator;
use aurora::storage::{ConversationStore, MemoryStore};
use aurora::types::{Role, TurnRequest};

fn orchestrator(
    store: Arc<MemoryStore>,
    invoker: Arc<ScriptedInvoker>,
) -> Arc<TurnOrchestrator> {
    Arc::new(TurnOrchestrator::new(
        store,
        invoker,
        Arc::new(TurnGuard::new()),
        &AuroraConfig::default(),
    ))
}

#[tokio::test]
async fn turn_persists_user_then_assistant_in_order() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.queue_text("Hi! How can I help?");
    invoker.queue_text("The sky is blue.");
    let orchestrator = orchestrator(store.clone(), invoker);

    let first = orchestrator
        .run_turn(TurnRequest::new("device-1", "hello"))
        .await
        .unwrap();
    assert_eq!(first.text, "Hi! How can I help?");
    assert!(!first.conversation_id.is_empty());
    assert!(!first.message_id.is_empty());

    let second = orchestrator
        .run_turn(TurnRequest::new("device-1", "why is the sky blue?"))
        .await
        .unwrap();
    assert_eq!(second.conversation_id, first.conversation_id);

    let messages = store.get_messages(&first.conversation_id).await.unwrap();
    let sequence: Vec<(Role, &str)> = messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            (Role::User, "hello"),
            (Role::Assistant, "Hi! How can I help?"),
            (Role::User, "why is the sky blue?"),
            (Role::Assistant, "The sky is blue."),
        ]
    );
    assert_eq!(messages.last().unwrap().id, second.message_id);
}

#[tokio::test]
async fn explicit_conversation_id_is_used() {
    let store = Arc::new(MemoryStore::new());
    let conversation = store.create_conversation("device-1", None).await.unwrap();
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.queue_text("ok");
    let orchestrator = orchestrator(store, invoker);

    let result = orchestrator
        .run_turn(TurnRequest::new("device-1", "hi").with_conversation(&conversation.id))
        .await
        .unwrap();
    assert_eq!(result.conversation_id, conversation.id);
}

#[tokio::test]
async fn unknown_conversation_id_yields_error_shaped_result() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(ScriptedInvoker::new());
    let orchestrator = orchestrator(store, invoker.clone());

    let result = orchestrator
        .run_turn(TurnRequest::new("device-1", "hi").with_conversation("no-such-id"))
        .await
        .unwrap();

    assert!(result.is_error());
    assert!(result.text.starts_with("Error:"));
    assert!(result.text.contains("no-such-id"));
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn concurrent_turns_on_one_conversation_admit_exactly_one() {
    let store = Arc::new(MemoryStore::new());
    let conversation = store.create_conversation("device-1", None).await.unwrap();
    let invoker = Arc::new(ScriptedInvoker::new().with_delay(Duration::from_millis(200)));
    invoker.queue_text("first answer");
    invoker.queue_text("second answer");
    let orchestrator = orchestrator(store.clone(), invoker);

    let a = {
        let orchestrator = orchestrator.clone();
        let id = conversation.id.clone();
        tokio::spawn(async move {
            orchestrator
                .run_turn(TurnRequest::new("device-1", "turn a").with_conversation(id))
                .await
        })
    };
    let b = {
        let orchestrator = orchestrator.clone();
        let id = conversation.id.clone();
        tokio::spawn(async move {
            orchestrator
                .run_turn(TurnRequest::new("device-1", "turn b").with_conversation(id))
                .await
        })
    };

    let outcomes = [a.await.unwrap(), b.await.unwrap()];
    let wins = outcomes.iter().filter(|o| o.is_ok()).count();
    let busy = outcomes
        .iter()
        .filter(|o| matches!(o, Err(e) if e.is_busy()))
        .count();
    assert_eq!((wins, busy), (1, 1));

    // Both turns settled; a third goes through.
    let third = orchestrator
        .run_turn(TurnRequest::new("device-1", "turn c").with_conversation(conversation.id))
        .await
        .unwrap();
    assert!(!third.is_error());
}

#[tokio::test]
async fn different_conversations_run_in_parallel() {
    let store = Arc::new(MemoryStore::new());
    let first = store.create_conversation("device-1", None).await.unwrap();
    let second = store.create_conversation("device-2", None).await.unwrap();
    let invoker = Arc::new(ScriptedInvoker::new().with_delay(Duration::from_millis(100)));
    invoker.queue_text("a");
    invoker.queue_text("b");
    let orchestrator = orchestrator(store, invoker);

    let a = {
        let orchestrator = orchestrator.clone();
        let id = first.id.clone();
        tokio::spawn(async move {
            orchestrator
                .run_turn(TurnRequest::new("device-1", "hi").with_conversation(id))
                .await
        })
    };
    let b = {
        let orchestrator = orchestrator.clone();
        let id = second.id.clone();
        tokio::spawn(async move {
            orchestrator
                .run_turn(TurnRequest::new("device-2", "hi").with_conversation(id))
                .await
        })
    };

    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());
}

#[tokio::test]
async fn model_failure_releases_the_guard_and_degrades_gracefully() {
    let store = Arc::new(MemoryStore::new());
    let conversation = store.create_conversation("device-1", None).await.unwrap();
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.queue_error("model unavailable");
    invoker.queue_text("recovered");
    let orchestrator = orchestrator(store.clone(), invoker);

    let failed = orchestrator
        .run_turn(TurnRequest::new("device-1", "hi").with_conversation(&conversation.id))
        .await
        .unwrap();
    assert!(failed.is_error());
    assert!(failed.text.contains("model unavailable"));

    // The user message was persisted before the model call; no assistant
    // reply followed.
    let messages = store.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);

    // Guard released on the failure path, so the conversation is available.
    let retried = orchestrator
        .run_turn(TurnRequest::new("device-1", "again").with_conversation(&conversation.id))
        .await
        .unwrap();
    assert_eq!(retried.text, "recovered");
}

#[tokio::test]
async fn turn_with_image_persists_it_and_attaches_it_once() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.queue_tool_call("", "calculator", serde_json::json!({ "expression": "1" }));
    invoker.queue_text("a red balloon");
    let orchestrator = orchestrator(store.clone(), invoker.clone());

    let result = orchestrator
        .run_turn(TurnRequest::new("device-1", "what do you see?").with_image("QUJD"))
        .await
        .unwrap();
    assert_eq!(result.text, "a red balloon");

    let messages = store.get_messages(&result.conversation_id).await.unwrap();
    assert_eq!(messages[0].image.as_deref(), Some("QUJD"));

    let requests = invoker.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].messages.last().unwrap().image.is_some());
    assert!(requests[1].messages.iter().all(|m| m.image.is_none()));
}

#[tokio::test]
async fn history_passed_to_the_model_excludes_the_current_prompt() {
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.queue_text("one");
    invoker.queue_text("two");
    let orchestrator = orchestrator(store, invoker.clone());

    let first = orchestrator
        .run_turn(TurnRequest::new("device-1", "first prompt"))
        .await
        .unwrap();
    orchestrator
        .run_turn(
            TurnRequest::new("device-1", "second prompt").with_conversation(first.conversation_id),
        )
        .await
        .unwrap();

    let second_request = &invoker.requests()[1];
    let contents: Vec<&str> = second_request
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    // System, prior turn (user + assistant), then the current prompt once.
    assert_eq!(
        contents[1..],
        ["first prompt", "one", "second prompt"]
    );
}
