//! Aurora — conversational turn orchestrator for the Aurora voice assistant.
//!
//! Given a device identifier, an optional conversation identifier, a user
//! utterance, and an optional image, the orchestrator produces exactly one
//! assistant reply while guaranteeing at most one in-flight turn per
//! conversation, maintaining ordered durable history, and running a bounded
//! tool-calling loop against the language model.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use aurora::prelude::*;
//!
//! # async fn example() -> aurora::error::Result<()> {
//! let config = AuroraConfig::from_env();
//! let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
//! let invoker = Arc::new(OpenAiInvoker::from_config(&config)?);
//! let orchestrator = TurnOrchestrator::new(store, invoker, Arc::new(TurnGuard::new()), &config);
//!
//! let result = orchestrator
//!     .run_turn(TurnRequest::new("device-1", "What's 2 + 2?"))
//!     .await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod error;
pub mod guard;
pub mod invoker;
pub mod orchestrator;
pub mod prelude;
pub mod storage;
pub mod tools;
pub mod types;
