//! # convo-llm
//!
//! Language-model client plumbing for conversation-state detection.
//!
//! Provides the `LlmClient` trait and its implementations:
//! - `OllamaClient`: local Ollama `/api/generate` backend
//! - `ApiChatClient`: OpenAI-compatible `/chat/completions` backend
//! - `NoOpLlmClient`: always-failing default for offline runs
//! - `MockLlmClient` / `ScriptedLlmClient` / `FailingLlmClient`: test doubles
//!
//! All calls are single-attempt; detection stages treat model errors as
//! a signal to fall back to their heuristic paths rather than retrying.

mod api;
mod client;
mod error;
mod extract;
mod mock;
mod ollama;

pub use api::{ApiChatClient, ApiChatConfig};
pub use client::{LlmClient, NoOpLlmClient};
pub use error::LlmError;
pub use extract::extract_json;
pub use mock::{FailingLlmClient, MockLlmClient, ScriptedLlmClient};
pub use ollama::{OllamaClient, OllamaConfig};
