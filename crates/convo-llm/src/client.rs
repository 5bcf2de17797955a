//! Pluggable completion client trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// Pluggable completion client.
///
/// Detection stages that need a language model call go through this
/// trait so the engine can run against a local Ollama instance, a
/// remote OpenAI-compatible endpoint, or a mock in tests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short identifier for logging (e.g. "ollama", "api", "noop").
    fn name(&self) -> &str;
}

/// No-op client for running the pipeline without any model backend.
///
/// Every completion fails, which pushes callers onto their keyword
/// fallbacks. Useful for offline runs and as a default.
pub struct NoOpLlmClient;

#[async_trait]
impl LlmClient for NoOpLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::ConfigError("no LLM backend configured".to_string()))
    }

    fn name(&self) -> &str {
        "noop"
    }
}
