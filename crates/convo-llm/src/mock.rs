//! Mock clients for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::LlmClient;
use crate::error::LlmError;

/// Mock client that returns the same response for every prompt.
///
/// Useful for testing detection stages without a model backend.
pub struct MockLlmClient {
    response: String,
}

impl MockLlmClient {
    /// Create a mock that always returns `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock client that plays back a sequence of responses in order.
///
/// Repeats the final response once the script is exhausted, so tests
/// can drive multi-call pipelines without counting calls exactly.
pub struct ScriptedLlmClient {
    responses: Vec<String>,
    cursor: Mutex<usize>,
}

impl ScriptedLlmClient {
    /// Create a scripted mock from an ordered list of responses.
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            cursor: Mutex::new(0),
        }
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        match self.cursor.lock() {
            Ok(cursor) => *cursor,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        if self.responses.is_empty() {
            return Err(LlmError::ConfigError("empty script".to_string()));
        }

        let mut cursor = match self.cursor.lock() {
            Ok(cursor) => cursor,
            Err(poisoned) => poisoned.into_inner(),
        };
        let index = (*cursor).min(self.responses.len() - 1);
        *cursor += 1;
        Ok(self.responses[index].clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Mock client that fails every call.
pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::ApiError("mock failure".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
