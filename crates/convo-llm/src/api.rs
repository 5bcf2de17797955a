//! Remote chat-completions client for OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use convo_types::ArbitrationApiSettings;

use crate::client::LlmClient;
use crate::error::LlmError;

/// Configuration for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct ApiChatConfig {
    /// API base URL (e.g., "https://open.bigmodel.cn/api/paas/v4")
    pub base_url: String,

    /// Model to use (e.g., "glm-4-flash")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiChatConfig {
    /// Build from settings; fails when no API key is configured.
    pub fn from_settings(settings: &ArbitrationApiSettings) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| LlmError::ConfigError("arbitration API key not set".to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

/// Client for `/chat/completions` on an OpenAI-compatible API.
///
/// Each call is a single attempt; arbitration is advisory, so the
/// engine degrades to its local verdict on any failure here.
pub struct ApiChatClient {
    client: Client,
    config: ApiChatConfig,
}

impl ApiChatClient {
    /// Create a new chat client.
    pub fn new(config: ApiChatConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmClient for ApiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessageResponse,
        }

        #[derive(Deserialize)]
        struct ChatMessageResponse {
            content: String,
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.1,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(model = %self.config.model, "Calling chat completions API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::ApiError(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(LlmError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        body.choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))
    }

    fn name(&self) -> &str {
        "api"
    }
}
