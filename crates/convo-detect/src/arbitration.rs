//! Remote arbitration for difficult or low-confidence cases.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use convo_llm::{extract_json, LlmClient, LlmError};
use convo_types::{ArbitrationConfig, ConversationState};

/// A parsed arbitration verdict.
///
/// Fields are best-effort: the remote model is prompted for strict
/// JSON but drifts, so missing or malformed fields degrade to neutral
/// defaults instead of failing the call.
#[derive(Debug, Clone)]
pub struct ArbitrationVerdict {
    pub state: ConversationState,
    pub confidence: f32,
    pub similarity: f32,
    pub reason: String,
    pub detected_topic: Option<String>,
}

/// Consults a remote model on cases the local pipeline is unsure about.
///
/// The gateway is advisory: its verdict only replaces the local result
/// when it clears the configured trust threshold, and any failure is
/// swallowed so the local pipeline always has the last word.
pub struct ArbitrationGateway {
    client: Arc<dyn LlmClient>,
    config: ArbitrationConfig,
}

impl ArbitrationGateway {
    /// Create a gateway backed by the given completion client.
    pub fn new(client: Arc<dyn LlmClient>, config: ArbitrationConfig) -> Self {
        Self { client, config }
    }

    /// The configured policy.
    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    /// Whether this input warrants a remote consultation.
    ///
    /// Either the message touches a difficult lexical domain or the
    /// local similarity signal is too weak to act on alone.
    pub fn should_consult(&self, user_input: &str, similarity: f32) -> bool {
        if !self.config.enabled {
            return false;
        }

        let difficult = self
            .config
            .difficult_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && user_input.contains(pattern.as_str()));

        difficult || similarity < self.config.consult_below_similarity
    }

    /// Whether a verdict clears the trust threshold.
    pub fn trusts(&self, verdict: &ArbitrationVerdict) -> bool {
        verdict.confidence > self.config.trust_threshold
    }

    /// Ask the remote model for a verdict on the current input.
    pub async fn arbitrate(
        &self,
        user_input: &str,
        history_tail: &[String],
    ) -> Result<ArbitrationVerdict, LlmError> {
        let prompt = build_arbitration_prompt(user_input, history_tail);
        let response = self.client.complete(&prompt).await?;
        let verdict = parse_verdict(&response)?;

        debug!(
            state = verdict.state.as_str(),
            confidence = verdict.confidence,
            "Arbitration verdict received"
        );

        Ok(verdict)
    }
}

fn build_arbitration_prompt(user_input: &str, history_tail: &[String]) -> String {
    let history_text = history_tail.join("\n");

    format!(
        r#"你是一個智能對話狀態檢測助手。

請分析以下對話並判斷對話狀態：
1. new_conversation - 完全新對話，無關聯
2. continuation - 續接對話，話題相同或高度相關
3. topic_change - 話題轉換，話題不同但相關

對話歷史：
{history_text}

當前用戶輸入：
{user_input}

請返回 JSON 格式：
{{
  "state": "new_conversation" | "continuation" | "topic_change",
  "confidence": 0.0-1.0,
  "similarity": 0.0-1.0,
  "reason": "判斷理由",
  "detected_topic": "code" | "task" | "chat" | "general"
}}"#
    )
}

/// Raw verdict shape before field coercion.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    state: Option<String>,
    confidence: Option<Value>,
    similarity: Option<Value>,
    reason: Option<String>,
    detected_topic: Option<String>,
}

fn parse_verdict(response: &str) -> Result<ArbitrationVerdict, LlmError> {
    let json = extract_json(response);
    let raw: RawVerdict = serde_json::from_str(&json)
        .map_err(|e| LlmError::ParseError(format!("arbitration verdict: {e}")))?;

    let state = raw
        .state
        .as_deref()
        .and_then(ConversationState::from_label)
        .unwrap_or_else(|| {
            warn!(label = ?raw.state, "Unknown arbitration state label, treating as continuation");
            ConversationState::Continuation
        });

    Ok(ArbitrationVerdict {
        state,
        confidence: coerce_score(raw.confidence.as_ref()),
        similarity: coerce_score(raw.similarity.as_ref()),
        reason: raw.reason.unwrap_or_default(),
        detected_topic: raw.detected_topic,
    })
}

/// Accept numbers or numeric strings; anything else scores 0.0.
fn coerce_score(value: Option<&Value>) -> f32 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
        Some(Value::String(s)) => s.trim().parse::<f32>().unwrap_or(0.0),
        _ => 0.0,
    };
    score.clamp(0.0, 1.0)
}
