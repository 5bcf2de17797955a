//! The staged detection pipeline.

use std::sync::Arc;

use tracing::{debug, warn};

use convo_llm::LlmClient;
use convo_types::{
    ConversationState, DetectionResult, DetectionSource, DetectorConfig, SessionHistory,
};

use crate::arbitration::ArbitrationGateway;
use crate::keyword::KeywordRules;
use crate::shift::TopicShiftDetector;
use crate::similarity::SimilarityScorer;
use crate::topic::TopicClassifier;

/// Orders the detection stages and produces the final verdict.
///
/// Stage priority, highest first:
/// 1. empty history (trivial new conversation)
/// 2. keyword rules (high, medium, then low-priority suppression)
/// 3. topic shift across the last two history messages
/// 4. semantic similarity thresholds, with optional arbitration
///    override for difficult or low-similarity cases
///
/// Every stage either decides outright or falls through; `detect`
/// always returns a well-formed result.
pub struct StateDecisionEngine {
    config: DetectorConfig,
    rules: KeywordRules,
    shift: TopicShiftDetector,
    scorer: SimilarityScorer,
    arbitration: Option<ArbitrationGateway>,
}

impl StateDecisionEngine {
    /// Build an engine without arbitration, using one local client for
    /// both topic classification and similarity scoring.
    pub fn new(client: Arc<dyn LlmClient>, config: DetectorConfig) -> Self {
        let rules = KeywordRules::new(&config.keywords);
        let shift = TopicShiftDetector::new(TopicClassifier::new(
            client.clone(),
            config.topic.clone(),
        ));
        let scorer = SimilarityScorer::new(client, config.similarity.clone());

        Self {
            config,
            rules,
            shift,
            scorer,
            arbitration: None,
        }
    }

    /// Build an engine with an arbitration gateway on a separate
    /// (typically remote) client.
    pub fn with_arbitration(
        local: Arc<dyn LlmClient>,
        arbiter: Arc<dyn LlmClient>,
        config: DetectorConfig,
    ) -> Self {
        let mut engine = Self::new(local, config);
        let gateway = ArbitrationGateway::new(arbiter, engine.config.arbitration.clone());
        engine.arbitration = Some(gateway);
        engine
    }

    /// The active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify what `user_input` means for the session.
    pub async fn detect(&self, user_input: &str, history: &SessionHistory) -> DetectionResult {
        if history.is_empty() {
            return DetectionResult::new(
                ConversationState::NewConversation,
                DetectionSource::EmptyHistory,
                1.0,
                "No session history available",
            );
        }

        if let Some(keyword) = self.rules.match_high(user_input) {
            return DetectionResult::new(
                ConversationState::TopicChange,
                DetectionSource::KeywordHigh,
                0.95,
                format!("High-priority keyword '{keyword}' detected"),
            );
        }

        if let Some(keyword) = self.rules.match_medium(user_input) {
            return DetectionResult::new(
                ConversationState::TopicChange,
                DetectionSource::KeywordMedium,
                0.85,
                format!("Medium-priority keyword '{keyword}' detected"),
            );
        }

        // Conversational particles suppress the keyword stage: they are
        // not topic markers and must not escalate to the later stages
        // as if they were.
        if let Some(keyword) = self.rules.match_low(user_input) {
            return DetectionResult::new(
                ConversationState::Continuation,
                DetectionSource::IgnoredLowPriority,
                0.95,
                format!("Ignored low-priority keyword '{keyword}' (conversational particle)"),
            );
        }

        if let Some((previous, latest)) = self.shift.detect(history).await {
            debug!(
                previous = previous.as_str(),
                latest = latest.as_str(),
                "Adjacent history messages disagree on topic"
            );
            return DetectionResult::new(
                ConversationState::TopicChange,
                DetectionSource::TopicShift,
                0.82,
                "Topic shift detected (context-aware)",
            );
        }

        let last_message = match history.last() {
            Some(last) => last,
            None => {
                // Unreachable given the empty-history check, but the
                // type does not prove it.
                return DetectionResult::new(
                    ConversationState::NewConversation,
                    DetectionSource::EmptyHistory,
                    1.0,
                    "No session history available",
                );
            }
        };

        let similarity = self.scorer.score(user_input, last_message).await;

        if let Some(result) = self.try_arbitration(user_input, history, similarity).await {
            return result;
        }

        self.threshold_verdict(similarity)
    }

    /// Consult the arbitration gateway; `None` falls back to the local
    /// threshold verdict.
    async fn try_arbitration(
        &self,
        user_input: &str,
        history: &SessionHistory,
        similarity: f32,
    ) -> Option<DetectionResult> {
        let gateway = self.arbitration.as_ref()?;

        if !gateway.should_consult(user_input, similarity) {
            return None;
        }

        let tail = history.tail(gateway.config().history_tail).to_vec();

        match gateway.arbitrate(user_input, &tail).await {
            Ok(verdict) if gateway.trusts(&verdict) => {
                let reported_similarity = if verdict.similarity > 0.0 {
                    verdict.similarity
                } else {
                    similarity
                };
                Some(
                    DetectionResult::new(
                        verdict.state,
                        DetectionSource::Arbitration,
                        verdict.confidence,
                        format!("Arbitration verdict (confidence: {:.2})", verdict.confidence),
                    )
                    .with_similarity(reported_similarity),
                )
            }
            Ok(verdict) => {
                debug!(
                    confidence = verdict.confidence,
                    "Arbitration verdict below trust threshold, keeping local result"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "Arbitration failed, keeping local result");
                None
            }
        }
    }

    /// Map a similarity score onto the terminal states.
    fn threshold_verdict(&self, similarity: f32) -> DetectionResult {
        let thresholds = self.scorer.config();

        let (state, confidence, reason) = if similarity >= thresholds.continuation_threshold {
            (
                ConversationState::Continuation,
                similarity,
                "High semantic similarity indicates continuation",
            )
        } else if similarity >= thresholds.topic_change_threshold {
            (
                ConversationState::TopicChange,
                similarity * 0.9,
                "Medium similarity indicates topic change",
            )
        } else {
            (
                ConversationState::NewConversation,
                thresholds.new_conversation_floor.max(similarity * 0.9),
                "Low similarity indicates new conversation",
            )
        };

        DetectionResult::new(state, DetectionSource::Similarity, confidence, reason)
            .with_similarity(similarity)
    }
}
