//! Integration tests for the full detection pipeline.
//!
//! These tests drive `StateDecisionEngine` end to end with scripted
//! model responses, covering each stage's decision and the fallback
//! chain between them.

use std::sync::Arc;

use convo_detect::StateDecisionEngine;
use convo_llm::{FailingLlmClient, LlmClient, MockLlmClient, ScriptedLlmClient};
use convo_types::{
    ArbitrationConfig, ConversationState, DetectionSource, DetectorConfig, SessionHistory,
};

fn engine(client: Arc<dyn LlmClient>) -> StateDecisionEngine {
    StateDecisionEngine::new(client, DetectorConfig::default())
}

#[tokio::test]
async fn greeting_into_empty_session() {
    let engine = engine(Arc::new(FailingLlmClient));

    let result = engine.detect("你好！", &SessionHistory::empty()).await;

    assert_eq!(result.state, ConversationState::NewConversation);
    assert_eq!(result.detected_by, DetectionSource::EmptyHistory);
    assert_eq!(result.reason, "No session history available");
    assert_eq!(result.context_length, 500);
}

#[tokio::test]
async fn explicit_topic_change_marker_mid_discussion() {
    let engine = engine(Arc::new(FailingLlmClient));
    let history = SessionHistory::from(vec!["這是一個關於 Python 的示例"]);

    let result = engine.detect("然後呢，接著說什麼？", &history).await;

    assert_eq!(result.state, ConversationState::TopicChange);
    assert_eq!(result.detected_by, DetectionSource::KeywordHigh);
    assert!((result.confidence - 0.95).abs() < f32::EPSILON);
    assert_eq!(result.context_length, 500);
}

#[tokio::test]
async fn interrogative_particle_is_not_a_topic_change() {
    let engine = engine(Arc::new(FailingLlmClient));
    let history = SessionHistory::from(vec!["我們在討論今天的安排"]);

    let result = engine.detect("下午有空嗎", &history).await;

    assert_eq!(result.state, ConversationState::Continuation);
    assert_eq!(result.detected_by, DetectionSource::IgnoredLowPriority);
    assert_eq!(result.context_length, 1000);
}

#[tokio::test]
async fn drifting_history_flags_topic_shift() {
    // History moved from code to chat before the current input.
    let client = Arc::new(ScriptedLlmClient::new(vec!["code", "chat"]));
    let engine = engine(client);
    let history = SessionHistory::from(vec!["幫我看看這段 Python", "午餐吃了牛肉麵"]);

    let result = engine.detect("好吃", &history).await;

    assert_eq!(result.state, ConversationState::TopicChange);
    assert_eq!(result.detected_by, DetectionSource::TopicShift);
    assert!((result.confidence - 0.82).abs() < f32::EPSILON);
}

#[tokio::test]
async fn similarity_thresholds_partition_the_score_range() {
    for (score, expected_state) in [
        ("0.8", ConversationState::Continuation),
        ("0.40", ConversationState::Continuation),
        ("0.3", ConversationState::TopicChange),
        ("0.25", ConversationState::TopicChange),
        ("0.1", ConversationState::NewConversation),
    ] {
        let client = Arc::new(ScriptedLlmClient::new(vec!["chat", "chat", score]));
        let engine = StateDecisionEngine::new(client, DetectorConfig::default());
        let history = SessionHistory::from(vec!["昨天去了海邊", "海水很冷"]);

        let result = engine.detect("晚餐吃火鍋", &history).await;

        assert_eq!(result.state, expected_state, "score {score}");
        assert_eq!(result.detected_by, DetectionSource::Similarity);
    }
}

#[tokio::test]
async fn total_service_failure_still_produces_a_verdict() {
    // Topic fallback labels both history messages, then the overlap
    // heuristic supplies a similarity score. Nothing errors.
    let engine = engine(Arc::new(FailingLlmClient));
    let history = SessionHistory::from(vec!["我們在聊旅行", "下個月去日本"]);

    let result = engine.detect("完全無關的主題", &history).await;

    assert!(result.confidence > 0.0);
    assert!(result.similarity_to_previous > 0.0);
    assert_eq!(result.detected_by, DetectionSource::Similarity);
}

#[tokio::test]
async fn arbitration_overrides_weak_local_verdict() {
    let local = Arc::new(ScriptedLlmClient::new(vec!["chat", "chat", "0.2"]));
    let arbiter = Arc::new(MockLlmClient::new(
        r#"{"state": "continuation", "confidence": 0.92, "similarity": 0.8, "reason": "同一專案的延續"}"#,
    ));
    let config = DetectorConfig {
        arbitration: ArbitrationConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = StateDecisionEngine::with_arbitration(local, arbiter, config);
    let history = SessionHistory::from(vec!["昨天的部署", "回滾了兩次"]);

    let result = engine.detect("今天重新上線", &history).await;

    assert_eq!(result.state, ConversationState::Continuation);
    assert_eq!(result.detected_by, DetectionSource::Arbitration);
    assert!((result.confidence - 0.92).abs() < f32::EPSILON);
    assert_eq!(result.context_length, 1000);
}

#[tokio::test]
async fn arbitration_failure_degrades_to_local_thresholds() {
    let local = Arc::new(ScriptedLlmClient::new(vec!["chat", "chat", "0.2"]));
    let config = DetectorConfig {
        arbitration: ArbitrationConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = StateDecisionEngine::with_arbitration(local, Arc::new(FailingLlmClient), config);
    let history = SessionHistory::from(vec!["昨天的部署", "回滾了兩次"]);

    let result = engine.detect("今天重新上線", &history).await;

    assert_eq!(result.state, ConversationState::NewConversation);
    assert_eq!(result.detected_by, DetectionSource::Similarity);
}

#[tokio::test]
async fn repeated_detection_is_deterministic() {
    let engine = engine(Arc::new(MockLlmClient::new("0.55")));
    let history = SessionHistory::from(vec!["專案快完成了"]);

    let first = engine.detect("進度到哪裡了", &history).await;
    let second = engine.detect("進度到哪裡了", &history).await;

    assert_eq!(first.state, second.state);
    assert_eq!(first.detected_by, second.detected_by);
    assert!((first.confidence - second.confidence).abs() < f32::EPSILON);
    assert!((first.similarity_to_previous - second.similarity_to_previous).abs() < f32::EPSILON);
}

#[tokio::test]
async fn history_window_drops_oldest_messages() {
    let messages: Vec<String> = (0..20).map(|i| format!("訊息 {i}")).collect();
    let history = SessionHistory::new(messages, 10);

    assert_eq!(history.len(), 10);
    assert_eq!(history.last(), Some("訊息 19"));
}
