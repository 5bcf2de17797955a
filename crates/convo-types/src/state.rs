//! Core detection types.
//!
//! This module defines the fundamental types of the detection pipeline:
//! - `ConversationState`: what the new message means for the session
//! - `DetectionSource`: which pipeline stage produced the verdict
//! - `TopicCategory`: coarse per-message topic labels
//! - `DetectionResult`: the record returned by every detection call

use serde::{Deserialize, Serialize};

/// Conversation state classification.
///
/// Determines how much prior history the calling agent should feed back
/// into generation for the next response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// No meaningful relation to prior history.
    /// Example: greeting a session that was discussing something else entirely.
    NewConversation,

    /// The new message extends the same topic as recent history.
    #[default]
    Continuation,

    /// A deliberate but related shift in subject.
    /// Example: "順便問一下…" mid-discussion.
    TopicChange,
}

impl ConversationState {
    /// Recommended context-window size in tokens for this state.
    ///
    /// Continuations keep the full recent window; a new conversation or a
    /// topic change starts from a smaller slice.
    pub fn context_length(&self) -> u32 {
        match self {
            ConversationState::NewConversation => 500,
            ConversationState::Continuation => 1000,
            ConversationState::TopicChange => 500,
        }
    }

    /// Returns the display name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::NewConversation => "new_conversation",
            ConversationState::Continuation => "continuation",
            ConversationState::TopicChange => "topic_change",
        }
    }

    /// Parse a free-text label from an external service.
    ///
    /// Unknown labels return `None`; callers decide their own default.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "new_conversation" => Some(ConversationState::NewConversation),
            "continuation" => Some(ConversationState::Continuation),
            "topic_change" => Some(ConversationState::TopicChange),
            _ => None,
        }
    }
}

/// Which pipeline stage produced the final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// No prior history; trivially a new conversation.
    EmptyHistory,

    /// High-priority topic-change keyword matched.
    KeywordHigh,

    /// Medium-priority topic-change keyword matched.
    KeywordMedium,

    /// A low-priority conversational particle matched and suppressed
    /// the keyword stage; treated as continuation.
    IgnoredLowPriority,

    /// The last two history messages carry different topic labels.
    TopicShift,

    /// The remote arbitration service overrode the local result.
    Arbitration,

    /// Semantic-similarity thresholds decided.
    Similarity,
}

impl DetectionSource {
    /// Returns the display name for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::EmptyHistory => "empty_history",
            DetectionSource::KeywordHigh => "keyword_high",
            DetectionSource::KeywordMedium => "keyword_medium",
            DetectionSource::IgnoredLowPriority => "ignored_low_priority",
            DetectionSource::TopicShift => "topic_shift",
            DetectionSource::Arbitration => "arbitration",
            DetectionSource::Similarity => "similarity",
        }
    }
}

/// Coarse topic label for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    /// Programming, scripts, debugging, tooling.
    Code,

    /// Work items, reminders, scheduling, deadlines.
    Task,

    /// Casual conversation, greetings, questions.
    Chat,

    /// Everything else.
    #[default]
    General,
}

impl TopicCategory {
    /// Returns the display name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::Code => "code",
            TopicCategory::Task => "task",
            TopicCategory::Chat => "chat",
            TopicCategory::General => "general",
        }
    }
}

/// Result of a single detection call.
///
/// Every call returns a well-formed record; stages that fail internally
/// degrade in confidence rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// The classified conversation state
    #[serde(rename = "conversationState")]
    pub state: ConversationState,

    /// Semantic similarity to the previous message (0.0 if not computed)
    #[serde(rename = "similarityToPrevious")]
    pub similarity_to_previous: f32,

    /// Which stage produced this verdict
    #[serde(rename = "detectedBy")]
    pub detected_by: DetectionSource,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    /// Human-readable justification
    pub reason: String,

    /// Recommended context-window size in tokens
    #[serde(rename = "contextLength")]
    pub context_length: u32,
}

impl DetectionResult {
    /// Create a result with no similarity signal.
    pub fn new(
        state: ConversationState,
        detected_by: DetectionSource,
        confidence: f32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            state,
            similarity_to_previous: 0.0,
            detected_by,
            confidence,
            reason: reason.into(),
            context_length: state.context_length(),
        }
    }

    /// Attach the computed similarity score.
    pub fn with_similarity(mut self, similarity: f32) -> Self {
        self.similarity_to_previous = similarity;
        self
    }
}
