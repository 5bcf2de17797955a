//! Detector configuration.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! Config file lives at ~/.config/convo-state/config.toml.
//!
//! The keyword tiers and fallback lexicons are immutable configuration:
//! loaded once at startup and never mutated afterwards.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConvoError;

/// Keyword tiers consumed by the keyword stage.
///
/// High-tier keywords are authoritative topic-change markers. Low-tier
/// entries are conversational particles that must be prevented from
/// triggering a topic change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Explicit topic-change markers
    #[serde(default = "default_high_priority")]
    pub high_priority: Vec<String>,

    /// Softer topic-change indicators
    #[serde(default = "default_medium_priority")]
    pub medium_priority: Vec<String>,

    /// Conversational particles; matching one suppresses the keyword stage
    #[serde(default = "default_low_priority")]
    pub low_priority: Vec<String>,
}

fn default_high_priority() -> Vec<String> {
    [
        "然後呢",
        "接著說",
        "順便問一下",
        "另外",
        "說起來",
        "話說",
        "換話題",
        "話題轉換",
    ]
    .map(String::from)
    .to_vec()
}

fn default_medium_priority() -> Vec<String> {
    ["但是", "不過", "還有"].map(String::from).to_vec()
}

fn default_low_priority() -> Vec<String> {
    ["什麼", "怎麼", "嗎", "呢"].map(String::from).to_vec()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            high_priority: default_high_priority(),
            medium_priority: default_medium_priority(),
            low_priority: default_low_priority(),
        }
    }
}

/// Fallback lexicons for topic classification when the service is
/// unavailable or returns an unmappable label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_code_keywords")]
    pub code_keywords: Vec<String>,

    #[serde(default = "default_task_keywords")]
    pub task_keywords: Vec<String>,

    #[serde(default = "default_chat_keywords")]
    pub chat_keywords: Vec<String>,
}

fn default_code_keywords() -> Vec<String> {
    [
        "代碼",
        "script",
        "code",
        "programming",
        "function",
        "class",
        "python",
        "javascript",
    ]
    .map(String::from)
    .to_vec()
}

fn default_task_keywords() -> Vec<String> {
    [
        "任務", "task", "工作", "job", "todo", "remind", "schedule", "deadline",
    ]
    .map(String::from)
    .to_vec()
}

fn default_chat_keywords() -> Vec<String> {
    [
        "對話", "chat", "說", "談", "hi", "hello", "你好", "嗎", "呢",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            code_keywords: default_code_keywords(),
            task_keywords: default_task_keywords(),
            chat_keywords: default_chat_keywords(),
        }
    }
}

/// Similarity thresholds and fallback scores.
///
/// The threshold set is the hybrid-strategy variant: >= 0.40 continues,
/// 0.25-0.40 is a topic change, below 0.25 is a new conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Scores at or above this are a continuation
    #[serde(default = "default_continuation_threshold")]
    pub continuation_threshold: f32,

    /// Scores at or above this (but below continuation) are a topic change
    #[serde(default = "default_topic_change_threshold")]
    pub topic_change_threshold: f32,

    /// Confidence floor for the new-conversation branch
    #[serde(default = "default_new_conversation_floor")]
    pub new_conversation_floor: f32,

    /// Heuristic score when the parser fails but messages share tokens
    #[serde(default = "default_overlap_score")]
    pub overlap_score: f32,

    /// Heuristic score when the parser fails and messages share nothing.
    /// Never 0.0: parser failure must not look like a confident
    /// new-conversation signal.
    #[serde(default = "default_disjoint_score")]
    pub disjoint_score: f32,
}

fn default_continuation_threshold() -> f32 {
    0.40
}

fn default_topic_change_threshold() -> f32 {
    0.25
}

fn default_new_conversation_floor() -> f32 {
    0.8
}

fn default_overlap_score() -> f32 {
    0.6
}

fn default_disjoint_score() -> f32 {
    0.3
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            continuation_threshold: default_continuation_threshold(),
            topic_change_threshold: default_topic_change_threshold(),
            new_conversation_floor: default_new_conversation_floor(),
            overlap_score: default_overlap_score(),
            disjoint_score: default_disjoint_score(),
        }
    }
}

impl SimilarityConfig {
    /// Validate threshold ordering and ranges.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("continuation_threshold", self.continuation_threshold),
            ("topic_change_threshold", self.topic_change_threshold),
            ("new_conversation_floor", self.new_conversation_floor),
            ("overlap_score", self.overlap_score),
            ("disjoint_score", self.disjoint_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be 0.0-1.0, got {value}"));
            }
        }
        if self.topic_change_threshold >= self.continuation_threshold {
            return Err(format!(
                "topic_change_threshold ({}) must be below continuation_threshold ({})",
                self.topic_change_threshold, self.continuation_threshold
            ));
        }
        if self.disjoint_score == 0.0 {
            return Err("disjoint_score must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Arbitration gateway policy (opt-in, disabled by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrationConfig {
    /// MUST be explicitly set to true to enable
    #[serde(default)]
    pub enabled: bool,

    /// Verdicts at or below this confidence are discarded
    #[serde(default = "default_trust_threshold")]
    pub trust_threshold: f32,

    /// Consult the gateway when local similarity falls below this
    #[serde(default = "default_consult_below_similarity")]
    pub consult_below_similarity: f32,

    /// How many trailing history messages to send
    #[serde(default = "default_history_tail")]
    pub history_tail: usize,

    /// Lexical patterns marking a message as a difficult case
    #[serde(default = "default_difficult_patterns")]
    pub difficult_patterns: Vec<String>,
}

fn default_trust_threshold() -> f32 {
    0.7
}

fn default_consult_below_similarity() -> f32 {
    0.5
}

fn default_history_tail() -> usize {
    3
}

fn default_difficult_patterns() -> Vec<String> {
    [
        "代碼", "程式", "算法", "優化", "函數", "類", "對象", "實例", "模式", "架構", "流程",
        "步驟",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trust_threshold: default_trust_threshold(),
            consult_below_similarity: default_consult_below_similarity(),
            history_tail: default_history_tail(),
            difficult_patterns: default_difficult_patterns(),
        }
    }
}

/// Master configuration for the detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// How many prior messages the history window keeps
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default)]
    pub keywords: KeywordConfig,

    #[serde(default)]
    pub topic: TopicConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,

    #[serde(default)]
    pub arbitration: ArbitrationConfig,
}

fn default_history_window() -> usize {
    10
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            keywords: KeywordConfig::default(),
            topic: TopicConfig::default(),
            similarity: SimilarityConfig::default(),
            arbitration: ArbitrationConfig::default(),
        }
    }
}

/// Local classification service endpoint (Ollama-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Base URL of the local model server
    #[serde(default = "default_service_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_service_model")]
    pub model: String,

    /// Request timeout in seconds; a timeout is a stage failure, never
    /// retried
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_service_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_service_model() -> String {
    "qwen2.5:1.5b".to_string()
}

fn default_service_timeout_secs() -> u64 {
    10
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_service_base_url(),
            model: default_service_model(),
            timeout_secs: default_service_timeout_secs(),
        }
    }
}

/// Remote high-accuracy arbitration endpoint (OpenAI-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrationApiSettings {
    /// Base URL of the chat-completions endpoint
    #[serde(default = "default_arbitration_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_arbitration_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_arbitration_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_arbitration_base_url() -> String {
    "https://open.bigmodel.cn/api/paas/v4".to_string()
}

fn default_arbitration_model() -> String {
    "glm-4-flash".to_string()
}

fn default_arbitration_timeout_secs() -> u64 {
    15
}

impl Default for ArbitrationApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_arbitration_base_url(),
            model: default_arbitration_model(),
            api_key: None,
            timeout_secs: default_arbitration_timeout_secs(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub arbitration_api: ArbitrationApiSettings,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            service: ServiceSettings::default(),
            arbitration_api: ArbitrationApiSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/convo-state/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CONVO_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConvoError> {
        let config_dir = ProjectDirs::from("", "", "convo-state")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONVO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConvoError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConvoError::Config(e.to_string()))
    }
}
