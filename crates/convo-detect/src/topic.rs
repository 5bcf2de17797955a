//! Per-message topic classification.

use std::sync::Arc;

use tracing::{debug, warn};

use convo_llm::LlmClient;
use convo_types::{TopicCategory, TopicConfig};

use crate::cache::MemoCache;

/// Maps free-form model labels onto the canonical categories.
///
/// Small models answer with near-synonyms ("coding", "programming") or
/// echo a word from the message; anything not listed here lands on
/// `General`.
const SYNONYMS: &[(&str, TopicCategory)] = &[
    ("coding", TopicCategory::Code),
    ("code", TopicCategory::Code),
    ("programming", TopicCategory::Code),
    ("script", TopicCategory::Code),
    ("function", TopicCategory::Code),
    ("class", TopicCategory::Code),
    ("python", TopicCategory::Code),
    ("javascript", TopicCategory::Code),
    ("git", TopicCategory::Code),
    ("debug", TopicCategory::Code),
    ("task", TopicCategory::Task),
    ("work", TopicCategory::Task),
    ("job", TopicCategory::Task),
    ("todo", TopicCategory::Task),
    ("remind", TopicCategory::Task),
    ("schedule", TopicCategory::Task),
    ("deadline", TopicCategory::Task),
    ("chat", TopicCategory::Chat),
    ("conversation", TopicCategory::Chat),
    ("greeting", TopicCategory::Chat),
    ("small talk", TopicCategory::Chat),
    ("sharing", TopicCategory::Chat),
    ("asking", TopicCategory::Chat),
    ("question", TopicCategory::Chat),
    ("hello", TopicCategory::Chat),
    ("hi", TopicCategory::Chat),
    ("你好", TopicCategory::Chat),
    ("嗎", TopicCategory::Chat),
    ("呢", TopicCategory::Chat),
    ("今天", TopicCategory::Chat),
    ("不錯", TopicCategory::Chat),
    ("general", TopicCategory::General),
    ("other", TopicCategory::General),
];

/// Classifies a single message into a coarse topic category.
///
/// Classification is infallible: a service failure falls back to the
/// configured keyword lexicons, and an unmappable label becomes
/// `General`. Results are memoized per message.
pub struct TopicClassifier {
    client: Arc<dyn LlmClient>,
    config: TopicConfig,
    cache: MemoCache<String, TopicCategory>,
}

impl TopicClassifier {
    /// Create a classifier backed by the given completion client.
    pub fn new(client: Arc<dyn LlmClient>, config: TopicConfig) -> Self {
        Self {
            client,
            config,
            cache: MemoCache::new(),
        }
    }

    /// Classify `message` into one of the four categories.
    pub async fn classify(&self, message: &str) -> TopicCategory {
        if let Some(cached) = self.cache.get(&message.to_string()) {
            return cached;
        }

        let prompt = build_topic_prompt(message);

        let category = match self.client.complete(&prompt).await {
            Ok(response) => {
                let label = response.trim().to_lowercase();
                let category = normalize_label(&label);
                debug!(label = %label, category = category.as_str(), "Topic label normalized");
                category
            }
            Err(e) => {
                warn!(error = %e, "Topic service unavailable, using keyword fallback");
                self.fallback_category(message)
            }
        };

        self.cache.insert(message.to_string(), category);
        category
    }

    /// Keyword-lexicon fallback when the service is unreachable.
    fn fallback_category(&self, message: &str) -> TopicCategory {
        let lower = message.to_lowercase();

        if contains_any(&lower, &self.config.code_keywords) {
            TopicCategory::Code
        } else if contains_any(&lower, &self.config.task_keywords) {
            TopicCategory::Task
        } else if contains_any(&lower, &self.config.chat_keywords) {
            TopicCategory::Chat
        } else {
            TopicCategory::General
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|kw| !kw.is_empty() && text.contains(&kw.to_lowercase()))
}

fn normalize_label(label: &str) -> TopicCategory {
    SYNONYMS
        .iter()
        .find(|(syn, _)| *syn == label)
        .map(|(_, category)| *category)
        .unwrap_or(TopicCategory::General)
}

fn build_topic_prompt(message: &str) -> String {
    format!(
        r#"Extract the topic category from this message.

Categories:
- code: messages about programming, coding, scripts, functions, classes, python, javascript, debugging
- task: messages about work, jobs, todo lists, reminders, scheduling, deadlines
- chat: casual conversation, greetings, small talk, sharing information, asking questions
- general: messages that don't fit other categories

Examples:
"這是一個關於 Python 的示例" -> code
"你覺得這個代碼怎麼樣？" -> code
"今天天氣怎麼樣？" -> chat
"順便問一下，這個項目進度如何？" -> task
"你好，歡迎使用助手！" -> chat
"我在香港，今天有點冷" -> chat
"今天天氣不錯" -> chat

Now extract the topic for:
Message: {message}

Just return the category name (single word), no other text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_llm::{FailingLlmClient, MockLlmClient, ScriptedLlmClient};

    fn classifier_with(client: Arc<dyn LlmClient>) -> TopicClassifier {
        TopicClassifier::new(client, TopicConfig::default())
    }

    #[test]
    fn test_normalize_known_synonyms() {
        assert_eq!(normalize_label("coding"), TopicCategory::Code);
        assert_eq!(normalize_label("todo"), TopicCategory::Task);
        assert_eq!(normalize_label("greeting"), TopicCategory::Chat);
        assert_eq!(normalize_label("other"), TopicCategory::General);
    }

    #[test]
    fn test_normalize_unknown_label() {
        assert_eq!(normalize_label("weather"), TopicCategory::General);
    }

    #[tokio::test]
    async fn test_classify_maps_model_label() {
        let classifier = classifier_with(Arc::new(MockLlmClient::new("Programming")));
        let category = classifier.classify("這是一個關於 Python 的示例").await;
        assert_eq!(category, TopicCategory::Code);
    }

    #[tokio::test]
    async fn test_classify_fallback_on_failure() {
        let classifier = classifier_with(Arc::new(FailingLlmClient));
        assert_eq!(
            classifier.classify("這段代碼有 bug").await,
            TopicCategory::Code
        );
        assert_eq!(
            classifier.classify("記得 remind 我明天的 deadline").await,
            TopicCategory::Task
        );
        assert_eq!(classifier.classify("你好！").await, TopicCategory::Chat);
        assert_eq!(classifier.classify("42").await, TopicCategory::General);
    }

    #[tokio::test]
    async fn test_classify_memoizes_per_message() {
        let client = Arc::new(ScriptedLlmClient::new(vec!["code", "chat"]));
        let classifier = TopicClassifier::new(client.clone(), TopicConfig::default());

        let first = classifier.classify("same message").await;
        let second = classifier.classify("same message").await;

        assert_eq!(first, TopicCategory::Code);
        assert_eq!(second, TopicCategory::Code);
        assert_eq!(client.calls(), 1);
    }
}
