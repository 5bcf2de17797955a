//! Semantic similarity scoring against the last history message.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use convo_llm::LlmClient;
use convo_types::SimilarityConfig;

use crate::cache::MemoCache;

/// Scores semantic relatedness between the current message and the
/// most recent prior message.
///
/// The service is asked for a bare number, but small models answer in
/// many shapes; `parse_score` walks a tolerant chain of extractors
/// before giving up. Total parse failure falls back to a token-overlap
/// heuristic that never returns 0.0, so a broken parser cannot fake a
/// confident new-conversation signal.
pub struct SimilarityScorer {
    client: Arc<dyn LlmClient>,
    config: SimilarityConfig,
    decimal_re: Regex,
    bare_number_re: Regex,
    percent_re: Regex,
    cache: MemoCache<(String, String), f32>,
}

impl SimilarityScorer {
    /// Create a scorer backed by the given completion client.
    pub fn new(client: Arc<dyn LlmClient>, config: SimilarityConfig) -> Self {
        // The patterns are literals; compilation cannot fail.
        Self {
            client,
            config,
            decimal_re: Regex::new(r"(\d+\.\d+)").unwrap(),
            bare_number_re: Regex::new(r"^\s*(\d+\.?\d*)\s*$").unwrap(),
            percent_re: Regex::new(r"(\d+)%").unwrap(),
            cache: MemoCache::new(),
        }
    }

    /// The configured thresholds (engine reads these when mapping
    /// scores to states).
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Score `message` against `last_message`, in [0, 1].
    pub async fn score(&self, message: &str, last_message: &str) -> f32 {
        let key = (message.to_string(), last_message.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let prompt = build_similarity_prompt(message, last_message);

        let score = match self.client.complete(&prompt).await {
            Ok(response) => match self.parse_score(&response) {
                Some(score) => {
                    debug!(score, "Similarity parsed from service response");
                    score
                }
                None => {
                    debug!(response = %response.trim(), "Unparseable similarity, using overlap heuristic");
                    self.overlap_heuristic(message, last_message)
                }
            },
            Err(e) => {
                warn!(error = %e, "Similarity service unavailable, using overlap heuristic");
                self.overlap_heuristic(message, last_message)
            }
        };

        self.cache.insert(key, score);
        score
    }

    /// Walk the extractor chain over a raw service response.
    fn parse_score(&self, output: &str) -> Option<f32> {
        let output = output.trim();

        if let Some(caps) = self.decimal_re.captures(output) {
            if let Ok(score) = caps[1].parse::<f32>() {
                return Some(score.clamp(0.0, 1.0));
            }
        }

        if let Some(caps) = self.bare_number_re.captures(output) {
            if let Ok(score) = caps[1].parse::<f32>() {
                return Some(score.clamp(0.0, 1.0));
            }
        }

        if let Some(caps) = self.percent_re.captures(output) {
            if let Ok(percent) = caps[1].parse::<f32>() {
                return Some((percent / 100.0).clamp(0.0, 1.0));
            }
        }

        qualitative_score(output)
    }

    /// Shared-token fallback when nothing numeric could be extracted.
    fn overlap_heuristic(&self, message: &str, last_message: &str) -> f32 {
        let shares_token = message
            .split_whitespace()
            .any(|word| last_message.split_whitespace().any(|other| other == word));

        if shares_token {
            self.config.overlap_score
        } else {
            self.config.disjoint_score
        }
    }
}

/// Map qualitative Chinese descriptors to scores.
///
/// Order matters: "完全無關" contains "無關", so the longer phrases are
/// checked before the bare one.
fn qualitative_score(output: &str) -> Option<f32> {
    if output.contains("很不同") || output.contains("完全不相關") {
        Some(0.1)
    } else if output.contains("中度相關") || output.contains("不太相關") {
        Some(0.6)
    } else if output.contains("完全相同") || output.contains("高度相關") {
        Some(0.9)
    } else if output.contains("無關") {
        Some(0.3)
    } else {
        None
    }
}

fn build_similarity_prompt(message: &str, last_message: &str) -> String {
    format!(
        r#"請計算這兩則訊息的語義相似度（0.0-1.0）。

0.0 = 完全無關
0.3 = 話題不太相關
0.7 = 話題高度相關
1.0 = 話題完全相同

訊息1: {message}
訊息2: {last_message}

請只返回一個數字，不要其他文字。"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_llm::{FailingLlmClient, MockLlmClient, ScriptedLlmClient};

    fn scorer_with(client: Arc<dyn LlmClient>) -> SimilarityScorer {
        SimilarityScorer::new(client, SimilarityConfig::default())
    }

    #[tokio::test]
    async fn test_decimal_response() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("0.85")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 0.85).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_verbose_decimal_response() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("相似度是 0.72 左右")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 0.72).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_bare_integer_response() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("1")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_percentage_response() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("大約 85%")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 0.85).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_qualitative_response() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("這兩則訊息高度相關")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_qualitative_negated_form_wins() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("完全不相關")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 0.1).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_garbage_with_shared_tokens() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("maybe?")));
        let score = scorer.score("the weather today", "weather report").await;
        assert!((score - 0.6).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_garbage_with_disjoint_tokens() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("maybe?")));
        let score = scorer.score("alpha beta", "gamma delta").await;
        assert!((score - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_service_failure_uses_heuristic() {
        let scorer = scorer_with(Arc::new(FailingLlmClient));
        let score = scorer.score("alpha beta", "gamma delta").await;
        assert!((score - 0.3).abs() < f32::EPSILON);
        assert!(score > 0.0);
    }

    #[tokio::test]
    async fn test_out_of_range_clamped() {
        let scorer = scorer_with(Arc::new(MockLlmClient::new("7.5")));
        let score = scorer.score("msg", "last").await;
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_memoized_by_message_pair() {
        let client = Arc::new(ScriptedLlmClient::new(vec!["0.8", "0.2"]));
        let scorer = SimilarityScorer::new(client.clone(), SimilarityConfig::default());

        let first = scorer.score("msg", "last").await;
        let second = scorer.score("msg", "last").await;

        assert!((first - 0.8).abs() < f32::EPSILON);
        assert!((second - 0.8).abs() < f32::EPSILON);
        assert_eq!(client.calls(), 1);
    }
}
