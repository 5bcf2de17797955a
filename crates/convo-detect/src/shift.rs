//! Topic-shift detection over recent history.

use convo_types::{SessionHistory, TopicCategory};

use crate::topic::TopicClassifier;

/// Detects a topic shift between the two most recent history messages.
///
/// Compares per-message topic labels; a disagreement means the session
/// was already drifting before the current input arrived.
pub struct TopicShiftDetector {
    classifier: TopicClassifier,
}

impl TopicShiftDetector {
    /// Create a detector around an existing topic classifier.
    pub fn new(classifier: TopicClassifier) -> Self {
        Self { classifier }
    }

    /// Returns the disagreeing `(previous, latest)` category pair, or
    /// `None` when fewer than two messages exist or the labels agree.
    pub async fn detect(
        &self,
        history: &SessionHistory,
    ) -> Option<(TopicCategory, TopicCategory)> {
        let (second_last, last) = history.last_two()?;

        let previous = self.classifier.classify(second_last).await;
        let latest = self.classifier.classify(last).await;

        if previous != latest {
            Some((previous, latest))
        } else {
            None
        }
    }

    /// Access the underlying classifier.
    pub fn classifier(&self) -> &TopicClassifier {
        &self.classifier
    }
}
