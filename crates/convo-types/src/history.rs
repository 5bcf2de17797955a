//! Session history view.

/// A bounded, ordered view of prior session messages, newest last.
///
/// The detector never mutates or persists the history; the calling
/// conversation manager owns the session and supplies this read-only
/// window per call.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    messages: Vec<String>,
}

impl SessionHistory {
    /// Create an empty history.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a history from prior messages, keeping only the most
    /// recent `window` entries.
    pub fn new(messages: Vec<String>, window: usize) -> Self {
        let skip = messages.len().saturating_sub(window);
        Self {
            messages: messages.into_iter().skip(skip).collect(),
        }
    }

    /// Number of messages in the window.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no prior messages are available.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent prior message.
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// The two most recent prior messages, oldest first.
    pub fn last_two(&self) -> Option<(&str, &str)> {
        if self.messages.len() < 2 {
            return None;
        }
        let second_last = &self.messages[self.messages.len() - 2];
        let last = &self.messages[self.messages.len() - 1];
        Some((second_last.as_str(), last.as_str()))
    }

    /// The most recent `n` messages, oldest first.
    pub fn tail(&self, n: usize) -> &[String] {
        let skip = self.messages.len().saturating_sub(n);
        &self.messages[skip..]
    }
}

impl From<Vec<String>> for SessionHistory {
    fn from(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

impl From<Vec<&str>> for SessionHistory {
    fn from(messages: Vec<&str>) -> Self {
        Self {
            messages: messages.into_iter().map(String::from).collect(),
        }
    }
}
