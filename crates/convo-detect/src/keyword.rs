//! Tiered keyword rules.
//!
//! Three keyword tiers with distinct meanings:
//! - high: explicit topic-change markers ("換話題", "順便問一下")
//! - medium: softer discourse connectives ("但是", "不過")
//! - low: conversational particles ("嗎", "呢") that suppress the
//!   keyword stage entirely rather than signal a change

use convo_types::KeywordConfig;

/// Substring matcher over the three keyword tiers.
///
/// Matching is plain containment; the lexicons are predominantly
/// Chinese, where token boundaries carry no meaning. Tiers are checked
/// in priority order by the engine and the first hit in a tier wins.
pub struct KeywordRules {
    high: Vec<String>,
    medium: Vec<String>,
    low: Vec<String>,
}

impl KeywordRules {
    /// Build the matcher from configured lexicons.
    pub fn new(config: &KeywordConfig) -> Self {
        Self {
            high: config.high_priority.clone(),
            medium: config.medium_priority.clone(),
            low: config.low_priority.clone(),
        }
    }

    /// First high-priority keyword contained in `text`, if any.
    pub fn match_high(&self, text: &str) -> Option<&str> {
        Self::first_match(&self.high, text)
    }

    /// First medium-priority keyword contained in `text`, if any.
    pub fn match_medium(&self, text: &str) -> Option<&str> {
        Self::first_match(&self.medium, text)
    }

    /// First low-priority particle contained in `text`, if any.
    pub fn match_low(&self, text: &str) -> Option<&str> {
        Self::first_match(&self.low, text)
    }

    fn first_match<'a>(keywords: &'a [String], text: &str) -> Option<&'a str> {
        keywords
            .iter()
            .find(|kw| !kw.is_empty() && text.contains(kw.as_str()))
            .map(String::as_str)
    }
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_priority_match() {
        let rules = KeywordRules::default();
        assert_eq!(rules.match_high("然後呢，接著說什麼？"), Some("然後呢"));
        assert_eq!(rules.match_high("順便問一下進度"), Some("順便問一下"));
    }

    #[test]
    fn test_medium_priority_match() {
        let rules = KeywordRules::default();
        assert_eq!(rules.match_medium("但是我想先吃飯"), Some("但是"));
        assert_eq!(rules.match_medium("今天天氣不錯"), None);
    }

    #[test]
    fn test_low_priority_particles() {
        let rules = KeywordRules::default();
        assert_eq!(rules.match_low("今天天氣怎麼樣？"), Some("怎麼"));
        assert_eq!(rules.match_low("你好嗎"), Some("嗎"));
    }

    #[test]
    fn test_empty_text_matches_nothing() {
        let rules = KeywordRules::default();
        assert_eq!(rules.match_high(""), None);
        assert_eq!(rules.match_medium(""), None);
        assert_eq!(rules.match_low(""), None);
    }

    #[test]
    fn test_custom_lexicon() {
        let config = KeywordConfig {
            high_priority: vec!["by the way".to_string()],
            medium_priority: vec![],
            low_priority: vec![],
        };
        let rules = KeywordRules::new(&config);
        assert_eq!(rules.match_high("oh by the way, lunch?"), Some("by the way"));
        assert_eq!(rules.match_high("然後呢"), None);
    }
}
