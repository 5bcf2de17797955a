//! Result rendering.

use anyhow::Result;

use convo_types::DetectionResult;

use crate::cli::OutputFormat;

/// Render a detection result in the requested format.
pub fn render(result: &DetectionResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Simple => Ok(render_simple(result)),
        OutputFormat::Pretty => Ok(render_pretty(result)),
    }
}

fn render_simple(result: &DetectionResult) -> String {
    format!(
        "Conversation State: {}\n\
         Similarity: {:.2}\n\
         Detected by: {}\n\
         Confidence: {:.2}",
        result.state.as_str(),
        result.similarity_to_previous,
        result.detected_by.as_str(),
        result.confidence,
    )
}

fn render_pretty(result: &DetectionResult) -> String {
    let rule = "=".repeat(80);
    format!(
        "{rule}\n\
         Detection Result\n\
         {rule}\n\
         \n\
         Conversation State: {}\n\
         Similarity to Previous: {:.2}\n\
         Detected by: {}\n\
         Confidence: {:.2}\n\
         Context Length Recommendation: {} tokens\n\
         \n\
         Reason: {}\n\
         {rule}",
        result.state.as_str(),
        result.similarity_to_previous,
        result.detected_by.as_str(),
        result.confidence,
        result.context_length,
        result.reason,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_types::{ConversationState, DetectionSource};

    fn sample() -> DetectionResult {
        DetectionResult::new(
            ConversationState::TopicChange,
            DetectionSource::KeywordHigh,
            0.95,
            "High-priority keyword '然後呢' detected",
        )
    }

    #[test]
    fn test_json_round_trips() {
        let rendered = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: DetectionResult = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.state, ConversationState::TopicChange);
        assert!(rendered.contains("\"conversationState\""));
    }

    #[test]
    fn test_simple_lists_core_fields() {
        let rendered = render(&sample(), OutputFormat::Simple).unwrap();
        assert!(rendered.contains("Conversation State: topic_change"));
        assert!(rendered.contains("Confidence: 0.95"));
        assert!(!rendered.contains("="));
    }

    #[test]
    fn test_pretty_includes_context_recommendation() {
        let rendered = render(&sample(), OutputFormat::Pretty).unwrap();
        assert!(rendered.contains("Context Length Recommendation: 500 tokens"));
        assert!(rendered.contains("Reason: High-priority keyword"));
    }
}
