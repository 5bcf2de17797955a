//! Helpers for pulling structured data out of model responses.

/// Extract a JSON object from text (handles markdown code blocks).
pub fn extract_json(text: &str) -> String {
    // Check for markdown code block
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    // Check for plain code block
    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    // Find first { and last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        return text[start..=end].to_string();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"state": "continuation", "confidence": 0.8}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_extract_json_code_block() {
        let text = "Here is the verdict:\n```json\n{\"state\": \"topic_change\"}\n```";
        let json = extract_json(text);
        assert!(json.starts_with('{'));
        assert!(json.contains("topic_change"));
    }

    #[test]
    fn test_extract_json_with_prefix() {
        let text = r#"Sure! The answer is {"state": "continuation"} as requested."#;
        let json = extract_json(text);
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_no_object() {
        assert_eq!(extract_json("0.85"), "0.85");
    }
}
