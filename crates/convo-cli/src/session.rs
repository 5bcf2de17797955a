//! Session JSONL parsing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use convo_types::SessionHistory;

/// Load the trailing `last_n` messages from a session JSONL file.
///
/// Session files come from several logging layouts, so each line is
/// probed for the first populated field among `message`, `assistant`,
/// `user`, and `content`. Malformed lines are skipped, not fatal.
pub fn load_history(path: &Path, last_n: usize) -> Result<SessionHistory> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut messages = Vec::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(entry) => {
                if let Some(message) = extract_message(&entry) {
                    messages.push(message);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped malformed session lines");
    }

    Ok(SessionHistory::new(messages, last_n))
}

/// First populated message field in a session entry.
fn extract_message(entry: &Value) -> Option<String> {
    for field in ["message", "assistant", "user", "content"] {
        if let Some(text) = entry.get(field).and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn session_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("Failed to write line");
        }
        file
    }

    #[test]
    fn test_load_mixed_field_layouts() {
        let file = session_file(&[
            r#"{"user": "你好"}"#,
            r#"{"assistant": "你好！有什麼可以幫你？"}"#,
            r#"{"message": "我想問 Python 的問題"}"#,
            r#"{"content": "沒問題"}"#,
        ]);

        let history = load_history(file.path(), 10).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.last(), Some("沒問題"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let file = session_file(&[
            r#"{"message": "第一則"}"#,
            "not json at all",
            r#"{"unrelated": 42}"#,
            "",
            r#"{"message": "第二則"}"#,
        ]);

        let history = load_history(file.path(), 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some("第二則"));
    }

    #[test]
    fn test_last_n_window_applied() {
        let lines: Vec<String> = (0..20).map(|i| format!(r#"{{"message": "m{i}"}}"#)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = session_file(&refs);

        let history = load_history(file.path(), 5).unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history.last(), Some("m19"));
    }

    #[test]
    fn test_field_probing_order() {
        // "message" wins over "content" when both are present.
        let file = session_file(&[r#"{"content": "後備", "message": "優先"}"#]);

        let history = load_history(file.path(), 10).unwrap();
        assert_eq!(history.last(), Some("優先"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_history(Path::new("/nonexistent/session.jsonl"), 10);
        assert!(result.is_err());
    }
}
