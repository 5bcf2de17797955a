//! CLI argument parsing for the conversation-state detector.

use clap::{Parser, ValueEnum};

/// Conversation State Detector
///
/// Classifies a new user message against a session's recent history as
/// a continuation, a topic change, or a new conversation, and prints a
/// context-length recommendation for the next response.
#[derive(Parser, Debug)]
#[command(name = "convo-state")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to session JSONL file
    pub session_file: String,

    /// User input message (if not provided, read from stdin)
    #[arg(short, long)]
    pub user_input: Option<String>,

    /// Number of messages to extract from history
    #[arg(long, default_value_t = 10)]
    pub last_n: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Consult the remote arbitration service on difficult cases
    #[arg(long)]
    pub arbitrate: bool,

    /// Path to config file (overrides default ~/.config/convo-state/config.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Supported output renderings.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Full JSON record
    Json,

    /// Human-readable report
    Pretty,

    /// One field per line, no decoration
    Simple,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::parse_from(["convo-state", "session.jsonl"]);
        assert_eq!(cli.session_file, "session.jsonl");
        assert_eq!(cli.last_n, 10);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(!cli.arbitrate);
    }

    #[test]
    fn test_user_input_flag() {
        let cli = Cli::parse_from(["convo-state", "s.jsonl", "--user-input", "然後呢"]);
        assert_eq!(cli.user_input.as_deref(), Some("然後呢"));
    }

    #[test]
    fn test_format_json() {
        let cli = Cli::parse_from(["convo-state", "s.jsonl", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_last_n_override() {
        let cli = Cli::parse_from(["convo-state", "s.jsonl", "--last-n", "5"]);
        assert_eq!(cli.last_n, 5);
    }

    #[test]
    fn test_arbitrate_flag() {
        let cli = Cli::parse_from(["convo-state", "s.jsonl", "--arbitrate"]);
        assert!(cli.arbitrate);
    }

    #[test]
    fn test_config_and_log_level() {
        let cli = Cli::parse_from([
            "convo-state",
            "--config",
            "/tmp/custom.toml",
            "--log-level",
            "debug",
            "s.jsonl",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/custom.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
