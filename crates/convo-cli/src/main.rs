//! Conversation State Detector
//!
//! Classifies a new user message against recent session history.
//!
//! # Usage
//!
//! ```bash
//! convo-state session.jsonl --user-input "然後呢，接著說什麼？"
//! convo-state session.jsonl --format json --last-n 5
//! convo-state session.jsonl --arbitrate
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/convo-state/config.toml)
//! 3. Environment variables (CONVO_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use convo_cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
