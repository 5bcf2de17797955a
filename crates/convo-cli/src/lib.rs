//! # convo-cli
//!
//! Command-line front end for the conversation-state detector.
//!
//! Reads a session JSONL file, classifies a new user message against
//! its recent history, and prints the verdict with a context-length
//! recommendation.

pub mod cli;
pub mod commands;
pub mod output;
pub mod session;

pub use cli::{Cli, OutputFormat};
pub use commands::run;
