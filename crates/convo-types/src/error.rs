//! Error types shared across the workspace.

use thiserror::Error;

/// Errors surfaced by configuration loading and serialization.
///
/// Detection itself is infallible by contract; this type covers the
/// plumbing around it.
#[derive(Debug, Error)]
pub enum ConvoError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
