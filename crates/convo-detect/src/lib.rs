//! # convo-detect
//!
//! Layered conversation-state detection.
//!
//! The pipeline classifies a new user message against a bounded window
//! of prior session messages, in strict priority order:
//!
//! 1. `KeywordRules`: tiered lexical markers, including particle
//!    suppression
//! 2. `TopicShiftDetector`: per-message topic labels over the last two
//!    history entries
//! 3. `SimilarityScorer`: semantic relatedness thresholds
//! 4. `ArbitrationGateway` (opt-in): remote second opinion on
//!    difficult or low-similarity cases
//!
//! `StateDecisionEngine` wires the stages together and is the only
//! entry point callers need.

mod arbitration;
mod cache;
mod engine;
mod keyword;
mod shift;
mod similarity;
mod topic;

pub use arbitration::{ArbitrationGateway, ArbitrationVerdict};
pub use cache::MemoCache;
pub use engine::StateDecisionEngine;
pub use keyword::KeywordRules;
pub use shift::TopicShiftDetector;
pub use similarity::SimilarityScorer;
pub use topic::TopicClassifier;
