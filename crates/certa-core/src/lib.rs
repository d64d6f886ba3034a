//! Self-reflection certainty scoring for LLM answers.
//!
//! A [`ReflectionScorer`] asks a model to judge a (question, answer) pair
//! several times, reads a verdict letter from each reply and averages the
//! mapped scores:
//!
//! - `A` (correct) → 1.0
//! - `B` (incorrect) → 0.0
//! - `C` (not sure) → 0.5
//!
//! Replies without a standalone verdict line are kept in the result but do
//! not contribute to the mean.
//!
//! # Quick Start
//!
//! ```no_run
//! use certa_core::{ReflectionScorer, ScorerConfig};
//!
//! # async fn example() -> certa_core::Result<()> {
//! let scorer = ReflectionScorer::from_config(ScorerConfig::load(None)?)?;
//! let result = scorer.explain("2", "What is 1 + 1?").await?;
//! if let Some(mean) = result.mean_score() {
//!     println!("certainty: {:.2}", mean);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod providers;
pub mod result;
pub mod scorer;
pub mod verdict;

// Re-export main types
pub use client::CompletionClient;
pub use config::{
    ClientConfig, ProviderConfig, ProviderKind, SamplingMode, ScorerConfig, CONFIG_FILE_NAME,
};
pub use error::{ApiError, ConfigError, Error, ProviderError, Result, RetryPolicy};
pub use prompt::{PromptTemplate, DEFAULT_REFLECTION_PROMPT};
pub use providers::{CompletionRequest, FakeProvider, LlmProvider, OpenAiProvider};
pub use result::{ReflectionResult, ReflectionSample};
pub use scorer::ReflectionScorer;
pub use verdict::{extract_letter, extract_verdict, Verdict};
