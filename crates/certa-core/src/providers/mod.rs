//! Completion providers.
//!
//! The scorer only ever sees [`LlmProvider`]; concrete providers are injected
//! so tests can substitute [`fake::FakeProvider`].

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

pub mod fake;
pub mod openai;

pub use fake::FakeProvider;
pub use openai::OpenAiProvider;

/// One completion request: prompt plus sampling parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    /// Provider-specific pass-through fields (e.g. `max_tokens`).
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
