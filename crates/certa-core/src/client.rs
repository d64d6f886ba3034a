//! Completion client with bounded exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError, ProviderError};
use crate::providers::{CompletionRequest, LlmProvider};

/// Wraps a provider with the retry policy from [`ClientConfig`].
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
    config: ClientConfig,
    base_backoff: Duration,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.provider.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_backoff = config.base_backoff()?;
        let timeout = config.timeout()?;
        Ok(Self {
            provider,
            config,
            base_backoff,
            timeout,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Delay before retry `retry` (0-indexed): `base_backoff * 2^retry`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }

    /// Complete `prompt`, retrying per the configured policy.
    ///
    /// Makes at most `max_retries + 1` attempts. Failures outside the retry
    /// policy are returned from the attempt that hit them.
    pub async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            options: self.config.options.clone(),
        };
        let max_retries = self.config.max_retries;
        let policy = self.config.retry_policy;
        let mut retries = 0;

        loop {
            debug!(
                provider = self.provider.provider_name(),
                attempt = retries + 1,
                "requesting completion"
            );

            match self.attempt(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if policy.should_retry(&e) => {
                    if retries >= max_retries {
                        return Err(ApiError::RetriesExhausted {
                            retries: max_retries,
                            source: e,
                        });
                    }

                    let backoff = self.backoff_for(retries);
                    retries += 1;

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying completion"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(ApiError::NonRetryable(e)),
            }
        }
    }

    /// Single attempt, bounded by the per-call timeout if one is set.
    async fn attempt(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, self.provider.complete(request))
                .await
                .unwrap_or(Err(ProviderError::Timeout { after })),
            None => self.provider.complete(request).await,
        }
    }
}
