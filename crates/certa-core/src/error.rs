//! Error types for certainty scoring.

use std::time::Duration;

/// Failures reported by an [`LlmProvider`](crate::providers::LlmProvider).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Rate limit exceeded.
    #[error("rate limited{}", retry_after_suffix(retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Authentication failed or key invalid.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Model or endpoint not found.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Provider-side outage (5xx).
    #[error("provider unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Transport failure before a response was received.
    #[error("network error: {message}")]
    Network { message: String },

    /// Attempt exceeded the configured per-call timeout.
    #[error("completion timed out after {after:?}")]
    Timeout { after: Duration },

    /// Request refused for a reason retrying will not fix (4xx other than the above).
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response arrived but did not carry a completion.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

fn retry_after_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(after) => format!(": retry after {after:?}"),
        None => String::new(),
    }
}

impl ProviderError {
    /// Failures expected to clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Unavailable { .. }
                | Self::Network { .. }
                | Self::Timeout { .. }
        )
    }

    /// Authentication and not-found failures. Usually permanent, but
    /// retried under [`RetryPolicy::Lenient`].
    pub fn is_permanent_client_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Which provider failures the completion client retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Transient failures plus authentication and not-found failures.
    #[default]
    Lenient,
    /// Transient failures only.
    Strict,
}

impl RetryPolicy {
    pub fn should_retry(&self, err: &ProviderError) -> bool {
        match self {
            Self::Lenient => err.is_transient() || err.is_permanent_client_error(),
            Self::Strict => err.is_transient(),
        }
    }
}

/// Completion failures surfaced to callers of the scorer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Every attempt failed with a retryable error.
    #[error("completion failed after {retries} retries: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: ProviderError,
    },

    /// Failure outside the retry policy; raised on the attempt that hit it.
    #[error("completion failed: {0}")]
    NonRetryable(#[source] ProviderError),
}

impl ApiError {
    /// The provider failure behind this error.
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::RetriesExhausted { source, .. } => source,
            Self::NonRetryable(source) => source,
        }
    }
}

/// Invalid construction parameters. Raised before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("n_reflections must be >= 1 (got {0})")]
    InvalidReflections(u32),

    #[error("temperature must be a finite, non-negative number (got {0})")]
    InvalidTemperature(f64),

    #[error("base backoff must be a positive, finite number of seconds (got {0})")]
    InvalidBackoff(f64),

    #[error("timeout must be a positive, finite number of seconds (got {0})")]
    InvalidTimeout(f64),

    #[error("prompt template: {message}")]
    TemplateSlot { message: String },

    #[error("unknown provider '{0}' (expected 'openai' or 'fake')")]
    UnknownProvider(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to build provider: {message}")]
    Provider { message: String },
}

/// Top-level error for scorer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for scorer operations.
pub type Result<T> = std::result::Result<T, Error>;
