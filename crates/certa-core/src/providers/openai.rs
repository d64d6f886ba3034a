//! OpenAI-compatible chat completions provider.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, LlmProvider};
use crate::error::{ConfigError, ProviderError};

/// User agent for provider requests.
const USER_AGENT_VALUE: &str = concat!("certa/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ConfigError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| ConfigError::Provider {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create with the key taken from `api_key_env` (may be unset for local gateways).
    pub fn from_env(base_url: &str, api_key_env: &str) -> Result<Self, ConfigError> {
        let api_key = std::env::var(api_key_env).ok().filter(|k| !k.is_empty());
        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
        });
        if let Some(obj) = body.as_object_mut() {
            for (key, value) in &request.options {
                if key == "model" || key == "messages" {
                    continue;
                }
                obj.insert(key.clone(), value.clone());
            }
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %request.model, "sending completion request");

        let mut builder = self.client.post(&url).json(&Self::request_body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::Unauthorized { message },
                404 => ProviderError::NotFound { message },
                429 => ProviderError::RateLimited { retry_after },
                code @ 500..=599 => ProviderError::Unavailable {
                    status: code,
                    message,
                },
                code => ProviderError::Rejected {
                    status: code,
                    message,
                },
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    message: format!("failed to parse completion response: {}", e),
                })?;

        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse {
                message: "response missing choices[0].message.content".to_string(),
            })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
