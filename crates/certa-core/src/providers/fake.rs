use super::{CompletionRequest, LlmProvider};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct Scripted {
    outcome: Result<String, ProviderError>,
    delay: Option<Duration>,
}

/// Offline provider: replays scripted outcomes in call order, then falls
/// back to a fixed response.
#[derive(Debug, Default)]
pub struct FakeProvider {
    fixed_response: Option<String>,
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicU32,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Queue a successful completion.
    pub fn then_respond(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()), None)
    }

    /// Queue a successful completion that resolves after `delay`.
    pub fn then_respond_after(self, text: impl Into<String>, delay: Duration) -> Self {
        self.push(Ok(text.into()), Some(delay))
    }

    /// Queue a provider failure.
    pub fn then_fail(self, err: ProviderError) -> Self {
        self.push(Err(err), None)
    }

    fn push(self, outcome: Result<String, ProviderError>, delay: Option<Duration>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Scripted { outcome, delay });
        self
    }

    /// Number of `complete` calls observed.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.prompt.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(Scripted { outcome, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => self
                .fixed_response
                .clone()
                .ok_or_else(|| ProviderError::InvalidResponse {
                    message: "fake provider has no more scripted responses".to_string(),
                }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
