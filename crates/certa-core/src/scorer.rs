//! Multi-sample reflection scoring.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, info_span, Instrument};

use crate::client::CompletionClient;
use crate::config::{ProviderKind, SamplingMode, ScorerConfig};
use crate::error::{ConfigError, Result};
use crate::prompt::PromptTemplate;
use crate::providers::{FakeProvider, LlmProvider, OpenAiProvider};
use crate::result::{ReflectionResult, ReflectionSample};

/// Asks the model to judge an answer `n_reflections` times and averages the verdicts.
///
/// Every scoring call issues exactly `n_reflections` completions. Nothing is cached.
#[derive(Debug, Clone)]
pub struct ReflectionScorer {
    client: CompletionClient,
    template: PromptTemplate,
    n_reflections: u32,
    sampling: SamplingMode,
}

impl ReflectionScorer {
    /// Validate `config` and wire it to `provider`.
    pub fn new(config: ScorerConfig, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        config.validate()?;
        let template = config.template()?;
        let client = CompletionClient::new(provider, config.client)?;
        Ok(Self {
            client,
            template,
            n_reflections: config.n_reflections,
            sampling: config.sampling,
        })
    }

    /// Build the provider named by `config.provider`.
    pub fn from_config(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        let provider: Arc<dyn LlmProvider> = match config.provider.kind {
            ProviderKind::Openai => Arc::new(OpenAiProvider::from_env(
                &config.provider.base_url,
                &config.provider.api_key_env,
            )?),
            ProviderKind::Fake => {
                let response =
                    config
                        .provider
                        .fake_response
                        .clone()
                        .ok_or_else(|| ConfigError::Provider {
                            message: "fake provider requires 'fake_response'".to_string(),
                        })?;
                Arc::new(FakeProvider::new().with_response(response))
            }
        };
        Self::new(config, provider)
    }

    pub fn n_reflections(&self) -> u32 {
        self.n_reflections
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    pub fn build_prompt(&self, question: &str, answer: &str) -> String {
        self.template.render(question, answer)
    }

    /// Score `answer` to `question` and return every sample alongside the mean.
    ///
    /// Fails if any completion fails after its retries; no partial result is returned.
    pub async fn explain(&self, answer: &str, question: &str) -> Result<ReflectionResult> {
        let span = info_span!(
            "certa.explain",
            n_reflections = self.n_reflections,
            sampling = ?self.sampling
        );
        self.explain_inner(answer, question).instrument(span).await
    }

    async fn explain_inner(&self, answer: &str, question: &str) -> Result<ReflectionResult> {
        let prompt = self.build_prompt(question, answer);

        let responses = match self.sampling {
            SamplingMode::Sequential => {
                let mut out = Vec::with_capacity(self.n_reflections as usize);
                for _ in 0..self.n_reflections {
                    out.push(self.client.complete(&prompt).await?);
                }
                out
            }
            SamplingMode::Concurrent => {
                try_join_all((0..self.n_reflections).map(|_| self.client.complete(&prompt)))
                    .await?
            }
        };

        let samples: Vec<ReflectionSample> = responses
            .iter()
            .map(|raw| ReflectionSample::from_response(raw))
            .collect();

        for (idx, sample) in samples.iter().enumerate() {
            debug!(sample = idx, verdict = ?sample.verdict, "parsed reflection");
        }

        let result = ReflectionResult::new(prompt, samples);
        info!(
            score_mean = ?result.mean_score(),
            parsed = result.parsed_count(),
            "reflection scoring complete"
        );
        Ok(result)
    }

    /// Mean certainty only. `None` when no sample produced a verdict.
    pub async fn score(&self, answer: &str, question: &str) -> Result<Option<f64>> {
        Ok(self.explain(answer, question).await?.mean_score())
    }

    /// Explain each `(answer, question)` pair in order. Stops at the first failure.
    pub async fn explain_batch<A, Q>(&self, pairs: &[(A, Q)]) -> Result<Vec<ReflectionResult>>
    where
        A: AsRef<str>,
        Q: AsRef<str>,
    {
        let mut results = Vec::with_capacity(pairs.len());
        for (answer, question) in pairs {
            results.push(self.explain(answer.as_ref(), question.as_ref()).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, ProviderConfig};
    use crate::error::{ApiError, Error, ProviderError};
    use crate::verdict::Verdict;
    use std::time::Duration;

    fn scorer(provider: Arc<FakeProvider>, n: u32) -> ReflectionScorer {
        ReflectionScorer::new(ScorerConfig::default().with_reflections(n), provider).unwrap()
    }

    #[tokio::test]
    async fn test_mixed_verdicts_average() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("Correct.\nA")
                .then_respond("Wrong.\nB")
                .then_respond("Unsure.\nC"),
        );
        let result = scorer(provider, 3).explain("2", "What is 1+1?").await.unwrap();

        let mean = result.mean_score().unwrap();
        assert!((mean - 0.5).abs() < 1e-9);
        assert_eq!(
            result.verdicts(),
            vec![Verdict::Correct, Verdict::Incorrect, Verdict::Uncertain]
        );
    }

    #[tokio::test]
    async fn test_prompt_shared_across_samples() {
        let provider = Arc::new(FakeProvider::new().with_response("A"));
        let result = scorer(provider.clone(), 4)
            .explain("2", "What is 1+1?")
            .await
            .unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts.iter().all(|p| p == result.prompt()));
        assert!(result.prompt().contains("Question: What is 1+1?"));
        assert!(result.prompt().contains("Answer: 2"));
    }

    #[tokio::test]
    async fn test_unparseable_does_not_stop_sampling() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("no idea")
                .then_respond("still nothing")
                .with_response("A"),
        );
        let result = scorer(provider.clone(), 5).explain("x", "y").await.unwrap();
        assert_eq!(provider.calls(), 5);
        assert_eq!(result.samples().len(), 5);
        assert_eq!(result.mean_score(), Some(1.0));
    }

    #[tokio::test]
    async fn test_all_unparseable_mean_is_none() {
        let provider = Arc::new(FakeProvider::new().with_response("I cannot decide."));
        let s = scorer(provider, 3);
        assert_eq!(s.score("x", "y").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_sample_fails_whole_call() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("A")
                .then_fail(ProviderError::RateLimited { retry_after: None })
                .then_fail(ProviderError::RateLimited { retry_after: None })
                .with_response("A"),
        );
        let config = ScorerConfig::default()
            .with_reflections(3)
            .with_client(ClientConfig::default().with_max_retries(1));
        let s = ReflectionScorer::new(config, provider.clone()).unwrap();

        let err = s.explain("x", "y").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::RetriesExhausted { retries: 1, .. })
        ));
        // First sample, then two attempts for the second; the third never runs.
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_preserves_issue_order() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond_after("slow\nA", Duration::from_secs(3))
                .then_respond_after("medium\nB", Duration::from_secs(2))
                .then_respond_after("fast\nC", Duration::from_secs(1)),
        );
        let config = ScorerConfig::default()
            .with_reflections(3)
            .with_sampling(SamplingMode::Concurrent);
        let s = ReflectionScorer::new(config, provider.clone()).unwrap();

        let start = tokio::time::Instant::now();
        let result = s.explain("x", "y").await.unwrap();

        assert_eq!(result.letters(), vec![Some('A'), Some('B'), Some('C')]);
        assert_eq!(provider.calls(), 3);
        // Overlapping calls finish with the slowest one.
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_concurrent_fails_fast() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("A")
                .then_fail(ProviderError::Rejected {
                    status: 400,
                    message: "bad".into(),
                })
                .then_respond("A"),
        );
        let config = ScorerConfig::default()
            .with_reflections(3)
            .with_sampling(SamplingMode::Concurrent);
        let s = ReflectionScorer::new(config, provider).unwrap();

        let err = s.explain("x", "y").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::NonRetryable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_exhausted_sample_fails_whole_call() {
        // All three samples pop their first step before any backoff sleep;
        // only the second keeps failing on its retries.
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("Fine.\nA")
                .then_fail(ProviderError::RateLimited { retry_after: None })
                .then_respond("Fine.\nA")
                .then_fail(ProviderError::RateLimited { retry_after: None })
                .then_fail(ProviderError::RateLimited { retry_after: None }),
        );
        let config = ScorerConfig::default()
            .with_reflections(3)
            .with_sampling(SamplingMode::Concurrent)
            .with_client(ClientConfig::default().with_max_retries(2));
        let s = ReflectionScorer::new(config, provider.clone()).unwrap();

        let err = s.explain("x", "y").await.unwrap_err();
        match err {
            Error::Api(ApiError::RetriesExhausted { retries, source }) => {
                assert_eq!(retries, 2);
                assert_eq!(source, ProviderError::RateLimited { retry_after: None });
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn test_no_caching_between_calls() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("A")
                .then_respond("B"),
        );
        let s = scorer(provider.clone(), 1);
        assert_eq!(s.score("2", "1+1?").await.unwrap(), Some(1.0));
        assert_eq!(s.score("2", "1+1?").await.unwrap(), Some(0.0));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_explain_batch_in_order() {
        let provider = Arc::new(
            FakeProvider::new()
                .then_respond("A")
                .then_respond("B"),
        );
        let s = scorer(provider, 1);
        let results = s
            .explain_batch(&[("2", "What is 1+1?"), ("13", "What is 6+6?")])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].mean_score(), Some(1.0));
        assert_eq!(results[1].mean_score(), Some(0.0));
        assert!(results[1].prompt().contains("Answer: 13"));
    }

    #[test]
    fn test_zero_reflections_rejected_before_any_call() {
        let provider = Arc::new(FakeProvider::new().with_response("A"));
        let err =
            ReflectionScorer::new(ScorerConfig::default().with_reflections(0), provider.clone())
                .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidReflections(0))
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_custom_template() {
        let provider = Arc::new(FakeProvider::new());
        let config = ScorerConfig::default()
            .with_prompt_template("Q: {question}\nA: {answer}\nVerdict letter:");
        let s = ReflectionScorer::new(config, provider).unwrap();
        assert_eq!(s.build_prompt("q", "a"), "Q: q\nA: a\nVerdict letter:");
    }

    #[tokio::test]
    async fn test_from_config_fake_provider() {
        let config = ScorerConfig::default().with_provider(ProviderConfig {
            kind: ProviderKind::Fake,
            fake_response: Some("Reasonable.\nC".to_string()),
            ..Default::default()
        });
        let s = ReflectionScorer::from_config(config).unwrap();
        assert_eq!(s.client().provider_name(), "fake");
        assert_eq!(s.score("a", "q").await.unwrap(), Some(0.5));
    }

    #[test]
    fn test_from_config_fake_without_response_is_config_error() {
        let config = ScorerConfig::default().with_provider(ProviderConfig {
            kind: ProviderKind::Fake,
            ..Default::default()
        });
        assert!(matches!(
            ReflectionScorer::from_config(config),
            Err(Error::Config(ConfigError::Provider { .. }))
        ));
    }
}
