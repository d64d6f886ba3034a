//! Contract tests for ReflectionScorer.
//!
//! Covers the fixed sample count, score mapping and averaging, the
//! zero-signal case, and retry behavior end to end against an
//! OpenAI-compatible mock server.

use std::sync::Arc;
use std::time::Duration;

use certa_core::{
    ApiError, ClientConfig, Error, FakeProvider, OpenAiProvider, ProviderError, ReflectionScorer,
    ScorerConfig, Verdict,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scorer_with(provider: Arc<FakeProvider>, n: u32) -> ReflectionScorer {
    ReflectionScorer::new(ScorerConfig::default().with_reflections(n), provider)
        .expect("failed to create scorer")
}

#[tokio::test]
async fn test_correct_answer_scores_one() {
    let provider = Arc::new(FakeProvider::new().with_response("A"));
    let scorer = scorer_with(provider, 3);

    let score = scorer.score("2", "What is 1+1?").await.unwrap();
    assert_eq!(score, Some(1.0));
}

#[tokio::test]
async fn test_wrong_answer_scores_zero() {
    let provider = Arc::new(FakeProvider::new().with_response("B"));
    let scorer = scorer_with(provider, 3);

    let score = scorer.score("13", "What is 6+6?").await.unwrap();
    assert_eq!(score, Some(0.0));
}

#[tokio::test]
async fn test_average_of_single_letter_runs() {
    let mut scores = Vec::new();
    for letter in ["A", "B", "C"] {
        let scorer = scorer_with(Arc::new(FakeProvider::new().with_response(letter)), 3);
        scores.push(scorer.score("answer", "").await.unwrap().unwrap());
    }

    let average = scores.iter().sum::<f64>() / 3.0;
    let expected = (1.0 + 0.0 + 0.5) / 3.0;
    assert!((average - expected).abs() < 1e-2);
}

#[tokio::test]
async fn test_fixed_sample_count() {
    for n in [1, 2, 5, 8] {
        let provider = Arc::new(FakeProvider::new().with_response("nothing to parse"));
        let scorer = scorer_with(provider.clone(), n);

        let result = scorer.explain("a", "q").await.unwrap();
        assert_eq!(provider.calls(), n);
        assert_eq!(result.samples().len(), n as usize);
        assert_eq!(result.mean_score(), None);
        assert!(result
            .verdicts()
            .iter()
            .all(|v| *v == Verdict::Unparseable));
    }
}

#[tokio::test]
async fn test_explain_envelope_contents() {
    let provider = Arc::new(
        FakeProvider::new()
            .then_respond("  1 + 1 is 2, so this is right.\nA\n")
            .then_respond("Prose mentioning A only.")
            .then_respond("Could be either.\n c "),
    );
    let scorer = scorer_with(provider, 3);

    let result = scorer.explain("2", "What is 1+1?").await.unwrap();
    assert_eq!(
        result.responses(),
        vec![
            "1 + 1 is 2, so this is right.\nA",
            "Prose mentioning A only.",
            "Could be either.\n c",
        ]
    );
    assert_eq!(result.letters(), vec![Some('A'), None, Some('C')]);
    assert_eq!(result.scores(), vec![1.0, 0.5]);
    assert_eq!(result.mean_score(), Some(0.75));
    assert_eq!(result.reasoning(), Some("1 + 1 is 2, so this is right."));
}

#[tokio::test]
async fn test_openai_provider_retries_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Basic arithmetic.\nA"}}]
        })))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let provider = Arc::new(OpenAiProvider::new(&mock_server.uri(), None).unwrap());
    let config = ScorerConfig::default().with_reflections(2).with_client(
        ClientConfig::default()
            .with_max_retries(3)
            .with_base_backoff(Duration::from_millis(1)),
    );
    let scorer = ReflectionScorer::new(config, provider).unwrap();

    let result = scorer.explain("2", "What is 1+1?").await.unwrap();
    assert_eq!(result.mean_score(), Some(1.0));

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 4);
}

#[tokio::test]
async fn test_openai_provider_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let provider = Arc::new(OpenAiProvider::new(&mock_server.uri(), Some("bad".into())).unwrap());
    let config = ScorerConfig::default().with_reflections(3).with_client(
        ClientConfig::default()
            .with_max_retries(2)
            .with_base_backoff(Duration::from_millis(1)),
    );
    let scorer = ReflectionScorer::new(config, provider).unwrap();

    let err = scorer.explain("2", "What is 1+1?").await.unwrap_err();
    match &err {
        Error::Api(ApiError::RetriesExhausted { retries, source }) => {
            assert_eq!(*retries, 2);
            assert!(matches!(source, ProviderError::Unauthorized { .. }));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert!(err.to_string().contains("after 2 retries"));

    // Fail-fast: only the first sample's three attempts were made.
    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}
