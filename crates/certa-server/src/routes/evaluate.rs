use crate::error::ApiError;
use crate::server::AppState;
use axum::routing::post;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalPair {
    pub answer: String,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub messages: Vec<EvalPair>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvalResult {
    pub input: EvalPair,
    /// `null` when no reflection produced a verdict.
    pub certainty_score: Option<f64>,
    pub reasoning: Option<String>,
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn router() -> axum::Router {
    axum::Router::new().route("/evaluate", post(evaluate))
}

#[tracing::instrument(level = "info", skip_all)]
async fn evaluate(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<Vec<EvalResult>>, ApiError> {
    tracing::info!(pairs = req.messages.len(), "evaluate request");
    if req.messages.is_empty() {
        return Err(ApiError::InvalidInput("messages is empty".to_string()));
    }

    let pairs: Vec<(&str, &str)> = req
        .messages
        .iter()
        .map(|p| (p.answer.as_str(), p.question.as_str()))
        .collect();
    let explanations = state.scorer.explain_batch(&pairs).await?;

    let out = req
        .messages
        .iter()
        .zip(explanations)
        .map(|(pair, explanation)| EvalResult {
            input: pair.clone(),
            certainty_score: explanation.mean_score(),
            reasoning: explanation.reasoning().map(str::to_string),
        })
        .collect();
    Ok(Json(out))
}
