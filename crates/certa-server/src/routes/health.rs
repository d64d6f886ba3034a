use crate::server::AppState;
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;

pub async fn get_health(Extension(state): Extension<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "n_reflections": state.scorer.n_reflections(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}
