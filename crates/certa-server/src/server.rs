use crate::routes;
use axum::{Extension, Router};
use certa_core::ReflectionScorer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct AppState {
    pub scorer: ReflectionScorer,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(scorer: ReflectionScorer) -> Self {
        Self {
            scorer,
            started_at: Instant::now(),
        }
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "certa server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
