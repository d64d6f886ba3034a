use axum::routing::get;
use axum::Router;

pub mod evaluate;
pub mod health;

#[tracing::instrument(level = "debug", skip_all)]
pub fn router() -> Router {
    Router::new()
        .merge(evaluate::router())
        .route("/health", get(health::get_health))
}
