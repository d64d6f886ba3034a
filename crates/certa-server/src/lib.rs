//! HTTP adapter over [`certa_core::ReflectionScorer`].
//!
//! - `POST /evaluate`: score a list of `{answer, question}` pairs
//! - `GET /health`: liveness

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::evaluate::{EvalPair, EvalResult, EvaluateRequest};
pub use server::{router, serve, AppState};
