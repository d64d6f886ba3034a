pub mod config;
pub mod demo;
pub mod dispatch;
pub mod score;
pub mod serve;

pub use dispatch::dispatch;

use super::args::GlobalArgs;
use certa_core::{ConfigError, ReflectionScorer, RetryPolicy, SamplingMode, ScorerConfig};
use std::path::Path;

/// Defaults, then config file, then `CERTA_*` environment, then flags.
pub(crate) fn resolve_config(args: &GlobalArgs) -> Result<ScorerConfig, ConfigError> {
    let default_path = Path::new(certa_core::CONFIG_FILE_NAME);
    let path = match &args.config {
        Some(path) => Some(path.as_path()),
        None if default_path.exists() => Some(default_path),
        None => None,
    };
    let mut config = ScorerConfig::load(path)?;

    if let Some(model) = &args.model {
        config.client.model = model.clone();
    }
    if let Some(t) = args.temperature {
        config.client.temperature = t;
    }
    if let Some(n) = args.reflections {
        config.n_reflections = n;
    }
    if let Some(r) = args.max_retries {
        config.client.max_retries = r;
    }
    if let Some(b) = args.backoff_secs {
        config.client.base_backoff_secs = b;
    }
    if let Some(t) = args.timeout_secs {
        config.client.timeout_secs = Some(t);
    }
    if let Some(kind) = &args.provider {
        config.provider.kind = kind.parse()?;
    }
    if let Some(url) = &args.base_url {
        config.provider.base_url = url.clone();
    }
    if let Some(resp) = &args.fake_response {
        config.provider.fake_response = Some(resp.clone());
    }
    if let Some(path) = &args.prompt_template {
        config.load_prompt_template(path)?;
    }
    if args.concurrent {
        config.sampling = SamplingMode::Concurrent;
    }
    if args.strict_retries {
        config.client.retry_policy = RetryPolicy::Strict;
    }

    Ok(config)
}

pub(crate) fn build_scorer(args: &GlobalArgs) -> certa_core::Result<ReflectionScorer> {
    let config = resolve_config(args)?;
    tracing::debug!(
        model = %config.client.model,
        provider = ?config.provider.kind,
        n_reflections = config.n_reflections,
        "building scorer"
    );
    ReflectionScorer::from_config(config)
}
