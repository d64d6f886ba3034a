//! Scorer configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables. The CLI applies its own flags on top.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CERTA_MODEL` | Model identifier |
//! | `CERTA_TEMPERATURE` | Sampling temperature |
//! | `CERTA_REFLECTIONS` | Samples per scoring call (default: 3) |
//! | `CERTA_MAX_RETRIES` | Retries per completion (default: 3) |
//! | `CERTA_BACKOFF_SECS` | Base backoff in seconds (default: 1.0) |
//! | `CERTA_TIMEOUT_SECS` | Per-attempt timeout in seconds (default: none) |
//! | `CERTA_BASE_URL` | OpenAI-compatible endpoint |
//! | `CERTA_PROMPT_TEMPLATE_FILE` | File holding a custom reflection prompt |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, RetryPolicy};
use crate::prompt::PromptTemplate;
use crate::providers::openai::DEFAULT_BASE_URL;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "certa.yaml";

/// Completion client settings. Fixed for the lifetime of a scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before retry `i` is `base_backoff_secs * 2^i`.
    #[serde(default = "default_backoff_secs")]
    pub base_backoff_secs: f64,

    /// Per-attempt timeout. `None` leaves timing to the provider.
    #[serde(default)]
    pub timeout_secs: Option<f64>,

    #[serde(default)]
    pub retry_policy: RetryPolicy,

    /// Provider-specific pass-through fields.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_secs() -> f64 {
    1.0
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            base_backoff_secs: default_backoff_secs(),
            timeout_secs: None,
            retry_policy: RetryPolicy::default(),
            options: serde_json::Map::new(),
        }
    }
}

impl ClientConfig {
    pub fn base_backoff(&self) -> Result<Duration, ConfigError> {
        positive_duration(self.base_backoff_secs).ok_or(ConfigError::InvalidBackoff(
            self.base_backoff_secs,
        ))
    }

    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout_secs
            .map(|secs| positive_duration(secs).ok_or(ConfigError::InvalidTimeout(secs)))
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        self.base_backoff()?;
        self.timeout()?;
        Ok(())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff_secs = backoff.as_secs_f64();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_secs = timeout.map(|t| t.as_secs_f64());
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

fn positive_duration(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Openai,
    Fake,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "fake" => Ok(Self::Fake),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Fixed reply for the `fake` provider.
    #[serde(default)]
    pub fake_response: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            fake_response: None,
        }
    }
}

/// How the N reflection calls of one scoring request are issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    #[default]
    Sequential,
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScorerConfig {
    #[serde(default = "default_reflections")]
    pub n_reflections: u32,

    /// Overrides the default reflection prompt. Must contain `{question}` and `{answer}`.
    #[serde(default)]
    pub prompt_template: Option<String>,

    #[serde(default)]
    pub sampling: SamplingMode,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_reflections() -> u32 {
    3
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            n_reflections: default_reflections(),
            prompt_template: None,
            sampling: SamplingMode::default(),
            client: ClientConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl ScorerConfig {
    /// Defaults, then `path` (if any), then environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit; treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<yaml>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("CERTA_MODEL") {
            self.client.model = model;
        }
        if let Some(v) = lookup("CERTA_TEMPERATURE") {
            self.client.temperature = parse_env("CERTA_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("CERTA_REFLECTIONS") {
            self.n_reflections = parse_env("CERTA_REFLECTIONS", &v)?;
        }
        if let Some(v) = lookup("CERTA_MAX_RETRIES") {
            self.client.max_retries = parse_env("CERTA_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("CERTA_BACKOFF_SECS") {
            self.client.base_backoff_secs = parse_env("CERTA_BACKOFF_SECS", &v)?;
        }
        if let Some(v) = lookup("CERTA_TIMEOUT_SECS") {
            self.client.timeout_secs = Some(parse_env("CERTA_TIMEOUT_SECS", &v)?);
        }
        if let Some(url) = lookup("CERTA_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(file) = lookup("CERTA_PROMPT_TEMPLATE_FILE") {
            self.load_prompt_template(Path::new(&file))?;
        }
        Ok(())
    }

    pub fn load_prompt_template(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.prompt_template = Some(text);
        Ok(())
    }

    /// Reject invalid settings before any provider is contacted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_reflections < 1 {
            return Err(ConfigError::InvalidReflections(self.n_reflections));
        }
        self.client.validate()?;
        self.template()?;
        Ok(())
    }

    /// The configured prompt template, or the default one.
    pub fn template(&self) -> Result<PromptTemplate, ConfigError> {
        match &self.prompt_template {
            Some(text) => PromptTemplate::new(text.clone()),
            None => Ok(PromptTemplate::default()),
        }
    }

    pub fn with_reflections(mut self, n: u32) -> Self {
        self.n_reflections = n;
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse {
        path: format!("env {}", key),
        message: format!("invalid value '{}'", value),
    })
}
