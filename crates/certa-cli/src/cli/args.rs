use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "certa",
    version,
    about = "Self-reflection certainty scoring: ask a model to judge an answer several times and average its verdicts"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score one answer to one question
    Score(ScoreArgs),
    /// Score a fixed set of correct, wrong and ambiguous answers
    Demo(DemoArgs),
    /// Serve the HTTP evaluation endpoint
    Serve(ServeArgs),
    /// Print the effective configuration as YAML
    Config,
}

/// Scorer settings. Flags override `certa.yaml` and `CERTA_*` environment variables.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: ./certa.yaml if present)
    #[arg(long, global = true, env = "CERTA_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub temperature: Option<f64>,

    /// Independent reflections per answer
    #[arg(long, short = 'n', global = true)]
    pub reflections: Option<u32>,

    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Base backoff in seconds; retry i waits backoff * 2^i
    #[arg(long, global = true)]
    pub backoff_secs: Option<f64>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<f64>,

    /// Completion provider: openai | fake
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Fixed reply for the fake provider
    #[arg(long, global = true)]
    pub fake_response: Option<String>,

    /// File holding a custom reflection prompt with {question} and {answer} slots
    #[arg(long, global = true)]
    pub prompt_template: Option<PathBuf>,

    /// Issue the reflections of one answer concurrently
    #[arg(long, global = true)]
    pub concurrent: bool,

    /// Only retry transient provider failures (not auth / not-found)
    #[arg(long, global = true)]
    pub strict_retries: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub answer: String,

    #[arg(long, default_value = "")]
    pub question: String,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DemoArgs {
    /// Pause between examples, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub pause_ms: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8080", env = "CERTA_ADDR")]
    pub addr: SocketAddr,
}
