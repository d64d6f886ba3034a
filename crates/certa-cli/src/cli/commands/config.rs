use crate::cli::args::GlobalArgs;
use crate::exit_codes;

/// Print the effective configuration. API keys live in the environment and never appear here.
pub fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = super::resolve_config(global).map_err(certa_core::Error::from)?;
    config.validate().map_err(certa_core::Error::from)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(exit_codes::SUCCESS)
}
