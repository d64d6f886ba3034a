use crate::cli::args::{GlobalArgs, ServeArgs};
use crate::exit_codes;
use certa_server::AppState;

pub async fn run(args: ServeArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let scorer = super::build_scorer(global)?;
    certa_server::serve(args.addr, AppState::new(scorer)).await?;
    Ok(exit_codes::SUCCESS)
}
