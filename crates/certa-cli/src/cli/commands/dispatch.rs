use super::super::args::*;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Score(args) => super::score::run(args, &cli.global).await,
        Command::Demo(args) => super::demo::run(args, &cli.global).await,
        Command::Serve(args) => super::serve::run(args, &cli.global).await,
        Command::Config => super::config::run(&cli.global),
    }
}
