use boltgrant_app::cli::Cli;
use boltgrant_app::{logging, runner};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    runner::run(cli).await
}
