//! JEXUpdate CLI Binary

use anyhow::Context;
use clap::Parser;
use jexupdate::config::JexConfig;
use jexupdate::logging;
use jexupdate::tooling::cli::{Cli, CliContext};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        JexConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    logging::init(&config.logging)?;

    let context = CliContext::new(config)?;
    let output = context.execute(&cli.command).await?;
    println!("{output}");
    Ok(())
}
