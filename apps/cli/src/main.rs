use anyhow::Context;
use clap::Parser;
use knob::Engine;
use knob_cli::{Cli, capabilities, execute};
use knob_logger::Logger;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config().context("Critical: Configuration is malformed")?;
    let _log = Logger::from_config(&config.logging)?;

    let engine = Engine::builder()
        .capabilities(capabilities(&config).await?)
        .config(config)
        .register_defaults()
        .load()?;

    let output = execute(&engine, &cli.command).await?;
    writeln!(std::io::stdout().lock(), "{output}")?;
    Ok(())
}
