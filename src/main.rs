mod cli;
mod dispatcher;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use ctc::config::Config;
use std::io::stderr;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so converted CSV on stdout stays pipeable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    dispatcher::dispatch_command(cli.command, &config, cli.json)
}
