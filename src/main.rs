//! Layerpaint CLI
//!
//! Command-line interface for running paint scripts against a layer canvas.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use layerpaint::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Layerpaint v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Layerpaint v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Layers => layerpaint::cli::commands::list_layers().context("listing layers"),
        Commands::Run(args) => layerpaint::cli::commands::run_script(&args)
            .with_context(|| format!("running script {}", args.script.display())),
    }
}
